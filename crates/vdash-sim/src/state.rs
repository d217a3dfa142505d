//! ---
//! vdash_section: "02-simulation"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Vehicle telemetry record mutated by the simulator."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

/// Battery charge of a freshly initialised vehicle.
pub const BATTERY_FULL_PCT: f64 = 100.0;

/// Current speed, engine RPM, and battery charge of the simulated vehicle.
///
/// After every simulation step `rpm` lies within the simulator's RPM range,
/// `battery_pct` is in `[0, 100]` and never higher than before the step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryState {
    pub speed_kmh: u32,
    pub rpm: u32,
    pub battery_pct: f64,
}

impl TelemetryState {
    pub const fn new(speed_kmh: u32, rpm: u32, battery_pct: f64) -> Self {
        Self {
            speed_kmh,
            rpm,
            battery_pct,
        }
    }

    /// Stationary vehicle, engine off, full battery.
    pub const fn initial() -> Self {
        Self::new(0, 0, BATTERY_FULL_PCT)
    }
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for TelemetryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Speed: {} Km/hr, RPM: {}, Battery: {:.2}%",
            self.speed_kmh, self.rpm, self.battery_pct
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_stationary_with_full_battery() {
        let state = TelemetryState::default();
        assert_eq!(state, TelemetryState::new(0, 0, 100.0));
    }

    #[test]
    fn display_lists_all_metrics() {
        let state = TelemetryState::new(87, 2610, 99.5);
        assert_eq!(state.to_string(), "Speed: 87 Km/hr, RPM: 2610, Battery: 99.50%");
    }
}
