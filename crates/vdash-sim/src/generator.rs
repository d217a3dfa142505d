//! ---
//! vdash_section: "02-simulation"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Pseudo-random telemetry generator."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use rand::prelude::*;

use crate::error::{Result, SimulationError};
use crate::state::TelemetryState;

/// Constants shaping a simulation step.
///
/// RPM follows speed with noise so the engine idles at low speed; battery
/// drain grows with RPM. These are illustrative formulas, not physical models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Largest speed change per step, in km/h, applied in either direction.
    pub speed_delta_max: u32,
    /// Largest RPM noise per step, applied in either direction.
    pub rpm_noise_max: u32,
    pub rpm_per_kmh: u32,
    pub rpm_min: u32,
    pub rpm_max: u32,
    /// Percentage drained every step regardless of load.
    pub base_drain_pct: f64,
    /// `rpm / rpm_drain_divisor` is added to the base drain.
    pub rpm_drain_divisor: f64,
}

impl SimulationParams {
    pub const DEFAULT: Self = Self {
        speed_delta_max: 15,
        rpm_noise_max: 400,
        rpm_per_kmh: 30,
        rpm_min: 800,
        rpm_max: 6500,
        base_drain_pct: 0.01,
        rpm_drain_divisor: 1_500_000.0,
    };

    pub fn validate(&self) -> Result<()> {
        if self.rpm_min > self.rpm_max {
            return Err(SimulationError::EmptyRpmRange {
                min: self.rpm_min,
                max: self.rpm_max,
            });
        }
        if !self.base_drain_pct.is_finite() || self.base_drain_pct < 0.0 {
            return Err(SimulationError::InvalidBaseDrain(self.base_drain_pct));
        }
        if !self.rpm_drain_divisor.is_finite() || self.rpm_drain_divisor <= 0.0 {
            return Err(SimulationError::InvalidDrainDivisor(self.rpm_drain_divisor));
        }
        Ok(())
    }

    /// Battery percentage consumed by one step at the given RPM.
    pub fn drain_for(&self, rpm: u32) -> f64 {
        self.base_drain_pct + f64::from(rpm) / self.rpm_drain_divisor
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Advances a [`TelemetryState`] one step at a time using an injected random source.
#[derive(Debug, Clone)]
pub struct TelemetrySimulator<R = StdRng> {
    rng: R,
    params: SimulationParams,
}

impl TelemetrySimulator<StdRng> {
    /// Reproducible simulator: identical seeds yield identical trajectories.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> TelemetrySimulator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            params: SimulationParams::DEFAULT,
        }
    }

    pub fn with_params(rng: R, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { rng, params })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Mutate `state` in place and hand it back for chaining.
    ///
    /// Order matters for reproducibility: the speed delta is drawn before the
    /// RPM noise.
    pub fn step<'a>(&mut self, state: &'a mut TelemetryState) -> &'a mut TelemetryState {
        let params = self.params;

        let speed_delta = self.symmetric_sample(params.speed_delta_max);
        state.speed_kmh =
            (i64::from(state.speed_kmh) + speed_delta).clamp(0, i64::from(u32::MAX)) as u32;

        let rpm_noise = self.symmetric_sample(params.rpm_noise_max);
        let target_rpm = i64::from(state.speed_kmh) * i64::from(params.rpm_per_kmh) + rpm_noise;
        state.rpm = target_rpm.clamp(i64::from(params.rpm_min), i64::from(params.rpm_max)) as u32;

        let drained = (state.battery_pct - params.drain_for(state.rpm)).max(0.0);
        // Rounding may not push the level back above where it started.
        state.battery_pct = round_hundredths(drained).min(state.battery_pct).max(0.0);

        state
    }

    fn symmetric_sample(&mut self, bound: u32) -> i64 {
        let bound = i64::from(bound);
        self.rng.gen_range(-bound..=bound)
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
