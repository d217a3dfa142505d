//! ---
//! vdash_section: "02-simulation"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Threshold evaluation producing per-cycle alerts."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::TelemetryState;
use crate::thresholds::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    HighSpeed,
    HighRpm,
    LowBattery,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::HighSpeed => "high-speed",
            AlertKind::HighRpm => "high-rpm",
            AlertKind::LowBattery => "low-battery",
        }
    }
}

/// A threshold crossing observed in a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Alert {
    HighSpeed { speed_kmh: u32, threshold: f64 },
    HighRpm { rpm: u32, threshold: f64 },
    LowBattery { battery_pct: f64, threshold: f64 },
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        match self {
            Alert::HighSpeed { .. } => AlertKind::HighSpeed,
            Alert::HighRpm { .. } => AlertKind::HighRpm,
            Alert::LowBattery { .. } => AlertKind::LowBattery,
        }
    }

    /// The offending telemetry value.
    pub fn value(&self) -> f64 {
        match *self {
            Alert::HighSpeed { speed_kmh, .. } => f64::from(speed_kmh),
            Alert::HighRpm { rpm, .. } => f64::from(rpm),
            Alert::LowBattery { battery_pct, .. } => battery_pct,
        }
    }

    pub fn threshold(&self) -> f64 {
        match *self {
            Alert::HighSpeed { threshold, .. }
            | Alert::HighRpm { threshold, .. }
            | Alert::LowBattery { threshold, .. } => threshold,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Alert::HighSpeed {
                speed_kmh,
                threshold,
            } => write!(
                f,
                "HIGH SPEED ALERT! Current Speed: {speed_kmh} Km/hr (Threshold: {threshold:.0})"
            ),
            Alert::HighRpm { rpm, threshold } => write!(
                f,
                "HIGH RPM ALERT! Current RPM: {rpm} RPM (Threshold: {threshold:.0})"
            ),
            Alert::LowBattery {
                battery_pct,
                threshold,
            } => write!(
                f,
                "LOW BATTERY ALERT! Current: {battery_pct:.2} % (Threshold: {threshold:.0} %)"
            ),
        }
    }
}

/// Compare `state` against `thresholds`.
///
/// Each check is independent and always re-evaluated; alerts come back in the
/// order speed, RPM, battery.
pub fn evaluate(state: &TelemetryState, thresholds: &Thresholds) -> Vec<Alert> {
    let mut alerts = Vec::with_capacity(3);

    if f64::from(state.speed_kmh) > thresholds.speed_kmh_max {
        alerts.push(Alert::HighSpeed {
            speed_kmh: state.speed_kmh,
            threshold: thresholds.speed_kmh_max,
        });
    }

    if f64::from(state.rpm) > thresholds.rpm_max {
        alerts.push(Alert::HighRpm {
            rpm: state.rpm,
            threshold: thresholds.rpm_max,
        });
    }

    if state.battery_pct < thresholds.battery_pct_min {
        alerts.push(Alert::LowBattery {
            battery_pct: state.battery_pct,
            threshold: thresholds.battery_pct_min,
        });
    }

    alerts
}
