//! ---
//! vdash_section: "02-simulation"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Alert thresholds and their configuration sources."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
//! Alert thresholds.
//!
//! Thresholds come from the `[THRESHOLDS]` section of the dashboard INI file:
//!
//! ```ini
//! [THRESHOLDS]
//! SPEED_KM_HR = 110
//! RPM = 6000
//! BATTERY_LEVEL_PCT = 10
//! ```
//!
//! Loading never fails. A missing file, a parse error, or any missing or
//! non-numeric field replaces the whole triple with [`Thresholds::default`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vdash_common::{ConfigError, IniDocument};

pub const THRESHOLDS_SECTION: &str = "THRESHOLDS";
pub const SPEED_KEY: &str = "SPEED_KM_HR";
pub const RPM_KEY: &str = "RPM";
pub const BATTERY_KEY: &str = "BATTERY_LEVEL_PCT";

pub const DEFAULT_SPEED_KMH_MAX: f64 = 110.0;
pub const DEFAULT_RPM_MAX: f64 = 6000.0;
pub const DEFAULT_BATTERY_PCT_MIN: f64 = 10.0;

/// Limits a [`crate::TelemetryState`] is checked against every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Alert when speed rises above this value.
    pub speed_kmh_max: f64,
    /// Alert when RPM rises above this value.
    pub rpm_max: f64,
    /// Alert when battery drops below this value.
    pub battery_pct_min: f64,
}

impl Thresholds {
    pub const DEFAULT: Self = Self {
        speed_kmh_max: DEFAULT_SPEED_KMH_MAX,
        rpm_max: DEFAULT_RPM_MAX,
        battery_pct_min: DEFAULT_BATTERY_PCT_MIN,
    };

    /// Read the three limits from a parsed INI document.
    pub fn from_document(document: &IniDocument) -> Result<Self, ConfigError> {
        let thresholds = Self {
            speed_kmh_max: finite(document, SPEED_KEY)?,
            rpm_max: finite(document, RPM_KEY)?,
            battery_pct_min: finite(document, BATTERY_KEY)?,
        };
        Ok(thresholds)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Speed > {:.0} Km/hr, RPM > {:.0}, Battery < {:.0} %",
            self.speed_kmh_max, self.rpm_max, self.battery_pct_min
        )
    }
}

fn finite(document: &IniDocument, key: &str) -> Result<f64, ConfigError> {
    let value = document.require::<f64>(THRESHOLDS_SECTION, key)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::malformed(
            document.path(),
            format!("[{THRESHOLDS_SECTION}] {key} must be a finite number, got {value}"),
        ))
    }
}

/// Source of the thresholds used for a monitoring run.
pub trait ThresholdProvider {
    /// Produce thresholds. Implementations degrade to defaults instead of failing.
    fn load(&self) -> Thresholds;
}

impl<T: ThresholdProvider + ?Sized> ThresholdProvider for Box<T> {
    fn load(&self) -> Thresholds {
        (**self).load()
    }
}

impl<T: ThresholdProvider + ?Sized> ThresholdProvider for &T {
    fn load(&self) -> Thresholds {
        (**self).load()
    }
}

/// Reads thresholds from an INI file on every [`ThresholdProvider::load`].
#[derive(Debug, Clone)]
pub struct IniThresholdProvider {
    path: PathBuf,
}

impl IniThresholdProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict variant of [`ThresholdProvider::load`] that reports why the file was rejected.
    pub fn try_load(&self) -> Result<Thresholds, ConfigError> {
        let document = IniDocument::open(&self.path)?;
        Thresholds::from_document(&document)
    }
}

impl ThresholdProvider for IniThresholdProvider {
    fn load(&self) -> Thresholds {
        match self.try_load() {
            Ok(thresholds) => {
                info!(config_path = %self.path.display(), %thresholds, "thresholds loaded");
                thresholds
            }
            Err(err) => {
                let thresholds = Thresholds::default();
                warn!(error = %err, %thresholds, "using default hardcoded thresholds");
                thresholds
            }
        }
    }
}

/// Always yields the same thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedThresholds(pub Thresholds);

impl ThresholdProvider for FixedThresholds {
    fn load(&self) -> Thresholds {
        self.0
    }
}
