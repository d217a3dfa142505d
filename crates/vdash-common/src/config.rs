//! ---
//! vdash_section: "01-core-functionality"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "INI configuration document and dashboard settings."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use config::{Config, File, FileFormat, Value};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::logging::LogFormat;

/// Default location of the configuration resource, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.ini";

/// Speed forced onto the vehicle before the first cycle so that a high-speed
/// alert is observable immediately. Demo seam, not a physical event.
pub const DEMO_INITIAL_SPEED_KMH: u32 = 120;

const SIMULATION_SECTION: &str = "SIMULATION";
const LOGGING_SECTION: &str = "LOGGING";

fn default_cycles() -> u32 {
    10
}

fn default_pause() -> Duration {
    Duration::from_millis(500)
}

fn default_initial_speed() -> Option<u32> {
    Some(DEMO_INITIAL_SPEED_KMH)
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_file_name() -> String {
    "dashboard.log".to_owned()
}

/// Parsed INI resource with case-insensitive section and key lookups.
#[derive(Debug, Clone)]
pub struct IniDocument {
    path: PathBuf,
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniDocument {
    /// Read and parse the INI file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        debug!(config_path = %path.display(), "loading configuration");
        let source = File::from(path).format(FileFormat::Ini).required(true);
        Self::build(path, Config::builder().add_source(source))
    }

    /// Parse INI text that did not come from disk. `origin` is only used in error messages.
    pub fn parse(origin: impl AsRef<Path>, content: &str) -> Result<Self> {
        let source = File::from_str(content, FileFormat::Ini);
        Self::build(origin.as_ref(), Config::builder().add_source(source))
    }

    fn build(
        path: &Path,
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings = builder
            .build()
            .map_err(|err| ConfigError::malformed(path, err.to_string()))?;
        let root = settings
            .try_deserialize::<HashMap<String, Value>>()
            .map_err(|err| ConfigError::malformed(path, err.to_string()))?;

        let mut sections = HashMap::new();
        for (name, value) in root {
            // Keys outside any section are not part of the format.
            let Ok(table) = value.into_table() else {
                continue;
            };
            let mut entries = HashMap::with_capacity(table.len());
            for (key, value) in table {
                let value = value
                    .into_string()
                    .map_err(|err| ConfigError::malformed(path, err.to_string()))?;
                entries.insert(key.to_ascii_lowercase(), value.trim().to_owned());
            }
            sections.insert(name.to_ascii_lowercase(), entries);
        }

        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&section.to_ascii_lowercase())
    }

    /// Raw string value of `key` within `section`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_ascii_lowercase())
            .and_then(|entries| entries.get(&key.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// Parse a mandatory value; absence and parse failures are both malformations.
    pub fn require<T>(&self, section: &str, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.get(section, key).ok_or_else(|| {
            ConfigError::malformed(&self.path, format!("missing key [{section}] {key}"))
        })?;
        raw.parse::<T>().map_err(|err| {
            ConfigError::malformed(
                &self.path,
                format!("invalid value '{raw}' for [{section}] {key}: {err}"),
            )
        })
    }

    /// Parse an optional value; only parse failures are malformations.
    pub fn optional<T>(&self, section: &str, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(section, key) {
            Some(_) => self.require(section, key).map(Some),
            None => Ok(None),
        }
    }
}

/// Runtime settings for the dashboard beyond the alert thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardConfig {
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub cycles: u32,
    pub pause: Duration,
    pub seed: Option<u64>,
    pub initial_speed_kmh: Option<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cycles: default_cycles(),
            pause: default_pause(),
            seed: None,
            initial_speed_kmh: default_initial_speed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    pub file_name: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_log_directory(),
            file_name: default_log_file_name(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn file_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Settings together with where they came from and any keys that were ignored.
#[derive(Debug)]
pub struct LoadedDashboardConfig {
    pub config: DashboardConfig,
    pub source: PathBuf,
    pub issues: Vec<ConfigError>,
}

impl DashboardConfig {
    pub const ENV_CONFIG_PATH: &str = "VDASH_CONFIG";

    /// Pick the configuration path: `VDASH_CONFIG`, then the explicit path, then `config.ini`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                return PathBuf::from(env_path);
            }
        }
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load settings from `path`. Never fails: every problem degrades to defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let loaded = Self::load_with_source(path);
        for issue in &loaded.issues {
            warn!(error = %issue, "ignoring invalid setting");
        }
        loaded.config
    }

    /// Like [`DashboardConfig::load`], but hands the problems back instead of logging
    /// them, for callers that read settings before tracing is initialised.
    pub fn load_with_source(path: impl AsRef<Path>) -> LoadedDashboardConfig {
        let source = path.as_ref().to_path_buf();
        let mut issues = Vec::new();
        let config = match IniDocument::open(&source) {
            Ok(document) => Self::collect(&document, &mut issues),
            Err(ConfigError::Missing(path)) => {
                debug!(config_path = %path.display(), "no configuration file, using default settings");
                Self::default()
            }
            Err(err) => {
                issues.push(err);
                Self::default()
            }
        };
        LoadedDashboardConfig {
            config,
            source,
            issues,
        }
    }

    /// Build settings from a parsed document, defaulting each key independently.
    pub fn from_document(document: &IniDocument) -> Self {
        let mut issues = Vec::new();
        let config = Self::collect(document, &mut issues);
        for issue in &issues {
            warn!(error = %issue, "ignoring invalid setting");
        }
        config
    }

    fn collect(document: &IniDocument, issues: &mut Vec<ConfigError>) -> Self {
        let defaults = Self::default();
        let mut setting = Settings { document, issues };
        let simulation = SimulationConfig {
            cycles: setting
                .get(SIMULATION_SECTION, "CYCLES")
                .unwrap_or(defaults.simulation.cycles),
            pause: setting
                .get::<u64>(SIMULATION_SECTION, "PAUSE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.simulation.pause),
            seed: setting.get(SIMULATION_SECTION, "SEED"),
            initial_speed_kmh: setting
                .get::<InitialSpeed>(SIMULATION_SECTION, "INITIAL_SPEED_KM_HR")
                .map(|speed| speed.0)
                .unwrap_or(defaults.simulation.initial_speed_kmh),
        };
        let logging = LoggingConfig {
            enabled: setting
                .get::<Switch>(LOGGING_SECTION, "ENABLED")
                .map(|switch| switch.0)
                .unwrap_or(defaults.logging.enabled),
            directory: setting
                .get(LOGGING_SECTION, "DIRECTORY")
                .unwrap_or(defaults.logging.directory),
            file_name: setting
                .get(LOGGING_SECTION, "FILE_NAME")
                .unwrap_or(defaults.logging.file_name),
            format: setting
                .get(LOGGING_SECTION, "FORMAT")
                .unwrap_or(defaults.logging.format),
        };
        Self {
            simulation,
            logging,
        }
    }
}

/// Optional-key reader that records parse failures instead of returning them.
struct Settings<'a> {
    document: &'a IniDocument,
    issues: &'a mut Vec<ConfigError>,
}

impl Settings<'_> {
    fn get<T>(&mut self, section: &str, key: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.document.optional(section, key) {
            Ok(value) => value,
            Err(err) => {
                self.issues.push(err);
                None
            }
        }
    }
}

/// `INITIAL_SPEED_KM_HR` accepts a speed, or `0`/`off`/`none` to disable the override.
struct InitialSpeed(Option<u32>);

impl FromStr for InitialSpeed {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" | "disabled" => Ok(InitialSpeed(None)),
            other => other
                .parse::<u32>()
                .map(|speed| InitialSpeed((speed > 0).then_some(speed)))
                .map_err(|err| err.to_string()),
        }
    }
}

struct Switch(bool);

impl FromStr for Switch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Switch(true)),
            "false" | "no" | "off" | "0" => Ok(Switch(false)),
            other => Err(format!("expected a boolean, got '{other}'")),
        }
    }
}
