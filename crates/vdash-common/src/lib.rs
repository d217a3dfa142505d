//! ---
//! vdash_section: "01-core-functionality"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Shared primitives and utilities for the dashboard runtime."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
//! Core shared primitives for the V-Dash workspace.
//! This crate exposes INI configuration loading and the tracing setup
//! consumed by the simulator and the `vdash` binary.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    DashboardConfig, IniDocument, LoadedDashboardConfig, LoggingConfig, SimulationConfig,
};
pub use error::ConfigError;
pub use logging::{init_tracing, LogFormat, RECORD_TARGET};
