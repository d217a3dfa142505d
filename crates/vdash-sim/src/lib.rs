//! ---
//! vdash_section: "02-simulation"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Simulation module exports and shared types."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
//! Telemetry simulation and threshold alerting for the V-Dash dashboard.
//!
//! A [`MonitoringLoop`] advances a [`TelemetryState`] with a
//! [`TelemetrySimulator`], checks it against [`Thresholds`] obtained from a
//! [`ThresholdProvider`], and reports every cycle to a [`CycleObserver`]
//! (console rendering, log records, or both through an [`ObserverSet`]).

pub mod alerts;
pub mod error;
pub mod generator;
pub mod monitor;
pub mod presenter;
pub mod state;
pub mod thresholds;

pub use alerts::{evaluate, Alert, AlertKind};
pub use error::SimulationError;
pub use generator::{SimulationParams, TelemetrySimulator};
pub use monitor::{LoopOptions, MonitoringLoop, Pacing, RunSummary};
pub use presenter::{ConsolePresenter, Cycle, CycleObserver, LogObserver, ObserverSet, RunStart};
pub use state::TelemetryState;
pub use thresholds::{FixedThresholds, IniThresholdProvider, ThresholdProvider, Thresholds};
