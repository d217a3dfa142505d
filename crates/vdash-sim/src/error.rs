//! ---
//! vdash_section: "02-simulation"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Simulation error types."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("rpm range is empty: min {min} exceeds max {max}")]
    EmptyRpmRange { min: u32, max: u32 },
    #[error("base drain must be a non-negative finite number, got {0}")]
    InvalidBaseDrain(f64),
    #[error("rpm drain divisor must be a positive finite number, got {0}")]
    InvalidDrainDivisor(f64),
}
