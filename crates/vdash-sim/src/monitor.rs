//! ---
//! vdash_section: "02-simulation"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Monitoring loop orchestrating simulate, present, evaluate, notify, pause."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info_span};
use vdash_common::config::{SimulationConfig, DEMO_INITIAL_SPEED_KMH};

use crate::alerts::evaluate;
use crate::generator::TelemetrySimulator;
use crate::presenter::{Cycle, CycleObserver, RunStart};
use crate::state::TelemetryState;
use crate::thresholds::{ThresholdProvider, Thresholds};

/// End-of-cycle pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep the current thread, simulating real-time refresh.
    Sleep(Duration),
    /// Run cycles back to back (tests, batch runs).
    Disabled,
}

impl Pacing {
    pub fn pause(&self) {
        if let Pacing::Sleep(period) = self {
            if !period.is_zero() {
                std::thread::sleep(*period);
            }
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Sleep(Duration::from_millis(500))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    /// Speed forced onto the state before the first cycle; `None` keeps the
    /// vehicle at rest. Defaults to [`DEMO_INITIAL_SPEED_KMH`] so that the
    /// first cycle reliably shows a high-speed alert.
    pub initial_speed_override: Option<u32>,
    pub pacing: Pacing,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            initial_speed_override: Some(DEMO_INITIAL_SPEED_KMH),
            pacing: Pacing::default(),
        }
    }
}

impl LoopOptions {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            initial_speed_override: config.initial_speed_kmh,
            pacing: Pacing::Sleep(config.pause),
        }
    }

    /// Default options without the end-of-cycle pause.
    pub fn unpaced() -> Self {
        Self {
            pacing: Pacing::Disabled,
            ..Self::default()
        }
    }
}

/// Completion record of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub cycles_completed: u32,
    pub alerts_fired: u64,
    pub thresholds: Thresholds,
    pub final_state: TelemetryState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives a fixed number of simulate, present, evaluate, notify, pause cycles.
///
/// The loop is consumed by [`MonitoringLoop::run`]; a finished run cannot be
/// restarted.
#[derive(Debug)]
pub struct MonitoringLoop<P, R = StdRng> {
    simulator: TelemetrySimulator<R>,
    thresholds: P,
    options: LoopOptions,
}

impl<P, R> MonitoringLoop<P, R>
where
    P: ThresholdProvider,
    R: Rng,
{
    pub fn new(simulator: TelemetrySimulator<R>, thresholds: P, options: LoopOptions) -> Self {
        Self {
            simulator,
            thresholds,
            options,
        }
    }

    pub fn options(&self) -> &LoopOptions {
        &self.options
    }

    /// Run `cycle_count` cycles, reporting each step to `observer`.
    ///
    /// Thresholds are loaded exactly once, before the initial-speed override
    /// and the first cycle.
    pub fn run(mut self, cycle_count: u32, observer: &mut dyn CycleObserver) -> RunSummary {
        let span = info_span!("monitoring", cycles = cycle_count);
        let _entered = span.enter();
        let started_at = Utc::now();

        let mut state = TelemetryState::initial();
        let thresholds = self.thresholds.load();
        if let Some(speed) = self.options.initial_speed_override {
            state.speed_kmh = speed;
        }

        observer.on_start(&RunStart {
            thresholds,
            initial_state: state,
            initial_speed_override: self.options.initial_speed_override,
            cycles: cycle_count,
        });

        let mut alerts_fired = 0u64;
        for index in 1..=cycle_count {
            let cycle = Cycle {
                index,
                total: cycle_count,
            };
            observer.on_cycle_start(cycle, &state);

            self.simulator.step(&mut state);
            observer.on_sample(cycle, &state);

            let alerts = evaluate(&state, &thresholds);
            alerts_fired += alerts.len() as u64;
            observer.on_alerts(cycle, &alerts);
            debug!(cycle = index, alerts = alerts.len(), %state, "cycle finished");

            self.options.pacing.pause();
        }

        let summary = RunSummary {
            cycles_completed: cycle_count,
            alerts_fired,
            thresholds,
            final_state: state,
            started_at,
            finished_at: Utc::now(),
        };
        observer.on_complete(&summary);
        summary
    }
}
