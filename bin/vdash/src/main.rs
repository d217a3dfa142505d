//! ---
//! vdash_section: "03-entrypoint"
//! vdash_subsection: "binary"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Binary entrypoint for the vehicle dashboard simulator."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::{info, warn};
use vdash_common::{init_tracing, DashboardConfig};
use vdash_sim::{
    ConsolePresenter, FixedThresholds, IniThresholdProvider, LogObserver, LoopOptions,
    MonitoringLoop, ObserverSet, TelemetrySimulator, ThresholdProvider,
};

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Simulated vehicle dashboard with threshold alerts",
    long_about = None
)]
struct Cli {
    /// INI file holding [THRESHOLDS] and optional [SIMULATION]/[LOGGING] sections
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of monitoring cycles to run
    #[arg(long)]
    cycles: Option<u32>,

    /// Seed for the telemetry generator; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between cycles in milliseconds
    #[arg(long, value_name = "MS", conflicts_with = "no_pause")]
    pause_ms: Option<u64>,

    /// Run cycles back to back
    #[arg(long)]
    no_pause: bool,

    /// Start the vehicle at rest instead of forcing the initial demo speed
    #[arg(long)]
    no_initial_override: bool,

    /// Ignore the configuration file's thresholds and use the built-in defaults
    #[arg(long)]
    defaults: bool,

    /// Do not write the dashboard log file
    #[arg(long)]
    no_log_file: bool,

    /// Print version information and exit
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("vdash {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config_path = DashboardConfig::resolve_path(cli.config.as_deref());
    let loaded = DashboardConfig::load_with_source(&config_path);
    let mut config = loaded.config;
    apply_overrides(&cli, &mut config);

    // Dropping the guard flushes the dashboard log; it must outlive the run.
    let _log_guard = init_tracing("vdash", &config.logging)?;
    for issue in &loaded.issues {
        warn!(error = %issue, "ignoring invalid setting");
    }

    let seed = config.simulation.seed.unwrap_or_else(rand::random);
    info!(config_path = %loaded.source.display(), seed, cycles = config.simulation.cycles, "starting dashboard");

    println!("--- Vehicle Dashboard Application Initialized ---");

    let provider: Box<dyn ThresholdProvider> = if cli.defaults {
        Box::new(FixedThresholds::default())
    } else {
        Box::new(IniThresholdProvider::new(&config_path))
    };

    let mut observers = ObserverSet::new().with(ConsolePresenter::stdout());
    if config.logging.enabled {
        observers.push(LogObserver);
    }

    let summary = MonitoringLoop::new(
        TelemetrySimulator::seeded(seed),
        provider,
        LoopOptions::from_config(&config.simulation),
    )
    .run(config.simulation.cycles, &mut observers);

    info!(
        cycles = summary.cycles_completed,
        alerts = summary.alerts_fired,
        battery_pct = summary.final_state.battery_pct,
        "dashboard run complete"
    );
    Ok(())
}

fn apply_overrides(cli: &Cli, config: &mut DashboardConfig) {
    if let Some(cycles) = cli.cycles {
        config.simulation.cycles = cycles;
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }
    if let Some(pause_ms) = cli.pause_ms {
        config.simulation.pause = Duration::from_millis(pause_ms);
    }
    if cli.no_pause {
        config.simulation.pause = Duration::ZERO;
    }
    if cli.no_initial_override {
        config.simulation.initial_speed_kmh = None;
    }
    if cli.no_log_file {
        config.logging.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdash_sim::Pacing;

    fn base_cli() -> Cli {
        Cli {
            config: None,
            cycles: None,
            seed: None,
            pause_ms: None,
            no_pause: false,
            no_initial_override: false,
            defaults: false,
            no_log_file: false,
            version: false,
        }
    }

    #[test]
    fn no_flags_keep_configured_behaviour() {
        let mut config = DashboardConfig::default();
        apply_overrides(&base_cli(), &mut config);
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.simulation.cycles, 10);
    }

    #[test]
    fn flags_override_configuration() {
        let mut cli = base_cli();
        cli.cycles = Some(3);
        cli.seed = Some(11);
        cli.no_pause = true;
        cli.no_initial_override = true;
        cli.no_log_file = true;

        let mut config = DashboardConfig::default();
        apply_overrides(&cli, &mut config);
        assert_eq!(config.simulation.cycles, 3);
        assert_eq!(config.simulation.seed, Some(11));
        assert_eq!(config.simulation.pause, Duration::ZERO);
        assert_eq!(config.simulation.initial_speed_kmh, None);
        assert!(!config.logging.enabled);
        assert_eq!(
            LoopOptions::from_config(&config.simulation).pacing,
            Pacing::Sleep(Duration::ZERO)
        );
    }

    #[test]
    fn cli_parses_without_arguments() {
        let cli = Cli::try_parse_from(["vdash"]).expect("no flags required");
        assert!(cli.config.is_none());
        assert!(!cli.defaults);
    }

    #[test]
    fn pause_flags_conflict() {
        assert!(Cli::try_parse_from(["vdash", "--pause-ms", "10", "--no-pause"]).is_err());
    }
}
