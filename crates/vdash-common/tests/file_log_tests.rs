//! ---
//! vdash_section: "01-core-functionality"
//! vdash_subsection: "tests"
//! vdash_type: "source"
//! vdash_scope: "test"
//! vdash_description: "Dashboard log file contents after a complete run."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
//! Installs the global subscriber, so this binary holds a single test.

use anyhow::Result;
use tempfile::tempdir;
use tracing::{info, warn};
use vdash_common::{init_tracing, LoggingConfig, RECORD_TARGET};

#[test]
fn records_reach_the_file_under_a_quiet_filter_once_the_guard_drops() -> Result<()> {
    // Diagnostics at warn must not hide the per-cycle records.
    std::env::set_var("VDASH_LOG", "warn");

    let temp = tempdir()?;
    let config = LoggingConfig {
        directory: temp.path().join("logs"),
        file_name: "dashboard.log".to_owned(),
        ..LoggingConfig::default()
    };
    let guard = init_tracing("vdash-test", &config)?;
    assert!(guard.is_some());

    for cycle in 1..=25u32 {
        info!(
            target: RECORD_TARGET,
            cycle,
            speed_kmh = 100 + cycle,
            rpm = 3000,
            battery_pct = 99.5,
            "cycle record"
        );
    }
    warn!(target: RECORD_TARGET, kind = "high-speed", "HIGH SPEED ALERT! Current Speed: 125 Km/hr");
    info!(target: "vdash_sim::monitor", "chatter below the diagnostics level");
    drop(guard);

    let contents = std::fs::read_to_string(config.file_path())?;
    let records: Vec<&str> = contents
        .lines()
        .filter(|line| line.contains("cycle record"))
        .collect();
    assert_eq!(records.len(), 25);
    assert!(records
        .iter()
        .all(|line| line.contains("INFO") && line.contains("speed_kmh=") && line.contains("battery_pct=")));

    let alerts: Vec<&str> = contents
        .lines()
        .filter(|line| line.contains("HIGH SPEED ALERT!"))
        .collect();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("WARN"));
    assert!(!contents.contains("chatter below the diagnostics level"));
    Ok(())
}
