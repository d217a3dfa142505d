//! ---
//! vdash_section: "02-simulation"
//! vdash_subsection: "module"
//! vdash_type: "source"
//! vdash_scope: "code"
//! vdash_description: "Cycle observers: console dashboard and log records."
//! vdash_version: "v0.1.0"
//! vdash_owner: "tbd"
//! ---
use std::io::{self, Stdout, Write};

use tracing::{info, warn};
use vdash_common::RECORD_TARGET;

use crate::alerts::{Alert, AlertKind};
use crate::monitor::RunSummary;
use crate::state::TelemetryState;
use crate::thresholds::Thresholds;

const RULE: &str = "-------------------------------------------";
const BAR_GLYPH: char = '█';
const EMPTY_GLYPH: char = '░';
const BATTERY_SEGMENTS: usize = 10;
const LOW_BATTERY_ICON_PCT: f64 = 20.0;

/// Position of a cycle within a run, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    pub index: u32,
    pub total: u32,
}

/// Context handed to observers once thresholds are known and before the first cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStart {
    pub thresholds: Thresholds,
    pub initial_state: TelemetryState,
    pub initial_speed_override: Option<u32>,
    pub cycles: u32,
}

/// Passive sink driven by [`crate::MonitoringLoop`].
///
/// Per cycle the loop calls `on_cycle_start`, then `on_sample` once the state
/// has been advanced, then `on_alerts` (possibly with an empty slice).
pub trait CycleObserver {
    fn on_start(&mut self, _start: &RunStart) {}

    fn on_cycle_start(&mut self, _cycle: Cycle, _state: &TelemetryState) {}

    fn on_sample(&mut self, cycle: Cycle, state: &TelemetryState);

    fn on_alerts(&mut self, cycle: Cycle, alerts: &[Alert]);

    fn on_complete(&mut self, _summary: &RunSummary) {}
}

/// Fans every callback out to a list of observers, in insertion order.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn CycleObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: impl CycleObserver + 'static) -> Self {
        self.push(observer);
        self
    }

    pub fn push(&mut self, observer: impl CycleObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl CycleObserver for ObserverSet {
    fn on_start(&mut self, start: &RunStart) {
        self.observers.iter_mut().for_each(|o| o.on_start(start));
    }

    fn on_cycle_start(&mut self, cycle: Cycle, state: &TelemetryState) {
        self.observers
            .iter_mut()
            .for_each(|o| o.on_cycle_start(cycle, state));
    }

    fn on_sample(&mut self, cycle: Cycle, state: &TelemetryState) {
        self.observers
            .iter_mut()
            .for_each(|o| o.on_sample(cycle, state));
    }

    fn on_alerts(&mut self, cycle: Cycle, alerts: &[Alert]) {
        self.observers
            .iter_mut()
            .for_each(|o| o.on_alerts(cycle, alerts));
    }

    fn on_complete(&mut self, summary: &RunSummary) {
        self.observers.iter_mut().for_each(|o| o.on_complete(summary));
    }
}

/// Number of bar glyphs drawn next to the RPM reading.
pub fn rpm_bar_len(rpm: u32) -> usize {
    (rpm / 1000) as usize
}

/// Filled segments of the 10-segment battery gauge.
pub fn battery_segments(battery_pct: f64) -> usize {
    ((battery_pct / 10.0).floor().max(0.0) as usize).min(BATTERY_SEGMENTS)
}

fn alert_icon(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::HighSpeed => "🛑",
        AlertKind::HighRpm => "⚠️",
        AlertKind::LowBattery => "🪫",
    }
}

/// Renders the dashboard and alert blocks as text.
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl ConsolePresenter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render_start(&mut self, start: &RunStart) -> io::Result<()> {
        writeln!(self.out, "\n--- Starting Monitoring Cycle ---")?;
        writeln!(self.out, "Alert Thresholds: {}", start.thresholds)?;
        if let Some(speed) = start.initial_speed_override {
            writeln!(
                self.out,
                "(Initial speed manually set to {speed} Km/hr for immediate check)"
            )?;
        }
        Ok(())
    }

    pub fn render_cycle_header(&mut self, cycle: Cycle) -> io::Result<()> {
        writeln!(
            self.out,
            "\n======== CYCLE {}/{} ========",
            cycle.index, cycle.total
        )
    }

    pub fn render_dashboard(&mut self, state: &TelemetryState) -> io::Result<()> {
        let rpm_bar: String = std::iter::repeat(BAR_GLYPH)
            .take(rpm_bar_len(state.rpm))
            .collect();
        let filled = battery_segments(state.battery_pct);
        let battery_bar: String = std::iter::repeat(BAR_GLYPH)
            .take(filled)
            .chain(std::iter::repeat(EMPTY_GLYPH).take(BATTERY_SEGMENTS - filled))
            .collect();
        let battery_icon = if state.battery_pct > LOW_BATTERY_ICON_PCT {
            "🔋"
        } else {
            "🪫"
        };

        writeln!(self.out, "\n{RULE}")?;
        writeln!(self.out, "      *** Real-Time Vehicle Status ***")?;
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out, "  🏎️  Speed: {:<4} Km/hr", state.speed_kmh)?;
        writeln!(self.out, "  ⚙️  RPM:   {:<4} RPM ({rpm_bar})", state.rpm)?;
        writeln!(
            self.out,
            "  {battery_icon} Battery: {:<5.2} % [{battery_bar}]",
            state.battery_pct
        )?;
        writeln!(self.out, "{RULE}")
    }

    /// Writes nothing when `alerts` is empty.
    pub fn render_alerts(&mut self, alerts: &[Alert]) -> io::Result<()> {
        if alerts.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "\n*** SYSTEM ALERTS ***")?;
        for alert in alerts {
            writeln!(self.out, "{} {}", alert_icon(alert.kind()), alert)?;
        }
        writeln!(self.out, "*********************")
    }

    pub fn render_complete(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- Monitoring Cycle Complete ---")?;
        self.out.flush()
    }
}

fn report(result: io::Result<()>) {
    if let Err(err) = result {
        warn!(error = %err, "failed to write dashboard output");
    }
}

impl<W: Write> CycleObserver for ConsolePresenter<W> {
    fn on_start(&mut self, start: &RunStart) {
        report(self.render_start(start));
    }

    fn on_cycle_start(&mut self, cycle: Cycle, _state: &TelemetryState) {
        report(self.render_cycle_header(cycle));
    }

    fn on_sample(&mut self, _cycle: Cycle, state: &TelemetryState) {
        report(self.render_dashboard(state));
    }

    fn on_alerts(&mut self, _cycle: Cycle, alerts: &[Alert]) {
        report(self.render_alerts(alerts));
    }

    fn on_complete(&mut self, _summary: &RunSummary) {
        report(self.render_complete());
    }
}

/// Records one line per cycle with the raw metrics and one warning per alert
/// on [`RECORD_TARGET`], which the subscriber routes to the dashboard log file.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl CycleObserver for LogObserver {
    fn on_start(&mut self, start: &RunStart) {
        info!(
            target: RECORD_TARGET,
            cycles = start.cycles,
            speed_kmh_max = start.thresholds.speed_kmh_max,
            rpm_max = start.thresholds.rpm_max,
            battery_pct_min = start.thresholds.battery_pct_min,
            "monitoring started"
        );
    }

    fn on_sample(&mut self, cycle: Cycle, state: &TelemetryState) {
        info!(
            target: RECORD_TARGET,
            cycle = cycle.index,
            speed_kmh = state.speed_kmh,
            rpm = state.rpm,
            battery_pct = state.battery_pct,
            "{}",
            state
        );
    }

    fn on_alerts(&mut self, cycle: Cycle, alerts: &[Alert]) {
        for alert in alerts {
            warn!(
                target: RECORD_TARGET,
                cycle = cycle.index,
                kind = alert.kind().as_str(),
                value = alert.value(),
                threshold = alert.threshold(),
                "{}",
                alert
            );
        }
    }

    fn on_complete(&mut self, summary: &RunSummary) {
        info!(
            target: RECORD_TARGET,
            cycles = summary.cycles_completed,
            alerts = summary.alerts_fired,
            "monitoring complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut ConsolePresenter<Vec<u8>>) -> io::Result<()>,
    {
        let mut presenter = ConsolePresenter::new(Vec::new());
        f(&mut presenter).expect("render");
        String::from_utf8(presenter.into_inner()).expect("utf8")
    }

    #[test]
    fn bar_lengths_follow_metrics() {
        assert_eq!(rpm_bar_len(800), 0);
        assert_eq!(rpm_bar_len(3999), 3);
        assert_eq!(rpm_bar_len(6500), 6);
        assert_eq!(battery_segments(100.0), 10);
        assert_eq!(battery_segments(99.99), 9);
        assert_eq!(battery_segments(9.5), 0);
        assert_eq!(battery_segments(0.0), 0);
    }

    #[test]
    fn dashboard_shows_three_metrics_and_bars() {
        let text = render(|p| p.render_dashboard(&TelemetryState::new(87, 3120, 45.3)));
        assert!(text.contains("Speed: 87"));
        assert!(text.contains("RPM:   3120 RPM (███)"));
        assert!(text.contains("Battery: 45.30 % [████░░░░░░]"));
        assert!(text.contains("🔋"));
    }

    #[test]
    fn low_battery_switches_icon() {
        let text = render(|p| p.render_dashboard(&TelemetryState::new(10, 900, 20.0)));
        assert!(text.contains("🪫 Battery"));
    }

    #[test]
    fn alert_block_only_when_alerts_present() {
        assert!(render(|p| p.render_alerts(&[])).is_empty());

        let alerts = [Alert::HighSpeed {
            speed_kmh: 125,
            threshold: 110.0,
        }];
        let text = render(|p| p.render_alerts(&alerts));
        assert!(text.contains("*** SYSTEM ALERTS ***"));
        assert!(text.contains("🛑 HIGH SPEED ALERT! Current Speed: 125 Km/hr (Threshold: 110)"));
    }

    #[test]
    fn start_banner_mentions_override() {
        let start = RunStart {
            thresholds: Thresholds::default(),
            initial_state: TelemetryState::new(120, 0, 100.0),
            initial_speed_override: Some(120),
            cycles: 10,
        };
        let text = render(|p| p.render_start(&start));
        assert!(text.contains("Alert Thresholds: Speed > 110 Km/hr, RPM > 6000, Battery < 10 %"));
        assert!(text.contains("(Initial speed manually set to 120 Km/hr"));

        let quiet = RunStart {
            initial_speed_override: None,
            ..start
        };
        assert!(!render(|p| p.render_start(&quiet)).contains("manually set"));
    }

    struct Tally(Rc<RefCell<Vec<&'static str>>>);

    impl CycleObserver for Tally {
        fn on_sample(&mut self, _cycle: Cycle, _state: &TelemetryState) {
            self.0.borrow_mut().push("sample");
        }

        fn on_alerts(&mut self, _cycle: Cycle, _alerts: &[Alert]) {
            self.0.borrow_mut().push("alerts");
        }
    }

    #[test]
    fn observer_set_fans_out_in_order() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut set = ObserverSet::new()
            .with(Tally(events.clone()))
            .with(Tally(events.clone()));
        assert_eq!(set.len(), 2);

        let cycle = Cycle { index: 1, total: 1 };
        set.on_sample(cycle, &TelemetryState::initial());
        set.on_alerts(cycle, &[]);
        assert_eq!(*events.borrow(), vec!["sample", "sample", "alerts", "alerts"]);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn log_observer_records_metrics_and_alerts() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut observer = LogObserver;
            let cycle = Cycle { index: 3, total: 10 };
            observer.on_sample(cycle, &TelemetryState::new(90, 2700, 99.2));
            observer.on_alerts(
                cycle,
                &[Alert::LowBattery {
                    battery_pct: 4.0,
                    threshold: 10.0,
                }],
            );
        });

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("INFO"));
        assert!(lines[0].contains(RECORD_TARGET));
        assert!(lines[0].contains("speed_kmh=90"));
        assert!(lines[0].contains("rpm=2700"));
        assert!(lines[0].contains("battery_pct=99.2"));
        assert!(lines[1].trim_start().starts_with("WARN"));
        assert!(lines[1].contains("low-battery"));
        assert!(lines[1].contains("LOW BATTERY ALERT!"));
    }
}
