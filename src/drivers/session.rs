use std::io::Write;
use std::time::Instant;
use crate::config::DetectorConfig;
use crate::drivers::source::{parse_line, RawReading};
use crate::drivers::{
    AcquisitionError, CalibratedRate, DeltaReporter, DualChannelTriggerTracker, LineSource,
    ParseError, PeakEventDetector, RollingWindow,
};
use crate::types::DetectionMode;
enum Detector {
    Echo(PeakEventDetector),
    Dual(DualChannelTriggerTracker),
}
/// What one tick consumed and produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub accepted: usize,
    pub discarded: usize,
    pub reports: usize,
}
/// Everything the steady-state loop needs, created after calibration and
/// dropped on shutdown (which also releases the source).
pub struct DetectorSession<S: LineSource, W: Write> {
    source: S,
    config: DetectorConfig,
    window: RollingWindow,
    detector: Detector,
    reporter: DeltaReporter<W>,
    accepted_total: u64,
    discarded_total: u64,
}
impl<S: LineSource, W: Write> DetectorSession<S, W> {
    pub fn new(
        source: S,
        sink: W,
        config: DetectorConfig,
        mode: DetectionMode,
        rate: CalibratedRate,
    ) -> Self {
        let detector = match mode {
            DetectionMode::Echo => Detector::Echo(PeakEventDetector::new(
                config.baseline_v,
                config.peak_threshold_v,
                config.min_separation_samples(rate.hz()),
                config.cooldown(),
            )),
            DetectionMode::Dual => Detector::Dual(DualChannelTriggerTracker::new(
                config.trigger_level_v(),
                config.max_wait_samples,
                rate.hz(),
                config.baseline_v,
            )),
        };
        Self {
            source,
            window: RollingWindow::with_capacity(config.window_capacity),
            detector,
            reporter: DeltaReporter::new(sink, rate),
            config,
            accepted_total: 0,
            discarded_total: 0,
        }
    }
    pub fn reporter_mut(&mut self) -> &mut DeltaReporter<W> {
        &mut self.reporter
    }
    pub fn totals(&self) -> (u64, u64) {
        (self.accepted_total, self.discarded_total)
    }
    /// Drains every line that is already available, then runs detection.
    pub fn tick(&mut self, now: Instant) -> Result<TickSummary, AcquisitionError> {
        let mut summary = TickSummary::default();
        while self.source.line_available()? {
            let line = self.source.read_line()?;
            match self.accept(&line) {
                Ok(reported) => {
                    summary.accepted += 1;
                    summary.reports += usize::from(reported);
                }
                Err(LineError::Malformed(e)) => {
                    log::trace!("discarded line {line:?}: {e}");
                    summary.discarded += 1;
                }
                Err(LineError::Sink(e)) => return Err(e.into()),
            }
        }
        if let Detector::Echo(detector) = &mut self.detector {
            if let Some(pair) = detector.analyze(&self.window.snapshot(), now) {
                if self.reporter.report_echo(&pair)?.valid {
                    summary.reports += 1;
                }
            }
        }
        if summary.discarded > 0 {
            log::debug!("tick dropped {} malformed line(s)", summary.discarded);
        }
        self.accepted_total += summary.accepted as u64;
        self.discarded_total += summary.discarded as u64;
        Ok(summary)
    }
    /// Parses one line into the window. Returns whether it completed a trigger pair.
    fn accept(&mut self, line: &str) -> Result<bool, LineError> {
        let reading = parse_line(line)?;
        let volts = |raw: f64| self.config.raw_to_volts(raw);
        match &mut self.detector {
            Detector::Echo(_) => {
                let ch2 = match reading {
                    RawReading::Pair(_, b) => Some(volts(b)),
                    RawReading::Single(_) => None,
                };
                self.window.push(volts(reading.first()), ch2);
                Ok(false)
            }
            Detector::Dual(tracker) => {
                let RawReading::Pair(a, b) = reading else {
                    return Err(ParseError::FieldCount {
                        expected: "2",
                        actual: 1,
                    }
                    .into());
                };
                let (v1, v2) = (volts(a), volts(b));
                let sample = self.window.push(v1, Some(v2));
                match tracker.update(sample.index, v1, v2) {
                    Some(result) => {
                        self.reporter.report_trigger_pair(&result)?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }
}
/// Per-line failure inside a tick: bad input is dropped, a dead sink is not.
#[derive(Debug, thiserror::Error)]
enum LineError {
    #[error(transparent)]
    Malformed(#[from] ParseError),
    #[error(transparent)]
    Sink(#[from] std::io::Error),
}
#[cfg(test)]
impl<S: LineSource, W: Write> DetectorSession<S, W> {
    pub fn mode(&self) -> DetectionMode {
        match self.detector {
            Detector::Echo(_) => DetectionMode::Echo,
            Detector::Dual(_) => DetectionMode::Dual,
        }
    }
    pub fn window_snapshot(&self) -> crate::drivers::WindowSnapshot {
        self.window.snapshot()
    }
    /// Result held by the dual-mode trigger pair, if any.
    pub fn held_delta(&self) -> Option<crate::types::DeltaResult> {
        match &self.detector {
            Detector::Dual(tracker) => tracker.result(),
            Detector::Echo(_) => None,
        }
    }
    pub fn into_sink(self) -> W {
        self.reporter.into_inner()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ManualSource;
    /// Raw counts read straight as volts.
    fn unit_config() -> DetectorConfig {
        DetectorConfig {
            adc_resolution: 5.0,
            v_ref: 5.0,
            min_peak_separation_ms: 1.0,
            window_capacity: 5,
            ..DetectorConfig::default()
        }
    }
    fn session(lines: &[&str], mode: DetectionMode) -> DetectorSession<ManualSource, Vec<u8>> {
        DetectorSession::new(
            ManualSource::new(lines.iter().copied()),
            Vec::new(),
            unit_config(),
            mode,
            CalibratedRate::new(1000.0).unwrap(),
        )
    }
    #[test]
    fn malformed_lines_are_dropped_silently() {
        let mut s = session(&["2.5", "abc", "1,2,3", "", "2.5,2.4"], DetectionMode::Echo);
        let summary = s.tick(Instant::now()).unwrap();
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.discarded, 3);
        assert_eq!(summary.reports, 0);
        assert_eq!(s.totals(), (2, 3));
        assert!(s.into_sink().is_empty());
    }
    #[test]
    fn echo_mode_reports_latest_peak_pair() {
        let mut s = session(&["2.5", "2.5", "2.7", "2.5", "2.3", "2.5"], DetectionMode::Echo);
        let summary = s.tick(Instant::now()).unwrap();
        assert_eq!(summary.reports, 1);
        assert_eq!(s.window_snapshot().first_index, 1);
        let out = String::from_utf8(s.into_sink()).unwrap();
        assert!(out.contains("DELTA T (echo): 2.0000 ms"), "{out}");
    }
    #[test]
    fn echo_mode_cools_down_between_ticks() {
        let mut s = session(&["2.5", "2.8", "2.5", "2.2", "2.5"], DetectionMode::Echo);
        let t0 = Instant::now();
        assert_eq!(s.tick(t0).unwrap().reports, 1);
        assert_eq!(s.tick(t0 + std::time::Duration::from_millis(100)).unwrap().reports, 0);
    }
    #[test]
    fn dual_mode_warns_on_simultaneous_trigger() {
        let mut s = session(&["2.4,2.4", "2.7,2.7"], DetectionMode::Dual);
        let summary = s.tick(Instant::now()).unwrap();
        assert_eq!(summary.reports, 1);
        let held = s.held_delta().unwrap();
        assert!(!held.valid);
        assert_eq!(held.sample_delta, 0.0);
        let out = String::from_utf8(s.into_sink()).unwrap();
        assert!(out.contains("simultaneously"));
        assert!(!out.contains("DELTA DETECTED"));
    }
    #[test]
    fn dual_mode_needs_both_fields() {
        let mut s = session(&["2.4", "2.4,2.4", "2.6,2.4", "2.6,2.6"], DetectionMode::Dual);
        let summary = s.tick(Instant::now()).unwrap();
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.accepted, 3);
        let held = s.held_delta().unwrap();
        assert!((held.sample_delta - 1.0).abs() < 1e-9);
        assert!((held.time_delta_ms - 1.0).abs() < 1e-9);
        assert_eq!(s.mode(), DetectionMode::Dual);
    }
}
