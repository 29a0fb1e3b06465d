use std::io::{self, Write};
use crate::drivers::CalibratedRate;
use crate::types::{DeltaOutcome, DeltaResult, EchoPair};
/// Writes human-readable event reports to an append-only text sink.
pub struct DeltaReporter<W: Write> {
    sink: W,
    rate: CalibratedRate,
}
impl<W: Write> DeltaReporter<W> {
    pub fn new(sink: W, rate: CalibratedRate) -> Self {
        Self { sink, rate }
    }
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.sink
    }
    pub fn delta(&self, sample_delta: f64) -> DeltaResult {
        DeltaResult::from_samples(sample_delta, self.rate.hz())
    }
    pub fn report_calibration(&mut self) -> io::Result<()> {
        writeln!(self.sink, "sample rate: {:.0} Hz", self.rate.hz())?;
        writeln!(self.sink, "time resolution: {:.4} ms per sample", self.rate.ms_per_sample())?;
        self.sink.flush()
    }
    pub fn report_trigger_level(&mut self, level_v: f64) -> io::Result<()> {
        writeln!(self.sink, "trigger level: {level_v:.2} V (rising edge)")?;
        self.sink.flush()
    }
    /// Echo-mode report: both peak heights and the outgoing-to-echo delay.
    pub fn report_echo(&mut self, pair: &EchoPair) -> io::Result<DeltaResult> {
        let result = self.delta(pair.delta_index());
        if result.valid {
            writeln!(self.sink, "=== DETECTION ===")?;
            writeln!(self.sink, "peak 1: {:.2} V (relative)", pair.outgoing.magnitude)?;
            writeln!(self.sink, "peak 2: {:.2} V (relative)", pair.echo.magnitude)?;
            writeln!(self.sink, "DELTA T (echo): {:.4} ms", result.time_delta_ms)?;
            writeln!(self.sink, "=================")?;
            self.sink.flush()?;
        }
        Ok(result)
    }
    /// Dual-mode report for a completed trigger pair.
    pub fn report_trigger_pair(&mut self, result: &DeltaResult) -> io::Result<()> {
        match result.outcome() {
            DeltaOutcome::SimultaneousTrigger => {
                writeln!(
                    self.sink,
                    "WARNING: both sensors triggered simultaneously; increase sensor spacing or sample rate"
                )?;
            }
            DeltaOutcome::Measured => {
                writeln!(self.sink, "DELTA DETECTED:")?;
                writeln!(self.sink, "  samples: {:.4}", result.sample_delta)?;
                writeln!(self.sink, "  time:    {:.5} ms", result.time_delta_ms)?;
            }
            DeltaOutcome::Inverted => {
                writeln!(self.sink, "DELTA DETECTED (sensor 2 triggered first):")?;
                writeln!(self.sink, "  samples: {:.4}", result.sample_delta)?;
                writeln!(self.sink, "  time:    {:.5} ms", result.time_delta_ms)?;
            }
        }
        self.sink.flush()
    }
}
