use std::time::{Duration, Instant};
use crate::drivers::{AcquisitionError, LineSource};
/// Empirical sample rate, measured once at startup. Always positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibratedRate {
    hz: f64,
}
impl CalibratedRate {
    /// `None` unless `hz` is a positive finite rate.
    pub fn new(hz: f64) -> Option<Self> {
        (hz.is_finite() && hz > 0.0).then_some(Self { hz })
    }
    pub fn hz(&self) -> f64 {
        self.hz
    }
    pub fn ms_per_sample(&self) -> f64 {
        1000.0 / self.hz
    }
}
/// Counts the lines the producer delivers in a fixed wall-clock window.
pub struct SampleRateCalibrator {
    window: Duration,
}
impl SampleRateCalibrator {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }
    pub fn window(&self) -> Duration {
        self.window
    }
    /// Clears stale input first so buffered data does not inflate the count.
    pub fn calibrate<S: LineSource>(
        &self,
        source: &mut S,
    ) -> Result<CalibratedRate, AcquisitionError> {
        source.clear_input()?;
        let started = Instant::now();
        let mut count: u64 = 0;
        while started.elapsed() < self.window {
            if source.line_available()? {
                source.read_line()?;
                count += 1;
            } else {
                std::thread::yield_now();
            }
        }
        let hz = count as f64 / self.window.as_secs_f64();
        CalibratedRate::new(hz).ok_or(AcquisitionError::NoDataReceived {
            window_ms: self.window.as_millis(),
        })
    }
}
impl Default for SampleRateCalibrator {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
