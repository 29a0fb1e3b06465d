#[cfg(test)]
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use rand::Rng;
use crate::drivers::{AcquisitionError, ParseError};
/// Anything that yields text lines from the microcontroller on demand.
///
/// `read_line` is only called after `line_available` returned true, so
/// implementations may block briefly for the rest of a partially received line.
pub trait LineSource {
    fn line_available(&mut self) -> Result<bool, AcquisitionError>;
    fn read_line(&mut self) -> Result<String, AcquisitionError>;
    /// Drops everything buffered so far.
    fn clear_input(&mut self) -> Result<(), AcquisitionError>;
}
/// Raw ADC counts parsed from one line, before voltage conversion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawReading {
    Single(f64),
    Pair(f64, f64),
}
impl RawReading {
    pub fn first(&self) -> f64 {
        match *self {
            RawReading::Single(v) | RawReading::Pair(v, _) => v,
        }
    }
}
/// Parses `"512"` or `"512,498"`. Anything else is a malformed sample.
pub fn parse_line(line: &str) -> Result<RawReading, ParseError> {
    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    let number = |field: &str| {
        field.parse::<f64>().map_err(|_| ParseError::NotNumeric {
            field: field.to_string(),
        })
    };
    match fields.as_slice() {
        [one] => Ok(RawReading::Single(number(*one)?)),
        [a, b] => Ok(RawReading::Pair(number(*a)?, number(*b)?)),
        other => Err(ParseError::FieldCount {
            expected: "1 or 2",
            actual: other.len(),
        }),
    }
}
/// In-memory source for deterministic playback in tests.
#[cfg(test)]
pub struct ManualSource {
    queue: VecDeque<String>,
}
#[cfg(test)]
impl ManualSource {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            queue: lines.into_iter().map(Into::into).collect(),
        }
    }
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.queue.push_back(line.into());
    }
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
#[cfg(test)]
impl LineSource for ManualSource {
    fn line_available(&mut self) -> Result<bool, AcquisitionError> {
        Ok(!self.queue.is_empty())
    }
    fn read_line(&mut self) -> Result<String, AcquisitionError> {
        Ok(self.queue.pop_front().unwrap_or_default())
    }
    fn clear_input(&mut self) -> Result<(), AcquisitionError> {
        self.queue.clear();
        Ok(())
    }
}
/// Synthetic impact sensor for running without hardware.
///
/// Emits ADC counts at `rate_hz` of wall-clock time: a noisy baseline with a
/// decaying impulse every `period`, followed by an echo (single channel) or a
/// delayed copy on channel 2 (two channels).
pub struct SimulatedSource {
    rate_hz: f64,
    two_channels: bool,
    baseline_counts: f64,
    started: Instant,
    emitted: u64,
    period_samples: u64,
    lag_samples: u64,
}
impl SimulatedSource {
    pub fn new(rate_hz: f64, two_channels: bool, baseline_counts: f64, period: Duration) -> Self {
        let period_samples = ((period.as_secs_f64() * rate_hz) as u64).max(1);
        Self {
            rate_hz,
            two_channels,
            baseline_counts,
            started: Instant::now(),
            emitted: 0,
            period_samples,
            lag_samples: ((rate_hz * 0.004) as u64).max(1),
        }
    }
    fn due(&self) -> u64 {
        (self.started.elapsed().as_secs_f64() * self.rate_hz) as u64
    }
    fn impulse(phase: u64) -> f64 {
        // 衰减振荡
        let t = phase as f64;
        80.0 * (-t / 3.0).exp() * (t * 0.9).cos()
    }
    fn channel_value(&self, phase: u64, rng: &mut impl Rng) -> f64 {
        let mut value = self.baseline_counts + rng.gen_range(-2.0_f64..2.0);
        if phase < 12 {
            value += Self::impulse(phase);
        }
        if !self.two_channels && phase >= self.lag_samples && phase < self.lag_samples + 12 {
            value -= 0.6 * Self::impulse(phase - self.lag_samples);
        }
        value
    }
}
impl LineSource for SimulatedSource {
    fn line_available(&mut self) -> Result<bool, AcquisitionError> {
        Ok(self.emitted < self.due())
    }
    fn read_line(&mut self) -> Result<String, AcquisitionError> {
        let mut rng = rand::thread_rng();
        let phase = self.emitted % self.period_samples;
        let ch1 = self.channel_value(phase, &mut rng);
        self.emitted += 1;
        if self.two_channels {
            let lagged = phase.checked_sub(self.lag_samples).unwrap_or(u64::MAX);
            let ch2 = self.channel_value(lagged, &mut rng);
            Ok(format!("{:.0},{:.0}", ch1, ch2))
        } else {
            Ok(format!("{:.0}", ch1))
        }
    }
    fn clear_input(&mut self) -> Result<(), AcquisitionError> {
        self.emitted = self.due();
        Ok(())
    }
}
