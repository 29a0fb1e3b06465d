// src/types.rs

// 检测模式
#[derive(PartialEq, Eq, Clone, Copy, Debug, clap::ValueEnum)]
pub enum DetectionMode {
    /// Single sensor: outgoing wave and its return echo.
    Echo,
    /// Two sensors hit by the same physical event.
    Dual,
}

/// One acquired sample, already converted to volts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub index: u64,
    pub ch1: f64,
    pub ch2: Option<f64>,
}

/// Local maximum of the rectified signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakEvent {
    /// Arrival index of the sample the peak sits on.
    pub index: u64,
    /// Height above (or below) the baseline, in volts.
    pub magnitude: f64,
}

/// Most recent outgoing wave / return echo pair found in a window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EchoPair {
    pub outgoing: PeakEvent,
    pub echo: PeakEvent,
}

impl EchoPair {
    pub fn delta_index(&self) -> f64 {
        self.echo.index as f64 - self.outgoing.index as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeltaResult {
    pub sample_delta: f64,
    pub time_delta_ms: f64,
    pub valid: bool,
}

impl DeltaResult {
    pub fn from_samples(sample_delta: f64, sample_rate_hz: f64) -> Self {
        Self {
            sample_delta,
            time_delta_ms: (sample_delta / sample_rate_hz) * 1000.0,
            valid: sample_delta > 0.0,
        }
    }

    pub fn outcome(&self) -> DeltaOutcome {
        if self.sample_delta == 0.0 {
            DeltaOutcome::SimultaneousTrigger
        } else if self.valid {
            DeltaOutcome::Measured
        } else {
            DeltaOutcome::Inverted
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaOutcome {
    Measured,
    /// Both events landed on the same fractional index. Compared exactly, so
    /// in dual mode this only fires when both channels crossed on the same
    /// sample with the same slope and interpolated to the same value.
    SimultaneousTrigger,
    /// The second event came before the first one.
    Inverted,
}
