use std::path::Path;
use std::time::Duration;
use serde::Deserialize;
use crate::drivers::ConfigError;
/// Tuning for acquisition and detection. Every field has a default so a config
/// file only needs to list what it changes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub adc_resolution: f64,
    pub v_ref: f64,
    /// Quiescent sensor voltage (zero g).
    pub baseline_v: f64,
    /// Offset from baseline a peak must exceed in echo mode.
    pub peak_threshold_v: f64,
    /// Offset from baseline that arms a channel in dual mode.
    pub trigger_threshold_v: f64,
    pub min_peak_separation_ms: f64,
    pub cooldown_ms: u64,
    pub max_wait_samples: u64,
    pub window_capacity: usize,
    pub tick_interval_ms: u64,
    pub calibration_secs: f64,
    pub settle_secs: f64,
}
impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            adc_resolution: 1023.0,
            v_ref: 5.0,
            baseline_v: 2.5,
            peak_threshold_v: 0.15,
            trigger_threshold_v: 0.05,
            min_peak_separation_ms: 2.0,
            cooldown_ms: 500,
            max_wait_samples: 500,
            window_capacity: 2000,
            tick_interval_ms: 20,
            calibration_secs: 1.0,
            settle_secs: 2.0,
        }
    }
}
impl DetectorConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("adc_resolution", self.adc_resolution > 0.0),
            ("v_ref", self.v_ref > 0.0),
            ("peak_threshold_v", self.peak_threshold_v > 0.0),
            ("trigger_threshold_v", self.trigger_threshold_v > 0.0),
            ("window_capacity", self.window_capacity > 0),
            ("calibration_secs", self.calibration_secs > 0.0),
            ("tick_interval_ms", self.tick_interval_ms > 0),
        ];
        match checks.iter().find(|(_, ok)| !ok) {
            Some((field, _)) => Err(ConfigError::NonPositive { field: *field }),
            None => Ok(()),
        }
    }
    /// `volts = raw / resolution * v_ref`
    pub fn raw_to_volts(&self, raw: f64) -> f64 {
        (raw / self.adc_resolution) * self.v_ref
    }
    pub fn trigger_level_v(&self) -> f64 {
        self.baseline_v + self.trigger_threshold_v
    }
    /// Minimum peak distance in samples for a calibrated rate; never below one.
    pub fn min_separation_samples(&self, sample_rate_hz: f64) -> usize {
        let ms_per_sample = 1000.0 / sample_rate_hz;
        ((self.min_peak_separation_ms / ms_per_sample).floor() as usize).max(1)
    }
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
    pub fn calibration_window(&self) -> Duration {
        Duration::from_secs_f64(self.calibration_secs)
    }
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs_f64(self.settle_secs.max(0.0))
    }
}
