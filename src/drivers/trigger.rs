use crate::drivers::crossing::{exact_crossing_index, is_rising_edge};
use crate::types::DeltaResult;
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerState {
    Unarmed,
    Armed { crossing_index: f64 },
}
impl TriggerState {
    pub fn crossing_index(&self) -> Option<f64> {
        match *self {
            TriggerState::Unarmed => None,
            TriggerState::Armed { crossing_index } => Some(crossing_index),
        }
    }
    pub fn is_armed(&self) -> bool {
        matches!(self, TriggerState::Armed { .. })
    }
}
/// Rising-edge trigger pair for two sensors hit by the same event.
///
/// Each channel arms once per epoch at its first crossing of the trigger
/// level. When both are armed the delta (channel 2 minus channel 1) is
/// computed once and held. The epoch ends, and both channels disarm, once
/// more than `max_wait_samples` have passed since the earliest crossing.
pub struct DualChannelTriggerTracker {
    trigger_level: f64,
    max_wait_samples: u64,
    sample_rate_hz: f64,
    prev: [f64; 2],
    states: [TriggerState; 2],
    result: Option<DeltaResult>,
}
impl DualChannelTriggerTracker {
    /// `initial_level` stands in for the sample before the first one, usually the baseline.
    pub fn new(
        trigger_level: f64,
        max_wait_samples: u64,
        sample_rate_hz: f64,
        initial_level: f64,
    ) -> Self {
        Self {
            trigger_level,
            max_wait_samples,
            sample_rate_hz,
            prev: [initial_level; 2],
            states: [TriggerState::Unarmed; 2],
            result: None,
        }
    }
    pub fn reset(&mut self) {
        self.states = [TriggerState::Unarmed; 2];
        self.result = None;
    }
    /// Feeds sample `index` of both channels. Returns the delta only on the
    /// sample that completes the pair.
    pub fn update(&mut self, index: u64, ch1: f64, ch2: f64) -> Option<DeltaResult> {
        let current = [ch1, ch2];
        for (channel, state) in self.states.iter_mut().enumerate() {
            let (prev, curr) = (self.prev[channel], current[channel]);
            if !state.is_armed() && is_rising_edge(prev, curr, self.trigger_level) {
                let crossing_index = exact_crossing_index(prev, curr, self.trigger_level, index);
                log::trace!("channel {} armed at {crossing_index:.4}", channel + 1);
                *state = TriggerState::Armed { crossing_index };
            }
        }
        let mut completed = None;
        if self.result.is_none() {
            let crossings = (self.states[0].crossing_index(), self.states[1].crossing_index());
            if let (Some(t1), Some(t2)) = crossings {
                let result = DeltaResult::from_samples(t2 - t1, self.sample_rate_hz);
                self.result = Some(result);
                completed = Some(result);
            }
        }
        self.expire(index);
        self.prev = current;
        completed
    }
    fn expire(&mut self, index: u64) {
        let earliest = self
            .states
            .iter()
            .filter_map(TriggerState::crossing_index)
            .fold(f64::INFINITY, f64::min);
        if earliest.is_finite() && (index as f64 - earliest) > self.max_wait_samples as f64 {
            if self.result.is_none() {
                log::debug!(
                    "trigger pair timed out after {} samples with one channel armed",
                    self.max_wait_samples
                );
            }
            self.reset();
        }
    }
}
#[cfg(test)]
impl DualChannelTriggerTracker {
    pub fn state(&self, channel: usize) -> TriggerState {
        self.states[channel]
    }
    /// Delta of the current epoch, once both channels have armed.
    pub fn result(&self) -> Option<DeltaResult> {
        self.result
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    const LEVEL: f64 = 2.5;
    fn tracker(max_wait: u64) -> DualChannelTriggerTracker {
        DualChannelTriggerTracker::new(LEVEL, max_wait, 1000.0, 2.4)
    }
    #[test]
    fn interpolates_first_crossing() {
        let mut t = tracker(500);
        assert!(t.update(1, 2.4, 2.4).is_none());
        assert!(t.update(2, 2.6, 2.4).is_none());
        let crossing = t.state(0).crossing_index().unwrap();
        assert!((crossing - 1.5).abs() < 1e-9);
        assert_eq!(t.state(1), TriggerState::Unarmed);
    }
    #[test]
    fn pair_yields_fractional_delta() {
        let mut t = tracker(500);
        t.update(1, 2.4, 2.4);
        t.update(2, 2.6, 2.4);
        let result = t.update(3, 2.6, 2.55).unwrap();
        // ch2 crosses at 2 + 0.1/0.15
        assert!((result.sample_delta - (2.0 + 0.1 / 0.15 - 1.5)).abs() < 1e-9);
        assert!((result.time_delta_ms - result.sample_delta).abs() < 1e-9);
        assert!(result.valid);
    }
    #[test]
    fn same_sample_crossing_is_simultaneous() {
        let mut t = tracker(500);
        t.update(1, 2.4, 2.4);
        let result = t.update(2, 2.7, 2.7).unwrap();
        assert_eq!(result.sample_delta, 0.0);
        assert!(!result.valid);
        assert_eq!(result.outcome(), crate::types::DeltaOutcome::SimultaneousTrigger);
    }
    #[test]
    fn channel_two_first_gives_negative_delta() {
        let mut t = tracker(500);
        t.update(1, 2.4, 2.6);
        let result = t.update(4, 2.6, 2.6).unwrap();
        assert!(result.sample_delta < 0.0);
        assert!(!result.valid);
    }
    #[test]
    fn result_is_held_until_reset() {
        let mut t = tracker(50);
        t.update(1, 2.6, 2.4);
        let first = t.update(2, 2.6, 2.6).unwrap();
        // fresh dips and crossings on both channels are ignored
        for i in 3..20 {
            let v = if i % 2 == 0 { 2.3 } else { 2.9 };
            assert!(t.update(i, v, v).is_none());
            assert_eq!(t.result(), Some(first));
        }
    }
    #[test]
    fn lone_channel_times_out_then_fresh_pair_is_detected() {
        let mut t = tracker(10);
        t.update(1, 2.6, 2.4); // ch1 arms at 0.5
        for i in 2..=10 {
            t.update(i, 2.6, 2.4);
            assert!(t.state(0).is_armed());
        }
        t.update(11, 2.4, 2.4);
        assert_eq!(t.state(0), TriggerState::Unarmed);
        assert_eq!(t.state(1), TriggerState::Unarmed);
        assert!(t.result().is_none());
        t.update(12, 2.6, 2.4);
        let result = t.update(13, 2.6, 2.6).unwrap();
        assert!((result.sample_delta - 1.0).abs() < 1e-9);
    }
    #[test]
    fn reported_epoch_expires_too() {
        let mut t = tracker(5);
        t.update(1, 2.6, 2.6);
        assert!(t.result().is_some());
        for i in 2..=6 {
            t.update(i, 2.4, 2.4);
        }
        assert!(t.result().is_none());
        assert!(!t.state(0).is_armed());
    }
}
