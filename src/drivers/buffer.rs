use std::collections::VecDeque;
use crate::types::Sample;
/// Ordered copy of the window contents at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSnapshot {
    /// Arrival index of `ch1[0]`.
    pub first_index: u64,
    pub ch1: Vec<f64>,
    /// Present once any two-channel sample has been pushed.
    pub ch2: Option<Vec<f64>>,
}
impl WindowSnapshot {
    /// `|v - baseline|` for channel 1.
    pub fn rectified(&self, baseline: f64) -> Vec<f64> {
        self.ch1.iter().map(|v| (v - baseline).abs()).collect()
    }
}
/// Rolling buffer of the most recent samples; the oldest is evicted at capacity.
pub struct RollingWindow {
    ch1: VecDeque<f64>,
    ch2: Option<VecDeque<f64>>,
    capacity: usize,
    next_index: u64,
}
impl RollingWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ch1: VecDeque::with_capacity(capacity),
            ch2: None,
            capacity,
            next_index: 0,
        }
    }
    /// Appends one sample and returns it with its arrival index.
    ///
    /// Single-channel samples pushed into a two-channel window repeat the
    /// previous channel 2 value so both channels stay aligned.
    pub fn push(&mut self, ch1: f64, ch2: Option<f64>) -> Sample {
        let capacity = self.capacity;
        if self.ch1.len() == capacity {
            self.ch1.pop_front();
            if let Some(second) = self.ch2.as_mut() {
                second.pop_front();
            }
        }
        self.ch1.push_back(ch1);
        if self.ch2.is_none() && ch2.is_some() {
            // Backfill so channel 2 lines up with the samples already held.
            self.ch2 = Some(self.ch1.iter().skip(1).map(|_| f64::NAN).collect());
        }
        if let Some(second) = self.ch2.as_mut() {
            let value = ch2.or_else(|| second.back().copied()).unwrap_or(f64::NAN);
            second.push_back(value);
        }
        let sample = Sample {
            index: self.next_index,
            ch1,
            ch2,
        };
        self.next_index += 1;
        sample
    }
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            first_index: self.next_index - self.ch1.len() as u64,
            ch1: self.ch1.iter().copied().collect(),
            ch2: self.ch2.as_ref().map(|c| c.iter().copied().collect()),
        }
    }
}
