use std::time::{Duration, Instant};
use crate::drivers::WindowSnapshot;
use crate::types::{EchoPair, PeakEvent};
/// Local maxima of `signal` strictly above `threshold`, at least `min_distance`
/// samples apart, in index order. Returns `(position, height)` pairs.
///
/// A plateau counts as one maximum at its middle (left of centre for even
/// widths). Within `min_distance` of each other only the taller maximum
/// survives; on equal height the earlier one does.
pub fn find_peaks(signal: &[f64], threshold: f64, min_distance: usize) -> Vec<(usize, f64)> {
    let mut candidates = local_maxima(signal);
    candidates.retain(|&i| signal[i] > threshold);
    if min_distance > 1 && candidates.len() > 1 {
        let mut by_priority: Vec<usize> = (0..candidates.len()).collect();
        by_priority.sort_by(|&a, &b| {
            signal[candidates[b]]
                .total_cmp(&signal[candidates[a]])
                .then(candidates[a].cmp(&candidates[b]))
        });
        let mut keep = vec![true; candidates.len()];
        for &slot in &by_priority {
            if !keep[slot] {
                continue;
            }
            let pos = candidates[slot];
            // 左右两侧距离不足的低峰全部抑制
            for (other, other_keep) in keep.iter_mut().enumerate() {
                if other != slot && candidates[other].abs_diff(pos) < min_distance {
                    *other_keep = false;
                }
            }
        }
        candidates = candidates
            .into_iter()
            .zip(keep)
            .filter_map(|(pos, k)| k.then_some(pos))
            .collect();
    }
    candidates.into_iter().map(|i| (i, signal[i])).collect()
}
fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if signal.len() < 3 {
        return maxima;
    }
    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                let right = ahead - 1;
                maxima.push((i + right) / 2);
                i = right;
            }
        }
        i += 1;
    }
    maxima
}
/// Outgoing-wave / echo detector over the rolling window, with a report cooldown.
pub struct PeakEventDetector {
    baseline: f64,
    threshold: f64,
    min_distance: usize,
    cooldown: Duration,
    last_report: Option<Instant>,
}
impl PeakEventDetector {
    pub fn new(baseline: f64, threshold: f64, min_distance: usize, cooldown: Duration) -> Self {
        Self {
            baseline,
            threshold,
            min_distance: min_distance.max(1),
            cooldown,
            last_report: None,
        }
    }
    /// All peaks in the window, with arrival indices.
    pub fn peaks(&self, snapshot: &WindowSnapshot) -> Vec<PeakEvent> {
        let rectified = snapshot.rectified(self.baseline);
        let loudest = rectified.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if loudest <= self.threshold {
            return Vec::new();
        }
        find_peaks(&rectified, self.threshold, self.min_distance)
            .into_iter()
            .map(|(pos, magnitude)| PeakEvent {
                index: snapshot.first_index + pos as u64,
                magnitude,
            })
            .collect()
    }
    /// The last two peaks in the window, if there are at least two.
    pub fn latest_pair(&self, snapshot: &WindowSnapshot) -> Option<EchoPair> {
        match self.peaks(snapshot).as_slice() {
            [.., outgoing, echo] => Some(EchoPair {
                outgoing: *outgoing,
                echo: *echo,
            }),
            _ => None,
        }
    }
    fn cooling_down(&self, now: Instant) -> bool {
        self.last_report
            .is_some_and(|last| now.saturating_duration_since(last) <= self.cooldown)
    }
    /// Returns a pair to report, at most once per cooldown period.
    pub fn analyze(&mut self, snapshot: &WindowSnapshot, now: Instant) -> Option<EchoPair> {
        if self.cooling_down(now) {
            return None;
        }
        let pair = self.latest_pair(snapshot)?;
        if pair.delta_index() <= 0.0 {
            return None;
        }
        self.last_report = Some(now);
        Some(pair)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::RollingWindow;
    fn window_of(capacity: usize, values: &[f64]) -> RollingWindow {
        let mut window = RollingWindow::with_capacity(capacity);
        for &v in values {
            window.push(v, None);
        }
        window
    }
    #[test]
    fn outgoing_and_echo_after_shift() {
        let window = window_of(5, &[2.5, 2.5, 2.7, 2.5, 2.3, 2.5]);
        let mut detector = PeakEventDetector::new(2.5, 0.15, 1, Duration::from_millis(500));
        let pair = detector.analyze(&window.snapshot(), Instant::now()).unwrap();
        assert_eq!(pair.outgoing.index, 2);
        assert_eq!(pair.echo.index, 4);
        assert!((pair.outgoing.magnitude - 0.2).abs() < 1e-9);
        assert!((pair.echo.magnitude - 0.2).abs() < 1e-9);
        assert_eq!(pair.delta_index(), 2.0);
    }
    #[test]
    fn quiet_window_has_no_peaks() {
        let window = window_of(8, &[2.5, 2.52, 2.48, 2.5, 2.55, 2.5]);
        let detector = PeakEventDetector::new(2.5, 0.15, 1, Duration::ZERO);
        assert!(detector.peaks(&window.snapshot()).is_empty());
    }
    #[test]
    fn single_peak_is_not_a_pair() {
        let window = window_of(8, &[2.5, 2.5, 3.0, 2.5, 2.5]);
        let detector = PeakEventDetector::new(2.5, 0.15, 1, Duration::ZERO);
        assert_eq!(detector.peaks(&window.snapshot()).len(), 1);
        assert!(detector.latest_pair(&window.snapshot()).is_none());
    }
    #[test]
    fn only_the_last_two_peaks_pair_up() {
        let signal = [0.0, 0.5, 0.0, 0.9, 0.0, 0.4, 0.0, 0.6, 0.0];
        let mut window = RollingWindow::with_capacity(16);
        for v in signal {
            window.push(2.5 + v, None);
        }
        let detector = PeakEventDetector::new(2.5, 0.1, 1, Duration::ZERO);
        let pair = detector.latest_pair(&window.snapshot()).unwrap();
        assert_eq!((pair.outgoing.index, pair.echo.index), (5, 7));
    }
    #[test]
    fn taller_neighbour_suppresses_within_distance() {
        let signal = [0.0, 0.3, 0.0, 0.8, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0];
        let peaks = find_peaks(&signal, 0.1, 3);
        assert_eq!(peaks.iter().map(|p| p.0).collect::<Vec<_>>(), vec![3, 8]);
    }
    #[test]
    fn equal_heights_keep_the_earlier_peak() {
        let signal = [0.0, 0.5, 0.0, 0.5, 0.0, 0.0, 0.0];
        let peaks = find_peaks(&signal, 0.1, 3);
        assert_eq!(peaks, vec![(1, 0.5)]);
    }
    #[test]
    fn returned_peaks_respect_min_distance() {
        let signal: Vec<f64> = (0..200)
            .map(|i| ((i as f64) * 0.7).sin().abs() * ((i * 37 % 11) as f64 / 10.0))
            .collect();
        for distance in [1, 2, 5, 9, 17] {
            let peaks = find_peaks(&signal, 0.2, distance);
            for pair in peaks.windows(2) {
                assert!(pair[1].0 - pair[0].0 >= distance);
            }
        }
    }
    #[test]
    fn plateau_reports_its_middle() {
        let signal = [0.0, 0.4, 0.4, 0.4, 0.0];
        assert_eq!(find_peaks(&signal, 0.1, 1), vec![(2, 0.4)]);
        let edge = [0.4, 0.4, 0.0];
        assert!(find_peaks(&edge, 0.1, 1).is_empty());
    }
    #[test]
    fn cooldown_suppresses_repeat_reports() {
        let window = window_of(8, &[2.5, 2.8, 2.5, 2.2, 2.5]);
        let mut detector = PeakEventDetector::new(2.5, 0.15, 1, Duration::from_millis(500));
        let t0 = Instant::now();
        assert!(detector.analyze(&window.snapshot(), t0).is_some());
        assert!(detector
            .analyze(&window.snapshot(), t0 + Duration::from_millis(200))
            .is_none());
        assert!(detector
            .analyze(&window.snapshot(), t0 + Duration::from_millis(501))
            .is_some());
    }
}
