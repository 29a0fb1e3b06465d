/// True when the signal went from below `trigger` to at or above it.
pub fn is_rising_edge(prev: f64, curr: f64, trigger: f64) -> bool {
    prev < trigger && curr >= trigger
}
/// Fractional sample index at which the straight line between `prev`
/// (sample `current_index - 1`) and `curr` (sample `current_index`) reaches
/// `trigger`.
///
/// Only meaningful for a rising edge. A flat segment has no crossing point;
/// `current_index` is returned unchanged in that case.
pub fn exact_crossing_index(prev: f64, curr: f64, trigger: f64, current_index: u64) -> f64 {
    if curr == prev {
        log::debug!("flat segment at sample {current_index}, crossing not interpolated");
        return current_index as f64;
    }
    let fraction = (trigger - prev) / (curr - prev);
    (current_index as f64 - 1.0) + fraction
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn midpoint_crossing() {
        assert!((exact_crossing_index(2.4, 2.6, 2.5, 2) - 1.5).abs() < 1e-12);
    }
    #[test]
    fn crossing_on_current_sample() {
        assert_eq!(exact_crossing_index(2.0, 3.0, 3.0, 10), 10.0);
    }
    #[test]
    fn flat_segment_falls_back_to_current_index() {
        assert_eq!(exact_crossing_index(2.5, 2.5, 2.5, 42), 42.0);
    }
    #[test]
    fn rising_edge_crossings_stay_inside_the_sample_interval() {
        let trigger = 2.55;
        let mut prev = 2.0;
        while prev < trigger {
            let mut curr = trigger;
            while curr < 4.0 {
                assert!(is_rising_edge(prev, curr, trigger));
                let idx = exact_crossing_index(prev, curr, trigger, 100);
                assert!((99.0..=100.0).contains(&idx), "{prev} -> {curr}: {idx}");
                curr += 0.13;
            }
            prev += 0.07;
        }
    }
    #[test]
    fn edge_detection_is_directional() {
        assert!(is_rising_edge(2.4, 2.5, 2.5));
        assert!(!is_rising_edge(2.5, 2.6, 2.5));
        assert!(!is_rising_edge(2.6, 2.4, 2.5));
    }
}
