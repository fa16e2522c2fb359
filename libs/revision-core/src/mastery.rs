//! Mastery percentage derived from cumulative review counters.

/// Percentage of correct reviews, 0-100.
///
/// Recomputed from the counters on every review rather than drifted
/// incrementally. A card that has never been reviewed is at 0.
pub fn compute_mastery(review_count: u32, correct_count: u32) -> u8 {
    debug_assert!(correct_count <= review_count);
    if review_count == 0 {
        return 0;
    }
    let percent = (correct_count as f64 / review_count as f64) * 100.0;
    percent.round().min(100.0) as u8
}
