//! SM-2 spaced repetition algorithm.
//!
//! Standard SuperMemo 2 transitions over (interval, ease, repetition).

use chrono::{DateTime, Duration, Utc};

use super::SchedulingResult;
use crate::types::{Quality, SchedulingState, INITIAL_EASE_FACTOR, MIN_EASE_FACTOR};

/// SM-2 scheduler with configurable ease bounds.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: INITIAL_EASE_FACTOR,
            minimum_ease: MIN_EASE_FACTOR,
        }
    }
}

impl Sm2 {
    /// Initial state for a card that has never been reviewed.
    pub fn initial_state(&self) -> SchedulingState {
        SchedulingState {
            interval_days: 1,
            ease_factor: self.initial_ease,
            repetition_count: 0,
            next_review: None,
        }
    }

    /// Compute the next state from the previous state and a review quality.
    ///
    /// Deterministic and side effect free: the same `(prev, quality, now)`
    /// always produces the same result.
    ///
    /// A lapse (quality < 3) resets repetition progress to a 1-day interval
    /// and leaves the ease factor untouched. On success the ease factor is
    /// updated first and the new interval grows from it: 1 day at the first
    /// repetition, 6 at the second, `prev_interval * ease` after that.
    pub fn schedule(
        &self,
        prev: &SchedulingState,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> SchedulingResult {
        let (interval, ease, repetitions) = if quality.is_lapse() {
            (1, prev.ease_factor, 0)
        } else {
            let repetitions = prev.repetition_count + 1;
            let ease = self.next_ease(prev.ease_factor, quality);
            let interval = match repetitions {
                1 => 1,
                2 => 6,
                _ => ((prev.interval_days as f64) * ease).round().max(1.0) as i64,
            };
            (interval, ease, repetitions)
        };

        let next_review = now + Duration::days(interval);

        SchedulingResult {
            new_state: SchedulingState {
                interval_days: interval,
                ease_factor: ease,
                repetition_count: repetitions,
                next_review: Some(next_review),
            },
            next_review,
        }
    }

    /// `EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))`, floored.
    fn next_ease(&self, ease: f64, quality: Quality) -> f64 {
        let q = quality.value() as f64;
        let delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
        (ease + delta).max(self.minimum_ease)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn quality(value: u8) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn first_success_gives_one_day() {
        let sm2 = Sm2::default();
        let result = sm2.schedule(&sm2.initial_state(), quality(4), now());
        assert_eq!(result.new_state.repetition_count, 1);
        assert_eq!(result.new_state.interval_days, 1);
        assert!((result.new_state.ease_factor - 2.5).abs() < 1e-9);
    }

    #[test]
    fn second_success_always_gives_six_days() {
        let sm2 = Sm2::default();
        // The 1 -> 2 transition is a fixed point regardless of prior interval.
        for prev_interval in [1, 3, 17] {
            let prev = SchedulingState {
                interval_days: prev_interval,
                ease_factor: 2.5,
                repetition_count: 1,
                next_review: Some(now()),
            };
            let result = sm2.schedule(&prev, quality(5), now());
            assert_eq!(result.new_state.repetition_count, 2);
            assert_eq!(result.new_state.interval_days, 6);
        }
    }

    #[test]
    fn later_successes_multiply_by_ease() {
        let sm2 = Sm2::default();
        let prev = SchedulingState {
            interval_days: 6,
            ease_factor: 2.6,
            repetition_count: 2,
            next_review: Some(now()),
        };
        let result = sm2.schedule(&prev, quality(5), now());
        assert_eq!(result.new_state.repetition_count, 3);
        // ease rises to 2.7 first, then 6 * 2.7 = 16.2 rounds to 16
        assert_eq!(result.new_state.interval_days, 16);
    }

    #[test]
    fn lapse_resets_repetition_and_interval() {
        let sm2 = Sm2::default();
        let prev = SchedulingState {
            interval_days: 15,
            ease_factor: 2.6,
            repetition_count: 5,
            next_review: Some(now()),
        };
        let result = sm2.schedule(&prev, quality(1), now());
        assert_eq!(result.new_state.repetition_count, 0);
        assert_eq!(result.new_state.interval_days, 1);
        assert_eq!(result.new_state.ease_factor, 2.6);
    }

    #[test]
    fn ease_never_drops_below_floor() {
        let sm2 = Sm2::default();
        let mut state = sm2.initial_state();
        let at = now();
        // Barely-passing reviews push ease down until the floor holds.
        for _ in 0..30 {
            state = sm2.schedule(&state, quality(3), at).new_state;
            assert!(state.ease_factor >= sm2.minimum_ease);
        }
        assert!((state.ease_factor - sm2.minimum_ease).abs() < 1e-9);
    }

    #[test]
    fn ease_has_no_ceiling() {
        let sm2 = Sm2::default();
        let mut state = sm2.initial_state();
        let at = now();
        for _ in 0..20 {
            state = sm2.schedule(&state, quality(5), at).new_state;
        }
        assert!(state.ease_factor > 4.0);
    }

    #[test]
    fn schedule_is_deterministic() {
        let sm2 = Sm2::default();
        let prev = SchedulingState {
            interval_days: 6,
            ease_factor: 2.36,
            repetition_count: 2,
            next_review: Some(now()),
        };
        let at = now();
        let a = sm2.schedule(&prev, quality(4), at);
        let b = sm2.schedule(&prev, quality(4), at);
        assert_eq!(a, b);
    }

    #[test]
    fn review_sequence_from_new_card() {
        let sm2 = Sm2::default();
        let at = now();

        // quality 4 on a fresh card: rep 1, 1 day, ease unchanged at 2.5
        let first = sm2.schedule(&sm2.initial_state(), quality(4), at);
        assert_eq!(first.new_state.repetition_count, 1);
        assert_eq!(first.new_state.interval_days, 1);
        assert!((first.new_state.ease_factor - 2.5).abs() < 1e-9);
        assert_eq!(first.next_review, at + Duration::days(1));

        // quality 5: rep 2, 6 days, ease 2.6
        let second = sm2.schedule(&first.new_state, quality(5), at);
        assert_eq!(second.new_state.repetition_count, 2);
        assert_eq!(second.new_state.interval_days, 6);
        assert!((second.new_state.ease_factor - 2.6).abs() < 1e-9);

        // quality 1 lapse: rep 0, 1 day, ease stays 2.6
        let third = sm2.schedule(&second.new_state, quality(1), at);
        assert_eq!(third.new_state.repetition_count, 0);
        assert_eq!(third.new_state.interval_days, 1);
        assert!((third.new_state.ease_factor - 2.6).abs() < 1e-9);
    }

    #[test]
    fn interval_never_below_one_day() {
        let sm2 = Sm2 {
            initial_ease: 1.3,
            minimum_ease: 1.3,
        };
        let prev = SchedulingState {
            interval_days: 1,
            ease_factor: 1.3,
            repetition_count: 2,
            next_review: Some(now()),
        };
        let result = sm2.schedule(&prev, quality(3), now());
        assert!(result.new_state.interval_days >= 1);
    }
}
