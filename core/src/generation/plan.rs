//! Feedback split and per-run bookkeeping

use crate::aiconfig::FeedbackKind;

/// Message recorded for failures that carry no text
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Number of generations that get positive feedback.
///
/// Computed as `total * percent / 100` rounded half away from zero (so
/// 2.5 becomes 3) and clamped to `0..=total`. Multiplying before dividing
/// keeps borderline splits such as 50 × 29% exact.
pub fn positive_target(total: u32, percent: f64) -> u32 {
    if !percent.is_finite() {
        return 0;
    }
    let exact = (total as f64 * percent) / 100.0;
    exact.round().clamp(0.0, total as f64) as u32
}

/// Counters of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub total_count: u32,
    pub positive_target: u32,
    pub completed_count: u32,
    pub positive_emitted: u32,
    pub negative_emitted: u32,
    pub errors: Vec<String>,
}

impl RunState {
    pub fn new(total_count: u32, good_feedback_percent: f64) -> Self {
        Self {
            total_count,
            positive_target: positive_target(total_count, good_feedback_percent),
            completed_count: 0,
            positive_emitted: 0,
            negative_emitted: 0,
            errors: Vec::new(),
        }
    }

    /// Negative share of the split
    pub fn negative_target(&self) -> u32 {
        self.total_count - self.positive_target
    }

    /// Polarity the next successful generation should report
    pub fn next_feedback(&self) -> FeedbackKind {
        if self.positive_emitted < self.positive_target {
            FeedbackKind::Positive
        } else {
            FeedbackKind::Negative
        }
    }

    /// Count a generation whose feedback was emitted
    pub fn record_success(&mut self, kind: FeedbackKind) {
        match kind {
            FeedbackKind::Positive => self.positive_emitted += 1,
            FeedbackKind::Negative => self.negative_emitted += 1,
        }
        self.completed_count += 1;
    }

    /// Keep the message of a skipped generation
    pub fn record_failure(&mut self, message: impl Into<String>) {
        let message = message.into();
        if message.trim().is_empty() {
            self.errors.push(UNKNOWN_ERROR.to_string());
        } else {
            self.errors.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_target_examples() {
        assert_eq!(positive_target(10, 80.0), 8);
        assert_eq!(positive_target(5, 0.0), 0);
        assert_eq!(positive_target(5, 100.0), 5);
        assert_eq!(positive_target(1, 49.0), 0);
        assert_eq!(positive_target(1, 50.0), 1);
    }

    #[test]
    fn test_positive_target_rounds_half_up() {
        assert_eq!(positive_target(5, 50.0), 3);
        assert_eq!(positive_target(3, 50.0), 2);
        assert_eq!(positive_target(50, 29.0), 15);
    }

    #[test]
    fn test_positive_target_stays_in_bounds() {
        for total in 1..=200u32 {
            for percent in 0..=100u32 {
                let target = positive_target(total, percent as f64);
                assert!(target <= total, "{} of {} at {}%", target, total, percent);
            }
        }
        assert_eq!(positive_target(10, f64::NAN), 0);
    }

    #[test]
    fn test_feedback_switches_after_target() {
        let mut state = RunState::new(3, 34.0);
        assert_eq!(state.positive_target, 1);
        assert_eq!(state.negative_target(), 2);

        assert_eq!(state.next_feedback(), FeedbackKind::Positive);
        state.record_success(FeedbackKind::Positive);
        assert_eq!(state.next_feedback(), FeedbackKind::Negative);
        state.record_success(FeedbackKind::Negative);

        assert_eq!(state.completed_count, 2);
        assert_eq!(state.positive_emitted, 1);
        assert_eq!(state.negative_emitted, 1);
    }

    #[test]
    fn test_empty_failure_message_is_replaced() {
        let mut state = RunState::new(2, 50.0);
        state.record_failure("");
        state.record_failure("rate limited");
        assert_eq!(state.errors, vec![UNKNOWN_ERROR, "rate limited"]);
        assert_eq!(state.completed_count, 0);
    }
}
