//! Value tween controller — time-based interpolation that walks each
//! displayed counter from its live value toward the latest engine output.
//!
//! The math is keyed on caller-supplied millisecond timestamps so it is
//! deterministic under test; the scheduling mechanism lives in
//! [`crate::animator`].

use serde::{Deserialize, Serialize};

use crate::engine::{RoiResult, TWEEN_DURATION_MS};

/// Cubic ease-out: fast start, settling toward the target.
fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// A single animated numeric value.
///
/// `retarget` always captures the *currently displayed* value as the new
/// start point, so rapid successive retargets never produce a visible
/// jump; the last retarget wins and nothing is queued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    start: f64,
    target: f64,
    started_at_ms: u64,
}

impl Tween {
    /// A settled tween sitting at `value`. The degenerate first animation
    /// (start == target) completes instantly.
    pub fn at(value: f64, now_ms: u64) -> Self {
        Self {
            start: value,
            target: value,
            started_at_ms: now_ms,
        }
    }

    /// Begin animating toward `target` from whatever is displayed now.
    pub fn retarget(&mut self, target: f64, now_ms: u64) {
        self.start = self.value_at(now_ms);
        self.target = target;
        self.started_at_ms = now_ms;
    }

    /// Displayed value at `now_ms`. Exactly `target` once the duration has
    /// elapsed, exactly the pre-retarget value at elapsed zero.
    pub fn value_at(&self, now_ms: u64) -> f64 {
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        if elapsed >= TWEEN_DURATION_MS {
            return self.target;
        }
        let t = elapsed as f64 / TWEEN_DURATION_MS as f64;
        self.start + (self.target - self.start) * ease_out_cubic(t)
    }

    /// Whether the animation has run its full duration.
    pub fn settled(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_at_ms) >= TWEEN_DURATION_MS
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

/// The displayed subset of an [`RoiResult`], rounded to whole units the
/// way the counters render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiSnapshot {
    pub weekly_savings: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub break_even_weeks: f64,
}

/// One tween per displayed field, retargeted atomically from a result so
/// no field ever animates toward a stale target.
#[derive(Debug, Clone, Copy)]
pub struct RoiTweenSet {
    weekly: Tween,
    monthly: Tween,
    annual: Tween,
    break_even: Tween,
}

impl RoiTweenSet {
    /// All counters start at zero.
    pub fn new(now_ms: u64) -> Self {
        Self {
            weekly: Tween::at(0.0, now_ms),
            monthly: Tween::at(0.0, now_ms),
            annual: Tween::at(0.0, now_ms),
            break_even: Tween::at(0.0, now_ms),
        }
    }

    /// Point every field at the latest engine output.
    pub fn retarget(&mut self, result: &RoiResult, now_ms: u64) {
        self.weekly.retarget(result.weekly_savings, now_ms);
        self.monthly.retarget(result.monthly_savings, now_ms);
        self.annual.retarget(result.annual_savings, now_ms);
        self.break_even
            .retarget(result.break_even_weeks as f64, now_ms);
    }

    pub fn snapshot(&self, now_ms: u64) -> RoiSnapshot {
        RoiSnapshot {
            weekly_savings: self.weekly.value_at(now_ms).round(),
            monthly_savings: self.monthly.value_at(now_ms).round(),
            annual_savings: self.annual.value_at(now_ms).round(),
            break_even_weeks: self.break_even.value_at(now_ms).round(),
        }
    }

    pub fn settled(&self, now_ms: u64) -> bool {
        self.weekly.settled(now_ms)
            && self.monthly.settled(now_ms)
            && self.annual.settled(now_ms)
            && self.break_even.settled(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compute, RoiInputs};

    #[test]
    fn test_reaches_target_exactly_at_duration() {
        let mut tween = Tween::at(0.0, 0);
        tween.retarget(3_750.0, 0);
        assert_eq!(tween.value_at(TWEEN_DURATION_MS), 3_750.0);
        assert_eq!(tween.value_at(TWEEN_DURATION_MS + 10_000), 3_750.0);
        assert!(tween.settled(TWEEN_DURATION_MS));
    }

    #[test]
    fn test_starts_at_displayed_value() {
        let mut tween = Tween::at(100.0, 0);
        tween.retarget(200.0, 0);
        assert_eq!(tween.value_at(0), 100.0);
    }

    #[test]
    fn test_monotonic_progress_upward() {
        let mut tween = Tween::at(0.0, 0);
        tween.retarget(1_000.0, 0);
        let mut last = tween.value_at(0);
        for now in (0..=TWEEN_DURATION_MS).step_by(100) {
            let v = tween.value_at(now);
            assert!(v >= last);
            assert!(v <= 1_000.0 + 1e-9);
            last = v;
        }
    }

    #[test]
    fn test_midflight_retarget_is_continuous() {
        let mut tween = Tween::at(0.0, 0);
        tween.retarget(1_000.0, 0);
        let displayed = tween.value_at(750);

        // Input changes mid-animation: new tween starts from the live value
        tween.retarget(200.0, 750);
        assert_eq!(tween.value_at(750), displayed);
        assert_eq!(tween.value_at(750 + TWEEN_DURATION_MS), 200.0);
    }

    #[test]
    fn test_last_retarget_wins() {
        let mut tween = Tween::at(0.0, 0);
        tween.retarget(500.0, 0);
        tween.retarget(900.0, 1);
        tween.retarget(300.0, 2);
        assert_eq!(tween.target(), 300.0);
        assert_eq!(tween.value_at(2 + TWEEN_DURATION_MS), 300.0);
    }

    #[test]
    fn test_degenerate_first_animation() {
        // start == target == 0 progresses instantly and stays valid
        let tween = Tween::at(0.0, 0);
        assert_eq!(tween.value_at(0), 0.0);
        assert_eq!(tween.value_at(1), 0.0);
    }

    #[test]
    fn test_set_retargets_all_fields_together() {
        let result = compute(&RoiInputs::default());
        let mut set = RoiTweenSet::new(0);
        set.retarget(&result, 0);

        let settled = set.snapshot(TWEEN_DURATION_MS);
        assert_eq!(settled.weekly_savings, 3_750.0);
        assert_eq!(settled.monthly_savings, 16_238.0);
        assert_eq!(settled.annual_savings, 180_000.0);
        assert_eq!(settled.break_even_weeks, 1.0);
        assert!(set.settled(TWEEN_DURATION_MS));
    }

    #[test]
    fn test_snapshot_rounds_like_the_counters() {
        let mut set = RoiTweenSet::new(0);
        let result = RoiResult {
            weekly_savings: 3.0,
            monthly_savings: 12.99,
            annual_savings: 144.3,
            break_even_weeks: 2,
        };
        set.retarget(&result, 0);
        let snap = set.snapshot(TWEEN_DURATION_MS);
        assert_eq!(snap.monthly_savings, 13.0);
        assert_eq!(snap.annual_savings, 144.0);
    }
}
