//! The alarm state machine and its pure evaluation step.
//!
//! ```text
//! Idle -> Armed -> Triggered -> Idle        (stop / expiry)
//!                          \--> Armed       (snooze)
//! ```

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::format::format_remaining;
use super::time::AlarmTime;

/// How long a target may sit in the past before the arming is resolved:
/// rolled over to tomorrow, or expired.
pub const GRACE_MS: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmPhase {
    Idle,
    Armed,
    Triggered,
}

/// Single process-wide alarm.
///
/// Fields are only changed together so that `triggered` and `armed_at` are
/// never set without a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmState {
    target: Option<AlarmTime>,
    triggered: bool,
    armed_at: Option<NaiveDateTime>,
}

/// Outcome of evaluating the alarm against the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Idle,
    /// The occurrence passed more than a minute ago without being handled.
    Expired { target: AlarmTime, overdue_ms: i64 },
    Counting {
        target: AlarmTime,
        /// The occurrence being counted down to.
        target_at: NaiveDateTime,
        diff_ms: i64,
        remaining: String,
        /// The current minute matches and the alarm has not fired yet.
        due: bool,
    },
}

impl AlarmState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<AlarmTime> {
        self.target
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn armed_at(&self) -> Option<NaiveDateTime> {
        self.armed_at
    }

    pub fn phase(&self) -> AlarmPhase {
        match (self.target, self.triggered) {
            (None, _) => AlarmPhase::Idle,
            (Some(_), false) => AlarmPhase::Armed,
            (Some(_), true) => AlarmPhase::Triggered,
        }
    }

    pub fn arm(&mut self, target: AlarmTime, armed_at: NaiveDateTime) {
        self.target = Some(target);
        self.triggered = false;
        self.armed_at = Some(armed_at);
    }

    /// Marks the current arming as fired. No-op when idle.
    pub fn mark_triggered(&mut self) {
        if self.target.is_some() {
            self.triggered = true;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::idle();
    }

    /// Resolve the alarm against `now` without changing anything.
    ///
    /// Today's occurrence is rolled forward a day when it lies more than
    /// [`GRACE_MS`] in the past, the current minute is not the target minute,
    /// and the arming happened after that occurrence had already passed.
    /// An occurrence that passed while armed is not rolled; once it is more
    /// than [`GRACE_MS`] overdue the alarm is expired.
    pub fn evaluate(&self, now: NaiveDateTime) -> Evaluation {
        let Some(target) = self.target else {
            return Evaluation::Idle;
        };
        let label = AlarmTime::of(now);
        let armed_at = self.armed_at.unwrap_or(now);

        let mut target_at = now.date().and_time(target.as_naive_time());
        let past_ms = (now - target_at).num_milliseconds();
        let armed_after_ms = (armed_at - target_at).num_milliseconds();
        if past_ms > GRACE_MS && label != target && armed_after_ms >= GRACE_MS {
            target_at += Duration::days(1);
        }

        let diff_ms = (target_at - now).num_milliseconds();
        if diff_ms < -GRACE_MS {
            return Evaluation::Expired {
                target,
                overdue_ms: -diff_ms,
            };
        }

        Evaluation::Counting {
            target,
            target_at,
            diff_ms,
            remaining: format_remaining(diff_ms),
            due: label == target && !self.triggered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn t(s: &str) -> AlarmTime {
        s.parse().unwrap()
    }

    #[test]
    fn phases_follow_fields() {
        let mut state = AlarmState::idle();
        assert_eq!(state.phase(), AlarmPhase::Idle);
        state.mark_triggered();
        assert!(!state.is_triggered());

        state.arm(t("14:30"), at(14, 0, 0));
        assert_eq!(state.phase(), AlarmPhase::Armed);
        state.mark_triggered();
        assert_eq!(state.phase(), AlarmPhase::Triggered);

        state.clear();
        assert_eq!(state, AlarmState::idle());
    }

    #[test]
    fn counts_down_to_later_today() {
        let mut state = AlarmState::idle();
        state.arm(t("14:30"), at(14, 0, 0));
        match state.evaluate(at(14, 29, 58)) {
            Evaluation::Counting {
                remaining, due, diff_ms, ..
            } => {
                assert_eq!(remaining, "0m 2s");
                assert_eq!(diff_ms, 2_000);
                assert!(!due);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn due_only_in_matching_minute_and_until_triggered() {
        let mut state = AlarmState::idle();
        state.arm(t("14:30"), at(14, 0, 0));
        assert!(matches!(state.evaluate(at(14, 30, 0)), Evaluation::Counting { due: true, .. }));
        assert!(matches!(state.evaluate(at(14, 30, 59)), Evaluation::Counting { due: true, .. }));
        state.mark_triggered();
        assert!(matches!(
            state.evaluate(at(14, 30, 30)),
            Evaluation::Counting { due: false, ref remaining, .. } if remaining == "00:00"
        ));
    }

    #[test]
    fn earlier_time_set_later_means_tomorrow() {
        let mut state = AlarmState::idle();
        state.arm(t("09:00"), at(10, 5, 0));
        match state.evaluate(at(10, 5, 0)) {
            Evaluation::Counting {
                target_at, remaining, ..
            } => {
                assert_eq!(target_at, at(9, 0, 0) + Duration::days(1));
                assert_eq!(remaining, "22h 55m 0s");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missed_occurrence_expires() {
        let mut state = AlarmState::idle();
        state.arm(t("09:00"), at(8, 0, 0));
        assert!(matches!(
            state.evaluate(at(10, 5, 0)),
            Evaluation::Expired { overdue_ms, .. } if overdue_ms == 65 * 60_000
        ));
    }

    #[test]
    fn restored_without_armed_at_rolls_forward() {
        let state = AlarmState {
            target: Some(t("09:00")),
            triggered: false,
            armed_at: None,
        };
        assert!(matches!(state.evaluate(at(10, 5, 0)), Evaluation::Counting { .. }));
    }

    #[test]
    fn grace_window_boundary() {
        let mut state = AlarmState::idle();
        state.arm(t("09:00"), at(8, 0, 0));
        assert!(matches!(
            state.evaluate(at(9, 1, 0)),
            Evaluation::Counting { diff_ms: -60_000, ref remaining, due: false, .. } if remaining == "00:00"
        ));
        assert!(matches!(
            state.evaluate(at(9, 1, 0) + Duration::milliseconds(1)),
            Evaluation::Expired { overdue_ms: 60_001, .. }
        ));
    }
}
