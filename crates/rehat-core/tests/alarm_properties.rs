//! Property tests for the countdown and the grace-minute boundary.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use rehat_core::alarm::{AlarmState, Evaluation, GRACE_MS, OVERDUE_LABEL};
use rehat_core::AlarmTime;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn time_of(minutes: u32) -> AlarmTime {
    AlarmTime::new((minutes / 60) as u8, (minutes % 60) as u8).unwrap()
}

fn at_ms(ms: i64) -> NaiveDateTime {
    day().and_time(NaiveTime::MIN) + Duration::milliseconds(ms)
}

proptest! {
    #[test]
    fn before_target_counts_down(target_min in 1u32..1440, raw in any::<u32>()) {
        let target = time_of(target_min);
        let target_ms = i64::from(target_min) * 60_000;
        let before_ms = 1 + i64::from(raw) % target_ms;
        let now = at_ms(target_ms - before_ms);

        let mut state = AlarmState::idle();
        state.arm(target, now);
        match state.evaluate(now) {
            Evaluation::Counting { diff_ms, due, .. } => {
                prop_assert_eq!(diff_ms, before_ms);
                prop_assert!(!due);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn exactly_grace_past_is_still_counting(target_min in 0u32..1438, armed_before_ms in 1i64..3_600_000) {
        let target = time_of(target_min);
        let target_ms = i64::from(target_min) * 60_000;
        let mut state = AlarmState::idle();
        state.arm(target, at_ms(target_ms - armed_before_ms));

        let now = at_ms(target_ms + GRACE_MS);
        match state.evaluate(now) {
            Evaluation::Counting { remaining, diff_ms, .. } => {
                prop_assert_eq!(diff_ms, -GRACE_MS);
                prop_assert_eq!(remaining, OVERDUE_LABEL);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn one_ms_later_expires_a_missed_arming(target_min in 0u32..1438, armed_before_ms in 0i64..3_600_000) {
        let target = time_of(target_min);
        let target_ms = i64::from(target_min) * 60_000;
        let mut state = AlarmState::idle();
        state.arm(target, at_ms(target_ms - armed_before_ms));

        let now = at_ms(target_ms + GRACE_MS + 1);
        match state.evaluate(now) {
            Evaluation::Expired { overdue_ms, .. } => prop_assert_eq!(overdue_ms, GRACE_MS + 1),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn one_ms_later_rolls_a_late_arming(target_min in 0u32..1438) {
        let target = time_of(target_min);
        let target_ms = i64::from(target_min) * 60_000;
        let now = at_ms(target_ms + GRACE_MS + 1);
        let mut state = AlarmState::idle();
        state.arm(target, now);

        match state.evaluate(now) {
            Evaluation::Counting { target_at, diff_ms, .. } => {
                prop_assert_eq!(target_at, at_ms(target_ms) + Duration::days(1));
                prop_assert!(diff_ms > 0);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}
