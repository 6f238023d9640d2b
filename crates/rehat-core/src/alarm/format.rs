/// Shown while the alarm sits in its one-minute grace window.
pub const OVERDUE_LABEL: &str = "00:00";

/// Countdown text for `diff_ms` milliseconds until the target.
///
/// `"<H>h <M>m <S>s"` when at least an hour is left, otherwise `"<M>m <S>s"`.
/// Negative differences render as [`OVERDUE_LABEL`].
pub fn format_remaining(diff_ms: i64) -> String {
    if diff_ms < 0 {
        return OVERDUE_LABEL.to_string();
    }
    let hours = diff_ms / 3_600_000;
    let minutes = (diff_ms % 3_600_000) / 60_000;
    let seconds = (diff_ms % 60_000) / 1000;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_and_without_hours() {
        assert_eq!(format_remaining(2_000), "0m 2s");
        assert_eq!(format_remaining(0), "0m 0s");
        assert_eq!(format_remaining(59_999), "0m 59s");
        assert_eq!(format_remaining(3_600_000), "1h 0m 0s");
        assert_eq!(format_remaining(22 * 3_600_000 + 55 * 60_000), "22h 55m 0s");
        assert_eq!(format_remaining(4 * 60_000 + 12_500), "4m 12s");
    }

    #[test]
    fn negative_is_overdue_label() {
        assert_eq!(format_remaining(-1), OVERDUE_LABEL);
        assert_eq!(format_remaining(-60_000), OVERDUE_LABEL);
    }
}
