//! Notification surface the scheduler talks to.
//!
//! The host decides what a "modal" and a "status indicator" look like. The
//! modal is non-blocking: the user's choice comes back later as
//! [`crate::Command::Respond`].

use serde::{Deserialize, Serialize};

use crate::alarm::AlarmTime;
use crate::command::AlarmResponse;

pub const TRIGGER_MESSAGE: &str = "☕ It's time. Take a short break.";
pub const TEST_MESSAGE: &str = "☕ Take a short break. The code can wait.";

/// The modal shown when the alarm fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmPrompt {
    pub message: String,
    pub alarm_time: AlarmTime,
    pub snooze_minutes: u32,
}

impl AlarmPrompt {
    pub fn new(alarm_time: AlarmTime, snooze_minutes: u32) -> Self {
        Self {
            message: TRIGGER_MESSAGE.to_string(),
            alarm_time,
            snooze_minutes,
        }
    }

    /// Choices in display order.
    pub fn choices(&self) -> [(String, AlarmResponse); 2] {
        [
            ("Stop Alarm".to_string(), AlarmResponse::Stop),
            (
                format!("Snooze {}m", self.snooze_minutes),
                AlarmResponse::Snooze(self.snooze_minutes),
            ),
        ]
    }
}

pub trait Notifier {
    /// Transient informational message.
    fn info(&mut self, message: &str);

    /// Show the alarm modal. Must not block.
    fn present_alarm(&mut self, prompt: &AlarmPrompt);

    /// Close the modal if it is still showing.
    fn dismiss_alarm(&mut self) {}

    /// Live countdown text in the persistent status indicator; `None` hides it.
    fn set_status(&mut self, text: Option<&str>);
}

/// Drops everything. Useful for one-shot commands with no UI.
#[derive(Debug, Default)]
pub struct QuietNotifier;

impl Notifier for QuietNotifier {
    fn info(&mut self, _message: &str) {}

    fn present_alarm(&mut self, _prompt: &AlarmPrompt) {}

    fn set_status(&mut self, _text: Option<&str>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_carry_snooze_length() {
        let prompt = AlarmPrompt::new("10:00".parse().unwrap(), 7);
        let choices = prompt.choices();
        assert_eq!(choices[0].1, AlarmResponse::Stop);
        assert_eq!(choices[1].0, "Snooze 7m");
        assert_eq!(choices[1].1, AlarmResponse::Snooze(7));
    }
}
