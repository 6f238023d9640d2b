//! User intents, relayed from whichever surface the host has.

use serde::{Deserialize, Serialize};

use crate::alarm::AlarmTime;
use crate::sound::SoundFile;

/// The user's answer to the alarm modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmResponse {
    Stop,
    Snooze(u32),
    /// Modal closed without a choice. Treated as stop.
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "camelCase")]
pub enum Command {
    SetAlarm(AlarmTime),
    /// Arm for now + N minutes.
    SetPreset(u32),
    StopAlarm,
    Snooze(u32),
    Respond(AlarmResponse),
    ToggleSound(bool),
    SetSound(SoundFile),
    PreviewSound,
    /// Re-push state and sound to the view.
    Refresh,
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_camel_case() {
        let json = serde_json::to_value(Command::SetAlarm("07:05".parse().unwrap())).unwrap();
        assert_eq!(json, serde_json::json!({ "command": "setAlarm", "value": "07:05" }));

        let json = serde_json::to_value(Command::PreviewSound).unwrap();
        assert_eq!(json, serde_json::json!({ "command": "previewSound" }));

        let cmd: Command =
            serde_json::from_value(serde_json::json!({ "command": "toggleSound", "value": false }))
                .unwrap();
        assert_eq!(cmd, Command::ToggleSound(false));
    }

    #[test]
    fn malformed_time_is_rejected_at_the_boundary() {
        let res: Result<Command, _> =
            serde_json::from_value(serde_json::json!({ "command": "setAlarm", "value": "24:00" }));
        assert!(res.is_err());
    }
}
