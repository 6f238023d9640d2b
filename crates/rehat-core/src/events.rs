use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmTime;
use crate::sound::SoundFile;

/// Every state change in the scheduler produces an Event.
/// Hosts print them, log them, or ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    AlarmArmed {
        alarm_time: AlarmTime,
        at: NaiveDateTime,
    },
    /// Re-armed from the store at startup.
    AlarmRestored {
        alarm_time: AlarmTime,
        armed_at: NaiveDateTime,
        at: NaiveDateTime,
    },
    AlarmTriggered {
        alarm_time: AlarmTime,
        break_count: u32,
        at: NaiveDateTime,
    },
    AlarmSnoozed {
        minutes: u32,
        alarm_time: AlarmTime,
        at: NaiveDateTime,
    },
    AlarmStopped {
        at: NaiveDateTime,
    },
    /// The occurrence was missed by more than the grace minute.
    AlarmExpired {
        alarm_time: AlarmTime,
        at: NaiveDateTime,
    },
    SoundChanged {
        sound_enabled: bool,
        selected_sound: SoundFile,
        at: NaiveDateTime,
    },
    SoundPreviewed {
        sound: SoundFile,
        at: NaiveDateTime,
    },
}
