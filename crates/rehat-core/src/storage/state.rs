//! Typed access to the persisted keys.
//!
//! | key             | value                              |
//! |-----------------|------------------------------------|
//! | `alarmTime`     | `"HH:mm"`, absent when idle        |
//! | `alarmArmedAt`  | local timestamp of the arming      |
//! | `alarmFiredAt`  | when that arming fired, if it did  |
//! | `soundEnabled`  | bool, default `true`               |
//! | `selectedSound` | `"alarm1"` .. `"alarm3"`           |
//! | `breakStats`    | `{ "YYYY-MM-DD": count }`          |
//!
//! Values are JSON text. Unreadable values are treated as missing.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::database::KvStore;
use crate::alarm::AlarmTime;
use crate::error::StoreError;
use crate::sound::SoundFile;

pub const KEY_ALARM_TIME: &str = "alarmTime";
pub const KEY_ALARM_ARMED_AT: &str = "alarmArmedAt";
pub const KEY_ALARM_FIRED_AT: &str = "alarmFiredAt";
pub const KEY_SOUND_ENABLED: &str = "soundEnabled";
pub const KEY_SELECTED_SOUND: &str = "selectedSound";
pub const KEY_BREAK_STATS: &str = "breakStats";

const DATE_FMT: &str = "%Y-%m-%d";

/// An alarm as it was left by the previous session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedAlarm {
    pub time: AlarmTime,
    pub armed_at: Option<NaiveDateTime>,
    /// Set once this arming has fired, so a later session does not fire it
    /// again.
    pub fired_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundPreference {
    pub sound_enabled: bool,
    pub selected_sound: SoundFile,
}

impl Default for SoundPreference {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            selected_sound: SoundFile::default(),
        }
    }
}

pub struct StateStore {
    kv: Box<dyn KvStore>,
}

impl StateStore {
    pub fn new(kv: impl KvStore + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.kv.kv_get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable stored value");
                Ok(None)
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.kv.kv_set(key, &raw)
    }

    // ── Alarm ────────────────────────────────────────────────────────

    pub fn alarm(&self) -> Result<Option<PersistedAlarm>, StoreError> {
        let Some(time) = self.read::<AlarmTime>(KEY_ALARM_TIME)? else {
            return Ok(None);
        };
        let armed_at = self.read::<NaiveDateTime>(KEY_ALARM_ARMED_AT)?;
        let fired_at = self.read::<NaiveDateTime>(KEY_ALARM_FIRED_AT)?;
        Ok(Some(PersistedAlarm {
            time,
            armed_at,
            fired_at,
        }))
    }

    /// Store a fresh arming. Any fired marker of the previous one is dropped.
    pub fn save_alarm(&self, time: AlarmTime, armed_at: NaiveDateTime) -> Result<(), StoreError> {
        self.kv.kv_delete(KEY_ALARM_FIRED_AT)?;
        self.write(KEY_ALARM_TIME, &time)?;
        self.write(KEY_ALARM_ARMED_AT, &armed_at)
    }

    pub fn mark_alarm_fired(&self, fired_at: NaiveDateTime) -> Result<(), StoreError> {
        self.write(KEY_ALARM_FIRED_AT, &fired_at)
    }

    pub fn clear_alarm(&self) -> Result<(), StoreError> {
        self.kv.kv_delete(KEY_ALARM_TIME)?;
        self.kv.kv_delete(KEY_ALARM_ARMED_AT)?;
        self.kv.kv_delete(KEY_ALARM_FIRED_AT)
    }

    // ── Sound ────────────────────────────────────────────────────────

    pub fn sound_preference(&self) -> Result<SoundPreference, StoreError> {
        let sound_enabled = self.read::<bool>(KEY_SOUND_ENABLED)?.unwrap_or(true);
        let selected_sound = self
            .read::<String>(KEY_SELECTED_SOUND)?
            .map(|s| SoundFile::from_stored(&s))
            .unwrap_or_default();
        Ok(SoundPreference {
            sound_enabled,
            selected_sound,
        })
    }

    pub fn set_sound_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.write(KEY_SOUND_ENABLED, &enabled)
    }

    pub fn set_selected_sound(&self, sound: SoundFile) -> Result<(), StoreError> {
        self.write(KEY_SELECTED_SOUND, sound.name())
    }

    // ── Break stats ──────────────────────────────────────────────────

    pub fn break_stats(&self) -> Result<BTreeMap<String, u32>, StoreError> {
        Ok(self.read(KEY_BREAK_STATS)?.unwrap_or_default())
    }

    pub fn break_count(&self, date: NaiveDate) -> Result<u32, StoreError> {
        let stats = self.break_stats()?;
        Ok(stats.get(&date_key(date)).copied().unwrap_or(0))
    }

    /// Add one break to `date`, returning the new count.
    pub fn increment_breaks(&self, date: NaiveDate) -> Result<u32, StoreError> {
        let mut stats = self.break_stats()?;
        let count = stats.entry(date_key(date)).or_insert(0);
        *count = count.saturating_add(1);
        let count = *count;
        self.write(KEY_BREAK_STATS, &stats)?;
        Ok(count)
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn store() -> StateStore {
        StateStore::new(Database::open_memory().unwrap())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn alarm_roundtrip_and_clear() {
        let s = store();
        assert!(s.alarm().unwrap().is_none());

        let time: AlarmTime = "22:00".parse().unwrap();
        let armed_at = day(3).and_hms_opt(21, 15, 7).unwrap();
        s.save_alarm(time, armed_at).unwrap();
        assert_eq!(
            s.alarm().unwrap(),
            Some(PersistedAlarm {
                time,
                armed_at: Some(armed_at),
                fired_at: None,
            })
        );

        s.clear_alarm().unwrap();
        assert!(s.alarm().unwrap().is_none());
    }

    #[test]
    fn fired_marker_belongs_to_one_arming() {
        let s = store();
        let time: AlarmTime = "22:00".parse().unwrap();
        let fired = day(3).and_hms_opt(22, 0, 4).unwrap();
        s.save_alarm(time, day(3).and_hms_opt(21, 0, 0).unwrap()).unwrap();
        s.mark_alarm_fired(fired).unwrap();
        assert_eq!(s.alarm().unwrap().unwrap().fired_at, Some(fired));

        s.save_alarm(time, day(3).and_hms_opt(22, 0, 30).unwrap()).unwrap();
        assert_eq!(s.alarm().unwrap().unwrap().fired_at, None);

        s.mark_alarm_fired(fired).unwrap();
        s.clear_alarm().unwrap();
        assert!(s.kv.kv_get(KEY_ALARM_FIRED_AT).unwrap().is_none());
    }

    #[test]
    fn alarm_without_armed_at_still_restores() {
        let db = Database::open_memory().unwrap();
        db.kv_set(KEY_ALARM_TIME, "\"07:45\"").unwrap();
        let s = StateStore::new(db);
        let restored = s.alarm().unwrap().unwrap();
        assert_eq!(restored.time.to_string(), "07:45");
        assert!(restored.armed_at.is_none());
    }

    #[test]
    fn malformed_alarm_is_treated_as_absent() {
        let db = Database::open_memory().unwrap();
        db.kv_set(KEY_ALARM_TIME, "\"25:99\"").unwrap();
        assert!(StateStore::new(db).alarm().unwrap().is_none());
    }

    #[test]
    fn sound_preference_defaults_and_fallbacks() {
        let db = Database::open_memory().unwrap();
        db.kv_set(KEY_SELECTED_SOUND, "\"alarm9.wav\"").unwrap();
        db.kv_set(KEY_SOUND_ENABLED, "\"yes please\"").unwrap();
        let s = StateStore::new(db);
        assert_eq!(s.sound_preference().unwrap(), SoundPreference::default());

        s.set_sound_enabled(false).unwrap();
        s.set_selected_sound(SoundFile::Alarm3).unwrap();
        let pref = s.sound_preference().unwrap();
        assert!(!pref.sound_enabled);
        assert_eq!(pref.selected_sound, SoundFile::Alarm3);
    }

    #[test]
    fn breaks_are_counted_per_day() {
        let s = store();
        assert_eq!(s.break_count(day(1)).unwrap(), 0);
        assert_eq!(s.increment_breaks(day(1)).unwrap(), 1);
        assert_eq!(s.increment_breaks(day(1)).unwrap(), 2);
        assert_eq!(s.increment_breaks(day(2)).unwrap(), 1);
        assert_eq!(s.break_count(day(1)).unwrap(), 2);

        let all = s.break_stats().unwrap();
        assert_eq!(all.get("2024-06-01"), Some(&2));
        assert_eq!(all.get("2024-06-02"), Some(&1));
    }
}
