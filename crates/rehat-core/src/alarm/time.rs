use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A validated 24-hour time of day with minute precision.
///
/// Displays and serializes as `HH:mm`. Parsing accepts `H:mm` as well, the
/// same shapes the input box of the original sidebar accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
}

impl AlarmTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 {
            return Err(ValidationError::invalid(
                "time",
                format!("hour {hour} is outside 0-23"),
            ));
        }
        if minute > 59 {
            return Err(ValidationError::invalid(
                "time",
                format!("minute {minute} is outside 0-59"),
            ));
        }
        Ok(Self { hour, minute })
    }

    /// The minute `now` falls in. Seconds are dropped.
    pub fn of(now: NaiveDateTime) -> Self {
        Self {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
        }
    }

    /// `now + minutes`, truncated to the minute. Wraps past midnight.
    pub fn from_now(now: NaiveDateTime, minutes: u32) -> Self {
        Self::of(now + Duration::minutes(i64::from(minutes)))
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for AlarmTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || ValidationError::invalid("time", format!("'{s}' must be HH:mm"));

        let (h, m) = s.split_once(':').ok_or_else(bad)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(bad());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let hour: u8 = h.parse().map_err(|_| bad())?;
        let minute: u8 = m.parse().map_err(|_| bad())?;
        Self::new(hour, minute)
    }
}

impl Serialize for AlarmTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AlarmTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_and_formats() {
        assert_eq!("14:30".parse::<AlarmTime>().unwrap().to_string(), "14:30");
        assert_eq!("9:05".parse::<AlarmTime>().unwrap().to_string(), "09:05");
        assert_eq!("00:00".parse::<AlarmTime>().unwrap().to_string(), "00:00");
        assert_eq!(" 23:59 ".parse::<AlarmTime>().unwrap().to_string(), "23:59");
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "24:00", "12:60", "1230", "12:3", "12:345", "ab:cd", "-1:00", "+1:00", "123:00"] {
            assert!(bad.parse::<AlarmTime>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn from_now_wraps_midnight_and_drops_seconds() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(23, 58, 42)
            .unwrap();
        assert_eq!(AlarmTime::from_now(now, 5).to_string(), "00:03");
        assert_eq!(AlarmTime::from_now(now, 0).to_string(), "23:58");
    }

    #[test]
    fn serde_uses_label() {
        let t = AlarmTime::new(7, 5).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:05\"");
        let back: AlarmTime = serde_json::from_str("\"07:05\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<AlarmTime>("\"7-05\"").is_err());
    }
}
