//! Alarm sounds.
//!
//! Playback is delegated to an external audio player process (`paplay`,
//! `afplay`, ...). At most one playback is alive at a time: starting a new one
//! always tears down the previous one first.

mod assets;
mod player;

pub use assets::install_default_sounds;
pub use player::{PlayerCommand, ProcessSoundPlayer};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The selectable alarm sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundFile {
    #[default]
    Alarm1,
    Alarm2,
    Alarm3,
}

impl SoundFile {
    pub const ALL: [SoundFile; 3] = [SoundFile::Alarm1, SoundFile::Alarm2, SoundFile::Alarm3];

    pub fn name(self) -> &'static str {
        match self {
            SoundFile::Alarm1 => "alarm1",
            SoundFile::Alarm2 => "alarm2",
            SoundFile::Alarm3 => "alarm3",
        }
    }

    /// File name inside the sounds directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SoundFile::Alarm1 => "alarm1.wav",
            SoundFile::Alarm2 => "alarm2.wav",
            SoundFile::Alarm3 => "alarm3.wav",
        }
    }

    /// Lenient lookup used when reading persisted values: anything unknown
    /// falls back to the default sound.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for SoundFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoundFile {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_suffix(".wav").unwrap_or(s);
        SoundFile::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ValidationError::invalid("sound", format!("'{s}' is not one of alarm1, alarm2, alarm3"))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Play the file a single time (preview).
    Once,
    /// Repeat until stopped (ringing alarm).
    Loop,
}

/// Starts and stops alarm audio.
pub trait SoundPlayer {
    /// Start playing `sound`, stopping whatever was playing before.
    ///
    /// # Errors
    /// Returns an error when the player could not be started. Callers treat
    /// that as "no sound".
    fn play(&mut self, sound: SoundFile, mode: PlayMode) -> std::io::Result<()>;

    /// Stop any active playback. A no-op when nothing plays.
    fn stop(&mut self);

    fn is_playing(&mut self) -> bool;
}

/// A player that never makes a sound.
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn play(&mut self, _sound: SoundFile, _mode: PlayMode) -> std::io::Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn is_playing(&mut self) -> bool {
        false
    }
}
