//! Render pushes for the view.
//!
//! The view keeps no authoritative state. It renders whatever it was last
//! pushed and relays user intents back as [`crate::Command`]s.

use serde::{Deserialize, Serialize};

use crate::alarm::AlarmTime;
use crate::sound::SoundFile;
use crate::stats::DailyStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_time: Option<AlarmTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DailyStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundUpdate {
    pub sound_enabled: bool,
    pub selected_sound: SoundFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum ViewUpdate {
    #[serde(rename = "updateState")]
    State(StateUpdate),
    #[serde(rename = "updateSound")]
    Sound(SoundUpdate),
}

pub trait View {
    fn push(&mut self, update: &ViewUpdate);
}

/// A view nobody looks at.
#[derive(Debug, Default)]
pub struct HeadlessView;

impl View for HeadlessView {
    fn push(&mut self, _update: &ViewUpdate) {}
}
