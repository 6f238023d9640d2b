//! # Rehat Core Library
//!
//! This library provides the core logic for Rehat, a personal break-reminder
//! timer. The user arms an alarm for a time of day (or a relative preset), the
//! library counts down, notifies when the minute arrives, optionally loops a
//! sound, and keeps simple daily statistics.
//!
//! ## Architecture
//!
//! - **Alarm Scheduler**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()`
//! - **Storage**: SQLite key-value state and TOML-based configuration
//! - **Stats**: Daily break counts plus an external "commits today" signal
//! - **Collaborators**: Traits for the clock, notifier, sound player and view,
//!   so the host decides how things are shown and played
//!
//! ## Key Components
//!
//! - [`SchedulerContext`]: Owns the alarm state and every collaborator
//! - [`Command`]: Every user intent, dispatched through one handler
//! - [`Database`]: Persisted key-value state
//! - [`Config`]: Application configuration management

pub mod alarm;
pub mod clock;
pub mod command;
pub mod error;
pub mod events;
pub mod notify;
pub mod runtime;
pub mod sound;
pub mod stats;
pub mod storage;
pub mod view;

pub use alarm::{AlarmPhase, AlarmSnapshot, AlarmState, AlarmStatus, AlarmTime, SchedulerContext};
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{AlarmResponse, Command};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use notify::{AlarmPrompt, Notifier};
pub use sound::{PlayMode, ProcessSoundPlayer, SoundFile, SoundPlayer};
pub use stats::{CommitSource, DailyStats, GitCommitCounter, StatsAggregator};
pub use storage::{Config, Database, KvStore, SoundPreference, StateStore};
pub use view::{View, ViewUpdate};
