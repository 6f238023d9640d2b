//! The scheduler context.
//!
//! Owns the alarm state, the store and every collaborator. Like the rest of
//! the crate it runs no threads of its own: the caller feeds it commands and
//! calls `tick()` whenever [`SchedulerContext::next_deadline`] passes.
//!
//! ## Usage
//!
//! ```ignore
//! let mut ctx = SchedulerContext::new(store, stats, &config)
//!     .with_notifier(notifier)
//!     .with_view(view);
//! ctx.attach();
//! ctx.restore();
//! ctx.handle(Command::SetAlarm("14:30".parse()?))?;
//! // In a loop, once per tick interval:
//! ctx.tick();
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::state::{AlarmPhase, AlarmState, Evaluation};
use super::time::AlarmTime;
use crate::clock::{Clock, SystemClock};
use crate::command::{AlarmResponse, Command};
use crate::error::{CoreError, StoreError, ValidationError};
use crate::events::Event;
use crate::notify::{AlarmPrompt, Notifier, QuietNotifier};
use crate::sound::{PlayMode, SilentPlayer, SoundFile, SoundPlayer};
use crate::stats::{DailyStats, StatsAggregator};
use crate::storage::{Config, SoundPreference, StateStore};
use crate::view::{HeadlessView, SoundUpdate, StateUpdate, View, ViewUpdate};

/// Where the alarm stands, as the next tick would see it.
///
/// [`AlarmPhase`] is what the alarm holds in memory and never says
/// `Expired`: that only shows once the clock is read, and the next tick turns
/// it back into `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmStatus {
    Idle,
    Armed,
    Triggered,
    /// Missed by more than the grace minute; the next tick clears it.
    Expired,
}

/// Side-effect-free view of the alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSnapshot {
    pub status: AlarmStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_time: Option<AlarmTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
}

struct Loaded {
    time: AlarmTime,
    at: chrono::NaiveDateTime,
    /// The store had no arming instant; `at` was used instead.
    backfill: bool,
}

pub struct SchedulerContext {
    clock: Box<dyn Clock>,
    store: StateStore,
    stats: StatsAggregator,
    notifier: Box<dyn Notifier>,
    sound: Box<dyn SoundPlayer>,
    view: Box<dyn View>,
    alarm: AlarmState,
    /// When the next tick is due. `None` while idle.
    cadence: Option<Instant>,
    tick_interval: Duration,
    snooze_minutes: u32,
    prompt_open: bool,
}

impl SchedulerContext {
    /// A context on the system clock with silent collaborators.
    pub fn new(store: StateStore, stats: StatsAggregator, config: &Config) -> Self {
        Self {
            clock: Box::new(SystemClock),
            store,
            stats,
            notifier: Box::new(QuietNotifier),
            sound: Box::new(SilentPlayer),
            view: Box::new(HeadlessView),
            alarm: AlarmState::idle(),
            cadence: None,
            tick_interval: config.tick_interval(),
            snooze_minutes: config.alarm.snooze_minutes.max(1),
            prompt_open: false,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_sound_player(mut self, sound: impl SoundPlayer + 'static) -> Self {
        self.sound = Box::new(sound);
        self
    }

    pub fn with_view(mut self, view: impl View + 'static) -> Self {
        self.view = Box::new(view);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn alarm(&self) -> &AlarmState {
        &self.alarm
    }

    pub fn phase(&self) -> AlarmPhase {
        self.alarm.phase()
    }

    pub fn is_active(&self) -> bool {
        self.alarm.target().is_some()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn snooze_minutes(&self) -> u32 {
        self.snooze_minutes
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// When the runtime should call [`tick`](Self::tick) next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.cadence
    }

    pub fn sound_preference(&self) -> SoundPreference {
        self.store.sound_preference().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "sound preference unavailable, using defaults");
            SoundPreference::default()
        })
    }

    pub fn stats_today(&mut self) -> DailyStats {
        let today = self.clock.now().date();
        self.stats.collect(&self.store, today)
    }

    /// What the next tick would see. Changes nothing.
    pub fn snapshot(&self) -> AlarmSnapshot {
        match self.alarm.evaluate(self.clock.now()) {
            Evaluation::Idle => AlarmSnapshot {
                status: AlarmStatus::Idle,
                alarm_time: None,
                remaining: None,
            },
            Evaluation::Expired { target, .. } => AlarmSnapshot {
                status: AlarmStatus::Expired,
                alarm_time: Some(target),
                remaining: None,
            },
            Evaluation::Counting {
                target,
                remaining,
                due,
                ..
            } => AlarmSnapshot {
                status: if due || self.alarm.is_triggered() {
                    AlarmStatus::Triggered
                } else {
                    AlarmStatus::Armed
                },
                alarm_time: Some(target),
                remaining: Some(remaining),
            },
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Push the sound preference and the full state to the view.
    pub fn attach(&mut self) {
        self.render_sound();
        self.render_state(None);
    }

    /// Re-arm whatever the previous session left in the store.
    pub fn restore(&mut self) -> Vec<Event> {
        let Some(persisted) = self.load_persisted() else {
            return Vec::new();
        };
        let armed_at = self.alarm.armed_at().unwrap_or(persisted.at);
        if persisted.backfill {
            self.persist("alarm", self.store.save_alarm(persisted.time, armed_at));
        }
        tracing::info!(alarm_time = %persisted.time, %armed_at, "alarm restored");

        let mut events = vec![Event::AlarmRestored {
            alarm_time: persisted.time,
            armed_at,
            at: persisted.at,
        }];
        self.start_cadence();
        events.extend(self.tick());
        events
    }

    /// Put the persisted alarm back in memory without ticking or writing.
    /// Returns whether there was one.
    pub fn load(&mut self) -> bool {
        self.load_persisted().is_some()
    }

    /// Arm for `time`, replacing any current alarm.
    pub fn set_alarm(&mut self, time: AlarmTime) -> Vec<Event> {
        let now = self.clock.now();
        self.silence();
        self.alarm.arm(time, now);
        self.persist("alarm", self.store.save_alarm(time, now));
        tracing::info!(alarm_time = %time, "alarm armed");

        let mut events = vec![Event::AlarmArmed {
            alarm_time: time,
            at: now,
        }];
        self.start_cadence();
        events.extend(self.tick());
        events
    }

    /// Arm for now + `minutes`, truncated to the minute.
    pub fn set_preset(&mut self, minutes: u32) -> Result<Vec<Event>, ValidationError> {
        let minutes = positive_minutes("preset", minutes)?;
        let target = AlarmTime::from_now(self.clock.now(), minutes);
        Ok(self.set_alarm(target))
    }

    pub fn snooze(&mut self, minutes: u32) -> Result<Vec<Event>, ValidationError> {
        let minutes = positive_minutes("snooze", minutes)?;
        let now = self.clock.now();
        let target = AlarmTime::from_now(now, minutes);
        let mut events = vec![Event::AlarmSnoozed {
            minutes,
            alarm_time: target,
            at: now,
        }];
        events.extend(self.set_alarm(target));
        Ok(events)
    }

    /// Safe to call while idle; only the display is refreshed then.
    pub fn stop_alarm(&mut self) -> Vec<Event> {
        let was_active = self.is_active();
        self.clear_alarm();
        if !was_active {
            return Vec::new();
        }
        tracing::info!("alarm stopped");
        vec![Event::AlarmStopped {
            at: self.clock.now(),
        }]
    }

    /// Answer to the alarm modal. The sound always stops first.
    pub fn respond(&mut self, response: AlarmResponse) -> Result<Vec<Event>, ValidationError> {
        self.sound.stop();
        self.prompt_open = false;
        match response {
            AlarmResponse::Stop | AlarmResponse::Dismiss => Ok(self.stop_alarm()),
            AlarmResponse::Snooze(minutes) => self.snooze(minutes),
        }
    }

    /// One evaluation step. Runs once per tick interval while an alarm is
    /// active.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        match self.alarm.evaluate(now) {
            Evaluation::Idle => {
                self.cadence = None;
                Vec::new()
            }
            Evaluation::Expired { target, overdue_ms } => {
                tracing::info!(alarm_time = %target, overdue_ms, "alarm expired");
                self.clear_alarm();
                vec![Event::AlarmExpired {
                    alarm_time: target,
                    at: now,
                }]
            }
            Evaluation::Counting {
                target,
                remaining,
                due,
                ..
            } => {
                let mut events = Vec::new();
                if due {
                    events.push(self.trigger(target));
                }
                self.notifier.set_status(Some(&status_text(&remaining)));
                self.render_state(Some((target, remaining)));
                self.cadence = Some(Instant::now() + self.tick_interval);
                events
            }
        }
    }

    pub fn preview_sound(&mut self) -> Vec<Event> {
        let sound = self.sound_preference().selected_sound;
        if let Err(e) = self.sound.play(sound, PlayMode::Once) {
            tracing::warn!(%sound, error = %e, "preview failed");
        }
        vec![Event::SoundPreviewed {
            sound,
            at: self.clock.now(),
        }]
    }

    pub fn toggle_sound(&mut self, enabled: bool) -> Vec<Event> {
        self.persist("soundEnabled", self.store.set_sound_enabled(enabled));
        if !enabled {
            self.sound.stop();
        }
        self.sound_changed()
    }

    pub fn set_sound(&mut self, sound: SoundFile) -> Vec<Event> {
        self.persist("selectedSound", self.store.set_selected_sound(sound));
        self.sound_changed()
    }

    /// Stop ticking and make sure nothing keeps ringing. The armed alarm stays
    /// persisted for the next session.
    pub fn shutdown(&mut self) {
        self.cadence = None;
        self.silence();
        self.notifier.set_status(None);
    }

    /// Single entry point for user intents.
    pub fn handle(&mut self, command: Command) -> Result<Vec<Event>, CoreError> {
        let events = match command {
            Command::SetAlarm(time) => {
                let events = self.set_alarm(time);
                self.announce_armed();
                events
            }
            Command::SetPreset(minutes) => {
                let events = self.set_preset(minutes)?;
                self.announce_armed();
                events
            }
            Command::Snooze(minutes) => {
                let events = self.snooze(minutes)?;
                self.announce_armed();
                events
            }
            Command::StopAlarm => {
                let events = self.stop_alarm();
                self.notifier.info("🛑 Break alarm stopped");
                events
            }
            Command::Respond(response) => {
                let events = self.respond(response)?;
                if matches!(response, AlarmResponse::Snooze(_)) {
                    self.announce_armed();
                }
                events
            }
            Command::ToggleSound(enabled) => self.toggle_sound(enabled),
            Command::SetSound(sound) => self.set_sound(sound),
            Command::PreviewSound => self.preview_sound(),
            Command::Refresh => {
                self.attach();
                Vec::new()
            }
            Command::Shutdown => {
                self.shutdown();
                Vec::new()
            }
        };
        Ok(events)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn load_persisted(&mut self) -> Option<Loaded> {
        let persisted = match self.store.alarm() {
            Ok(p) => p?,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted alarm");
                return None;
            }
        };
        let now = self.clock.now();
        self.alarm.arm(persisted.time, persisted.armed_at.unwrap_or(now));
        if persisted.fired_at.is_some() {
            self.alarm.mark_triggered();
        }
        Some(Loaded {
            time: persisted.time,
            at: now,
            backfill: persisted.armed_at.is_none(),
        })
    }

    fn trigger(&mut self, target: AlarmTime) -> Event {
        let now = self.clock.now();
        self.alarm.mark_triggered();
        self.persist("alarm", self.store.mark_alarm_fired(now));
        let break_count = self.store.increment_breaks(now.date()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not record break");
            0
        });
        tracing::info!(alarm_time = %target, break_count, "alarm triggered");

        let pref = self.sound_preference();
        if pref.sound_enabled {
            if let Err(e) = self.sound.play(pref.selected_sound, PlayMode::Loop) {
                tracing::warn!(sound = %pref.selected_sound, error = %e, "alarm sound failed");
            }
        }
        self.notifier
            .present_alarm(&AlarmPrompt::new(target, self.snooze_minutes));
        self.prompt_open = true;

        Event::AlarmTriggered {
            alarm_time: target,
            break_count,
            at: now,
        }
    }

    fn clear_alarm(&mut self) {
        self.alarm.clear();
        self.persist("alarm", self.store.clear_alarm());
        self.cadence = None;
        self.silence();
        self.notifier.set_status(None);
        self.render_state(None);
    }

    fn silence(&mut self) {
        self.sound.stop();
        if self.prompt_open {
            self.notifier.dismiss_alarm();
            self.prompt_open = false;
        }
    }

    fn start_cadence(&mut self) {
        self.cadence = Some(Instant::now());
    }

    fn announce_armed(&mut self) {
        if let Some(target) = self.alarm.target() {
            self.notifier.info(&format!("⏰ Break alarm set for {target}"));
        }
    }

    fn sound_changed(&mut self) -> Vec<Event> {
        self.render_sound();
        let pref = self.sound_preference();
        vec![Event::SoundChanged {
            sound_enabled: pref.sound_enabled,
            selected_sound: pref.selected_sound,
            at: self.clock.now(),
        }]
    }

    fn render_state(&mut self, counting: Option<(AlarmTime, String)>) {
        let counting = counting.or_else(|| match self.alarm.evaluate(self.clock.now()) {
            Evaluation::Counting {
                target, remaining, ..
            } => Some((target, remaining)),
            _ => None,
        });
        let stats = self.stats_today();
        let (alarm_time, remaining) = match counting {
            Some((t, r)) => (Some(t), Some(r)),
            None => (None, None),
        };
        self.view.push(&ViewUpdate::State(StateUpdate {
            alarm_time,
            remaining,
            stats: Some(stats),
        }));
    }

    fn render_sound(&mut self) {
        let pref = self.sound_preference();
        self.view.push(&ViewUpdate::Sound(SoundUpdate {
            sound_enabled: pref.sound_enabled,
            selected_sound: pref.selected_sound,
        }));
    }

    fn persist(&self, what: &str, result: Result<(), StoreError>) {
        if let Err(e) = result {
            tracing::warn!(key = what, error = %e, "store write failed");
        }
    }
}

fn positive_minutes(field: &str, minutes: u32) -> Result<u32, ValidationError> {
    if minutes == 0 {
        return Err(ValidationError::invalid(field, "minutes must be a positive integer"));
    }
    Ok(minutes)
}

fn status_text(remaining: &str) -> String {
    format!("⏰ {remaining}")
}
