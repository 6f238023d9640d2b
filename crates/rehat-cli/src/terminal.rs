//! Terminal renditions of the notifier and the view.
//!
//! Text mode keeps a live countdown on stderr and prints changes on stdout.
//! JSON mode prints one object per line on stdout and nothing else.

use std::io::Write;

use notify_rust::Notification;
use rehat_core::notify::AlarmPrompt;
use rehat_core::view::StateUpdate;
use rehat_core::{AlarmTime, DailyStats, Notifier, View, ViewUpdate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

impl Output {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Output::Json
        } else {
            Output::Text
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "could not serialize output"),
    }
}

/// Wipe the countdown line so the next stdout line starts clean.
pub fn clear_status_line() {
    eprint!("\r\x1b[2K");
    let _ = std::io::stderr().flush();
}

pub fn desktop_notify(body: &str) {
    if let Err(e) = Notification::new()
        .summary("Rehat")
        .body(body)
        .appname("rehat")
        .show()
    {
        tracing::debug!(error = %e, "desktop notification failed");
    }
}

pub struct TerminalNotifier {
    output: Output,
    desktop: bool,
    status_visible: bool,
}

impl TerminalNotifier {
    pub fn new(output: Output, desktop: bool) -> Self {
        Self {
            output,
            desktop,
            status_visible: false,
        }
    }

    fn before_line(&mut self) {
        if self.status_visible {
            clear_status_line();
        }
    }
}

impl Notifier for TerminalNotifier {
    fn info(&mut self, message: &str) {
        match self.output {
            Output::Text => {
                self.before_line();
                println!("{message}");
            }
            Output::Json => print_json(&serde_json::json!({ "type": "Info", "message": message })),
        }
    }

    fn present_alarm(&mut self, prompt: &AlarmPrompt) {
        match self.output {
            Output::Text => {
                self.before_line();
                let [stop, snooze] = prompt.choices();
                println!("{}", prompt.message);
                println!("  [s] {}   [z] {}", stop.0, snooze.0);
            }
            Output::Json => print_json(&serde_json::json!({ "type": "Prompt", "prompt": prompt })),
        }
        if self.desktop {
            desktop_notify(&prompt.message);
        }
    }

    fn set_status(&mut self, text: Option<&str>) {
        if self.output == Output::Json {
            return;
        }
        match text {
            Some(text) => {
                eprint!("\r\x1b[2K{text}");
                let _ = std::io::stderr().flush();
                self.status_visible = true;
            }
            None if self.status_visible => {
                clear_status_line();
                self.status_visible = false;
            }
            None => {}
        }
    }
}

/// Prints the view state. In text mode only changes are printed; a sound
/// update starts a full redraw.
pub struct TerminalView {
    output: Output,
    last: Option<(Option<AlarmTime>, Option<DailyStats>)>,
}

impl TerminalView {
    pub fn new(output: Output) -> Self {
        Self { output, last: None }
    }
}

impl View for TerminalView {
    fn push(&mut self, update: &ViewUpdate) {
        if self.output == Output::Json {
            print_json(update);
            return;
        }
        match update {
            ViewUpdate::Sound(sound) => {
                clear_status_line();
                let state = if sound.sound_enabled { "on" } else { "off" };
                println!("🔔 Sound {state} ({})", sound.selected_sound);
                self.last = None;
            }
            ViewUpdate::State(state) => {
                let key = (state.alarm_time, state.stats.clone());
                if self.last.as_ref() == Some(&key) {
                    return;
                }
                self.last = Some(key);
                clear_status_line();
                println!("{}", describe_state(state));
            }
        }
    }
}

pub fn describe_state(state: &StateUpdate) -> String {
    let mut line = match state.alarm_time {
        Some(t) => format!("⏰ Alarm set for {t}"),
        None => "No alarm set".to_string(),
    };
    if let Some(stats) = &state.stats {
        if stats.break_count > 0 || stats.commits_today > 0 {
            line.push_str(&format!(
                " · today: {} breaks, {} commits",
                stats.break_count, stats.commits_today
            ));
        }
        if !stats.tip.is_empty() {
            line.push_str(&format!(" · 💡 {}", stats.tip));
        }
    }
    line
}
