//! Line commands accepted by `rehat run` on stdin.

use rehat_core::{AlarmResponse, AlarmTime, Command, SoundFile};

pub const HELP: &str = "\
commands:
  set HH:mm        arm the alarm
  preset N         arm for N minutes from now
  stop             stop the alarm
  snooze [N]       re-arm N minutes from now
  sound on|off     toggle the alarm sound
  sound alarmN     pick alarm1, alarm2 or alarm3
  preview          play the selected sound once
  status           redraw the current state
  quit             leave
while ringing: s (stop), z (snooze), d (dismiss)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Help,
    Quit,
}

/// Parse one stdin line. Blank lines yield `None`.
pub fn parse_line(line: &str, snooze_minutes: u32) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments for '{head}'"));
    }

    let input = match (head.to_ascii_lowercase().as_str(), arg) {
        ("set", Some(time)) => {
            let time: AlarmTime = time.parse().map_err(|e| format!("{e}"))?;
            Input::Command(Command::SetAlarm(time))
        }
        ("set", None) => return Err("usage: set HH:mm".into()),
        ("preset", Some(n)) => Input::Command(Command::SetPreset(minutes(n)?)),
        ("preset", None) => return Err("usage: preset N".into()),
        ("stop", None) => Input::Command(Command::StopAlarm),
        ("snooze", Some(n)) => Input::Command(Command::Snooze(minutes(n)?)),
        ("snooze", None) | ("z", None) => {
            Input::Command(Command::Respond(AlarmResponse::Snooze(snooze_minutes)))
        }
        ("s", None) => Input::Command(Command::Respond(AlarmResponse::Stop)),
        ("d", None) | ("dismiss", None) => Input::Command(Command::Respond(AlarmResponse::Dismiss)),
        ("sound", Some("on")) => Input::Command(Command::ToggleSound(true)),
        ("sound", Some("off")) => Input::Command(Command::ToggleSound(false)),
        ("sound", Some(file)) => {
            let sound: SoundFile = file.parse().map_err(|e| format!("{e}"))?;
            Input::Command(Command::SetSound(sound))
        }
        ("preview", None) => Input::Command(Command::PreviewSound),
        ("status", None) => Input::Command(Command::Refresh),
        ("help", None) | ("?", None) => Input::Help,
        ("quit", None) | ("q", None) | ("exit", None) => Input::Quit,
        (other, _) => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(input))
}

fn minutes(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{s}' is not a positive number of minutes")),
    }
}
