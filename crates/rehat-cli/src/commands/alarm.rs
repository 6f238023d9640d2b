use clap::Subcommand;
use rehat_core::{AlarmStatus, AlarmTime, Command, Config};

use super::{open_context, CmdResult};
use crate::terminal::{Output, TerminalNotifier};

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Arm the alarm for a time of day
    Set {
        /// Time as HH:mm (24-hour)
        time: AlarmTime,
    },
    /// Arm the alarm N minutes from now
    Preset {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        minutes: u32,
    },
    /// Stop the alarm
    Stop,
    /// Print the current alarm state
    Status {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: AlarmAction) -> CmdResult {
    let config = Config::load()?;
    let mut ctx = open_context(&config)?.with_notifier(TerminalNotifier::new(Output::Text, false));

    match action {
        AlarmAction::Set { time } => {
            ctx.handle(Command::SetAlarm(time))?;
        }
        AlarmAction::Preset { minutes } => {
            ctx.handle(Command::SetPreset(minutes))?;
        }
        AlarmAction::Stop => {
            ctx.handle(Command::StopAlarm)?;
        }
        AlarmAction::Status { json } => {
            ctx.load();
            let snapshot = ctx.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                let time = snapshot.alarm_time.map(|t| t.to_string()).unwrap_or_default();
                let remaining = snapshot.remaining.unwrap_or_default();
                match snapshot.status {
                    AlarmStatus::Idle => println!("No alarm set"),
                    AlarmStatus::Armed => println!("⏰ Alarm set for {time} ({remaining} left)"),
                    AlarmStatus::Triggered => println!("⏰ Alarm for {time} is ringing"),
                    AlarmStatus::Expired => println!("⌛ Alarm for {time} was missed"),
                }
            }
        }
    }

    ctx.shutdown();
    Ok(())
}
