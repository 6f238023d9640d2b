use std::io::BufRead;
use std::sync::mpsc::{self, Sender};
use std::thread;

use rehat_core::runtime;
use rehat_core::{Command, Config, Event, ProcessSoundPlayer};

use super::{open_context, CmdResult};
use crate::input::{parse_line, Input, HELP};
use crate::terminal::{clear_status_line, print_json, Output, TerminalNotifier, TerminalView};

pub fn run(json: bool) -> CmdResult {
    let config = Config::load()?;
    let output = Output::from_flag(json);

    let mut ctx = open_context(&config)?
        .with_sound_player(ProcessSoundPlayer::new(
            config.player_command(),
            config.sounds_dir(),
        ))
        .with_notifier(TerminalNotifier::new(output, config.notifications.desktop))
        .with_view(TerminalView::new(output));

    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone(), ctx.snooze_minutes(), output);
    spawn_ctrl_c_listener(tx);

    if output == Output::Text {
        println!("{HELP}");
    }
    ctx.attach();
    for event in ctx.restore() {
        report(&event, output);
    }

    let exit = runtime::run(&mut ctx, &rx, |event| report(event, output));
    if output == Output::Text {
        clear_status_line();
    }
    tracing::debug!(?exit, "session ended");
    Ok(())
}

fn report(event: &Event, output: Output) {
    match output {
        Output::Json => print_json(event),
        Output::Text => match event {
            Event::AlarmRestored { alarm_time, .. } => {
                clear_status_line();
                println!("⏰ Restored alarm for {alarm_time}");
            }
            Event::AlarmExpired { alarm_time, .. } => {
                clear_status_line();
                println!("⌛ The {alarm_time} alarm was missed and has been cleared");
            }
            _ => {}
        },
    }
}

/// Forwards parsed stdin lines. End of input leaves the session running;
/// only `quit` or Ctrl-C end it.
fn spawn_stdin_reader(tx: Sender<Command>, snooze_minutes: u32, output: Output) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    return;
                }
            };
            match parse_line(&line, snooze_minutes) {
                Ok(None) => {}
                Ok(Some(Input::Command(command))) => {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
                Ok(Some(Input::Help)) => println!("{HELP}"),
                Ok(Some(Input::Quit)) => {
                    let _ = tx.send(Command::Shutdown);
                    return;
                }
                Err(message) => match output {
                    Output::Text => {
                        clear_status_line();
                        println!("{message}");
                    }
                    Output::Json => {
                        print_json(&serde_json::json!({ "type": "InputError", "message": message }))
                    }
                },
            }
        }
    });
}

fn spawn_ctrl_c_listener(tx: Sender<Command>) {
    thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::warn!(error = %e, "no Ctrl-C handling");
                return;
            }
        };
        if rt.block_on(tokio::signal::ctrl_c()).is_ok() {
            let _ = tx.send(Command::Shutdown);
        }
    });
}
