use std::thread;
use std::time::Duration;

use clap::Subcommand;
use rehat_core::sound::install_default_sounds;
use rehat_core::{Command, Config, PlayMode, ProcessSoundPlayer, SoundFile, SoundPlayer};

use super::{open_context, CmdResult};
use crate::terminal::{Output, TerminalView};

#[derive(Subcommand)]
pub enum SoundAction {
    /// Play the alarm sound when the alarm rings
    On,
    /// Keep the alarm silent
    Off,
    /// Pick the alarm sound
    Set {
        /// alarm1, alarm2 or alarm3 (".wav" optional)
        sound: SoundFile,
    },
    /// Play the selected sound once
    Preview,
    /// Print the sound preference
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Write the default alarm sounds into the sounds directory
    Install {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

pub fn run(action: SoundAction) -> CmdResult {
    let config = Config::load()?;

    match action {
        SoundAction::On => change(&config, Command::ToggleSound(true))?,
        SoundAction::Off => change(&config, Command::ToggleSound(false))?,
        SoundAction::Set { sound } => change(&config, Command::SetSound(sound))?,
        SoundAction::Preview => {
            let ctx = open_context(&config)?;
            let sound = ctx.sound_preference().selected_sound;
            let mut player = ProcessSoundPlayer::new(config.player_command(), config.sounds_dir());
            player.play(sound, PlayMode::Once).map_err(|e| {
                format!("{e} (run `rehat sound install` to create the default sounds)")
            })?;
            // Dropping the player would cut the preview short.
            while player.is_playing() {
                thread::sleep(Duration::from_millis(50));
            }
        }
        SoundAction::Status { json } => {
            let pref = open_context(&config)?.sound_preference();
            if json {
                println!("{}", serde_json::to_string_pretty(&pref)?);
            } else {
                let state = if pref.sound_enabled { "on" } else { "off" };
                println!("Sound {state} ({})", pref.selected_sound);
            }
        }
        SoundAction::Install { force } => {
            let dir = config.sounds_dir();
            let written = install_default_sounds(&dir, force)?;
            if written.is_empty() {
                println!("sounds already present in {}", dir.display());
            }
            for sound in written {
                println!("wrote {}", dir.join(sound.file_name()).display());
            }
        }
    }
    Ok(())
}

/// Apply a preference change and print the resulting preference.
fn change(config: &Config, command: Command) -> CmdResult {
    let mut ctx = open_context(config)?.with_view(TerminalView::new(Output::Text));
    ctx.handle(command)?;
    Ok(())
}
