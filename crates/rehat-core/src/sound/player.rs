use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{PlayMode, SoundFile, SoundPlayer};

const LOOP_POLL: Duration = Duration::from_millis(50);
const FILE_PLACEHOLDER: &str = "{file}";

/// Command line used to play one sound file once.
///
/// `{file}` in any argument is replaced with the sound path; without a
/// placeholder the path is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PlayerCommand {
    /// Split a configured command line on whitespace.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Best guess for the current platform.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self {
                program: "afplay".into(),
                args: Vec::new(),
            }
        } else if cfg!(windows) {
            Self {
                program: "powershell".into(),
                args: vec![
                    "-NoProfile".into(),
                    "-Command".into(),
                    format!("(New-Object Media.SoundPlayer '{FILE_PLACEHOLDER}').PlaySync()"),
                ],
            }
        } else {
            Self {
                program: "paplay".into(),
                args: Vec::new(),
            }
        }
    }

    fn spawn(&self, file: &Path) -> io::Result<Child> {
        let file = file.to_string_lossy();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(FILE_PLACEHOLDER, &file))
            .collect();
        if !self.args.iter().any(|a| a.contains(FILE_PLACEHOLDER)) {
            args.push(file.into_owned());
        }
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
    }
}

/// The single live playback.
struct Playback {
    stop: Arc<AtomicBool>,
    child: Arc<Mutex<Option<Child>>>,
    /// Respawns the player for looping playback; `None` for one-shot.
    worker: Option<JoinHandle<()>>,
}

impl Playback {
    fn is_alive(&self) -> bool {
        if self.worker.as_ref().is_some_and(|w| !w.is_finished()) {
            return true;
        }
        let mut guard = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn terminate(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        {
            let mut guard = self.child.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(mut child) = guard.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Plays sounds by spawning an external player process.
///
/// Looping is done by a worker thread that respawns the player whenever the
/// previous run exits, until [`SoundPlayer::stop`] is called. Dropping the
/// player stops playback, so no audio process outlives its owner.
pub struct ProcessSoundPlayer {
    command: PlayerCommand,
    sounds_dir: PathBuf,
    active: Option<Playback>,
}

impl ProcessSoundPlayer {
    pub fn new(command: PlayerCommand, sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            sounds_dir: sounds_dir.into(),
            active: None,
        }
    }

    pub fn sound_path(&self, sound: SoundFile) -> PathBuf {
        self.sounds_dir.join(sound.file_name())
    }
}

impl SoundPlayer for ProcessSoundPlayer {
    fn play(&mut self, sound: SoundFile, mode: PlayMode) -> io::Result<()> {
        self.stop();

        let path = self.sound_path(sound);
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("sound file {} not found", path.display()),
            ));
        }

        let first = self.command.spawn(&path)?;
        tracing::debug!(sound = %sound, ?mode, pid = first.id(), "sound started");

        let stop = Arc::new(AtomicBool::new(false));
        let child = Arc::new(Mutex::new(Some(first)));
        let worker = match mode {
            PlayMode::Once => None,
            PlayMode::Loop => {
                let stop = Arc::clone(&stop);
                let child = Arc::clone(&child);
                let command = self.command.clone();
                Some(thread::spawn(move || loop_worker(&command, &path, &stop, &child)))
            }
        };

        self.active = Some(Playback {
            stop,
            child,
            worker,
        });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(playback) = self.active.take() {
            playback.terminate();
            tracing::debug!("sound stopped");
        }
    }

    fn is_playing(&mut self) -> bool {
        self.active.as_ref().is_some_and(Playback::is_alive)
    }
}

impl Drop for ProcessSoundPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn loop_worker(
    command: &PlayerCommand,
    path: &Path,
    stop: &AtomicBool,
    child: &Mutex<Option<Child>>,
) {
    while !stop.load(Ordering::SeqCst) {
        {
            let mut guard = child.lock().unwrap_or_else(PoisonError::into_inner);
            let finished = match guard.as_mut() {
                Some(c) => !matches!(c.try_wait(), Ok(None)),
                None => return,
            };
            if finished && !stop.load(Ordering::SeqCst) {
                match command.spawn(path) {
                    Ok(next) => *guard = Some(next),
                    Err(e) => {
                        tracing::warn!(error = %e, "sound loop could not respawn player");
                        *guard = None;
                        return;
                    }
                }
            }
        }
        thread::sleep(LOOP_POLL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_line() {
        let cmd = PlayerCommand::parse("aplay -q").unwrap();
        assert_eq!(cmd.program, "aplay");
        assert_eq!(cmd.args, vec!["-q".to_string()]);
        assert!(PlayerCommand::parse("   ").is_none());
    }

    #[test]
    fn missing_file_is_an_error_and_nothing_plays() {
        let dir = tempfile::tempdir().unwrap();
        let mut player = ProcessSoundPlayer::new(PlayerCommand::platform_default(), dir.path());
        let err = player.play(SoundFile::Alarm1, PlayMode::Loop).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!player.is_playing());
    }

    #[test]
    fn unknown_player_program_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alarm1.wav"), b"RIFF").unwrap();
        let mut player = ProcessSoundPlayer::new(
            PlayerCommand::parse("rehat-no-such-player-binary").unwrap(),
            dir.path(),
        );
        assert!(player.play(SoundFile::Alarm1, PlayMode::Once).is_err());
        assert!(!player.is_playing());
    }

    #[cfg(unix)]
    #[test]
    fn loop_keeps_playing_until_stopped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alarm2.wav"), b"RIFF").unwrap();
        // `true` exits immediately, so the worker has to keep respawning it.
        let mut player = ProcessSoundPlayer::new(PlayerCommand::parse("true").unwrap(), dir.path());
        player.play(SoundFile::Alarm2, PlayMode::Loop).unwrap();
        thread::sleep(Duration::from_millis(200));
        assert!(player.is_playing());
        player.stop();
        assert!(!player.is_playing());
    }

    #[cfg(unix)]
    #[test]
    fn starting_again_replaces_previous_playback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alarm1.wav"), b"RIFF").unwrap();
        // The `#` keeps the substituted path out of the sleep arguments.
        let mut player = ProcessSoundPlayer::new(
            PlayerCommand {
                program: "sh".into(),
                args: vec!["-c".into(), "sleep 5 # {file}".into()],
            },
            dir.path(),
        );
        player.play(SoundFile::Alarm1, PlayMode::Loop).unwrap();
        let first = Arc::clone(&player.active.as_ref().unwrap().child);
        player.play(SoundFile::Alarm1, PlayMode::Once).unwrap();
        assert!(first.lock().unwrap().is_none());
        assert!(player.is_playing());
        drop(player);
    }
}
