//! Commits-today via `git rev-list`.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use super::CommitSource;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Counts commits on `HEAD` made since local midnight.
#[derive(Debug, Clone)]
pub struct GitCommitCounter {
    repo: Option<PathBuf>,
    timeout: Duration,
}

impl GitCommitCounter {
    /// `repo` of `None` means the current directory.
    pub fn new(repo: Option<PathBuf>, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    fn run_git(&self, args: &[String]) -> io::Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(repo) = &self.repo {
            cmd.current_dir(repo);
        }
        let mut child = cmd.spawn()?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("git did not answer within {:?}", self.timeout),
                ));
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(io::Error::other(format!("git exited with {status}")));
        }
        let mut out = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_string(&mut out)?;
        }
        Ok(out)
    }
}

impl CommitSource for GitCommitCounter {
    fn commits_on(&mut self, date: NaiveDate) -> io::Result<u32> {
        let since = format!("--since={} 00:00:00", date.format("%Y-%m-%d"));
        let args = ["rev-list".to_string(), "--count".to_string(), since, "HEAD".to_string()];
        let out = self.run_git(&args)?;
        out.trim()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("'{}': {e}", out.trim())))
    }
}
