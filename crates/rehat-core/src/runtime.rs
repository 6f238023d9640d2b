//! The session loop.
//!
//! Owns nothing but the wait: commands are taken from a channel, and the
//! scheduler is ticked whenever its deadline passes. Everything runs on the
//! calling thread.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;

use crate::alarm::SchedulerContext;
use crate::command::Command;
use crate::events::Event;

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Shutdown,
    /// Every sender was dropped.
    Disconnected,
}

/// Drive `ctx` until a [`Command::Shutdown`] arrives or the channel closes.
///
/// Each produced event is passed to `on_event`. Rejected commands are logged
/// and the loop carries on. The context is shut down before returning.
pub fn run(
    ctx: &mut SchedulerContext,
    commands: &Receiver<Command>,
    mut on_event: impl FnMut(&Event),
) -> Exit {
    let exit = loop {
        let timeout = match ctx.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => ctx.tick_interval(),
        };

        match commands.recv_timeout(timeout) {
            Ok(Command::Shutdown) => break Exit::Shutdown,
            Ok(command) => match ctx.handle(command) {
                Ok(events) => events.iter().for_each(&mut on_event),
                Err(e) => tracing::warn!(?command, error = %e, "command rejected"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break Exit::Disconnected,
        }

        if ctx.next_deadline().is_some_and(|d| d <= Instant::now()) {
            ctx.tick().iter().for_each(&mut on_event);
        }
    };

    tracing::debug!(?exit, "session loop finished");
    ctx.shutdown();
    exit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::stats::{CommitSource, StatsAggregator};
    use crate::storage::{Config, Database, StateStore};
    use crate::view::{View, ViewUpdate};
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    struct NoCommits;

    impl CommitSource for NoCommits {
        fn commits_on(&mut self, _date: NaiveDate) -> std::io::Result<u32> {
            Ok(0)
        }
    }

    #[derive(Clone, Default)]
    struct CountingView(Rc<Cell<u32>>);

    impl View for CountingView {
        fn push(&mut self, update: &ViewUpdate) {
            if matches!(update, ViewUpdate::State(_)) {
                self.0.set(self.0.get() + 1);
            }
        }
    }

    fn context(view: CountingView) -> SchedulerContext {
        let mut config = Config::default();
        config.alarm.tick_interval_ms = 5;
        let now = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        SchedulerContext::new(
            StateStore::new(Database::open_memory().unwrap()),
            StatsAggregator::new(NoCommits),
            &config,
        )
        .with_clock(ManualClock::new(now))
        .with_view(view)
    }

    #[test]
    fn disconnect_ends_the_loop() {
        let mut ctx = context(CountingView::default());
        let (tx, rx) = mpsc::channel();
        tx.send(Command::SetAlarm("10:00".parse().unwrap())).unwrap();
        drop(tx);

        let mut events = Vec::new();
        let exit = run(&mut ctx, &rx, |e| events.push(e.clone()));

        assert_eq!(exit, Exit::Disconnected);
        assert!(matches!(events[0], Event::AlarmArmed { .. }));
        assert!(ctx.next_deadline().is_none());
        assert!(ctx.is_active());
    }

    #[test]
    fn ticks_until_shutdown() {
        let view = CountingView::default();
        let mut ctx = context(view.clone());
        let (tx, rx) = mpsc::channel();
        tx.send(Command::SetAlarm("10:00".parse().unwrap())).unwrap();
        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            let _ = tx.send(Command::Shutdown);
        });

        let exit = run(&mut ctx, &rx, |_| {});
        sender.join().unwrap();

        assert_eq!(exit, Exit::Shutdown);
        // One render from arming plus the periodic ones.
        assert!(view.0.get() > 2, "only {} renders", view.0.get());
    }

    #[test]
    fn rejected_command_keeps_running() {
        let mut ctx = context(CountingView::default());
        let (tx, rx) = mpsc::channel();
        tx.send(Command::Snooze(0)).unwrap();
        tx.send(Command::SetPreset(30)).unwrap();
        tx.send(Command::Shutdown).unwrap();

        let mut events = Vec::new();
        assert_eq!(run(&mut ctx, &rx, |e| events.push(e.clone())), Exit::Shutdown);
        assert_eq!(ctx.alarm().target(), Some("09:30".parse().unwrap()));
    }
}
