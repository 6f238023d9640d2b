//! Wall-clock sources.
//!
//! The scheduler works on local, naive wall-clock time: an alarm for `14:30`
//! means 14:30 on whatever the device clock says.

use std::cell::Cell;

use chrono::{Duration, Local, NaiveDateTime};

pub trait Clock {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// The device clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to. Used by tests and simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn manual_clock_advances() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(23, 59, 30)
            .unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::seconds(45));
        assert_eq!(
            clock.now(),
            NaiveDate::from_ymd_opt(2024, 3, 2)
                .unwrap()
                .and_hms_opt(0, 0, 15)
                .unwrap()
        );
    }
}
