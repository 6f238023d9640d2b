//! Daily statistics: breaks taken, commits made, and a tip of the day.

mod git;

pub use git::GitCommitCounter;

use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::{StateStore, StatsConfig};

const BUILTIN_TIPS: &[&str] = &[
    "Look at something 20 feet away for 20 seconds.",
    "Stand up and stretch your back and shoulders.",
    "Drink a glass of water.",
    "Roll your wrists and open your hands wide.",
    "Take five slow, deep breaths.",
    "Walk around for a couple of minutes.",
    "Relax your jaw and drop your shoulders.",
];

/// What the view shows under the countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub break_count: u32,
    pub commits_today: u32,
    pub tip: String,
}

/// An external "commits made today" signal.
pub trait CommitSource {
    fn commits_on(&mut self, date: NaiveDate) -> std::io::Result<u32>;
}

#[derive(Debug, Clone, Copy)]
struct CachedCount {
    date: NaiveDate,
    value: u32,
    fetched: Instant,
}

pub struct StatsAggregator {
    source: Box<dyn CommitSource>,
    tips: Vec<String>,
    cache_ttl: Duration,
    cached: Option<CachedCount>,
}

impl StatsAggregator {
    pub fn new(source: impl CommitSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            tips: BUILTIN_TIPS.iter().map(|s| s.to_string()).collect(),
            cache_ttl: Duration::ZERO,
            cached: None,
        }
    }

    /// Git-backed aggregator with the configured repo, timeout, cache and tips.
    pub fn from_config(config: &StatsConfig) -> Self {
        let counter = GitCommitCounter::new(
            config.project_dir.clone(),
            Duration::from_millis(config.commit_query_timeout_ms),
        );
        Self::new(counter)
            .with_cache_ttl(Duration::from_secs(config.commit_cache_secs))
            .with_tips(config.tips.clone())
    }

    /// Replace the tip list. An empty list keeps the built-in tips.
    pub fn with_tips(mut self, tips: Vec<String>) -> Self {
        if !tips.is_empty() {
            self.tips = tips;
        }
        self
    }

    /// `Duration::ZERO` asks the source every time.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Never fails: any source error reads as zero commits.
    pub fn commits_on(&mut self, date: NaiveDate) -> u32 {
        if let Some(c) = self.cached {
            if c.date == date && c.fetched.elapsed() < self.cache_ttl {
                return c.value;
            }
        }
        let value = match self.source.commits_on(date) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "commit count unavailable");
                0
            }
        };
        self.cached = Some(CachedCount {
            date,
            value,
            fetched: Instant::now(),
        });
        value
    }

    /// Stable for a whole day, different the next.
    pub fn tip_for(&self, date: NaiveDate) -> &str {
        if self.tips.is_empty() {
            return "";
        }
        let epoch_day = i64::from(date.num_days_from_ce()) - i64::from(unix_epoch().num_days_from_ce());
        // Day index mod count, not floor(day / count) mod count: the tip changes daily.
        let idx = epoch_day.rem_euclid(self.tips.len() as i64) as usize;
        &self.tips[idx]
    }

    /// Stats for `date`. A store failure reads as zero breaks.
    pub fn collect(&mut self, store: &StateStore, date: NaiveDate) -> DailyStats {
        let break_count = store.break_count(date).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "break count unavailable");
            0
        });
        DailyStats {
            break_count,
            commits_today: self.commits_on(date),
            tip: self.tip_for(date).to_string(),
        }
    }
}

pub fn breaks_on(store: &StateStore, date: NaiveDate) -> Result<u32, StoreError> {
    store.break_count(date)
}

/// Break counts for the `days` days ending at `last`, oldest first.
pub fn history(
    store: &StateStore,
    last: NaiveDate,
    days: u32,
) -> Result<Vec<(NaiveDate, u32)>, StoreError> {
    let stats = store.break_stats()?;
    let out = (0..days)
        .rev()
        .filter_map(|back| last.checked_sub_days(chrono::Days::new(u64::from(back))))
        .map(|date| {
            let count = stats
                .get(&crate::storage::state::date_key(date))
                .copied()
                .unwrap_or(0);
            (date, count)
        })
        .collect();
    Ok(out)
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;

    struct Counting {
        calls: Rc<Cell<u32>>,
        value: u32,
    }

    impl CommitSource for Counting {
        fn commits_on(&mut self, _date: NaiveDate) -> io::Result<u32> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.value)
        }
    }

    struct Broken;

    impl CommitSource for Broken {
        fn commits_on(&mut self, _date: NaiveDate) -> io::Result<u32> {
            Err(io::Error::new(io::ErrorKind::TimedOut, "too slow"))
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn failing_source_reads_as_zero() {
        let mut agg = StatsAggregator::new(Broken);
        assert_eq!(agg.commits_on(day(2024, 6, 10)), 0);
    }

    #[test]
    fn cache_is_reused_within_a_day() {
        let calls = Rc::new(Cell::new(0));
        let mut agg = StatsAggregator::new(Counting {
            calls: calls.clone(),
            value: 4,
        })
        .with_cache_ttl(Duration::from_secs(3600));

        assert_eq!(agg.commits_on(day(2024, 6, 10)), 4);
        assert_eq!(agg.commits_on(day(2024, 6, 10)), 4);
        assert_eq!(calls.get(), 1);

        agg.commits_on(day(2024, 6, 11));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn zero_ttl_disables_cache() {
        let calls = Rc::new(Cell::new(0));
        let mut agg = StatsAggregator::new(Counting {
            calls: calls.clone(),
            value: 1,
        });
        agg.commits_on(day(2024, 6, 10));
        agg.commits_on(day(2024, 6, 10));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn tip_is_stable_per_day_and_rotates() {
        let agg = StatsAggregator::new(Broken).with_tips(vec!["a".into(), "b".into(), "c".into()]);
        // 1970-01-01 is epoch day 0.
        assert_eq!(agg.tip_for(day(1970, 1, 1)), "a");
        assert_eq!(agg.tip_for(day(1970, 1, 2)), "b");
        assert_eq!(agg.tip_for(day(1970, 1, 4)), "a");
        assert_eq!(agg.tip_for(day(1969, 12, 31)), "c");

        let today = day(2024, 6, 10);
        assert_eq!(agg.tip_for(today), agg.tip_for(today));
        assert_ne!(agg.tip_for(today), agg.tip_for(today.succ_opt().unwrap()));
    }

    #[test]
    fn empty_tip_override_keeps_builtins() {
        let agg = StatsAggregator::new(Broken).with_tips(Vec::new());
        assert!(!agg.tip_for(day(2024, 6, 10)).is_empty());
    }

    #[test]
    fn collect_combines_sources() {
        let store = StateStore::new(Database::open_memory().unwrap());
        let today = day(2024, 6, 10);
        store.increment_breaks(today).unwrap();
        store.increment_breaks(today).unwrap();

        let mut agg = StatsAggregator::new(Counting {
            calls: Rc::new(Cell::new(0)),
            value: 7,
        })
        .with_tips(vec!["Stretch".into()]);
        let stats = agg.collect(&store, today);
        assert_eq!(
            stats,
            DailyStats {
                break_count: 2,
                commits_today: 7,
                tip: "Stretch".into()
            }
        );
    }

    #[test]
    fn history_fills_missing_days() {
        let store = StateStore::new(Database::open_memory().unwrap());
        store.increment_breaks(day(2024, 6, 8)).unwrap();
        store.increment_breaks(day(2024, 6, 10)).unwrap();
        store.increment_breaks(day(2024, 6, 10)).unwrap();

        let h = history(&store, day(2024, 6, 10), 3).unwrap();
        assert_eq!(
            h,
            vec![(day(2024, 6, 8), 1), (day(2024, 6, 9), 0), (day(2024, 6, 10), 2)]
        );
        assert_eq!(breaks_on(&store, day(2024, 6, 9)).unwrap(), 0);
        assert!(history(&store, day(2024, 6, 10), 0).unwrap().is_empty());
    }
}
