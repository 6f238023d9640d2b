pub mod alarm;
pub mod config;
pub mod run;
pub mod sound;
pub mod stats;

use rehat_core::{Config, Database, SchedulerContext, StateStore, StatsAggregator};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Scheduler on the real store and git. Silent unless the caller attaches
/// a sound player.
pub fn open_context(config: &Config) -> Result<SchedulerContext, Box<dyn std::error::Error>> {
    let store = StateStore::new(Database::open()?);
    let stats = StatsAggregator::from_config(&config.stats);
    Ok(SchedulerContext::new(store, stats, config))
}
