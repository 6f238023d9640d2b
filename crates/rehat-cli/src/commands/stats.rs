use clap::Subcommand;
use rehat_core::stats::history;
use rehat_core::{Config, Database, StateStore, StatsAggregator};
use serde::Serialize;

use super::CmdResult;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's breaks, commits and tip
    Today {
        #[arg(long)]
        json: bool,
    },
    /// Breaks per day
    History {
        /// Number of days, ending today
        #[arg(long, default_value = "7")]
        days: u32,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayRow {
    date: String,
    break_count: u32,
}

pub fn run(action: StatsAction) -> CmdResult {
    let config = Config::load()?;
    let store = StateStore::new(Database::open()?);
    let today = chrono::Local::now().date_naive();

    match action {
        StatsAction::Today { json } => {
            let stats = StatsAggregator::from_config(&config.stats).collect(&store, today);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Breaks today:  {}", stats.break_count);
                println!("Commits today: {}", stats.commits_today);
                println!("Tip: {}", stats.tip);
            }
        }
        StatsAction::History { days, json } => {
            let rows: Vec<DayRow> = history(&store, today, days)?
                .into_iter()
                .map(|(date, break_count)| DayRow {
                    date: date.format("%Y-%m-%d").to_string(),
                    break_count,
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    let bar = "█".repeat(row.break_count.min(40) as usize);
                    println!("{}  {:>3} {bar}", row.date, row.break_count);
                }
            }
        }
    }
    Ok(())
}
