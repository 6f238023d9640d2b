use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod terminal;

#[derive(Parser)]
#[command(name = "rehat", version, about = "Rehat break-reminder timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: counts down, rings, and takes commands on stdin
    Run {
        /// Emit view updates and events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Alarm control
    Alarm {
        #[command(subcommand)]
        action: commands::alarm::AlarmAction,
    },
    /// Alarm sound preference and playback
    Sound {
        #[command(subcommand)]
        action: commands::sound::SoundAction,
    },
    /// Break statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Show a test break notification
    Test,
}

fn main() {
    // Logs go to stderr so stdout stays machine-readable with --json.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { json } => commands::run::run(json),
        Commands::Alarm { action } => commands::alarm::run(action),
        Commands::Sound { action } => commands::sound::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Test => commands::test::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
