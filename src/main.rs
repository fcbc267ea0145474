/// Main entry point for the habit statistics MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use habit_stats_server::{HabitTrackerServer, StatsEngine, WeeklyCompletionPolicy};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|mut p| {
            p.push(".habit_stats");
            p
        }),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("habit_stats");
            p
        }),
        // 3. User's config directory
        dirs::config_dir().map(|mut p| {
            p.push("habit_stats");
            p
        }),
        // 4. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_stats");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_stats");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// How weekly habits are credited in statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WeeklyPolicy {
    /// Every completed date counts
    RawCount,
    /// At most one completion per 7-day bucket counts
    DistinctWeeks,
}

impl From<WeeklyPolicy> for WeeklyCompletionPolicy {
    fn from(policy: WeeklyPolicy) -> Self {
        match policy {
            WeeklyPolicy::RawCount => WeeklyCompletionPolicy::RawCount,
            WeeklyPolicy::DistinctWeeks => WeeklyCompletionPolicy::DistinctWeeks,
        }
    }
}

/// Command line arguments for the habit statistics MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "HABIT_STATS_DB")]
    database: Option<PathBuf>,

    /// Crediting policy for weekly habits
    #[arg(long, env = "HABIT_STATS_WEEKLY_POLICY", value_enum, default_value_t = WeeklyPolicy::RawCount)]
    weekly_policy: WeeklyPolicy,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    // RUST_LOG wins over the command line flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("habit_stats_server={}", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // stdout carries the protocol
        .init();

    info!("Starting habit stats MCP server");

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let engine = StatsEngine::new(args.weekly_policy.into());
    let server = HabitTrackerServer::new(db_path, engine).await?;

    server.run().await?;

    info!("Habit stats MCP server shutdown complete");
    Ok(())
}
