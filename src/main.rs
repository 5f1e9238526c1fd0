//! Command line entry point for rebuilding a ladder
//!
//! Reads already-parsed game results, recomputes every rating with the
//! configured rating system and prints the resulting standings.

use anyhow::{Context, Result};
use clap::Parser;
use ladder_ratings::config::AppConfig;
use ladder_ratings::{
    AccountDirectory, Game, InMemoryRatingStore, Ladder, LadderRatingSystem, LadderSnapshot,
    RatingSystemKind,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Ladder Ratings - recompute a 1v1 ladder from its game history
#[derive(Parser)]
#[command(
    name = "ladder-ratings",
    version,
    about = "Recompute ladder ratings from a chronological list of 1v1 game results",
    long_about = "Ladder Ratings rebuilds a competitive 1v1 ladder from scratch: it resolves \
                 game participants to accounts, rates every game with Elo, Glicko-2 or \
                 TrueSkill, and prints the resulting standings."
)]
struct Args {
    /// Game results (JSON array of {winner, loser, start_time, end_time})
    #[arg(value_name = "GAMES")]
    games: PathBuf,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Account directory (JSON object mapping participant to {profile_id, name})
    #[arg(short, long, value_name = "FILE")]
    accounts: Option<PathBuf>,

    /// Rating system override
    #[arg(short, long, value_name = "SYSTEM", help = "Rating system (elo, glicko2, trueskill)")]
    system: Option<RatingSystemKind>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Print the whole snapshot as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Number of standings to print
    #[arg(long, value_name = "N")]
    top: Option<usize>,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without rating games")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(system) = args.system {
        config.rating.system = system;
    }

    ladder_ratings::config::validate_config(&config)?;
    Ok(config)
}

fn read_games(path: &Path) -> Result<Vec<Game<String>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read games file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid games file {}", path.display()))
}

fn read_accounts(path: &Path) -> Result<AccountDirectory> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read accounts file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid accounts file {}", path.display()))
}

fn print_standings(snapshot: &LadderSnapshot, top: Option<usize>) {
    println!(
        "{:>4}  {:<24} {:>7} {:>6} {:>5} {:>5}",
        "#", "Player", "Rating", "Delta", "W", "L"
    );
    let limit = top.unwrap_or(snapshot.standings.len());
    for (rank, standing) in snapshot.standings.iter().take(limit).enumerate() {
        println!(
            "{:>4}  {:<24} {:>7} {:>+6} {:>5} {:>5}",
            rank + 1,
            standing.name,
            standing.rating,
            standing.rating - standing.previous_rating,
            standing.wins,
            standing.losses
        );
    }
    println!(
        "{} games rated with {}, {} skipped",
        snapshot.outcomes.len(),
        snapshot.system,
        snapshot.skipped_games
    );
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let system = LadderRatingSystem::from_config(&config.rating)?;

    let games = read_games(&args.games)?;
    let accounts = match &args.accounts {
        Some(path) => read_accounts(path)?,
        None => AccountDirectory::from_participants(
            games.iter().flat_map(|game| [&game.side_a, &game.side_b]),
        ),
    };
    info!(
        "Loaded {} games and {} accounts",
        games.len(),
        accounts.len()
    );

    let ladder = Ladder::new(system, Arc::new(InMemoryRatingStore::new()));
    let snapshot = ladder.rebuild(&games, &accounts)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_standings(&snapshot, args.top);
    }

    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!(
            "Configuration for {} is valid ({} rating system)",
            config.service.name, config.rating.system
        );
        return Ok(());
    }

    if let Err(e) = run(&args, &config) {
        error!("Ladder rebuild failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
