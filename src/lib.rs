//! mealgate library root.
//! Exposes the CLI parser, the high-level run() function, and the engine modules.

pub mod attendance;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use utils::path::expand_to_string;

/// Structured diagnostics on stderr, filtered by `MEALGATE_LOG` (default: info).
pub fn init_log() {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("MEALGATE_LOG")
                .from_env_lossy(),
        )
        .try_init();
}

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli, cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Device { .. } => cli::commands::device::handle(&cli.command, cfg),
        Commands::Window { .. } => cli::commands::schedule::handle_window(&cli.command, cfg),
        Commands::Shift { .. } => cli::commands::schedule::handle_shift(&cli.command, cfg),
        Commands::Link { .. } => cli::commands::link::handle(&cli.command, cfg),
        Commands::Shards { .. } => cli::commands::shards::handle(&cli.command, cfg),
        Commands::Poll { .. } => cli::commands::poll::handle(&cli.command, cfg),
        Commands::Watch { .. } => cli::commands::watch::handle(&cli.command, cfg),
        Commands::Evaluate { .. } => cli::commands::evaluate::handle(&cli.command, cfg),
        Commands::Transactions { .. } => cli::commands::transactions::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // In test mode the user's config file is never read
    let mut cfg = if cli.test {
        Config::default()
    } else {
        Config::load()?
    };

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    if let Some(att) = &cli.attendance {
        cfg.attendance_database = att.clone();
    }

    cfg.database = expand_to_string(&cfg.database);
    cfg.attendance_database = expand_to_string(&cfg.attendance_database);
    cfg.validate()?;

    dispatch(&cli, &cfg)
}
