mod catalog;
mod categorizer;
mod cli;
mod credentials;
mod cursor;
mod dates;
mod db;
mod error;
mod fmt;
mod models;
mod plaid;
mod query;
mod reviewer;
mod settings;
mod source;
mod store;
mod sync;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, Context};
use error::Result;

fn main() {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    match dotenv::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("unable to load .env: {e}"),
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = settings::load_settings()?;
    let ctx = Context::new(cli.data_dir.as_deref(), settings);

    match cli.command {
        Commands::Init => cli::init::run(&ctx, cli.data_dir.is_some()),
        Commands::Sync {
            get_all,
            force,
            filter_by,
        } => cli::sync::run(&ctx, get_all, force, filter_by),
        Commands::Get {
            category,
            filter_by,
            dates,
        } => cli::get::run(&ctx, category.as_deref(), filter_by, &dates),
        Commands::Categorize {
            force,
            filter_by,
            dates,
        } => cli::categorize::run(&ctx, force, filter_by, &dates),
        Commands::Summary { filter_by, dates } => cli::summary::run(&ctx, filter_by, &dates),
    }
}

pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // Without RUST_LOG only tally's own messages are shown.
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_CRATE_NAME"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
