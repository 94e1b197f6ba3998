use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use rust_product_store::{menu, Dispatcher, Report, Session, SqliteConfig, SqliteSession};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the product database
    #[arg(long, env = "PRODUCT_STORE_DB")]
    database: Option<String>,

    /// TOML file with a [database] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a throwaway in-memory database
    #[arg(long, conflicts_with = "database")]
    memory: bool,
}

// The console already shows every report; RUST_LOG turns on the log stream.
const DEFAULT_LOG_FILTER: &str = "off";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let cli = Cli::parse();
    let config = SqliteConfig::resolve(cli.config.as_deref(), cli.database, cli.memory)
        .context("failed to load configuration")?;

    let mut session = SqliteSession::new(config);
    let connected = session.connect();
    let mut dispatcher = Dispatcher::new(session);

    let run = match connected {
        Ok(()) => {
            println!("Database connection established. AutoCommit set to false.");
            menu::run(&mut dispatcher, io::stdin().lock(), io::stdout().lock())
                .context("console I/O failed")
        }
        Err(error) => {
            let report = Report::connection(&error);
            eprintln!("{report}");
            report.emit();
            Err(anyhow::Error::new(error).context("no operations were run"))
        }
    };

    let was_connected = dispatcher.executor().session().is_connected();
    match dispatcher.shutdown() {
        Ok(()) if was_connected => println!("\nDatabase connection closed."),
        Ok(()) => {}
        Err(error) => {
            let report = Report::close_failed(&error);
            eprintln!("{report}");
            report.emit();
        }
    }

    run
}
