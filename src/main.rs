use anyhow::{Context, Result};
use std::env;
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use air_booking::{import_directory, run_menu, Config, LineConsole, Session, SqliteStore};

fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(&config);

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let dir = args.get(2).context("Usage: air-booking import <csv_dir>")?;
            run_import(&config, Path::new(dir))?;
        }
        Some("init") => run_init(&config)?,
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Usage: air-booking [init | import <csv_dir>]");
            std::process::exit(2);
        }
        // Console mode (default)
        None => run_console(&config)?,
    }

    Ok(())
}

/// Diagnostics go to stderr so the dialogue on stdout stays readable
fn init_logging(config: &Config) {
    let ansi = std::io::stderr().is_terminal() && env::var_os("NO_COLOR").is_none();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.database_path, config.busy_timeout)
        .with_context(|| format!("Unable to open database {:?}", config.database_path))
}

fn run_init(config: &Config) -> Result<()> {
    open_store(config)?;
    println!("✓ Schema ready in {}", config.database_path.display());
    Ok(())
}

fn run_import(config: &Config, dir: &Path) -> Result<()> {
    println!("📂 Importing seed data from {}", dir.display());

    let store = open_store(config)?;
    for summary in import_directory(&store, dir)? {
        println!("✓ {}", summary);
    }

    Ok(())
}

fn run_console(config: &Config) -> Result<()> {
    println!("Connecting to database {}...", config.database_path.display());
    let store = open_store(config)?;

    let mut session = Session::new(store, LineConsole::stdio()).with_retry(config.retry);
    run_menu(&mut session)?;

    println!("Disconnecting from database...Done\n\nBye !");
    Ok(())
}
