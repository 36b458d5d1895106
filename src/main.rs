use anyhow::{Context, Result};
use cinecatalog::app::{App, Command};
use cinecatalog::config::CatalogConfig;
use cinecatalog::render::sanitize_terminal;
use clap::Parser;
use dotenvy::dotenv;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cinecatalog")]
#[command(about = "Browse and edit a remote movie catalog")]
struct Cli {
    /// Catalog endpoint; overrides CATALOG_API_URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = dotenv();
    init_tracing();
    match loaded {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let cli = Cli::parse();
    let mut config = CatalogConfig::from_env().context("Invalid catalog configuration")?;
    if let Some(url) = cli.base_url.as_deref() {
        config = config.with_base_url(url);
    }

    let mut app = App::from_config(&config)?;
    if !matches!(cli.command, Command::Status) {
        app.check_status().await;
    }

    let report = app.run(cli.command, confirm_on_stdin).await;
    for notification in &report.notifications {
        eprintln!("{}", sanitize_terminal(&notification.to_string()));
    }
    if let Some(output) = report.output {
        println!("{output}");
    }
    Ok(())
}
