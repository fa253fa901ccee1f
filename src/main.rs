use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bibsane::{
    AbbrevisoClient, AbbrevisoConfig, Config, Verdict, discover_aux_files, process_all,
};

#[derive(Parser)]
#[command(name = "bibsane")]
#[command(author, version, about = "Sanitize the BibTeX bibliography of LaTeX documents", long_about = None)]
struct Cli {
    /// LaTeX aux files to process; defaults to every document below the current directory
    aux: Vec<PathBuf>,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.quiet, cli.verbose);

    let verdict = match run(cli).await {
        Ok(verdict) => verdict,
        Err(e) => {
            error!("{:#}", e);
            Verdict::Broken
        }
    };
    std::process::exit(verdict.exit_code());
}

fn setup_logging(quiet: bool, verbose: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (_, true) => "debug",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run(cli: Cli) -> Result<Verdict> {
    let config = Config::from_file(cli.config.as_deref()).context("Failed to load config")?;

    let aux_paths = if cli.aux.is_empty() {
        let cwd = std::env::current_dir().context("Cannot determine the current directory")?;
        let found = discover_aux_files(&cwd)?;
        info!("Found {} aux files below {:?}", found.len(), cwd);
        found
    } else {
        cli.aux
    };

    let client = AbbrevisoClient::new(AbbrevisoConfig::with_timeout(
        config.journal_lookup_timeout(),
    ))?;

    Ok(process_all(&aux_paths, &config, &client).await)
}
