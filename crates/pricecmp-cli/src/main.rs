mod compare;
mod sites;

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use pricecmp_core::ScoringWeights;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricecmp-cli")]
#[command(about = "Compare product listings across e-commerce sites")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every site for a product and rank the listings
    Compare(CompareArgs),
    /// List configured sites, categories and popular queries
    Sites,
}

#[derive(Debug, Args)]
struct CompareArgs {
    /// Product to search for (e.g. "iPhone 15")
    query: String,
    /// Listings to take from each site (defaults to `PRICECMP_DEFAULT_RESULTS`)
    #[arg(long)]
    num: Option<usize>,
    /// Restrict to these site domains; repeat or comma-separate
    #[arg(long = "site", value_delimiter = ',')]
    sites: Vec<String>,
    /// Category appended to the search terms (e.g. smartphones)
    #[arg(long)]
    category: Option<String>,
    /// Scoring weights as price,rating,reviews (e.g. 0.5,0.3,0.2)
    #[arg(long)]
    weights: Option<ScoringWeights>,
    /// Drop listings that carry no rating instead of scoring them as 0
    #[arg(long)]
    strict_rating: bool,
    /// Read listings from a JSON fixture file instead of the search API
    #[arg(long)]
    fixture: Option<PathBuf>,
    /// Print the full comparison as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = pricecmp_core::load_app_config_from_env()?;
    // Logs go to stderr so `--json` output stays machine-readable.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Compare(args)) => compare::run_compare(config, args).await?,
        Some(Commands::Sites) => sites::run_sites(&config)?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}
