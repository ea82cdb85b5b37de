use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use price_catalog::app::StageSummary;
use price_catalog::catalog::Catalog;
use price_catalog::config::{PipelineConfig, StoreProfiles};
use price_catalog::pipeline::Pipeline;
use price_catalog::{constants, logging, metrics, server};

#[derive(Parser)]
#[command(name = "price_catalog")]
#[command(about = "Cross-retailer grocery price catalog pipeline")]
#[command(version)]
struct Cli {
    /// Directory holding store exports and pipeline tables
    #[arg(long, global = true, env = constants::DATA_DIR_ENV, default_value = constants::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// TOML file with [[store]] profiles; the built-in retailers are used when omitted
    #[arg(long, global = true)]
    stores: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every store export into consolidated_items.csv
    Consolidate,
    /// Clean text and standardize quantities into normalized_items.csv
    Normalize,
    /// Assign shared product ids into matched_items_v1.csv
    Match,
    /// Run consolidate, normalize and match in order
    Run,
    /// Serve the catalog over HTTP
    Serve {
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
}

fn print_summaries(summaries: &[StageSummary]) {
    for summary in summaries {
        println!(
            "{:<12} in={:<6} out={:<6} dropped={:<6} {} sha256={}",
            summary.stage,
            summary.rows_in,
            summary.rows_out,
            summary.rows_dropped,
            summary.output.display(),
            summary.sha256
        );
    }
}

fn load_profiles(path: Option<&PathBuf>) -> anyhow::Result<StoreProfiles> {
    match path {
        Some(path) => StoreProfiles::load(path)
            .with_context(|| format!("invalid store configuration {}", path.display())),
        None => Ok(StoreProfiles::builtin()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging();
    if metrics::init_metrics().is_none() {
        warn!("continuing without a metrics recorder");
    }

    let cli = Cli::parse();
    let config = PipelineConfig::new(cli.data_dir);
    let profiles = load_profiles(cli.stores.as_ref())?;
    info!(data_dir = %config.data_dir.display(), stores = profiles.len(), "configuration loaded");

    let pipeline = Pipeline::new(config, profiles);
    match cli.command {
        Commands::Consolidate => print_summaries(&[pipeline.consolidate()?]),
        Commands::Normalize => print_summaries(&[pipeline.normalize()?]),
        Commands::Match => print_summaries(&[pipeline.match_items()?]),
        Commands::Run => print_summaries(&pipeline.run_all()?),
        Commands::Serve { port } => {
            let catalog = Catalog::load_from(pipeline.config())?;
            server::start_server(catalog, port).await?;
        }
    }

    Ok(())
}
