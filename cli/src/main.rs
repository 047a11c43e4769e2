mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripweather_core::{
    data_dir, CityCatalog, DaytimeAnalyzer, FileSummaryStore, ForecastPipeline,
    HttpForecastSource, PipelineConfig, SummaryStore,
};

#[derive(Parser)]
#[command(name = "tripweather")]
#[command(about = "Finds the city with the best travel weather", long_about = None)]
struct Cli {
    /// Directory holding standings.json (default: ~/.tripweather)
    #[arg(long, global = true, env = "TRIPWEATHER_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// JSON file mapping city names to forecast URLs
    #[arg(long, global = true, env = "TRIPWEATHER_CATALOG")]
    catalog: Option<PathBuf>,
    /// TOML file with worker pool sizes, timeouts and retry settings
    #[arg(long, global = true, env = "TRIPWEATHER_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Fetch forecasts, update the standings and print the best cities
    Run {
        /// Forget standings from earlier runs first
        #[arg(long)]
        fresh: bool,
    },
    /// Show the stored standings
    Standings,
    /// List the cities that will be forecast
    Cities,
    /// Clear the stored standings
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripweather=info,tripweather_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let catalog = match &cli.catalog {
        Some(path) => CityCatalog::from_file(path)?,
        None => CityCatalog::default(),
    };
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    let dir = data_dir(cli.data_dir.clone())?;
    let store = Arc::new(
        FileSummaryStore::new(&dir)
            .with_context(|| format!("Could not open standings in {}", dir.display()))?,
    );

    match cli.command.unwrap_or(Commands::Run { fresh: false }) {
        Commands::Run { fresh } => {
            if fresh {
                store.reset().context("Could not reset standings")?;
            }
            run(store, catalog, config).await?;
        }
        Commands::Standings => {
            let standings = store.get_all().context("Could not read standings")?;
            report::show_standings(&standings);
        }
        Commands::Cities => {
            report::show_catalog(&catalog);
        }
        Commands::Reset => {
            store.reset().context("Could not reset standings")?;
            println!("Standings cleared: {}", store.path().display());
        }
    }
    Ok(())
}

async fn run(store: Arc<FileSummaryStore>, catalog: CityCatalog, config: PipelineConfig) -> Result<()> {
    let source = HttpForecastSource::new(config.fetch_timeout())
        .context("Could not build HTTP client")?;
    let pipeline = ForecastPipeline::new(
        Arc::new(source),
        Arc::new(DaytimeAnalyzer::default()),
        store,
        config,
    );

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_ctrl_c.cancel();
        }
    });

    let report = pipeline
        .run(&catalog, &cancel)
        .await
        .context("Forecast run failed")?;
    report::show_report(&report);
    Ok(())
}
