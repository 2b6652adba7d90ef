use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

use veille_client::{HttpClassifier, JsonlStore, ReqwestFetcher};
use veille_core::assembler::OfferAssembler;
use veille_core::config::ScrapeConfig;
use veille_core::models::{BatchReport, NodeOutcome};
use veille_core::traits::{Classifier, NullClassifier, NullStore, OfferStore};

#[derive(Parser)]
#[command(name = "veille", version, about = "Job-offer harvesting pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest offers from a listing page
    Run {
        /// Listing page URL to harvest
        #[arg(short, long)]
        url: String,

        /// JSON config file overriding selectors/patterns
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output JSONL file for persisted offers
        #[arg(short, long, default_value = "offers.jsonl")]
        out: PathBuf,

        /// Categorization endpoint; offers get no tags when omitted
        #[arg(long, env = "VEILLE_CLASSIFIER_URL")]
        classifier_url: Option<String>,

        /// Worker-pool width (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Run the pipeline without persisting anything
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("veille=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            url,
            config,
            out,
            classifier_url,
            concurrency,
            dry_run,
        } => {
            Url::parse(&url).with_context(|| format!("Invalid listing URL: {url}"))?;

            let mut config = match config {
                Some(path) => ScrapeConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => ScrapeConfig::default(),
            };
            if let Some(n) = concurrency {
                config.concurrency = n;
            }

            let report = match (classifier_url.as_deref(), dry_run) {
                (Some(endpoint), true) => {
                    harvest(&config, &url, HttpClassifier::new(endpoint)?, NullStore).await?
                }
                (Some(endpoint), false) => {
                    harvest(
                        &config,
                        &url,
                        HttpClassifier::new(endpoint)?,
                        JsonlStore::open(&out)?,
                    )
                    .await?
                }
                (None, true) => harvest(&config, &url, NullClassifier, NullStore).await?,
                (None, false) => {
                    harvest(&config, &url, NullClassifier, JsonlStore::open(&out)?).await?
                }
            };

            print_report(&report, dry_run);
        }
    }

    Ok(())
}

async fn harvest<C: Classifier, S: OfferStore>(
    config: &ScrapeConfig,
    url: &str,
    classifier: C,
    store: S,
) -> Result<BatchReport> {
    tracing::info!(%url, concurrency = config.concurrency, "Harvesting listing");

    let fetcher = ReqwestFetcher::new().context("Failed to create HTTP client")?;
    let assembler = OfferAssembler::new(config, fetcher, classifier, store)
        .context("Invalid selector or pattern in config")?;
    let report = assembler.harvest(url).await?;

    tracing::info!(
        persisted = report.persisted(),
        skipped = report.skipped(),
        failed = report.failed(),
        "Harvest finished"
    );
    Ok(report)
}

fn print_report(report: &BatchReport, dry_run: bool) {
    for outcome in &report.outcomes {
        match outcome {
            NodeOutcome::Persisted { url } => println!("persisted  {url}"),
            NodeOutcome::Skipped { href, reason } => println!("skipped    {href} ({reason})"),
            NodeOutcome::Failed { url, error } => println!("failed     {url} ({error})"),
        }
    }

    println!(
        "\nTotal: {} persisted, {} skipped, {} failed",
        report.persisted(),
        report.skipped(),
        report.failed()
    );
    if dry_run {
        println!("(dry run: nothing was written)");
    }
}
