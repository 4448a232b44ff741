use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod classifier;
mod config;
mod db;
mod error;
mod feed;
mod jobs;
mod models;
mod sentiment;
mod server;

use config::Config;
use db::Repository;
use error::{AppError, Result};
use feed::NewsFetcher;
use jobs::{Backfiller, DailyTrigger, Ingestor, Scheduler};
use sentiment::Scorer;
use server::AppState;

enum Mode {
    Serve,
    Ingest,
    Backfill,
    Evaluate {
        positive: Option<PathBuf>,
        negative: Option<PathBuf>,
    },
}

fn parse_args(args: &[String]) -> Result<Mode> {
    match args.get(1).map(String::as_str) {
        None => Ok(Mode::Serve),
        Some("--ingest") => Ok(Mode::Ingest),
        Some("--backfill") => Ok(Mode::Backfill),
        Some("--evaluate") => Ok(Mode::Evaluate {
            positive: args.get(2).map(PathBuf::from),
            negative: args.get(3).map(PathBuf::from),
        }),
        Some(other) => Err(anyhow::anyhow!(
            "unknown argument '{}' (expected --ingest, --backfill or --evaluate)",
            other
        )
        .into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,good_news=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mode = parse_args(&args)?;
    let config = Config::load()?;

    match mode {
        Mode::Evaluate { positive, negative } => evaluate(&config, positive, negative)?,
        Mode::Ingest => {
            let repository = open_store(&config).await?;
            let ingestor = build_ingestor(&config, repository, Scorer::default())?;
            let stored = ingestor.ingest().await?;
            println!("Stored {} articles", stored);
        }
        Mode::Backfill => {
            let repository = open_store(&config).await?;
            let updated = Backfiller::new(repository, Scorer::default()).backfill().await?;
            println!("Scored {} articles", updated);
        }
        Mode::Serve => run(&config).await?,
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<Repository>> {
    let repository = Repository::new(&config.database_path()?).await?;
    tracing::info!(
        "Article store holds {} articles",
        repository.count_articles().await?
    );
    Ok(Arc::new(repository))
}

/// Serve the feeds and run the daily jobs until shutdown.
async fn run(config: &Config) -> Result<()> {
    let repository = open_store(config).await?;
    let scorer = Scorer::default();

    let mut scheduler = Scheduler::new();
    match build_ingestor(config, repository.clone(), scorer.clone()) {
        Ok(ingestor) => scheduler.add(
            DailyTrigger::parse(&config.schedule.ingest_at)?,
            Arc::new(ingestor),
        ),
        Err(e) => tracing::warn!("Daily ingestion disabled: {}", e),
    }
    scheduler.add(
        DailyTrigger::parse(&config.schedule.backfill_at)?,
        Arc::new(Backfiller::new(repository.clone(), scorer)),
    );
    let scheduler_handle = scheduler.spawn();

    let state = AppState {
        repository,
        thresholds: config.thresholds,
    };
    let app = server::router(state, &config.static_dir);
    let result = server::serve(&config.bind_addr, app).await;
    scheduler_handle.abort();
    result
}

fn build_ingestor(config: &Config, repository: Arc<Repository>, scorer: Scorer) -> Result<Ingestor> {
    let fetcher = NewsFetcher::new(
        &config.news_api_url,
        config.require_api_key()?,
        Duration::from_secs(config.request_timeout_secs),
        Duration::from_secs(config.connect_timeout_secs),
    )?;

    Ok(Ingestor::new(
        repository,
        Arc::new(fetcher),
        scorer,
        config.sources.clone(),
        config.sort_by.clone(),
    ))
}

fn evaluate(config: &Config, positive: Option<PathBuf>, negative: Option<PathBuf>) -> Result<()> {
    let positive = positive.unwrap_or_else(|| PathBuf::from(&config.training.positive_path));
    let negative = negative.unwrap_or_else(|| PathBuf::from(&config.training.negative_path));

    let samples = classifier::load_training_set(&positive, &negative)?;
    if samples.is_empty() {
        return Err(AppError::Training("no headlines in the training files".to_string()));
    }

    let report = classifier::cross_validate(
        samples,
        config.training.folds,
        config.training.max_ngram,
        &mut rand::rng(),
    )?;
    println!("{}", report);
    Ok(())
}
