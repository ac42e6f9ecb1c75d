use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use reviewtag::aggregate::sqlite::SqliteAggregator;
use reviewtag::aggregate::{Aggregator, InMemoryAggregator};
use reviewtag::api::{AppState, build_router};
use reviewtag::config::{AggregateBackend, ProviderConfig, ServiceConfig, TaggerConfig};
use reviewtag::consts::{
    API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_BIND, DEFAULT_MAX_TAGS, DEFAULT_MODEL,
    DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_TEMPERATURE, VERSION, default_db_path,
};
use reviewtag::service::ReviewService;
use reviewtag::store::ReviewStore;
use reviewtag::store::sqlite::SqliteReviewStore;
use reviewtag::tagger::Dispatcher;

#[derive(Parser)]
#[command(name = "reviewtag", version, about = "Tag product reviews and summarize the tags.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Address the HTTP server binds to
    #[arg(long, env = "REVIEWTAG_BIND", default_value = DEFAULT_BIND, global = true)]
    bind: String,

    /// SQLite database path for stored reviews (use :memory: for ephemeral)
    #[arg(short, long, env = "REVIEWTAG_DB", global = true)]
    db: Option<String>,

    /// Where aggregate counters live
    #[arg(long, value_enum, default_value_t = AggregateBackend::Memory, global = true)]
    aggregate: AggregateBackend,

    /// Maximum tags per review
    #[arg(long, default_value_t = DEFAULT_MAX_TAGS, global = true)]
    max_tags: usize,

    /// Provider call timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_PROVIDER_TIMEOUT_MS, global = true)]
    provider_timeout_ms: u64,

    /// Provider model name
    #[arg(long, default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, default_value = DEFAULT_API_BASE, global = true)]
    api_base: String,

    /// Provider API key; capability tagging is disabled without one
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Tag a single review and print the result as JSON
    Tag {
        /// Review text
        text: String,
    },
}

impl Cli {
    fn service_config(&self) -> ServiceConfig {
        let db_path = self
            .db
            .clone()
            .unwrap_or_else(|| default_db_path().to_string_lossy().into_owned());
        ServiceConfig {
            bind: self.bind.clone(),
            db_path,
            aggregate: self.aggregate,
            tagger: TaggerConfig {
                max_tags: self.max_tags,
                provider_timeout: Duration::from_millis(self.provider_timeout_ms),
            },
            provider: ProviderConfig {
                api_key: self.api_key.clone(),
                api_base: self.api_base.clone(),
                model: self.model.clone(),
                temperature: DEFAULT_TEMPERATURE,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = cli.service_config();
    config.validate()?;

    match &cli.command {
        Some(Command::Tag { text }) => run_once(&config, text).await,
        Some(Command::Serve) | None => serve(config).await,
    }
}

/// Single-shot mode: no store, no aggregate.
async fn run_once(config: &ServiceConfig, text: &str) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::from_config(&config.tagger, &config.provider);
    let tagging = dispatcher.tag(text).await;
    println!("{}", serde_json::to_string_pretty(&tagging)?);
    Ok(())
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    info!(
        "Starting reviewtag v{} (max_tags={}, provider_timeout={:?})",
        VERSION,
        config.tagger.max_tags,
        config.tagger.provider_timeout
    );

    prepare_db_dir(&config.db_path)?;
    info!(db = %config.db_path, aggregate = ?config.aggregate, "opening database");

    let store = SqliteReviewStore::new(&config.db_path)?;
    info!("{} stored reviews", store.count().await?);

    let aggregator: Arc<dyn Aggregator> = match config.aggregate {
        AggregateBackend::Memory => Arc::new(InMemoryAggregator::new()),
        AggregateBackend::Sqlite => Arc::new(SqliteAggregator::new(&config.db_path)?),
    };

    let dispatcher = Dispatcher::from_config(&config.tagger, &config.provider);
    let service = ReviewService::new(dispatcher, Arc::new(store), aggregator);
    let app = build_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("reviewtag listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

fn prepare_db_dir(db_path: &str) -> anyhow::Result<()> {
    if db_path == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = Path::new(db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create database directory {}", parent.display()))?;
    }
    Ok(())
}
