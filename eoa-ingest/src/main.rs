//! eoa-ingest - Executive Orders Archive ingestion service
//!
//! Fetches executive orders from the Federal Register API into the local
//! archive and serves the archive over a read-only HTTP API.
//!
//! # Commands
//! - `serve`    Read API, optionally with the recurring update scheduler
//! - `update`   Incremental update over the trailing window
//! - `backfill` Historical backfill, one sub-run per year
//! - `fetch`    Manual, resumable fetch over a date window
//! - `lookup`   Fetch and store a single order by number
//! - `search`   Full-text search of the Federal Register (read-only)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use eoa_common::config::{self, DataFolder, TomlConfig};
use eoa_common::db::executive_orders;
use sqlx::SqlitePool;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eoa_ingest::services::{
    normalizer, ClientConfig, FederalRegisterClient, ManualFetchRequest, OrchestratorConfig,
    ProgressTracker, RunOrchestrator, RunRetryPolicy, SchedulerConfig, UpdateScheduler,
};
use eoa_ingest::AppState;

/// Command-line arguments for eoa-ingest
#[derive(Parser, Debug)]
#[command(name = "eoa-ingest")]
#[command(about = "Executive Orders Archive ingestion service")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, global = true, env = "EOA_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database and fetch state
    #[arg(short, long, global = true, env = "EOA_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the read API
    Serve {
        /// Also run the recurring incremental update
        #[arg(long)]
        schedule: bool,

        /// Listen address (overrides config)
        #[arg(long, env = "EOA_BIND_ADDRESS")]
        bind: Option<String>,
    },

    /// Incremental update over the trailing window
    Update {
        #[arg(long, default_value_t = 30)]
        days_back: u32,
    },

    /// Historical backfill, one sub-run per year
    Backfill {
        /// First year (default: configured backfill start)
        #[arg(long)]
        start_year: Option<i32>,

        /// Last year (default: current year)
        #[arg(long)]
        end_year: Option<i32>,
    },

    /// Manual, resumable fetch over a date window
    Fetch {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// End date (YYYY-MM-DD), default today
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Days back from the end date when no start date is given
        #[arg(long, default_value_t = 365)]
        days_back: u32,

        /// Results per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Stop after this page number
        #[arg(long)]
        max_pages: Option<u32>,

        /// Continue from the saved fetch state
        #[arg(long)]
        resume: bool,
    },

    /// Fetch and store a single order by number (e.g. 13985)
    Lookup { number: String },

    /// Full-text search of the Federal Register, ordered by relevance
    Search {
        query: String,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config::resolve_config_path(args.config.as_deref());
    let toml_config = config::load_toml_config(config_path.as_deref())?;

    // Initialize tracing (RUST_LOG overrides the configured level)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting eoa-ingest");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) if path.exists() => info!("Config: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using built-in defaults", path.display()),
        None => warn!("No config directory available, using built-in defaults"),
    }

    let data_folder = DataFolder::new(config::resolve_data_folder(
        args.data_folder.as_deref(),
        &toml_config,
    ));
    data_folder
        .ensure_exists()
        .context("Failed to initialize data folder")?;

    let db_path = data_folder.database_path();
    info!("Database: {}", db_path.display());
    let db = eoa_common::db::init_database_pool(&db_path)
        .await
        .context("Failed to open database")?;
    info!("Database connection established");

    match args.command {
        Command::Serve { schedule, bind } => {
            let bind = bind.unwrap_or_else(|| toml_config.bind_address.clone());
            serve(db, &toml_config, &bind, schedule).await
        }
        Command::Update { days_back } => {
            let orchestrator = build_orchestrator(db, &toml_config)?;
            let retry = RunRetryPolicy::from(&toml_config.ingest);
            let summary = retry
                .run("incremental update", || orchestrator.run_incremental_update(days_back))
                .await?;
            info!(
                "Update complete: {} new, {} updated, {} skipped, {} errors",
                summary.new_records, summary.updated_records, summary.skipped_records, summary.errors
            );
            Ok(())
        }
        Command::Backfill {
            start_year,
            end_year,
        } => {
            let orchestrator = build_orchestrator(db, &toml_config)?;
            let summary = orchestrator
                .run_historical_backfill(start_year, end_year)
                .await?;
            info!(
                "Backfill complete: {} records across {} years, failed years: {:?}",
                summary.total_records, summary.years_processed, summary.error_years
            );
            Ok(())
        }
        Command::Fetch {
            start_date,
            end_date,
            days_back,
            page_size,
            max_pages,
            resume,
        } => {
            let orchestrator = build_orchestrator(db, &toml_config)?;
            let tracker = ProgressTracker::new(data_folder.state_file_path(&toml_config.ingest));
            info!("Fetch state: {}", tracker.path().display());

            let request = ManualFetchRequest {
                start_date,
                end_date,
                days_back,
                page_size,
                max_pages,
                resume,
            };
            let total = orchestrator.run_manual_fetch(&request, &tracker).await?;
            info!("Fetch complete: {} records stored", total);
            Ok(())
        }
        Command::Lookup { number } => lookup(db, &toml_config, &number).await,
        Command::Search {
            query,
            page,
            per_page,
        } => search(&toml_config, &query, page, per_page).await,
    }
}

fn build_client(config: &TomlConfig) -> Result<FederalRegisterClient> {
    FederalRegisterClient::new(ClientConfig::from(&config.source))
        .context("Failed to build Federal Register client")
}

fn build_orchestrator(db: SqlitePool, config: &TomlConfig) -> Result<RunOrchestrator> {
    let client = build_client(config)?;
    Ok(RunOrchestrator::new(
        db,
        Arc::new(client),
        OrchestratorConfig::from(&config.ingest),
    ))
}

async fn serve(db: SqlitePool, config: &TomlConfig, bind: &str, schedule: bool) -> Result<()> {
    let cancel_token = CancellationToken::new();

    let scheduler_handle = if schedule {
        let orchestrator = Arc::new(build_orchestrator(db.clone(), config)?);
        let scheduler = UpdateScheduler::new(orchestrator, SchedulerConfig::from(&config.ingest));
        Some(scheduler.spawn(cancel_token.clone()))
    } else {
        None
    };

    let app = eoa_ingest::build_router(AppState::new(db));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;
    info!("Listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cancel_token.cancel();
    if let Some(handle) = scheduler_handle {
        if let Err(e) = handle.await {
            warn!("Scheduler task ended abnormally: {}", e);
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn lookup(db: SqlitePool, config: &TomlConfig, number: &str) -> Result<()> {
    let client = build_client(config)?;

    let Some(document) = client.get_executive_order_by_number(number).await? else {
        warn!("Executive order {} not found in the Federal Register", number);
        return Ok(());
    };

    let record = normalizer::normalize(&document)
        .with_context(|| format!("Executive order {} has no usable identifier", number))?;

    if let Some(existing) = executive_orders::get_by_id(&db, &record.id).await? {
        if existing.to_canonical() == record {
            info!("{}: already up to date ({})", record.id, record.title);
            return Ok(());
        }
    }

    let reconciler = eoa_ingest::services::Reconciler::new(db, config.ingest.max_lock_wait_ms);
    let outcome = reconciler.reconcile_record(&record).await?;
    info!("{}: {:?} ({})", record.id, outcome, record.title);
    Ok(())
}

async fn search(config: &TomlConfig, query: &str, page: u32, per_page: u32) -> Result<()> {
    let client = build_client(config)?;
    let result = client.search_executive_orders(query, page, per_page).await?;

    info!(
        "Search '{}': {} matches, page {} of {}",
        query,
        result.count.unwrap_or(0),
        page,
        result.total_pages.unwrap_or(0)
    );
    for raw in &result.results {
        match normalizer::decode_and_normalize(raw) {
            Ok(Some(record)) => info!("{}  {}  {}", record.id, record.issuance_date, record.title),
            Ok(None) => {}
            Err(e) => warn!("Undecodable search result: {}", e),
        }
    }
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
