//! `arenatrack-agent` -- local tracker daemon.
//!
//! Tails the card client's log file, turns records into typed events,
//! and publishes them on the event bus for downstream consumers. Card
//! identities are seeded from local storage at startup.
//!
//! # Environment variables
//!
//! | Variable           | Required | Default                  | Description                    |
//! |--------------------|----------|--------------------------|--------------------------------|
//! | `LOG_PATH`         | yes      | --                       | Client log file to follow      |
//! | `DATABASE_URL`     | no       | `sqlite://arenatrack.db` | Tracker database               |
//! | `POLL_INTERVAL_MS` | no       | `500`                    | Tail poll interval             |

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arenatrack_agent::config::Config;
use arenatrack_agent::cursor::SqliteCursorStore;
use arenatrack_agent::follower::LogFollower;
use arenatrack_agent::pipeline;
use arenatrack_core::cards::index::CardIndex;
use arenatrack_db::repositories::CardRepo;
use arenatrack_events::EventBus;

/// Buffer between the follower and the pipeline.
const CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arenatrack_agent=info,arenatrack_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        log_path = %config.log_path.display(),
        database_url = %config.database_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Starting arenatrack-agent",
    );

    // Cursor and identity storage are hard requirements; running without
    // them would be silently inconsistent.
    let pool = match arenatrack_db::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Database unavailable");
            std::process::exit(1);
        }
    };

    let index = Arc::new(CardIndex::new());
    match CardRepo::load_all(&pool).await {
        Ok(records) => {
            let count = records.len();
            index.seed(records.into_iter().map(Into::into).collect());
            tracing::info!(cards = count, "Card identity index seeded");
        }
        Err(e) => {
            tracing::error!(error = %e, "Identity storage unavailable");
            std::process::exit(1);
        }
    }

    let bus = Arc::new(EventBus::default());
    let store = Arc::new(SqliteCursorStore::new(pool.clone()));
    let follower = LogFollower::new(config.log_path.clone(), store, config.poll_interval);
    let cancel = follower.cancellation_token();

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let follower_task = tokio::spawn(follower.run(tx));
    let pipeline_task = tokio::spawn(pipeline::run(rx, index, Arc::clone(&bus)));

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down after the in-flight record");
    cancel.cancel();

    match follower_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Follower failed"),
        Err(e) => tracing::error!(error = %e, "Follower task panicked"),
    }
    match pipeline_task.await {
        Ok(stats) => tracing::info!(
            records = stats.records,
            events = stats.events,
            parse_failures = stats.parse_failures,
            discontinuities = stats.discontinuities,
            "Shutdown complete",
        ),
        Err(e) => tracing::error!(error = %e, "Pipeline task panicked"),
    }
}
