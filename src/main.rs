use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shift_swap_bot::calendar::StaticSchedule;
use shift_swap_bot::config::Config;
use shift_swap_bot::dedup::{CalendarGate, Messenger, WebhookDeduplicator};
use shift_swap_bot::identity::{CachedResolver, StaticDirectory};
use shift_swap_bot::negotiation::{InMemoryStore, NegotiationEngine};
use shift_swap_bot::persistence::{JsonArchive, NoArchive, RequestArchive};
use shift_swap_bot::registry::InMemoryRegistry;
use shift_swap_bot::server::{build_router, AppState};
use shift_swap_bot::transport::LogTransport;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shift_swap_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "configuration error");
            std::process::exit(1);
        }
    };

    let roster = match &config.roster_path {
        Some(path) => match StaticDirectory::load(path) {
            Ok(roster) => roster,
            Err(error) => {
                tracing::error!(%error, path = %path.display(), "failed to load roster");
                std::process::exit(1);
            }
        },
        None => StaticDirectory::default(),
    };

    let schedule = match &config.schedule_path {
        Some(path) => match StaticSchedule::load(path) {
            Ok(schedule) => schedule,
            Err(error) => {
                tracing::error!(%error, path = %path.display(), "failed to load schedule");
                std::process::exit(1);
            }
        },
        None => StaticSchedule::new(),
    };

    let calendar = Arc::new(schedule);
    // One registry backs all dedup windows; keys are domain-prefixed and
    // each entry expires on its own deadline.
    let registry = Arc::new(InMemoryRegistry::new());
    let messenger = Messenger::new(Arc::new(LogTransport), registry.clone());
    let archive: Arc<dyn RequestArchive> = match &config.archive_dir {
        Some(dir) => Arc::new(JsonArchive::new(dir)),
        None => Arc::new(NoArchive),
    };

    let engine = NegotiationEngine::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(CachedResolver::new(roster)),
        calendar.clone(),
        CalendarGate::new(calendar, registry.clone()),
        messenger.clone(),
        archive,
    );

    let state = AppState::new(
        engine,
        WebhookDeduplicator::new(registry),
        messenger,
        config.channel_secret,
    );
    let app = build_router(state);

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
