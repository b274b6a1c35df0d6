//! Bookshare Server - Neighborhood Book Sharing
//!
//! REST API server for lending books between neighbours.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bookshare_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Bookshare Server v{}", env!("CARGO_PKG_VERSION"));

    let repository = if config.database.in_memory {
        tracing::warn!("Using in-memory storage, data is lost on restart");
        Repository::in_memory()
    } else {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect(&config.database.url)
            .await?;

        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Database migrations completed");
        Repository::new(pool)
    };

    if config.lending.strict_transitions {
        tracing::info!("Strict transaction ordering enabled");
    }
    if config.lending.enforce_credit_floor {
        tracing::info!("Credit floor enforced on approval");
    }

    let services = Services::new(repository, &config)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the global subscriber: stdout in the configured format, plus a
/// daily rolling JSON file when a log directory is set.
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookshare_server={},tower_http=debug", config.level).into());

    let json = config.format.eq_ignore_ascii_case("json");
    let pretty_layer = (!json).then(|| fmt::layer());
    let json_layer = json.then(|| fmt::layer().json());

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "bookshare.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    guard
}
