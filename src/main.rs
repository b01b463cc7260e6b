use std::sync::Arc;

use anyhow::{Context, Result};
use movies_api::{
    AppState, InMemoryMovieRepository, MovieSchema, build_router_with_policy,
    config::AppConfig,
    cors::OriginPolicy,
    seed::{DEFAULT_SEED, load_seed_file, parse_seed},
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("failed to load application configuration")?;
    let schema = MovieSchema::current();

    let movies = match &config.seed_path {
        Some(path) => {
            info!(path = %path.display(), "seeding movies from file");
            load_seed_file(path, &schema)
                .await
                .with_context(|| format!("failed to load seed file {}", path.display()))?
        }
        None => {
            info!("seeding movies from embedded dataset");
            parse_seed(DEFAULT_SEED, &schema).context("embedded seed data is invalid")?
        }
    };
    info!(count = movies.len(), "movie catalogue ready");

    let repository = Arc::new(InMemoryMovieRepository::with_movies(movies));
    let policy = OriginPolicy::new(&config.allowed_origins);
    let app = build_router_with_policy(AppState::with_schema(repository, schema), policy);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movies_api=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
