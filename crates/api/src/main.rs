use std::sync::Arc;

use anyhow::Context;
use axum::{extract::Request, ServiceExt};
use sqlx::PgPool;
use tracing::{info, warn};

use fittrack_api::app::{build_service, AppServices};
use fittrack_api::config::ApiConfig;
use fittrack_infra::{db, FitnessStore, InMemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;

    fittrack_observability::init(config.log_format);

    if config.jwt_secret_defaulted {
        warn!("JWT_SECRET not set; using insecure dev default");
    }

    let (store, pool): (Arc<dyn FitnessStore>, Option<PgPool>) = match &config.database_url {
        Some(url) => {
            let pool = db::connect(url, config.database_max_connections).await?;
            db::run_migrations(&pool).await?;
            (Arc::new(PostgresStore::new(pool.clone())), Some(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store, data is lost on exit");
            (Arc::new(InMemoryStore::new()), None)
        }
    };

    let services = Arc::new(AppServices::new(store, &config));
    let app = build_service(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pool) = pool {
        pool.close().await;
        info!("database pool closed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
