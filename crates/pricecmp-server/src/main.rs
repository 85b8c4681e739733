mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use pricecmp_compare::{Comparison, QueryCache};
use pricecmp_scraper::Backend;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(pricecmp_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let sites = Arc::new(pricecmp_core::load_sites(&config.sites_path)?);
    tracing::info!(
        path = %config.sites_path.display(),
        sites = sites.enabled_sites().count(),
        "loaded sites"
    );

    let backend = match Backend::from_config(&config) {
        Ok(backend) => Some(backend),
        Err(e) => {
            tracing::warn!(error = %e, "no listing backend configured; compare requests will fail");
            None
        }
    };

    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let cache = Arc::new(Mutex::new(QueryCache::<Comparison>::new(ttl)));
    spawn_cache_janitor(Arc::clone(&cache), ttl);

    let auth = AuthState::from_env(matches!(
        config.env,
        pricecmp_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            config: Arc::clone(&config),
            sites,
            backend,
            cache,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "pricecmp-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Periodically drops expired comparisons so the cache does not grow without bound.
fn spawn_cache_janitor(cache: Arc<Mutex<QueryCache<Comparison>>>, ttl: Duration) {
    if ttl.is_zero() {
        return;
    }
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ttl);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = cache.lock().await.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, "purged expired comparisons");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
