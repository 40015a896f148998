mod api;
mod middleware;

use std::time::Duration;

use anyhow::Context;
use novita_backend::BackendClient;
use novita_core::{load_site_config, AppConfig, SiteConfig};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState, BackendPresence},
    middleware::{AuthState, RateLimitState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = novita_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let backend = match config.backend_settings() {
        Some(settings) => {
            let client = BackendClient::new(&settings)?;
            tracing::info!(
                table_url = %client.table_url(),
                service_key = client.has_service_key(),
                "backend configured"
            );
            Some(client)
        }
        None => {
            tracing::warn!("backend not configured; serving the in-memory sample catalog");
            None
        }
    };

    let site = load_site(&config)?;
    let presence = BackendPresence {
        url: config.backend_url.is_some(),
        key: config.backend_anon_key.is_some(),
    };

    let auth = AuthState::from_env(config.is_development())?;
    let rate_limit = RateLimitState::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    let app = build_app(AppState::new(backend, presence, site), auth, rate_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "novita-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn load_site(config: &AppConfig) -> anyhow::Result<SiteConfig> {
    match config.site_config_path.as_deref() {
        Some(path) => load_site_config(path)
            .with_context(|| format!("loading site config from {}", path.display())),
        None => Ok(SiteConfig::default()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
