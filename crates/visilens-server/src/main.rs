mod api;
mod middleware;
mod pipeline;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::pipeline::Analyzer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = visilens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let lexicons = match &config.lexicons_path {
        Some(path) => visilens_core::load_lexicons(path)?,
        None => visilens_core::Lexicons::default(),
    };

    let analyzer = Arc::new(Analyzer {
        scraper: visilens_scraper::ScrapeClient::new(
            config.scraper_timeout_secs,
            &config.scraper_user_agent,
        )?,
        rater: visilens_rater::RaterClient::new(
            &config.openrouter_api_key,
            config.rater_timeout_secs,
        )?,
        lexicons,
    });

    let store = visilens_store::JobStore::new();
    let _scheduler = scheduler::build_scheduler(store.clone(), config.job_retention_hours).await?;

    let app = build_app(AppState { store, analyzer });

    tracing::info!(addr = %config.bind_addr, env = %config.env, "starting visilens server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
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
