mod cli;
mod config;
mod context;
mod error;
mod handlers;
mod models;
mod normalize;
mod render;
mod router;
mod services;
mod synthesis;
mod utils;
mod validation;

use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::Config;
use services::generation::GenerationService;

/// Application state shared across handlers
pub struct AppState {
    pub generator: GenerationService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so one-shot commands can print JSON on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "torforge=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut cfg = Config::load();
    cli.apply(&mut cfg);

    match cli.command {
        None | Some(Command::Serve { .. }) => serve(cfg).await,
        Some(command) => cli::run(command, &cfg).await,
    }
}

async fn serve(cfg: Config) -> anyhow::Result<()> {
    tracing::info!("Starting TorForge Server");
    if cfg.templates_dir.is_empty() {
        tracing::info!("Templates: bundled");
    } else {
        tracing::info!("Templates: {}", cfg.templates_dir);
    }

    let generator = cli::generator(&cfg);
    let vendors = generator.renderer().store().vendors().await;
    if vendors.is_empty() {
        tracing::warn!("No templates found; rendering will fail until templates are added");
    } else {
        tracing::info!("Supported vendors: {}", vendors.join(", "));
    }

    let app = router::build(Arc::new(AppState { generator }));

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("TorForge listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("TorForge shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
