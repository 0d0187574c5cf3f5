//! Chat relay HTTP server
//!
//! Main entry point for the HTTP API server.

use std::time::Duration;

use ai_core::engine_for;
use ai_speech::{synthesizer_for, transcriber_for};
use anyhow::Context;
use application::{ChatService, SpeechService};
use axum::http::{HeaderValue, Method};
use presentation_http::{AppConfig, AppState, BodyLimits, create_router};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "info,chat_relay_server=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();

    // Log format comes from the config; fall back to text when it failed to load
    let json_logs = config.as_ref().is_ok_and(|c| c.server.json_logs());
    init_tracing(json_logs);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Refusing to start");
            return Err(e).context("Failed to load configuration");
        },
    };

    info!("Chat relay v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = %config.server.port,
        provider = %config.inference.provider,
        model = %config.inference.resolved_model(),
        "Configuration loaded"
    );

    let engine = engine_for(config.inference.clone())
        .context("Failed to initialize the inference provider")?;
    let transcriber =
        transcriber_for(&config.speech).context("Failed to initialize transcription")?;
    let synthesizer =
        synthesizer_for(&config.speech).context("Failed to initialize speech synthesis")?;

    if synthesizer.is_none() {
        warn!("OPENAI_API_KEY not set, /generate-speech will fail");
    }

    let state = AppState::new(
        ChatService::new(engine).with_retry_policy(config.retry),
        SpeechService::new(transcriber, synthesizer).with_retry_policy(config.retry),
    );

    let app = create_router(state, BodyLimits::from(&config.server))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.allowed_origins));

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// All origins when none are configured, otherwise only the listed ones
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Wait for SIGINT or SIGTERM, then bound the drain to `timeout`
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("Waiting up to {:?} for connections to close", timeout);
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        warn!("Connections still open after {:?}, exiting", timeout);
        std::process::exit(1);
    });
}
