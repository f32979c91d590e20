mod classify;
mod config;
mod error;
mod handlers;
mod openai;
mod prompt;
mod provider;
mod schema;
mod types;

use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use config::Config;
use handlers::AppState;
use openai::OpenAiProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_json);

    tracing::info!("Starting classification service with config: {:?}", config);

    // Fail at startup rather than on the first request
    let Some(api_key) = config.api_key() else {
        anyhow::bail!("OPENAI_API_KEY (or --openai-api-key) must be provided");
    };

    let provider = OpenAiProvider::new(
        api_key.to_string(),
        config.openai_base_url.clone(),
        config.model.clone(),
        config.request_timeout(),
    )?;
    tracing::info!(
        model = %config.model,
        prompt_version = prompt::PROMPT_VERSION,
        "LLM provider client created"
    );

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let state = AppState::new(Arc::new(provider), config.expose_error_details());
    let app = handlers::router(state)
        .route(handlers::METRICS_PATH, get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.server_address()).await?;
    tracing::info!("Server running on http://{}", config.server_address());
    if config.expose_error_details() {
        tracing::warn!(
            environment = %config.environment,
            "Error details are included in responses"
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,classification_service=debug".into());

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
