//! WriteKit server - exposes assisted-writing capabilities over HTTP.

use std::env;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use writekit_common::CapabilityKind;
use writekit_service::{api, logging, AppState, Config, OllamaHost};
use writekit_session::SessionBroker;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    println!("writekit-server {}", VERSION);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        print_version();
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml is valid or set WRITEKIT__SECTION__KEY environment variables.",
            e
        )
    })?;
    tracing::info!("Starting writekit-server against {}", config.ollama.base_url);

    for kind in CapabilityKind::ALL {
        match config.models.model_for(kind) {
            Some(model) => tracing::info!("Capability {} backed by model {}", kind, model),
            None => tracing::warn!("Capability {} has no model configured; it will be reported as unsupported", kind),
        }
    }

    // Build the host binding and broker
    let host = Arc::new(OllamaHost::from_config(&config));
    let broker = SessionBroker::new(host);

    // Create shared state
    let state = Arc::new(AppState::new(config.clone(), broker));

    // Build router
    let app = Router::new()
        .nest("/v1", api::router())
        .route("/health", axum::routing::get(api::health::health))
        .layer(axum::middleware::from_fn(logging::request_logger))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.api.host, config.api.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
