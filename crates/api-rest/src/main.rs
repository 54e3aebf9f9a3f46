//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging against the API crate directly. The workspace's main
//! `rxscan-run` binary serves the same router.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{rules_from_env, serve, AppState};

/// Main entry point for the rxscan REST API server
///
/// # Environment Variables
/// - `RXSCAN_REST_ADDR`: Server address (default: "0.0.0.0:5000")
/// - `RXSCAN_RULES_FILE`: Optional YAML file overriding the warning rules
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the rules file cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var(rxscan_core::REST_ADDR_ENV)
        .unwrap_or_else(|_| rxscan_core::DEFAULT_REST_ADDR.into());
    let rules = rules_from_env()?;

    tracing::info!("-- Starting rxscan REST API on {}", addr);

    serve(&addr, AppState::new(rules)).await
}
