use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, rules_from_env, serve};

/// Main entry point for the rxscan application
///
/// Resolves configuration once, then serves the REST API:
/// - `POST /api/warnings` runs the warning engine
/// - `POST /api/canonical` and `POST /api/medicine-info` render treatment items
/// - `GET /api/rules` and `GET /health` for introspection
///
/// # Environment Variables
/// - `RXSCAN_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `RXSCAN_RULES_FILE`: Optional YAML file overriding the warning rules
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rxscan_run=info".parse()?)
                .add_directive("rxscan_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var(rxscan_core::REST_ADDR_ENV)
        .unwrap_or_else(|_| rxscan_core::DEFAULT_REST_ADDR.into());
    let rules = rules_from_env()?;

    tracing::info!("++ Starting rxscan REST on {}", rest_addr);

    serve(&rest_addr, AppState::new(rules)).await
}
