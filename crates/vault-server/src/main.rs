//! Vault PSP Provisioning Server
//!
//! Axum-based HTTP surface in front of the vault-gateway crate: mints
//! collect tokens for the vault SDK and exchanges vaulted-card aliases for
//! PSP payment-method tokens via the outbound proxy.

mod handlers;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vault_gateway::Settings;

use crate::handlers::{config_info, get_collect_token, health_check, provision_psp_token};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Fatal on invalid configuration; all options are validated here, once.
    let settings = Settings::from_env()?;

    if settings.psp_configured() {
        tracing::info!("✓ PSP configured");
    } else {
        tracing::warn!("⚠ PSP not configured - provisioning disabled");
        tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
    }
    if settings.client_id.is_none() {
        tracing::warn!("⚠ Vault client credentials not set - collect tokens disabled");
        tracing::warn!("  Set VGS_CLIENT_ID and VGS_CLIENT_SECRET in .env");
    }

    let bind_addr = settings.bind_addr.clone();
    let vault_id = settings.vault_id.clone();
    let environment = settings.environment.as_str();
    let outbound_url = settings.outbound_url();

    let state = AppState::new(settings);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/config", get(config_info))
        // Collect token for the vault frontend SDK
        .route("/get-collect-token", get(get_collect_token))
        // PSP provisioning through the outbound proxy
        .route("/provision-psp-token", post(provision_psp_token))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 vault-server running on http://{}", bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Vault: {} ({})", vault_id, environment);
    tracing::info!("Outbound proxy: {}", outbound_url);
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /config              - Vault configuration info");
    tracing::info!("  GET  /get-collect-token   - Mint a collect token");
    tracing::info!("  POST /provision-psp-token - Provision a PSP token");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
