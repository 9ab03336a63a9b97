//! HTTP Handlers
//!
//! Error detail from the PSP is surfaced verbatim in response bodies. That is
//! acceptable for a sandbox/demo surface; a production deployment would
//! redact it.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use vault_gateway::{
    fetch_collect_token, provision_payment_method, CardObject, ProvisionResult, PspEndpoint,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub vault_id: String,
    pub environment: &'static str,
    pub psp_configured: bool,
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub vault_id: String,
    pub environment: &'static str,
    pub outbound_url: String,
    pub psp_configured: bool,
}

#[derive(Serialize)]
pub struct CollectTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    #[serde(default)]
    pub card_object: Option<CardObject>,

    #[serde(default = "default_provider")]
    pub psp_provider: String,
}

fn default_provider() -> String {
    "stripe".into()
}

#[derive(Serialize)]
pub struct ProvisionResponse {
    pub success: bool,
    pub psp_token: String,
    pub payment_method: Value,
    pub card_id: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: Value,
}

impl ErrorResponse {
    fn new(error: impl Into<Value>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        vault_id: state.settings.vault_id.clone(),
        environment: state.settings.environment.as_str(),
        psp_configured: state.settings.psp_configured(),
    })
}

/// Vault configuration info (no secrets)
pub async fn config_info(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        vault_id: state.settings.vault_id.clone(),
        environment: state.settings.environment.as_str(),
        outbound_url: state.settings.outbound_url(),
        psp_configured: state.settings.psp_configured(),
    })
}

/// Mint a short-lived collect token for the vault's frontend SDK
pub async fn get_collect_token(
    State(state): State<AppState>,
) -> Result<Json<CollectTokenResponse>, HandlerError> {
    let (client_id, client_secret) = match (
        state.settings.client_id.as_deref(),
        state.settings.client_secret.as_deref(),
    ) {
        (Some(id), Some(secret)) => (id, secret),
        _ => {
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("Vault client credentials not configured")),
            ));
        }
    };

    let access_token = fetch_collect_token(&state.settings.token_url, client_id, client_secret)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "collect token exchange failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new("Failed to get token")),
            )
        })?;

    Ok(Json(CollectTokenResponse { access_token }))
}

/// Exchange a vaulted-card alias for a PSP payment-method token
pub async fn provision_psp_token(
    State(state): State<AppState>,
    Json(payload): Json<ProvisionRequest>,
) -> Result<Json<ProvisionResponse>, HandlerError> {
    let card_object = payload.card_object.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Card object is required")),
        )
    })?;

    if !payload.psp_provider.eq_ignore_ascii_case("stripe") {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!(
                "Unsupported PSP provider: {}",
                payload.psp_provider
            ))),
        ));
    }

    let secret_key = state.settings.psp_secret_key.as_deref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("PSP not configured")),
        )
    })?;

    let card = card_object.into_aliased_card();
    card.validate().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    tracing::info!(card_id = %card.card_id, "provisioning PSP token");

    // Fresh tunnel agent per call; nothing is shared across requests.
    let agent = state.settings.tunnel_config().build().map_err(|e| {
        tracing::error!(error = %e, "tunnel build failed");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(e.user_message())),
        )
    })?;

    let endpoint = PspEndpoint::stripe(&state.settings.psp_base_url, secret_key);
    match provision_payment_method(&agent, &endpoint, &card).await {
        ProvisionResult::Success { psp_token, payment_method } => {
            tracing::info!(card_id = %card.card_id, psp_token = %psp_token, "PSP token provisioned");
            Ok(Json(ProvisionResponse {
                success: true,
                psp_token,
                payment_method,
                card_id: card.card_id,
            }))
        }
        ProvisionResult::Failure { status, error } => {
            let code = status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            Err((code, Json(ErrorResponse::new(error))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use tower::ServiceExt;
    use vault_gateway::{Environment, Settings, TunnelMode, DEFAULT_PSP_BASE_URL, DEFAULT_TOKEN_URL};

    fn sample_settings() -> Settings {
        Settings {
            vault_id: "tntabc123".into(),
            environment: Environment::Sandbox,
            proxy_username: "user".into(),
            proxy_password: "pass".into(),
            proxy_port: 8443,
            tunnel_mode: TunnelMode::HttpsOverHttps,
            server_name: None,
            ca_cert_pem: None,
            client_id: Some("cid".into()),
            client_secret: Some("csecret".into()),
            token_url: DEFAULT_TOKEN_URL.into(),
            psp_secret_key: Some("sk_test_123".into()),
            psp_base_url: DEFAULT_PSP_BASE_URL.into(),
            bind_addr: "0.0.0.0:3031".into(),
        }
    }

    fn test_app(settings: Settings) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/config", get(config_info))
            .route("/provision-psp-token", post(provision_psp_token))
            .with_state(AppState::new(settings))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_shape() {
        let app = test_app(sample_settings());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["vault_id"], "tntabc123");
        assert_eq!(body["psp_configured"], true);
    }

    #[tokio::test]
    async fn test_config_reports_outbound_url() {
        let app = test_app(sample_settings());
        let response = app
            .oneshot(Request::get("/config").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["environment"], "sandbox");
        assert_eq!(
            body["outbound_url"],
            "tntabc123.sandbox.verygoodproxy.com:8443"
        );
    }

    #[tokio::test]
    async fn test_provision_requires_card_object() {
        let app = test_app(sample_settings());
        let response = app
            .oneshot(
                Request::post("/provision-psp-token")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"pspProvider": "stripe"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Card object is required");
    }

    #[tokio::test]
    async fn test_provision_rejects_unknown_provider() {
        let app = test_app(sample_settings());
        let payload = serde_json::json!({
            "cardObject": {
                "data": {
                    "id": "card_1",
                    "attributes": {
                        "pan_alias": "tok_pan",
                        "cvc_alias": "tok_cvc",
                        "exp_month": 1,
                        "exp_year": 2030
                    }
                }
            },
            "pspProvider": "adyen"
        });
        let response = app
            .oneshot(
                Request::post("/provision-psp-token")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provision_without_psp_key_is_unavailable() {
        let mut settings = sample_settings();
        settings.psp_secret_key = None;
        let app = test_app(settings);
        let payload = serde_json::json!({
            "cardObject": {
                "data": {
                    "id": "card_1",
                    "attributes": {
                        "pan_alias": "tok_pan",
                        "cvc_alias": "tok_cvc",
                        "exp_month": 1,
                        "exp_year": 2030
                    }
                }
            }
        });
        let response = app
            .oneshot(
                Request::post("/provision-psp-token")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_provision_rejects_invalid_expiry() {
        let app = test_app(sample_settings());
        let payload = serde_json::json!({
            "cardObject": {
                "data": {
                    "id": "card_1",
                    "attributes": {
                        "pan_alias": "tok_pan",
                        "cvc_alias": "tok_cvc",
                        "exp_month": 13,
                        "exp_year": 2030
                    }
                }
            }
        });
        let response = app
            .oneshot(
                Request::post("/provision-psp-token")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }
}
