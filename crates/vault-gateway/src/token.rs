//! Collect-Token Acquisition
//!
//! Minimal OAuth2 client-credentials exchange against the vault's auth
//! realm. The bearer token is returned verbatim and never cached; each call
//! is independent.

use serde::Deserialize;

use crate::error::{GatewayError, Result};

/// Default vault auth realm token endpoint
pub const DEFAULT_TOKEN_URL: &str =
    "https://auth.verygoodsecurity.com/auth/realms/vgs/protocol/openid-connect/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange client credentials for a short-lived collect token.
pub async fn fetch_collect_token(
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String> {
    if client_id.is_empty() || client_secret.is_empty() {
        return Err(GatewayError::Configuration(
            "vault client credentials are required".into(),
        ));
    }

    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("grant_type", "client_credentials"),
    ];

    let response = reqwest::Client::new()
        .post(token_url)
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "collect-token exchange rejected");
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            detail,
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| GatewayError::Transport(format!("malformed token response: {}", e)))?;

    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_valid_credentials_yield_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("client_id=cid")
                .body_contains("client_secret=csecret")
                .body_contains("grant_type=client_credentials");
            then.status(200)
                .json_body(serde_json::json!({"access_token": "abc", "expires_in": 900}));
        });

        let token = fetch_collect_token(&server.url("/token"), "cid", "csecret")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_rejected_credentials_yield_upstream_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(401)
                .json_body(serde_json::json!({"error": "invalid_client"}));
        });

        let result = fetch_collect_token(&server.url("/token"), "cid", "wrong").await;

        match result {
            Err(GatewayError::Upstream { status, detail }) => {
                assert_eq!(status, 401);
                assert!(detail.contains("invalid_client"));
            }
            other => panic!("expected upstream error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_before_network() {
        let result = fetch_collect_token("http://127.0.0.1:9/token", "", "secret").await;
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }
}
