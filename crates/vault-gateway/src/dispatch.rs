//! Secure Request Dispatcher
//!
//! Issues exactly one provisioning POST to the PSP through a tunnel agent.
//! The request body carries alias tokens only; the outbound proxy swaps in
//! the real PAN/CVC on the way out. Every failure mode is normalized into a
//! [`ProvisionResult`] — nothing propagates past this boundary as an error.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::AliasedCard;
use crate::tunnel::TunnelAgent;

/// Path for Stripe-style payment-method creation
const PAYMENT_METHODS_PATH: &str = "/v1/payment_methods";

/// A PSP API to provision against.
#[derive(Clone, Debug)]
pub struct PspEndpoint {
    /// API base URL, e.g. `https://api.stripe.com`
    pub base_url: String,

    /// Pre-built `Authorization` header value
    pub auth_header: String,
}

impl PspEndpoint {
    /// Stripe-style endpoint: Basic auth with the secret key as username and
    /// an empty password.
    pub fn stripe(base_url: impl Into<String>, secret_key: &str) -> Self {
        let encoded = BASE64.encode(format!("{}:", secret_key));
        Self {
            base_url: base_url.into(),
            auth_header: format!("Basic {}", encoded),
        }
    }
}

/// Outcome of one provisioning dispatch.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProvisionResult {
    /// PSP accepted the aliased card and returned a payment-method handle
    Success {
        /// PSP-assigned payment-method identifier
        psp_token: String,

        /// Full payment-method payload as returned by the PSP
        payment_method: Value,
    },

    /// Provisioning failed; the upstream payload is preserved when present
    Failure {
        /// Upstream HTTP status, absent on transport failures
        status: Option<u16>,

        /// Upstream error payload, or the transport error message
        error: Value,
    },
}

impl ProvisionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProvisionResult::Success { .. })
    }

    fn transport_failure(message: impl Into<String>) -> Self {
        ProvisionResult::Failure {
            status: None,
            error: Value::String(message.into()),
        }
    }
}

/// Provision a PSP payment method for an aliased card.
///
/// Single attempt, no retries, default client timeout. Validation failures,
/// transport errors and upstream rejections all come back as
/// [`ProvisionResult::Failure`].
pub async fn provision_payment_method(
    agent: &TunnelAgent,
    endpoint: &PspEndpoint,
    card: &AliasedCard,
) -> ProvisionResult {
    if let Err(e) = card.validate() {
        return ProvisionResult::Failure {
            status: None,
            error: Value::String(e.to_string()),
        };
    }

    // Stripe's nested form encoding; the first two values are opaque aliases.
    let form = [
        ("type", "card".to_string()),
        ("card[number]", card.pan_alias.clone()),
        ("card[cvc]", card.cvc_alias.clone()),
        ("card[exp_month]", card.exp_month.to_string()),
        ("card[exp_year]", card.exp_year.to_string()),
    ];

    let url = format!("{}{}", endpoint.base_url, PAYMENT_METHODS_PATH);
    tracing::debug!(card_id = %card.card_id, url = %url, "dispatching provisioning request");

    let response = match agent
        .client()
        .post(&url)
        .header(AUTHORIZATION, &endpoint.auth_header)
        .form(&form)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(card_id = %card.card_id, error = %e, "provisioning transport failure");
            return ProvisionResult::transport_failure(e.to_string());
        }
    };

    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return ProvisionResult::transport_failure(e.to_string()),
    };
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

    if status.is_success() {
        match body.get("id").and_then(Value::as_str) {
            Some(id) => {
                tracing::info!(card_id = %card.card_id, psp_token = %id, "payment method provisioned");
                ProvisionResult::Success {
                    psp_token: id.to_string(),
                    payment_method: body,
                }
            }
            None => ProvisionResult::Failure {
                status: Some(status.as_u16()),
                error: Value::String("PSP response missing payment method id".into()),
            },
        }
    } else {
        tracing::warn!(card_id = %card.card_id, status = %status, "PSP rejected provisioning request");
        ProvisionResult::Failure {
            status: Some(status.as_u16()),
            error: body,
        }
    }
}
