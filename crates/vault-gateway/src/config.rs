//! Environment-Driven Settings
//!
//! One strongly-typed settings struct, populated once at startup and
//! validated eagerly. Business logic never branches on the environment name;
//! it only consumes the derived values here. Secrets are redacted from the
//! `Debug` output so they never land in logs.

use std::fmt;

use crate::error::{GatewayError, Result};
use crate::token::DEFAULT_TOKEN_URL;
use crate::tunnel::{DEFAULT_TUNNEL_PORT, TunnelConfig, TunnelMode};

/// Default PSP API base URL
pub const DEFAULT_PSP_BASE_URL: &str = "https://api.stripe.com";

/// Vault environment the outbound proxy belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "production" | "live" => Ok(Environment::Production),
            other => Err(GatewayError::Configuration(format!(
                "unknown environment: {}",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }
}

/// Process-wide settings, loaded once at startup.
#[derive(Clone)]
pub struct Settings {
    /// Vault tenant identifier
    pub vault_id: String,

    /// Vault environment (selects the outbound proxy subdomain)
    pub environment: Environment,

    /// Outbound proxy Basic-auth username
    pub proxy_username: String,

    /// Outbound proxy Basic-auth password
    pub proxy_password: String,

    /// Outbound proxy port
    pub proxy_port: u16,

    /// Tunnel transport mode
    pub tunnel_mode: TunnelMode,

    /// Optional TLS validation-name override for the proxy
    pub server_name: Option<String>,

    /// Optional PEM CA certificate for the proxy chain, loaded at startup
    pub ca_cert_pem: Option<Vec<u8>>,

    /// Vault OAuth client id for the collect-token exchange
    pub client_id: Option<String>,

    /// Vault OAuth client secret
    pub client_secret: Option<String>,

    /// OAuth token endpoint
    pub token_url: String,

    /// PSP secret key (Stripe-style); provisioning is disabled when unset
    pub psp_secret_key: Option<String>,

    /// PSP API base URL
    pub psp_base_url: String,

    /// HTTP bind address for the local surface
    pub bind_addr: String,
}

impl Settings {
    /// Load and validate settings from the process environment.
    ///
    /// Call `dotenvy::dotenv().ok()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self> {
        let vault_id = require_env("VGS_VAULT_ID")?;
        let proxy_username = require_env("VGS_USERNAME")?;
        let proxy_password = require_env("VGS_PASSWORD")?;

        let environment = match std::env::var("VGS_ENVIRONMENT") {
            Ok(value) => Environment::parse(&value)?,
            Err(_) => Environment::Sandbox,
        };

        let proxy_port = match std::env::var("PROXY_PORT") {
            Ok(value) => value.parse().map_err(|_| {
                GatewayError::Configuration(format!("PROXY_PORT is not a port: {}", value))
            })?,
            Err(_) => DEFAULT_TUNNEL_PORT,
        };

        let tunnel_mode = match std::env::var("VAULT_TUNNEL_MODE") {
            Ok(value) => TunnelMode::parse(&value)?,
            Err(_) => TunnelMode::HttpsOverHttps,
        };

        let ca_cert_pem = match std::env::var("CERT_PATH") {
            Ok(path) => Some(std::fs::read(&path).map_err(|e| {
                GatewayError::Configuration(format!("cannot read CERT_PATH {}: {}", path, e))
            })?),
            Err(_) => None,
        };

        let settings = Self {
            vault_id,
            environment,
            proxy_username,
            proxy_password,
            proxy_port,
            tunnel_mode,
            server_name: std::env::var("PROXY_SERVER_NAME").ok(),
            ca_cert_pem,
            client_id: std::env::var("VGS_CLIENT_ID").ok(),
            client_secret: std::env::var("VGS_CLIENT_SECRET").ok(),
            token_url: std::env::var("VAULT_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.into()),
            psp_secret_key: std::env::var("STRIPE_SECRET_KEY").ok(),
            psp_base_url: std::env::var("PSP_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PSP_BASE_URL.into()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3031".into()),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Consistency checks beyond per-variable parsing.
    pub fn validate(&self) -> Result<()> {
        if self.vault_id.trim().is_empty() {
            return Err(GatewayError::Configuration("vault id is empty".into()));
        }
        if self.client_id.is_some() != self.client_secret.is_some() {
            return Err(GatewayError::Configuration(
                "vault client id and secret must be set together".into(),
            ));
        }
        if self.environment == Environment::Production && self.ca_cert_pem.is_none() {
            tracing::warn!("production environment without a pinned CA certificate");
        }
        Ok(())
    }

    /// Outbound proxy host derived from the vault id and environment.
    pub fn outbound_host(&self) -> String {
        format!(
            "{}.{}.verygoodproxy.com",
            self.vault_id,
            self.environment.as_str()
        )
    }

    /// Host:port string reported by the `/config` endpoint.
    pub fn outbound_url(&self) -> String {
        format!("{}:{}", self.outbound_host(), self.proxy_port)
    }

    /// Whether a PSP secret key is available.
    pub fn psp_configured(&self) -> bool {
        self.psp_secret_key.is_some()
    }

    /// A fresh tunnel config for one outbound call.
    pub fn tunnel_config(&self) -> TunnelConfig {
        TunnelConfig {
            destination_host: self.outbound_host(),
            destination_port: self.proxy_port,
            proxy_username: self.proxy_username.clone(),
            proxy_password: self.proxy_password.clone(),
            mode: self.tunnel_mode,
            server_name: self.server_name.clone(),
            ca_cert_pem: self.ca_cert_pem.clone(),
        }
    }
}

// Manual Debug keeps credentials out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("vault_id", &self.vault_id)
            .field("environment", &self.environment)
            .field("proxy_username", &"<redacted>")
            .field("proxy_password", &"<redacted>")
            .field("proxy_port", &self.proxy_port)
            .field("tunnel_mode", &self.tunnel_mode)
            .field("server_name", &self.server_name)
            .field("ca_cert", &self.ca_cert_pem.as_ref().map(|_| "<pem>"))
            .field("client_id", &self.client_id.as_ref().map(|_| "<redacted>"))
            .field("token_url", &self.token_url)
            .field("psp_secret_key", &self.psp_secret_key.as_ref().map(|_| "<redacted>"))
            .field("psp_base_url", &self.psp_base_url)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| GatewayError::Configuration(format!("{} not set", name)))
}
