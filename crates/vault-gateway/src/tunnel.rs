//! Outbound Tunnel Builder
//!
//! Builds the HTTP client that routes every request through the vault's
//! outbound proxy. The proxy authenticates the caller with Basic credentials
//! and substitutes card aliases for real values before the request leaves for
//! the PSP network, so this process never holds live card data.
//!
//! Two TLS trust modes exist and must not be confused:
//!
//! - **CA-pinned** (production): the proxy's certificate chain is validated
//!   against a supplied CA certificate.
//! - **Hostname-relaxed** (sandbox only): no CA is supplied but a
//!   `server_name` override is; the system root store is kept and hostname
//!   verification is disabled to accommodate the sandbox proxy's certificate.

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Default outbound proxy port
pub const DEFAULT_TUNNEL_PORT: u16 = 8443;

/// How the tunnel reaches the outbound proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TunnelMode {
    /// TLS to the proxy, then TLS to the destination (sandbox default)
    HttpsOverHttps,

    /// Plaintext to the proxy, TLS to the destination
    HttpsOverHttp,
}

impl TunnelMode {
    /// Parse from a configuration string.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "https-over-https" | "httpsoverhttps" => Ok(TunnelMode::HttpsOverHttps),
            "https-over-http" | "httpsoverhttp" => Ok(TunnelMode::HttpsOverHttp),
            other => Err(GatewayError::Configuration(format!(
                "unknown tunnel mode: {}",
                other
            ))),
        }
    }

    /// URL scheme used to reach the proxy itself.
    fn proxy_scheme(self) -> &'static str {
        match self {
            TunnelMode::HttpsOverHttps => "https",
            TunnelMode::HttpsOverHttp => "http",
        }
    }
}

/// Everything needed to build one tunnel agent.
///
/// Constructed fresh per outbound call and owned by the caller; nothing here
/// is persisted or shared process-wide.
#[derive(Clone, Debug)]
pub struct TunnelConfig {
    /// Outbound proxy host, e.g. `tntabc123.sandbox.verygoodproxy.com`
    pub destination_host: String,

    /// Outbound proxy port
    pub destination_port: u16,

    /// Proxy Basic-auth username
    pub proxy_username: String,

    /// Proxy Basic-auth password
    pub proxy_password: String,

    /// Tunnel transport mode
    pub mode: TunnelMode,

    /// TLS validation-name override (sandbox trust relaxation)
    pub server_name: Option<String>,

    /// PEM-encoded CA certificate for the proxy's chain (production pinning)
    pub ca_cert_pem: Option<Vec<u8>>,
}

impl TunnelConfig {
    /// Create a config with the default port, TLS-over-TLS mode and no
    /// TLS overrides.
    pub fn new(
        destination_host: impl Into<String>,
        proxy_username: impl Into<String>,
        proxy_password: impl Into<String>,
    ) -> Self {
        Self {
            destination_host: destination_host.into(),
            destination_port: DEFAULT_TUNNEL_PORT,
            proxy_username: proxy_username.into(),
            proxy_password: proxy_password.into(),
            mode: TunnelMode::HttpsOverHttps,
            server_name: None,
            ca_cert_pem: None,
        }
    }

    /// URL the HTTP client will use to reach the proxy.
    pub fn proxy_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.mode.proxy_scheme(),
            self.destination_host,
            self.destination_port
        )
    }

    fn validate(&self) -> Result<()> {
        if self.destination_host.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "tunnel destination host is required".into(),
            ));
        }
        if self.destination_port == 0 {
            return Err(GatewayError::Configuration(
                "tunnel destination port must be non-zero".into(),
            ));
        }
        if self.proxy_username.is_empty() {
            return Err(GatewayError::Configuration(
                "proxy username is required".into(),
            ));
        }
        if self.proxy_password.is_empty() {
            return Err(GatewayError::Configuration(
                "proxy password is required".into(),
            ));
        }
        Ok(())
    }

    /// Build an independent tunnel agent from this config.
    ///
    /// Fails with a configuration error before any network activity; the
    /// first actual connection happens when a request is issued through the
    /// returned agent.
    pub fn build(&self) -> Result<TunnelAgent> {
        self.validate()?;

        let proxy_url = self.proxy_url();
        let proxy = reqwest::Proxy::all(&proxy_url)
            .map_err(|e| GatewayError::Configuration(format!("invalid proxy url: {}", e)))?
            .basic_auth(&self.proxy_username, &self.proxy_password);

        let mut builder = reqwest::Client::builder().proxy(proxy);

        if let Some(ref pem) = self.ca_cert_pem {
            let cert = reqwest::Certificate::from_pem(pem)
                .map_err(|e| GatewayError::Configuration(format!("invalid CA certificate: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        } else if let Some(ref server_name) = self.server_name {
            if server_name != &self.destination_host {
                tracing::warn!(
                    server_name = %server_name,
                    host = %self.destination_host,
                    "no CA supplied; disabling hostname verification (sandbox only)"
                );
                builder = builder.danger_accept_invalid_hostnames(true);
            }
        }

        let client = builder
            .build()
            .map_err(|e| GatewayError::Configuration(format!("client build failed: {}", e)))?;

        tracing::debug!(proxy = %proxy_url, mode = ?self.mode, "tunnel agent built");

        Ok(TunnelAgent { client, proxy_url })
    }
}

/// An HTTP client bound to one outbound proxy.
///
/// Agents are independent: building twice from the same config yields two
/// clients with identical connection parameters and no shared state.
#[derive(Clone, Debug)]
pub struct TunnelAgent {
    client: reqwest::Client,
    proxy_url: String,
}

impl TunnelAgent {
    /// The underlying HTTP client routed through the proxy.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Proxy URL this agent connects through.
    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    /// An agent that connects directly, without any proxy. Used for flows
    /// that carry no aliased data (e.g. the collect-token exchange) and for
    /// exercising the dispatcher against local stubs.
    pub fn direct() -> Self {
        Self {
            client: reqwest::Client::new(),
            proxy_url: String::new(),
        }
    }
}
