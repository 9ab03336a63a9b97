//! # vault-gateway
//!
//! Tunneled PSP provisioning over a vault outbound proxy.
//!
//! Sensitive card fields never transit this crate: the vault's collect SDK
//! hands out opaque aliases, and the outbound proxy substitutes the real
//! PAN/CVC only after the request has left this process.
//!
//! ```text
//! ┌──────────┐   aliases    ┌─────────────────┐  real values  ┌─────────┐
//! │ gateway  │─────────────▶│ outbound proxy  │──────────────▶│ PSP API │
//! │ (here)   │  via tunnel  │ (substitution)  │      TLS      │         │
//! └──────────┘              └─────────────────┘               └─────────┘
//! ```
//!
//! ## Flow
//!
//! 1. [`TunnelConfig::build`] produces a [`TunnelAgent`]: an HTTP client
//!    that routes everything through the outbound proxy with Basic
//!    credentials and the configured TLS trust mode.
//! 2. [`provision_payment_method`] issues exactly one POST with the aliased
//!    fields and normalizes the outcome into a [`ProvisionResult`].
//! 3. [`fetch_collect_token`] covers the supporting OAuth2
//!    client-credentials exchange for the collect SDK.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vault_gateway::{provision_payment_method, PspEndpoint, Settings};
//!
//! let settings = Settings::from_env()?;
//! let agent = settings.tunnel_config().build()?;
//! let endpoint = PspEndpoint::stripe(&settings.psp_base_url, "sk_test_xxx");
//! let result = provision_payment_method(&agent, &endpoint, &card).await;
//! ```

mod card;
mod config;
mod dispatch;
mod error;
mod token;
mod tunnel;

pub use card::{AliasedCard, CardAttributes, CardData, CardObject};
pub use config::{Environment, Settings, DEFAULT_PSP_BASE_URL};
pub use dispatch::{provision_payment_method, ProvisionResult, PspEndpoint};
pub use error::{GatewayError, Result};
pub use token::{fetch_collect_token, DEFAULT_TOKEN_URL};
pub use tunnel::{TunnelAgent, TunnelConfig, TunnelMode, DEFAULT_TUNNEL_PORT};
