//! Gateway Error Types

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Gateway error taxonomy
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or invalid proxy/credential configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed caller input, rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Tunnel handshake or network failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// PSP or token endpoint returned a non-2xx response
    #[error("Upstream error ({status}): {detail}")]
    Upstream { status: u16, detail: String },
}

impl GatewayError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Configuration(_) => "Service configuration error.".into(),
            GatewayError::Validation(msg) => format!("Invalid request: {}", msg),
            GatewayError::Transport(_) => {
                "Could not reach the payment network. Please try again.".into()
            }
            GatewayError::Upstream { detail, .. } => {
                format!("Payment provider error: {}", detail)
            }
        }
    }

    /// HTTP status the serving layer should map this error to
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::Configuration(_) | GatewayError::Validation(_) => 400,
            GatewayError::Transport(_) => 502,
            GatewayError::Upstream { status, .. } => *status,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_is_retryable() {
        assert!(GatewayError::Transport("reset".into()).is_retryable());
        assert!(!GatewayError::Configuration("missing".into()).is_retryable());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(GatewayError::Validation("bad".into()).http_status(), 400);
        assert_eq!(GatewayError::Transport("down".into()).http_status(), 502);
        assert_eq!(
            GatewayError::Upstream { status: 402, detail: "declined".into() }.http_status(),
            402
        );
    }
}
