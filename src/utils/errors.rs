use thiserror::Error;

pub const MISSING_CREDENTIAL_MESSAGE: &str = "API key is not configured on the server.";
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "Failed to fetch data from Supercell API.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";

/// Failures of the card proxy. Only `public_message` ever reaches a caller.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Catalog API key is missing from the server configuration")]
    MissingCredential,
    #[error("Card catalog answered {status}: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Upstream { status: u16, reason: Option<String> },
    #[error("Card catalog request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("Card catalog body could not be read: {0}")]
    MalformedBody(String),
}

impl ProxyError {
    /// HTTP status the proxy answers with for this failure.
    pub fn status(&self) -> u16 {
        match self {
            ProxyError::Upstream { status, .. } => *status,
            _ => 500,
        }
    }

    /// Message safe to send to the caller.
    pub fn public_message(&self) -> String {
        match self {
            ProxyError::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
            ProxyError::Upstream { reason, .. } => reason
                .clone()
                .unwrap_or_else(|| UPSTREAM_FALLBACK_MESSAGE.to_string()),
            ProxyError::Transport(_) | ProxyError::MalformedBody(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_body() || error.is_decode() {
            TransportError::Body(error.to_string())
        } else {
            TransportError::Network(error.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request head is empty")]
    Empty,
    #[error("Request head exceeds {0} bytes")]
    TooLarge(usize),
    #[error("Request head is not valid UTF-8")]
    InvalidEncoding,
    #[error("Malformed request line: `{0}`")]
    MalformedRequestLine(String),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Connection I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Unknown log level `{0}`")]
    InvalidLogLevel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_maps_to_500() {
        let error = ProxyError::MissingCredential;
        assert_eq!(error.status(), 500);
        assert_eq!(error.public_message(), MISSING_CREDENTIAL_MESSAGE);
    }

    #[test]
    fn test_upstream_keeps_status_and_reason() {
        let error = ProxyError::Upstream { status: 403, reason: Some("invalid key".to_string()) };
        assert_eq!(error.status(), 403);
        assert_eq!(error.public_message(), "invalid key");
    }

    #[test]
    fn test_upstream_without_reason_uses_fallback() {
        let error = ProxyError::Upstream { status: 503, reason: None };
        assert_eq!(error.status(), 503);
        assert_eq!(error.public_message(), "Failed to fetch data from Supercell API.");
    }

    #[test]
    fn test_faults_never_leak_detail() {
        let error = ProxyError::Transport(TransportError::Network("dns lookup failed".to_string()));
        assert_eq!(error.status(), 500);
        assert_eq!(error.public_message(), INTERNAL_ERROR_MESSAGE);

        let error = ProxyError::MalformedBody("expected value at line 1".to_string());
        assert_eq!(error.public_message(), INTERNAL_ERROR_MESSAGE);
    }
}
