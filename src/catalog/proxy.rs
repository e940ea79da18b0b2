use serde_json::Value;

use crate::catalog::transport::{CatalogReply, CatalogTransport};
use crate::logger;
use crate::models::http_response::{CardsPayload, CatalogFailure, CatalogListing, ErrorPayload};
use crate::models::settings::Credential;
use crate::utils::errors::{ProxyError, INTERNAL_ERROR_MESSAGE};

/// Status and JSON body of a `/api/cards` answer.
#[derive(Debug, Clone)]
pub struct ProxyReply {
    pub status: u16,
    pub body: String,
}

impl ProxyReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Forwards card listing requests to the catalog with the server-held key.
///
/// Holds no mutable state, so a single instance serves every connection.
pub struct CardProxy<T: CatalogTransport> {
    transport: T,
    catalog_url: String,
    credential: Credential,
}

impl<T: CatalogTransport> CardProxy<T> {
    pub fn new(transport: T, catalog_url: impl Into<String>, credential: Credential) -> Self {
        Self {
            transport,
            catalog_url: catalog_url.into(),
            credential,
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches the catalog and returns its `items` untouched.
    ///
    /// # Returns
    /// * `Ok(Vec<Value>)` - every record exactly as the catalog sent it.
    /// * `Err(ProxyError)` - missing key, a failing catalog status, or a transport/parse fault.
    pub async fn fetch_cards(&self) -> Result<Vec<Value>, ProxyError> {
        let token = self.credential.resolve().ok_or(ProxyError::MissingCredential)?;

        logger!(DEBUG, "[PROXY] GET {}", &self.catalog_url);
        let reply = self.transport.get(&self.catalog_url, &token).await?;

        if !reply.is_success() {
            return Err(ProxyError::Upstream {
                status: reply.status,
                reason: failure_reason(&reply),
            });
        }

        let listing = serde_json::from_str::<CatalogListing>(&reply.body)
            .map_err(|e| ProxyError::MalformedBody(e.to_string()))?;

        logger!(DEBUG, "[PROXY] Catalog returned {} cards", listing.items.len());
        Ok(listing.items)
    }

    /// Runs `fetch_cards` and shapes the outcome into the endpoint's HTTP answer.
    pub async fn handle(&self) -> ProxyReply {
        match self.fetch_cards().await {
            Ok(cards) => match serde_json::to_string(&CardsPayload { cards }) {
                Ok(body) => ProxyReply { status: 200, body },
                Err(error) => {
                    logger!(ERROR, "[PROXY] Could not serialize card payload ({error})");
                    error_reply(500, INTERNAL_ERROR_MESSAGE)
                }
            },
            Err(error) => {
                match &error {
                    ProxyError::Upstream { .. } => logger!(WARN, "[PROXY] {error}"),
                    _ => logger!(ERROR, "[PROXY] {error}"),
                }
                error_reply(error.status(), &error.public_message())
            }
        }
    }
}

/// Best-effort `reason` from a failing catalog body.
fn failure_reason(reply: &CatalogReply) -> Option<String> {
    serde_json::from_str::<CatalogFailure>(&reply.body)
        .ok()
        .and_then(|failure| failure.reason)
        .filter(|reason| !reason.is_empty())
}

pub fn error_reply(status: u16, message: &str) -> ProxyReply {
    let payload = ErrorPayload { message: message.to_string() };
    let body = serde_json::to_string(&payload)
        .unwrap_or_else(|_| String::from(r#"{"message":"An internal server error occurred."}"#));
    ProxyReply { status, body }
}
