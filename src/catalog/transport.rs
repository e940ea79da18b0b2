use std::future::Future;

use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::utils::errors::TransportError;

/// Raw answer from the card catalog: status code plus the unparsed body.
#[derive(Debug, Clone)]
pub struct CatalogReply {
    pub status: u16,
    pub body: String,
}

impl CatalogReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One outbound GET against the catalog. Implementations must not retry.
pub trait CatalogTransport: Send + Sync {
    fn get(
        &self,
        url: &str,
        token: &str,
    ) -> impl Future<Output = Result<CatalogReply, TransportError>> + Send;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl CatalogTransport for ReqwestTransport {
    async fn get(&self, url: &str, token: &str) -> Result<CatalogReply, TransportError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(CatalogReply { status, body })
    }
}
