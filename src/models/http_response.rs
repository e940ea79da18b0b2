use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful catalog body. Only `items` is read; records stay raw.
#[derive(Debug, Deserialize)]
pub struct CatalogListing {
    pub items: Vec<Value>,
}

/// Failure body of the catalog, e.g. `{"reason": "accessDenied", "message": "..."}`.
#[derive(Debug, Deserialize, Default)]
pub struct CatalogFailure {
    #[serde(default)]
    pub reason: Option<String>,
}

/// What `/api/cards` returns on success.
#[derive(Debug, Serialize, Deserialize)]
pub struct CardsPayload {
    pub cards: Vec<Value>,
}

/// What every endpoint returns on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}
