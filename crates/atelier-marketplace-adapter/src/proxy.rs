//! Rate-limited marketplace proxy
//!
//! The proxy is the boundary between automation modules and the marketplace
//! API. Requests and responses use the dashboard's wire envelope:
//!
//! ```json
//! { "endpoint": "listings/search", "params": {"query": "mug"} }
//! { "success": true, "data": {...} }
//! { "success": false, "error": "Rate limit exceeded. Please try again later." }
//! ```
//!
//! Quota exhaustion answers with HTTP 429 and the failure envelope; it is a
//! retryable condition and is never silently dropped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::MarketplaceBackend;
use crate::error::{AdapterError, Result};
use crate::rate_limit::RollingWindowLimiter;

/// A proxied marketplace request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyRequest {
    /// Marketplace endpoint path (e.g., "listings/search")
    pub endpoint: String,
    /// Endpoint parameters
    #[serde(default)]
    pub params: Value,
}

/// The proxy response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProxyResponse {
    /// Successful envelope carrying data
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failure envelope carrying an error message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Rate-limited front door to a marketplace backend
pub struct MarketplaceProxy {
    backend: Arc<dyn MarketplaceBackend>,
    limiter: RollingWindowLimiter,
}

impl MarketplaceProxy {
    /// Create a proxy over a backend with the given limiter
    pub fn new(backend: Arc<dyn MarketplaceBackend>, limiter: RollingWindowLimiter) -> Self {
        Self { backend, limiter }
    }

    /// Dispatch a request for a client key, returning raw data or a typed
    /// error. Used by in-process callers (automation modules).
    pub async fn call(&self, client_key: &str, request: &ProxyRequest) -> Result<Value> {
        if !self.limiter.check(client_key) {
            log::warn!("Rate limit exceeded for client '{}'", client_key);
            return Err(AdapterError::RateLimited);
        }
        self.backend.dispatch(&request.endpoint, &request.params).await
    }

    /// Dispatch a request and wrap the outcome in the wire envelope with its
    /// HTTP status code. Used at the HTTP boundary.
    pub async fn handle(&self, client_key: &str, request: &ProxyRequest) -> (u16, ProxyResponse) {
        match self.call(client_key, request).await {
            Ok(data) => (200, ProxyResponse::ok(data)),
            Err(e) => (status_for(&e), ProxyResponse::err(e.to_string())),
        }
    }
}

/// HTTP status code for an adapter error
fn status_for(error: &AdapterError) -> u16 {
    match error {
        AdapterError::RateLimited => 429,
        AdapterError::UnknownEndpoint(_) => 404,
        AdapterError::Upstream(_) | AdapterError::Serialization(_) => 502,
    }
}
