//! Marketplace backends
//!
//! The proxy dispatches to a `MarketplaceBackend`, which is the seam a real
//! marketplace API integration replaces. `SimulatedBackend` serves a small
//! fixture catalog for development and tests; `HttpBackend` forwards to a
//! live endpoint.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{AdapterError, Result};

/// A marketplace request handler: endpoint + params in, JSON data out
#[async_trait]
pub trait MarketplaceBackend: Send + Sync {
    /// Handle one request for the given endpoint
    async fn dispatch(&self, endpoint: &str, params: &Value) -> Result<Value>;
}

/// Fixture-backed backend standing in for the real marketplace API
pub struct SimulatedBackend;

impl SimulatedBackend {
    fn catalog() -> Vec<Value> {
        vec![
            json!({"id": "l-101", "title": "Stoneware Mug, speckled glaze", "price": 28.0, "quantity": 12}),
            json!({"id": "l-102", "title": "Linen Tote Bag, natural", "price": 34.0, "quantity": 5}),
            json!({"id": "l-103", "title": "Walnut Serving Board", "price": 59.0, "quantity": 3}),
            json!({"id": "l-104", "title": "Ceramic Planter, matte white", "price": 42.0, "quantity": 8}),
        ]
    }
}

#[async_trait]
impl MarketplaceBackend for SimulatedBackend {
    async fn dispatch(&self, endpoint: &str, params: &Value) -> Result<Value> {
        match endpoint {
            "listings/search" => {
                let query = params
                    .get("query")
                    .and_then(|q| q.as_str())
                    .unwrap_or("")
                    .to_lowercase();
                let limit = params
                    .get("limit")
                    .and_then(|l| l.as_u64())
                    .unwrap_or(25) as usize;

                let results: Vec<Value> = Self::catalog()
                    .into_iter()
                    .filter(|listing| {
                        query.is_empty()
                            || listing
                                .get("title")
                                .and_then(|t| t.as_str())
                                .is_some_and(|t| t.to_lowercase().contains(&query))
                    })
                    .take(limit)
                    .collect();

                let count = results.len();
                Ok(json!({"results": results, "count": count}))
            }
            "shop/stats" => Ok(json!({
                "activeListings": Self::catalog().len(),
                "pendingOrders": 2,
                "favorites": 418
            })),
            other => Err(AdapterError::UnknownEndpoint(other.to_string())),
        }
    }
}

/// Backend that forwards requests to a live marketplace API over HTTP
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend forwarding to `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AdapterError::Upstream(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MarketplaceBackend for HttpBackend {
    async fn dispatch(&self, endpoint: &str, params: &Value) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("Forwarding marketplace request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| AdapterError::Upstream(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AdapterError::RateLimited);
        }
        if !status.is_success() {
            return Err(AdapterError::Upstream(format!(
                "upstream returned {}",
                status
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AdapterError::Upstream(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_search_filters_by_query() {
        let backend = SimulatedBackend;
        let data = backend
            .dispatch("listings/search", &json!({"query": "mug"}))
            .await
            .unwrap();

        assert_eq!(data["count"], 1);
        assert_eq!(data["results"][0]["id"], "l-101");
    }

    #[tokio::test]
    async fn test_simulated_search_empty_query_returns_all() {
        let backend = SimulatedBackend;
        let data = backend
            .dispatch("listings/search", &json!({}))
            .await
            .unwrap();

        assert_eq!(data["count"], 4);
    }

    #[tokio::test]
    async fn test_simulated_search_respects_limit() {
        let backend = SimulatedBackend;
        let data = backend
            .dispatch("listings/search", &json!({"limit": 2}))
            .await
            .unwrap();

        assert_eq!(data["results"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let backend = SimulatedBackend;
        let err = backend.dispatch("listings/teleport", &json!({})).await.unwrap_err();
        assert!(matches!(err, AdapterError::UnknownEndpoint(_)));
    }
}
