//! Listing Search Module
//!
//! Queries the marketplace catalog through the rate-limited proxy. The query
//! can arrive on the input port (from an upstream module) or from config;
//! the port value wins when both are present.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use atelier_marketplace_adapter::{MarketplaceProxy, ProxyRequest};
use automation_engine::{
    ConfigFieldSpec, ConfigFieldType, DataType, DescriptorFn, EngineError, ModuleCategory,
    ModuleHandler, ModuleType, PortSpec, Result,
};
use serde_json::{json, Value};

/// Listing Search
///
/// # Inputs
/// - `query` (optional) - Search text, overrides the configured query
///
/// # Outputs
/// - `results` - Matching listings
/// - `count` - Number of matches
pub struct ListingSearchModule {
    proxy: Arc<MarketplaceProxy>,
    client_key: String,
}

impl ListingSearchModule {
    pub const TYPE_ID: &'static str = "listing-search";

    /// Create a search module dispatching through the given proxy
    pub fn new(proxy: Arc<MarketplaceProxy>) -> Self {
        Self {
            proxy,
            client_key: "automation".to_string(),
        }
    }

    /// Use a specific client key for rate limiting
    pub fn with_client_key(mut self, key: impl Into<String>) -> Self {
        self.client_key = key.into();
        self
    }

    pub fn spec() -> ModuleType {
        ModuleType {
            id: Self::TYPE_ID.to_string(),
            category: ModuleCategory::Marketplace,
            label: "Listing Search".to_string(),
            description: "Searches the shop's marketplace listings".to_string(),
            inputs: vec![PortSpec::optional("query", "Query", DataType::String)],
            outputs: vec![
                PortSpec::optional("results", "Results", DataType::Array),
                PortSpec::optional("count", "Count", DataType::Number),
            ],
            config_fields: vec![
                ConfigFieldSpec::optional("query", "Query", ConfigFieldType::Text),
                ConfigFieldSpec::optional("limit", "Limit", ConfigFieldType::Number),
            ],
        }
    }
}

inventory::submit!(DescriptorFn(ListingSearchModule::spec));

#[async_trait]
impl ModuleHandler for ListingSearchModule {
    async fn run(
        &self,
        module_id: &str,
        inputs: &HashMap<String, Value>,
        config: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>> {
        let query = inputs
            .get("query")
            .and_then(|v| v.as_str())
            .or_else(|| config.get("query").and_then(|v| v.as_str()))
            .unwrap_or("");
        let limit = config.get("limit").and_then(|v| v.as_u64()).unwrap_or(25);

        log::debug!("ListingSearch {}: query='{}'", module_id, query);

        let request = ProxyRequest {
            endpoint: "listings/search".to_string(),
            params: json!({"query": query, "limit": limit}),
        };
        let data = self
            .proxy
            .call(&self.client_key, &request)
            .await
            .map_err(|e| EngineError::failed(e.to_string()))?;

        let mut outputs = HashMap::new();
        outputs.insert(
            "results".to_string(),
            data.get("results").cloned().unwrap_or(json!([])),
        );
        outputs.insert(
            "count".to_string(),
            data.get("count").cloned().unwrap_or(json!(0)),
        );
        Ok(outputs)
    }
}
