//! Listing Upsert Module
//!
//! Writes a listing row through the injected `RowSink`. The host decides
//! where rows actually land (persistence layer, export file, etc).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use automation_engine::{
    ConfigFieldSpec, ConfigFieldType, DataType, DescriptorFn, EngineError, ModuleCategory,
    ModuleHandler, ModuleType, PortSpec, Result,
};
use serde_json::Value;

use crate::sink::RowSink;

/// Listing Upsert
///
/// # Inputs
/// - `listing` (required) - The listing row to persist
///
/// # Outputs
/// - `saved` - The stored row
pub struct ListingUpsertModule {
    sink: Arc<dyn RowSink>,
}

impl ListingUpsertModule {
    pub const TYPE_ID: &'static str = "listing-upsert";

    /// Default destination table when none is configured
    pub const DEFAULT_TABLE: &'static str = "listings";

    /// Create an upsert module writing through the given sink
    pub fn new(sink: Arc<dyn RowSink>) -> Self {
        Self { sink }
    }

    pub fn spec() -> ModuleType {
        ModuleType {
            id: Self::TYPE_ID.to_string(),
            category: ModuleCategory::Marketplace,
            label: "Listing Upsert".to_string(),
            description: "Writes a listing row to a table".to_string(),
            inputs: vec![PortSpec::required("listing", "Listing", DataType::Object)],
            outputs: vec![PortSpec::optional("saved", "Saved", DataType::Object)],
            config_fields: vec![ConfigFieldSpec::optional(
                "table",
                "Table",
                ConfigFieldType::Text,
            )],
        }
    }
}

inventory::submit!(DescriptorFn(ListingUpsertModule::spec));

#[async_trait]
impl ModuleHandler for ListingUpsertModule {
    async fn run(
        &self,
        module_id: &str,
        inputs: &HashMap<String, Value>,
        config: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>> {
        let listing = inputs
            .get("listing")
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| EngineError::MissingInput("listing".to_string()))?;
        let table = config
            .get("table")
            .and_then(|v| v.as_str())
            .unwrap_or(Self::DEFAULT_TABLE);

        log::debug!("ListingUpsert {}: writing to '{}'", module_id, table);
        let saved = self.sink.write(table, listing)?;

        let mut outputs = HashMap::new();
        outputs.insert("saved".to_string(), saved);
        Ok(outputs)
    }
}
