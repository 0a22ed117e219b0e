//! Merge Module
//!
//! Joins string items into a single block of text. Accepts either an array
//! of strings or a single string on its input port; blank entries are
//! dropped before joining.

use std::collections::HashMap;

use async_trait::async_trait;
use automation_engine::{
    ConfigFieldSpec, ConfigFieldType, DataType, DescriptorFn, ModuleCategory, ModuleHandler,
    ModuleType, PortSpec, Result,
};
use serde_json::{json, Value};

/// Merge
///
/// # Inputs
/// - `items` (optional) - Array of strings, or a single string
///
/// # Outputs
/// - `merged` - Joined text
/// - `count` - Number of non-blank items joined
pub struct MergeModule;

impl MergeModule {
    pub const TYPE_ID: &'static str = "merge";

    pub fn spec() -> ModuleType {
        ModuleType {
            id: Self::TYPE_ID.to_string(),
            category: ModuleCategory::Logic,
            label: "Merge".to_string(),
            description: "Joins text items into one block".to_string(),
            inputs: vec![PortSpec::optional("items", "Items", DataType::Any)],
            outputs: vec![
                PortSpec::optional("merged", "Merged", DataType::String),
                PortSpec::optional("count", "Count", DataType::Number),
            ],
            config_fields: vec![ConfigFieldSpec::optional(
                "separator",
                "Separator",
                ConfigFieldType::Text,
            )],
        }
    }
}

inventory::submit!(DescriptorFn(MergeModule::spec));

#[async_trait]
impl ModuleHandler for MergeModule {
    async fn run(
        &self,
        _module_id: &str,
        inputs: &HashMap<String, Value>,
        config: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>> {
        let items: Vec<String> = match inputs.get("items") {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .filter(|s| !s.trim().is_empty())
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
            _ => vec![],
        };
        let separator = config
            .get("separator")
            .and_then(|v| v.as_str())
            .unwrap_or("\n");

        let merged = items.join(separator);
        let count = items.len();

        let mut outputs = HashMap::new();
        outputs.insert("merged".to_string(), json!(merged));
        outputs.insert("count".to_string(), json!(count));
        Ok(outputs)
    }
}
