//! Manual Trigger Module
//!
//! Entry point for workflows the seller runs by hand. It has no inputs and
//! emits its configured payload plus the firing timestamp.

use std::collections::HashMap;

use async_trait::async_trait;
use automation_engine::{
    ConfigFieldSpec, ConfigFieldType, DataType, DescriptorFn, ModuleCategory, ModuleHandler,
    ModuleType, PortSpec, Result,
};
use serde_json::Value;

/// Manual Trigger
///
/// # Outputs
/// - `payload` - The configured payload value (null when unset)
/// - `fired_at` - RFC 3339 timestamp of the run
pub struct ManualTriggerModule;

impl ManualTriggerModule {
    pub const TYPE_ID: &'static str = "manual-trigger";

    pub fn spec() -> ModuleType {
        ModuleType {
            id: Self::TYPE_ID.to_string(),
            category: ModuleCategory::Triggers,
            label: "Manual Trigger".to_string(),
            description: "Starts the workflow on demand".to_string(),
            inputs: vec![],
            outputs: vec![
                PortSpec::optional("payload", "Payload", DataType::Any),
                PortSpec::optional("fired_at", "Fired At", DataType::String),
            ],
            config_fields: vec![ConfigFieldSpec::optional(
                "payload",
                "Payload",
                ConfigFieldType::TextArea,
            )],
        }
    }
}

inventory::submit!(DescriptorFn(ManualTriggerModule::spec));

#[async_trait]
impl ModuleHandler for ManualTriggerModule {
    async fn run(
        &self,
        module_id: &str,
        _inputs: &HashMap<String, Value>,
        config: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>> {
        // A string payload that parses as JSON is passed through parsed, so a
        // pasted object in the config box behaves like structured data.
        let payload = match config.get("payload") {
            Some(Value::String(s)) => serde_json::from_str(s).unwrap_or(Value::String(s.clone())),
            Some(other) => other.clone(),
            None => Value::Null,
        };

        log::debug!("ManualTrigger {}: firing", module_id);

        let mut outputs = HashMap::new();
        outputs.insert("payload".to_string(), payload);
        outputs.insert(
            "fired_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        Ok(outputs)
    }
}
