//! Conditional Module
//!
//! Routes a value to one of two outputs based on a boolean condition. The
//! unused branch emits null so downstream modules can tell which path fired.

use std::collections::HashMap;

use async_trait::async_trait;
use automation_engine::{
    DataType, DescriptorFn, ModuleCategory, ModuleHandler, ModuleType, PortSpec, Result,
};
use serde_json::Value;

/// Conditional
///
/// # Inputs
/// - `condition` (required) - Which branch to take
/// - `value` (optional) - The value to route
///
/// # Outputs
/// - `true_out` - The value when the condition holds, else null
/// - `false_out` - The value when the condition fails, else null
pub struct ConditionalModule;

impl ConditionalModule {
    pub const TYPE_ID: &'static str = "conditional";

    pub fn spec() -> ModuleType {
        ModuleType {
            id: Self::TYPE_ID.to_string(),
            category: ModuleCategory::Logic,
            label: "Conditional".to_string(),
            description: "Routes a value by a boolean condition".to_string(),
            inputs: vec![
                PortSpec::required("condition", "Condition", DataType::Boolean),
                PortSpec::optional("value", "Value", DataType::Any),
            ],
            outputs: vec![
                PortSpec::optional("true_out", "True", DataType::Any),
                PortSpec::optional("false_out", "False", DataType::Any),
            ],
            config_fields: vec![],
        }
    }
}

inventory::submit!(DescriptorFn(ConditionalModule::spec));

#[async_trait]
impl ModuleHandler for ConditionalModule {
    async fn run(
        &self,
        _module_id: &str,
        inputs: &HashMap<String, Value>,
        _config: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>> {
        let condition = inputs
            .get("condition")
            .and_then(|c| c.as_bool())
            .unwrap_or(false);
        let value = inputs.get("value").cloned().unwrap_or(Value::Null);

        let mut outputs = HashMap::new();
        if condition {
            outputs.insert("true_out".to_string(), value);
            outputs.insert("false_out".to_string(), Value::Null);
        } else {
            outputs.insert("true_out".to_string(), Value::Null);
            outputs.insert("false_out".to_string(), value);
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn route(condition: Value, value: Value) -> HashMap<String, Value> {
        let mut inputs = HashMap::new();
        inputs.insert("condition".to_string(), condition);
        inputs.insert("value".to_string(), value);
        ConditionalModule
            .run("cond-1", &inputs, &HashMap::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_true_branch() {
        let outputs = route(Value::Bool(true), serde_json::json!("keep")).await;
        assert_eq!(outputs["true_out"], "keep");
        assert_eq!(outputs["false_out"], Value::Null);
    }

    #[tokio::test]
    async fn test_false_branch() {
        let outputs = route(Value::Bool(false), serde_json::json!("keep")).await;
        assert_eq!(outputs["true_out"], Value::Null);
        assert_eq!(outputs["false_out"], "keep");
    }

    #[tokio::test]
    async fn test_non_boolean_condition_is_false() {
        let outputs = route(serde_json::json!("yes"), serde_json::json!(1)).await;
        assert_eq!(outputs["false_out"], serde_json::json!(1));
    }
}
