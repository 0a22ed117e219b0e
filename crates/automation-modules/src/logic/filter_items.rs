//! Filter Items Module
//!
//! Keeps array elements whose field matches the configured comparison.
//! Comparisons are numeric when both sides parse as numbers, string
//! comparisons otherwise.

use std::collections::HashMap;

use async_trait::async_trait;
use automation_engine::{
    ConfigFieldSpec, ConfigFieldType, DataType, DescriptorFn, EngineError, ModuleCategory,
    ModuleHandler, ModuleType, PortSpec, Result,
};
use serde_json::{json, Value};

/// Filter Items
///
/// # Inputs
/// - `items` (required) - The array to filter
///
/// # Outputs
/// - `items` - Elements that matched
/// - `removed` - Number of elements dropped
pub struct FilterItemsModule;

impl FilterItemsModule {
    pub const TYPE_ID: &'static str = "filter-items";

    pub fn spec() -> ModuleType {
        ModuleType {
            id: Self::TYPE_ID.to_string(),
            category: ModuleCategory::Logic,
            label: "Filter Items".to_string(),
            description: "Filters an array by a field comparison".to_string(),
            inputs: vec![PortSpec::required("items", "Items", DataType::Array)],
            outputs: vec![
                PortSpec::optional("items", "Items", DataType::Array),
                PortSpec::optional("removed", "Removed", DataType::Number),
            ],
            config_fields: vec![
                ConfigFieldSpec::required("field", "Field", ConfigFieldType::Text),
                ConfigFieldSpec {
                    options: Some(
                        ["eq", "neq", "contains", "gt", "lt"]
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    ),
                    ..ConfigFieldSpec::required("op", "Operator", ConfigFieldType::Select)
                },
                ConfigFieldSpec::required("value", "Value", ConfigFieldType::Text),
            ],
        }
    }
}

inventory::submit!(DescriptorFn(FilterItemsModule::spec));

#[async_trait]
impl ModuleHandler for FilterItemsModule {
    async fn run(
        &self,
        _module_id: &str,
        inputs: &HashMap<String, Value>,
        config: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>> {
        let items = inputs
            .get("items")
            .and_then(|v| v.as_array())
            .ok_or_else(|| EngineError::MissingInput("items".to_string()))?;
        let field = config
            .get("field")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::failed("Config field 'field' must be a string"))?;
        let op = config.get("op").and_then(|v| v.as_str()).unwrap_or("eq");
        let expected = config.get("value").cloned().unwrap_or(Value::Null);

        let kept: Vec<Value> = items
            .iter()
            .filter(|item| {
                item.get(field)
                    .is_some_and(|actual| compare(actual, op, &expected))
            })
            .cloned()
            .collect();
        let removed = items.len() - kept.len();

        let mut outputs = HashMap::new();
        outputs.insert("items".to_string(), Value::Array(kept));
        outputs.insert("removed".to_string(), json!(removed));
        Ok(outputs)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    if let (Some(a), Some(b)) = (as_number(actual), as_number(expected)) {
        return a == b;
    }
    actual == expected
}

fn compare(actual: &Value, op: &str, expected: &Value) -> bool {
    match op {
        "eq" => values_equal(actual, expected),
        "neq" => !values_equal(actual, expected),
        "contains" => actual
            .as_str()
            .zip(expected.as_str())
            .is_some_and(|(a, b)| a.to_lowercase().contains(&b.to_lowercase())),
        "gt" => as_number(actual)
            .zip(as_number(expected))
            .is_some_and(|(a, b)| a > b),
        "lt" => as_number(actual)
            .zip(as_number(expected))
            .is_some_and(|(a, b)| a < b),
        _ => false,
    }
}
