//! Apply Template Module
//!
//! Renders a listing template against a value map and reports which
//! placeholders the template declares, for editor hints.

use std::collections::HashMap;

use async_trait::async_trait;
use automation_engine::{
    template, ConfigFieldSpec, ConfigFieldType, DataType, DescriptorFn, EngineError,
    ModuleCategory, ModuleHandler, ModuleType, PortSpec, Result,
};
use serde_json::{json, Value};

/// Apply Template
///
/// # Inputs
/// - `values` (optional) - Substitution values keyed by placeholder name
///
/// # Outputs
/// - `text` - The rendered template
/// - `variables` - Placeholder names the template declares
pub struct ApplyTemplateModule;

impl ApplyTemplateModule {
    pub const TYPE_ID: &'static str = "apply-template";

    pub fn spec() -> ModuleType {
        ModuleType {
            id: Self::TYPE_ID.to_string(),
            category: ModuleCategory::Logic,
            label: "Apply Template".to_string(),
            description: "Renders a {{placeholder}} template".to_string(),
            inputs: vec![PortSpec::optional("values", "Values", DataType::Object)],
            outputs: vec![
                PortSpec::optional("text", "Text", DataType::String),
                PortSpec::optional("variables", "Variables", DataType::Array),
            ],
            config_fields: vec![ConfigFieldSpec::required(
                "template",
                "Template",
                ConfigFieldType::TextArea,
            )],
        }
    }
}

inventory::submit!(DescriptorFn(ApplyTemplateModule::spec));

#[async_trait]
impl ModuleHandler for ApplyTemplateModule {
    async fn run(
        &self,
        _module_id: &str,
        inputs: &HashMap<String, Value>,
        config: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>> {
        let template_text = config
            .get("template")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::failed("Config field 'template' must be a string"))?;

        let values: HashMap<String, Value> = inputs
            .get("values")
            .and_then(|v| v.as_object())
            .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        let mut outputs = HashMap::new();
        outputs.insert(
            "text".to_string(),
            json!(template::render(template_text, &values)),
        );
        outputs.insert(
            "variables".to_string(),
            json!(template::extract_variables(template_text)),
        );
        Ok(outputs)
    }
}
