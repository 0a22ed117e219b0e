//! Text Generator Module
//!
//! Simulated copywriting backend. Renders the configured template against the
//! incoming context and applies a tone-specific sign-off. A real generative
//! backend replaces this handler behind the same spec.

use std::collections::HashMap;

use async_trait::async_trait;
use automation_engine::{
    template, ConfigFieldSpec, ConfigFieldType, DataType, DescriptorFn, EngineError,
    ModuleCategory, ModuleHandler, ModuleType, PortSpec, Result,
};
use serde_json::Value;

/// Text Generator
///
/// # Inputs
/// - `context` (optional) - Values substituted into the template
///
/// # Outputs
/// - `text` - Generated listing copy
pub struct TextGeneratorModule;

impl TextGeneratorModule {
    pub const TYPE_ID: &'static str = "text-generator";

    pub fn spec() -> ModuleType {
        ModuleType {
            id: Self::TYPE_ID.to_string(),
            category: ModuleCategory::Ai,
            label: "Text Generator".to_string(),
            description: "Generates listing copy from a template".to_string(),
            inputs: vec![PortSpec::optional("context", "Context", DataType::Object)],
            outputs: vec![PortSpec::optional("text", "Text", DataType::String)],
            config_fields: vec![
                ConfigFieldSpec::required("template", "Template", ConfigFieldType::TextArea),
                ConfigFieldSpec::select("tone", "Tone", vec!["warm", "playful", "minimal"]),
            ],
        }
    }

    fn sign_off(tone: &str) -> &'static str {
        match tone {
            "warm" => "\n\nMade with care in our studio.",
            "playful" => "\n\nCome meet your new favorite thing!",
            _ => "",
        }
    }
}

inventory::submit!(DescriptorFn(TextGeneratorModule::spec));

#[async_trait]
impl ModuleHandler for TextGeneratorModule {
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
        let tone = config.get("tone").and_then(|v| v.as_str()).unwrap_or("minimal");

        let values: HashMap<String, Value> = inputs
            .get("context")
            .and_then(|v| v.as_object())
            .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        let mut text = template::render(template_text, &values);
        text.push_str(Self::sign_off(tone));

        let mut outputs = HashMap::new();
        outputs.insert("text".to_string(), Value::String(text));
        Ok(outputs)
    }
}
