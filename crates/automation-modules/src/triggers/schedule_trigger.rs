//! Schedule Trigger Module
//!
//! Simulated recurring entry point. The dashboard's scheduler decides when to
//! run; this module just stamps the tick so downstream modules can see the
//! interval and firing time.

use std::collections::HashMap;

use async_trait::async_trait;
use automation_engine::{
    ConfigFieldSpec, ConfigFieldType, DataType, DescriptorFn, ModuleCategory, ModuleHandler,
    ModuleType, PortSpec, Result,
};
use serde_json::{json, Value};

/// Schedule Trigger
///
/// # Outputs
/// - `tick` - `{intervalMinutes, firedAt}` for the current firing
pub struct ScheduleTriggerModule;

impl ScheduleTriggerModule {
    pub const TYPE_ID: &'static str = "schedule-trigger";

    pub fn spec() -> ModuleType {
        ModuleType {
            id: Self::TYPE_ID.to_string(),
            category: ModuleCategory::Triggers,
            label: "Schedule Trigger".to_string(),
            description: "Starts the workflow on a recurring interval".to_string(),
            inputs: vec![],
            outputs: vec![PortSpec::optional("tick", "Tick", DataType::Object)],
            config_fields: vec![ConfigFieldSpec::required(
                "interval_minutes",
                "Interval (minutes)",
                ConfigFieldType::Number,
            )],
        }
    }
}

inventory::submit!(DescriptorFn(ScheduleTriggerModule::spec));

#[async_trait]
impl ModuleHandler for ScheduleTriggerModule {
    async fn run(
        &self,
        _module_id: &str,
        _inputs: &HashMap<String, Value>,
        config: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>> {
        let interval = config
            .get("interval_minutes")
            .and_then(|v| v.as_f64())
            .unwrap_or(60.0);

        let mut outputs = HashMap::new();
        outputs.insert(
            "tick".to_string(),
            json!({
                "intervalMinutes": interval,
                "firedAt": chrono::Utc::now().to_rfc3339(),
            }),
        );
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tick_carries_interval() {
        let module = ScheduleTriggerModule;
        let mut config = HashMap::new();
        config.insert("interval_minutes".to_string(), json!(15));

        let outputs = module.run("sched-1", &HashMap::new(), &config).await.unwrap();
        assert_eq!(outputs["tick"]["intervalMinutes"], json!(15.0));
        assert!(outputs["tick"]["firedAt"].is_string());
    }
}
