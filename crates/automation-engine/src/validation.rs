//! Workflow graph validation
//!
//! Validates graph structure, port types, required inputs and configuration.
//! Validation is advisory: the mutation API stays permissive and these checks
//! are run on demand (e.g., before offering the run button). The run engine
//! handles every condition reported here without crashing.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::registry::ModuleRegistry;
use crate::workflow::Workflow;

/// Validation error with location context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Cycle detected in the graph
    CycleDetected,
    /// A module has an unknown type (not in registry)
    UnknownModuleType { module_id: String, type_id: String },
    /// A connection references a module that is not in the workflow
    DanglingEndpoint { module_id: String },
    /// A required input has no connection, config value, or default
    UnsatisfiedRequiredInput { module_id: String, port_id: String },
    /// A required config field is unset
    IncompleteConfig { module_id: String, field_id: String },
    /// A connection joins ports with incompatible data types
    IncompatiblePortTypes {
        source_id: String,
        source_handle: String,
        target_id: String,
        target_handle: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CycleDetected => write!(f, "Cycle detected in workflow graph"),
            Self::UnknownModuleType { module_id, type_id } => {
                write!(f, "Unknown module type '{}' for module '{}'", type_id, module_id)
            }
            Self::DanglingEndpoint { module_id } => {
                write!(f, "Connection references unknown module '{}'", module_id)
            }
            Self::UnsatisfiedRequiredInput { module_id, port_id } => {
                write!(
                    f,
                    "Required input '{}' on module '{}' is not satisfied",
                    port_id, module_id
                )
            }
            Self::IncompleteConfig { module_id, field_id } => {
                write!(
                    f,
                    "Required config field '{}' on module '{}' is unset",
                    field_id, module_id
                )
            }
            Self::IncompatiblePortTypes {
                source_id,
                source_handle,
                target_id,
                target_handle,
            } => {
                write!(
                    f,
                    "Connection {}:{} -> {}:{} joins incompatible port types",
                    source_id, source_handle, target_id, target_handle
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a workflow graph
///
/// Returns all validation errors found (not just the first).
/// Pass a registry to enable module type, port type, and config validation.
pub fn validate_workflow(
    workflow: &Workflow,
    registry: Option<&ModuleRegistry>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_connection_references(workflow, &mut errors);
    detect_cycles(workflow, &mut errors);

    if let Some(reg) = registry {
        validate_module_types(workflow, reg, &mut errors);
        validate_required_inputs(workflow, reg, &mut errors);
        validate_required_config(workflow, reg, &mut errors);
        validate_port_types(workflow, reg, &mut errors);
    }

    errors
}

/// Check that all connection endpoints exist
fn validate_connection_references(workflow: &Workflow, errors: &mut Vec<ValidationError>) {
    let module_ids: HashSet<&str> = workflow.modules.iter().map(|m| m.id.as_str()).collect();

    for conn in &workflow.connections {
        if !module_ids.contains(conn.source_id.as_str()) {
            errors.push(ValidationError::DanglingEndpoint {
                module_id: conn.source_id.clone(),
            });
        }
        if !module_ids.contains(conn.target_id.as_str()) {
            errors.push(ValidationError::DanglingEndpoint {
                module_id: conn.target_id.clone(),
            });
        }
    }
}

/// Detect cycles using Kahn's algorithm (topological sort)
fn detect_cycles(workflow: &Workflow, errors: &mut Vec<ValidationError>) {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for module in &workflow.modules {
        in_degree.insert(&module.id, 0);
    }
    for conn in &workflow.connections {
        if let Some(deg) = in_degree.get_mut(conn.target_id.as_str()) {
            *deg += 1;
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut visited = 0;
    while let Some(module_id) = queue.pop_front() {
        visited += 1;
        for conn in &workflow.connections {
            if conn.source_id == module_id {
                if let Some(deg) = in_degree.get_mut(conn.target_id.as_str()) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(&conn.target_id);
                    }
                }
            }
        }
    }

    if visited < workflow.modules.len() {
        errors.push(ValidationError::CycleDetected);
    }
}

/// Check that all modules have known types in the registry
fn validate_module_types(
    workflow: &Workflow,
    registry: &ModuleRegistry,
    errors: &mut Vec<ValidationError>,
) {
    for module in &workflow.modules {
        if !registry.contains(&module.type_id) {
            errors.push(ValidationError::UnknownModuleType {
                module_id: module.id.clone(),
                type_id: module.type_id.clone(),
            });
        }
    }
}

/// Check that required inputs are connected, configured, or defaulted
fn validate_required_inputs(
    workflow: &Workflow,
    registry: &ModuleRegistry,
    errors: &mut Vec<ValidationError>,
) {
    let mut connected_inputs: HashSet<(&str, &str)> = HashSet::new();
    for conn in &workflow.connections {
        connected_inputs.insert((conn.target_id.as_str(), conn.target_handle.as_str()));
    }

    for module in &workflow.modules {
        if let Some(spec) = registry.get(&module.type_id) {
            for port in &spec.inputs {
                if !port.required {
                    continue;
                }
                let connected = connected_inputs.contains(&(module.id.as_str(), port.id.as_str()));
                let configured = module.config.contains_key(&port.id);
                if !connected && !configured && port.default_value.is_none() {
                    errors.push(ValidationError::UnsatisfiedRequiredInput {
                        module_id: module.id.clone(),
                        port_id: port.id.clone(),
                    });
                }
            }
        }
    }
}

/// Check that required config fields are set
fn validate_required_config(
    workflow: &Workflow,
    registry: &ModuleRegistry,
    errors: &mut Vec<ValidationError>,
) {
    for module in &workflow.modules {
        if let Some(spec) = registry.get(&module.type_id) {
            for field in &spec.config_fields {
                if field.required && !module.config.contains_key(&field.id) {
                    errors.push(ValidationError::IncompleteConfig {
                        module_id: module.id.clone(),
                        field_id: field.id.clone(),
                    });
                }
            }
        }
    }
}

/// Check data type compatibility across every connection
fn validate_port_types(
    workflow: &Workflow,
    registry: &ModuleRegistry,
    errors: &mut Vec<ValidationError>,
) {
    for conn in &workflow.connections {
        let source_port = workflow
            .find_module(&conn.source_id)
            .and_then(|m| registry.get(&m.type_id))
            .and_then(|spec| spec.output(&conn.source_handle));
        let target_port = workflow
            .find_module(&conn.target_id)
            .and_then(|m| registry.get(&m.type_id))
            .and_then(|spec| spec.input(&conn.target_handle));

        if let (Some(source), Some(target)) = (source_port, target_port) {
            if !source.data_type.is_compatible_with(&target.data_type) {
                errors.push(ValidationError::IncompatiblePortTypes {
                    source_id: conn.source_id.clone(),
                    source_handle: conn.source_handle.clone(),
                    target_id: conn.target_id.clone(),
                    target_handle: conn.target_handle.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;
    use crate::types::{
        ConfigFieldSpec, ConfigFieldType, DataType, ModuleCategory, ModuleType, PortSpec,
    };

    fn make_test_registry() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry.register_spec(ModuleType {
            id: "manual-trigger".to_string(),
            category: ModuleCategory::Triggers,
            label: "Manual Trigger".to_string(),
            description: "Starts the workflow".to_string(),
            inputs: vec![],
            outputs: vec![PortSpec::optional("payload", "Payload", DataType::Object)],
            config_fields: vec![],
        });
        registry.register_spec(ModuleType {
            id: "text-generator".to_string(),
            category: ModuleCategory::Ai,
            label: "Text Generator".to_string(),
            description: "Generates listing copy".to_string(),
            inputs: vec![PortSpec::required("context", "Context", DataType::Object)],
            outputs: vec![PortSpec::optional("text", "Text", DataType::String)],
            config_fields: vec![ConfigFieldSpec::required(
                "template",
                "Template",
                ConfigFieldType::TextArea,
            )],
        });
        registry
    }

    #[test]
    fn test_valid_graph() {
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("a", "manual-trigger", (0.0, 0.0))
            .add_module("b", "text-generator", (100.0, 0.0))
            .with_config(serde_json::json!({"template": "{{title}}"}))
            .connect("a", "payload", "b", "context")
            .build();

        let registry = make_test_registry();
        let errors = validate_workflow(&workflow, Some(&registry));
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_detect_cycle() {
        let workflow = WorkflowBuilder::new("wf", "Cyclic")
            .add_module("a", "manual-trigger", (0.0, 0.0))
            .add_module("b", "manual-trigger", (100.0, 0.0))
            .connect("a", "out", "b", "in")
            .connect("b", "out", "a", "in")
            .build();

        let errors = validate_workflow(&workflow, None);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::CycleDetected)));
    }

    #[test]
    fn test_no_cycle_linear() {
        let workflow = WorkflowBuilder::new("wf", "Linear")
            .add_module("a", "manual-trigger", (0.0, 0.0))
            .add_module("b", "manual-trigger", (100.0, 0.0))
            .add_module("c", "manual-trigger", (200.0, 0.0))
            .connect("a", "out", "b", "in")
            .connect("b", "out", "c", "in")
            .build();

        let errors = validate_workflow(&workflow, None);
        assert!(!errors.iter().any(|e| matches!(e, ValidationError::CycleDetected)));
    }

    #[test]
    fn test_unknown_module_type() {
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("a", "discontinued-type", (0.0, 0.0))
            .build();

        let registry = make_test_registry();
        let errors = validate_workflow(&workflow, Some(&registry));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownModuleType { .. })));
    }

    #[test]
    fn test_unsatisfied_required_input() {
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("b", "text-generator", (100.0, 0.0))
            .with_config(serde_json::json!({"template": "{{title}}"}))
            .build();

        let registry = make_test_registry();
        let errors = validate_workflow(&workflow, Some(&registry));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::UnsatisfiedRequiredInput { port_id, .. } if port_id == "context"
        )));
    }

    #[test]
    fn test_config_value_satisfies_required_input() {
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("b", "text-generator", (100.0, 0.0))
            .with_config(serde_json::json!({
                "template": "{{title}}",
                "context": {"title": "Mug"}
            }))
            .build();

        let registry = make_test_registry();
        let errors = validate_workflow(&workflow, Some(&registry));
        assert!(!errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnsatisfiedRequiredInput { .. })));
    }

    #[test]
    fn test_incomplete_config() {
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("a", "manual-trigger", (0.0, 0.0))
            .add_module("b", "text-generator", (100.0, 0.0))
            .connect("a", "payload", "b", "context")
            .build();

        let registry = make_test_registry();
        let errors = validate_workflow(&workflow, Some(&registry));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::IncompleteConfig { field_id, .. } if field_id == "template"
        )));
    }

    #[test]
    fn test_dangling_connection_endpoint() {
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("a", "manual-trigger", (0.0, 0.0))
            .connect("a", "payload", "missing", "context")
            .build();

        let errors = validate_workflow(&workflow, None);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::DanglingEndpoint { module_id } if module_id == "missing"
        )));
    }

    #[test]
    fn test_incompatible_port_types() {
        let mut registry = make_test_registry();
        registry.register_spec(ModuleType {
            id: "counter".to_string(),
            category: ModuleCategory::Logic,
            label: "Counter".to_string(),
            description: "Counts things".to_string(),
            inputs: vec![PortSpec::required("count", "Count", DataType::Number)],
            outputs: vec![],
            config_fields: vec![],
        });

        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("a", "manual-trigger", (0.0, 0.0))
            .add_module("b", "counter", (100.0, 0.0))
            .with_config(serde_json::json!({"count": 1}))
            .connect("a", "payload", "b", "count") // object -> number
            .build();

        let errors = validate_workflow(&workflow, Some(&registry));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::IncompatiblePortTypes { .. })));
    }

    #[test]
    fn test_collects_multiple_errors() {
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("a", "unknown-1", (0.0, 0.0))
            .add_module("b", "unknown-2", (100.0, 0.0))
            .connect("a", "out", "b", "in")
            .connect("b", "out", "a", "in")
            .build();

        let registry = make_test_registry();
        let errors = validate_workflow(&workflow, Some(&registry));
        // Cycle plus two unknown types
        assert!(errors.len() >= 3);
    }
}
