//! Fluent builder for workflow graphs
//!
//! Provides a fluent API for constructing workflows programmatically with
//! explicit instance ids. The builder bypasses mutation-time validation so
//! tests can assemble arbitrary graphs, including invalid ones.

use std::collections::HashMap;

use crate::types::{Connection, ModuleInstance};
use crate::workflow::Workflow;

/// Fluent builder for constructing workflows
///
/// # Example
///
/// ```ignore
/// let workflow = WorkflowBuilder::new("wf-1", "Restock copy")
///     .add_module("search-1", "listing-search", (0.0, 0.0))
///     .with_config(serde_json::json!({"query": "ceramic mug"}))
///     .add_module("copy-1", "text-generator", (200.0, 0.0))
///     .connect("search-1", "results", "copy-1", "context")
///     .build();
/// ```
pub struct WorkflowBuilder {
    id: String,
    name: String,
    modules: Vec<ModuleInstance>,
    connections: Vec<Connection>,
}

impl WorkflowBuilder {
    /// Create a new workflow builder
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            modules: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Add a module instance with an explicit id
    pub fn add_module(
        mut self,
        id: impl Into<String>,
        type_id: impl Into<String>,
        position: (f64, f64),
    ) -> Self {
        let type_id = type_id.into();
        self.modules.push(ModuleInstance {
            id: id.into(),
            type_id: type_id.clone(),
            display_name: type_id,
            position,
            config: HashMap::new(),
        });
        self
    }

    /// Set config values on the most recently added module
    ///
    /// Must be called immediately after `add_module`. Accepts a JSON object;
    /// its keys are merged into the module's config.
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        if let (Some(module), Some(object)) = (self.modules.last_mut(), config.as_object()) {
            module
                .config
                .extend(object.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        self
    }

    /// Set the display name of the most recently added module
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        if let Some(module) = self.modules.last_mut() {
            module.display_name = name.into();
        }
        self
    }

    /// Connect two modules
    pub fn connect(
        mut self,
        source_id: impl Into<String>,
        source_handle: impl Into<String>,
        target_id: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        self.connections.push(Connection {
            source_id: source_id.into(),
            source_handle: source_handle.into(),
            target_id: target_id.into(),
            target_handle: target_handle.into(),
        });
        self
    }

    /// Build the workflow without validation
    pub fn build(self) -> Workflow {
        let mut workflow = Workflow::with_id(self.id, self.name);
        workflow.modules = self.modules;
        workflow.connections = self.connections;
        workflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let workflow = WorkflowBuilder::new("wf-1", "Test Workflow")
            .add_module("search-1", "listing-search", (0.0, 0.0))
            .with_config(serde_json::json!({"query": "ceramic mug"}))
            .add_module("copy-1", "text-generator", (200.0, 0.0))
            .connect("search-1", "results", "copy-1", "context")
            .build();

        assert_eq!(workflow.id, "wf-1");
        assert_eq!(workflow.name, "Test Workflow");
        assert_eq!(workflow.modules.len(), 2);
        assert_eq!(workflow.connections.len(), 1);
        assert_eq!(
            workflow.modules[0].config["query"],
            serde_json::json!("ceramic mug")
        );
    }

    #[test]
    fn test_builder_display_name() {
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("a", "listing-search", (0.0, 0.0))
            .with_display_name("Mug search")
            .build();

        assert_eq!(workflow.modules[0].display_name, "Mug search");
    }

    #[test]
    fn test_builder_allows_invalid_graphs() {
        // The builder does not validate: cycles and dangling endpoints are
        // representable so validation and run-time handling can be tested.
        let workflow = WorkflowBuilder::new("wf", "Cyclic")
            .add_module("a", "x", (0.0, 0.0))
            .add_module("b", "x", (100.0, 0.0))
            .connect("a", "out", "b", "in")
            .connect("b", "out", "a", "in")
            .connect("a", "out", "ghost", "in")
            .build();

        assert_eq!(workflow.connections.len(), 3);
    }
}
