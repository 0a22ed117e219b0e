//! Workflow aggregate and graph mutation API
//!
//! A `Workflow` owns its module instances and connections exclusively and is
//! the sole writer of its own graph state. Structural invariants (no
//! self-loops, no duplicate connections, cascade deletion) are enforced here;
//! advisory checks such as port-type compatibility live in `validation`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::registry::ModuleRegistry;
use crate::types::{Connection, ModuleId, ModuleInstance, WorkflowId};

/// Structural mutation errors
///
/// These are rejected synchronously at the API boundary; the graph is never
/// left half-mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Referenced module type is not in the registry
    #[error("Unknown module type '{0}'")]
    UnknownType(String),

    /// Connection endpoint references a module not in this workflow
    #[error("Module '{0}' does not exist in this workflow")]
    UnknownEndpoint(String),

    /// A module cannot be connected to itself
    #[error("Self-loop connections are not allowed")]
    SelfLoop,

    /// The exact connection tuple already exists
    #[error("Connection already exists")]
    DuplicateConnection,
}

/// A complete automation workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Unique identifier for this workflow
    pub id: WorkflowId,
    /// Human-readable name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: String,
    /// Module instances in the graph
    pub modules: Vec<ModuleInstance>,
    /// Connections between module ports
    pub connections: Vec<Connection>,
    /// When this workflow was created
    pub created_at: DateTime<Utc>,
    /// When this workflow was last saved
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create a new empty workflow with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name)
    }

    /// Create a new empty workflow with an explicit id
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            modules: Vec::new(),
            connections: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find a module by ID
    pub fn find_module(&self, id: &str) -> Option<&ModuleInstance> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Find a module by ID (mutable)
    pub fn find_module_mut(&mut self, id: &str) -> Option<&mut ModuleInstance> {
        self.modules.iter_mut().find(|m| m.id == id)
    }

    /// Get connections coming into a module
    pub fn incoming_connections<'a>(
        &'a self,
        module_id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.target_id == module_id)
    }

    /// Get connections going out of a module
    pub fn outgoing_connections<'a>(
        &'a self,
        module_id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.source_id == module_id)
    }

    /// Get the distinct IDs of modules this module depends on (upstream)
    pub fn dependencies(&self, module_id: &str) -> Vec<ModuleId> {
        let mut deps: Vec<ModuleId> = Vec::new();
        for conn in self.incoming_connections(module_id) {
            if !deps.contains(&conn.source_id) {
                deps.push(conn.source_id.clone());
            }
        }
        deps
    }

    // =========================================================================
    // Mutation API
    // =========================================================================

    /// Add a module instance of the given type at the given position.
    ///
    /// Fails with `GraphError::UnknownType` when `type_id` is not in the
    /// registry. On success the new instance has a fresh unique id, the
    /// type's label as its display name, and an empty config.
    pub fn add_module(
        &mut self,
        registry: &ModuleRegistry,
        type_id: &str,
        position: (f64, f64),
    ) -> Result<&ModuleInstance, GraphError> {
        let spec = registry
            .get(type_id)
            .ok_or_else(|| GraphError::UnknownType(type_id.to_string()))?;

        let instance = ModuleInstance {
            id: Uuid::new_v4().to_string(),
            type_id: spec.id.clone(),
            display_name: spec.label.clone(),
            position,
            config: Default::default(),
        };
        self.modules.push(instance);
        Ok(self.modules.last().expect("module was just pushed"))
    }

    /// Remove a module and cascade-delete every connection touching it.
    ///
    /// Idempotent: removing an id that is not present is a no-op and returns
    /// false (duplicate delete clicks must not error).
    pub fn remove_module(&mut self, module_id: &str) -> bool {
        let before = self.modules.len();
        self.modules.retain(|m| m.id != module_id);
        if self.modules.len() == before {
            return false;
        }
        self.connections
            .retain(|c| c.source_id != module_id && c.target_id != module_id);
        true
    }

    /// Move a module on the canvas. No-op if the module is missing.
    pub fn update_position(&mut self, module_id: &str, position: (f64, f64)) {
        if let Some(module) = self.find_module_mut(module_id) {
            module.position = position;
        }
    }

    /// Merge configuration values into a module's config.
    ///
    /// Shallow merge, last-write-wins per key. Values are not validated
    /// against the type's config schema here; that happens at validation and
    /// execution time.
    pub fn update_config(
        &mut self,
        module_id: &str,
        partial: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) {
        if let Some(module) = self.find_module_mut(module_id) {
            module.config.extend(partial);
        }
    }

    /// Rename a module instance. No-op if the module is missing.
    pub fn set_display_name(&mut self, module_id: &str, name: impl Into<String>) {
        if let Some(module) = self.find_module_mut(module_id) {
            module.display_name = name.into();
        }
    }

    /// Connect an output port to an input port.
    ///
    /// Rejects self-loops, exact duplicate tuples, and endpoints that are not
    /// in this workflow. Port data types are deliberately not checked here,
    /// and a single input may carry several incoming connections; the run
    /// engine resolves such inputs to the most recently completed source.
    pub fn add_connection(
        &mut self,
        source_id: &str,
        source_handle: &str,
        target_id: &str,
        target_handle: &str,
    ) -> Result<&Connection, GraphError> {
        if source_id == target_id {
            return Err(GraphError::SelfLoop);
        }
        if self.find_module(source_id).is_none() {
            return Err(GraphError::UnknownEndpoint(source_id.to_string()));
        }
        if self.find_module(target_id).is_none() {
            return Err(GraphError::UnknownEndpoint(target_id.to_string()));
        }

        let exists = self.connections.iter().any(|c| {
            c.source_id == source_id
                && c.source_handle == source_handle
                && c.target_id == target_id
                && c.target_handle == target_handle
        });
        if exists {
            return Err(GraphError::DuplicateConnection);
        }

        self.connections.push(Connection {
            source_id: source_id.to_string(),
            source_handle: source_handle.to_string(),
            target_id: target_id.to_string(),
            target_handle: target_handle.to_string(),
        });
        Ok(self.connections.last().expect("connection was just pushed"))
    }

    /// Remove all connections between two modules matching the given handles.
    ///
    /// Omitted handles act as wildcards. Returns the number of connections
    /// removed; removing nothing is a no-op, not an error.
    pub fn remove_connections(
        &mut self,
        source_id: &str,
        target_id: &str,
        source_handle: Option<&str>,
        target_handle: Option<&str>,
    ) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| {
            !(c.source_id == source_id
                && c.target_id == target_id
                && source_handle.map_or(true, |h| c.source_handle == h)
                && target_handle.map_or(true, |h| c.target_handle == h))
        });
        before - self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, ModuleCategory, ModuleType, PortSpec};

    fn test_registry() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry.register_spec(ModuleType {
            id: "source".to_string(),
            category: ModuleCategory::Triggers,
            label: "Source".to_string(),
            description: "Produces a number".to_string(),
            inputs: vec![],
            outputs: vec![PortSpec::optional("value", "Value", DataType::Number)],
            config_fields: vec![],
        });
        registry.register_spec(ModuleType {
            id: "double".to_string(),
            category: ModuleCategory::Logic,
            label: "Double".to_string(),
            description: "Doubles a number".to_string(),
            inputs: vec![PortSpec::required("value", "Value", DataType::Number)],
            outputs: vec![PortSpec::optional("value", "Value", DataType::Number)],
            config_fields: vec![],
        });
        registry
    }

    #[test]
    fn test_add_module_unknown_type() {
        let registry = test_registry();
        let mut workflow = Workflow::new("Test");

        let err = workflow
            .add_module(&registry, "missing-type", (0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, GraphError::UnknownType("missing-type".to_string()));
        assert!(workflow.modules.is_empty());
    }

    #[test]
    fn test_add_module_defaults() {
        let registry = test_registry();
        let mut workflow = Workflow::new("Test");

        let module = workflow.add_module(&registry, "source", (10.0, 20.0)).unwrap();
        assert_eq!(module.type_id, "source");
        assert_eq!(module.display_name, "Source");
        assert_eq!(module.position, (10.0, 20.0));
        assert!(module.config.is_empty());
    }

    #[test]
    fn test_no_self_loops() {
        let registry = test_registry();
        let mut workflow = Workflow::new("Test");
        let id = workflow
            .add_module(&registry, "source", (0.0, 0.0))
            .unwrap()
            .id
            .clone();

        let err = workflow.add_connection(&id, "value", &id, "value").unwrap_err();
        assert_eq!(err, GraphError::SelfLoop);
        assert!(workflow.connections.is_empty());
    }

    #[test]
    fn test_duplicate_connection_suppressed() {
        let registry = test_registry();
        let mut workflow = Workflow::new("Test");
        let m1 = workflow.add_module(&registry, "source", (0.0, 0.0)).unwrap().id.clone();
        let m2 = workflow.add_module(&registry, "double", (100.0, 0.0)).unwrap().id.clone();

        workflow.add_connection(&m1, "value", &m2, "value").unwrap();
        let err = workflow.add_connection(&m1, "value", &m2, "value").unwrap_err();
        assert_eq!(err, GraphError::DuplicateConnection);
        assert_eq!(workflow.connections.len(), 1);
    }

    #[test]
    fn test_connection_unknown_endpoint() {
        let registry = test_registry();
        let mut workflow = Workflow::new("Test");
        let m1 = workflow.add_module(&registry, "source", (0.0, 0.0)).unwrap().id.clone();

        let err = workflow.add_connection(&m1, "value", "ghost", "value").unwrap_err();
        assert_eq!(err, GraphError::UnknownEndpoint("ghost".to_string()));
    }

    #[test]
    fn test_remove_module_cascades_connections() {
        let registry = test_registry();
        let mut workflow = Workflow::new("Test");
        let m1 = workflow.add_module(&registry, "source", (0.0, 0.0)).unwrap().id.clone();
        let m2 = workflow.add_module(&registry, "double", (100.0, 0.0)).unwrap().id.clone();
        workflow.add_connection(&m1, "value", &m2, "value").unwrap();

        assert!(workflow.remove_module(&m1));
        assert!(workflow.connections.is_empty());
        assert_eq!(workflow.modules.len(), 1);
        assert_eq!(workflow.modules[0].id, m2);
    }

    #[test]
    fn test_removal_is_idempotent() {
        let registry = test_registry();
        let mut workflow = Workflow::new("Test");
        let m1 = workflow.add_module(&registry, "source", (0.0, 0.0)).unwrap().id.clone();

        assert!(workflow.remove_module(&m1));
        assert!(!workflow.remove_module(&m1));
        assert_eq!(workflow.remove_connections(&m1, "anything", None, None), 0);
    }

    #[test]
    fn test_remove_connections_wildcard_handles() {
        let registry = test_registry();
        let mut workflow = Workflow::new("Test");
        let m1 = workflow.add_module(&registry, "source", (0.0, 0.0)).unwrap().id.clone();
        let m2 = workflow.add_module(&registry, "double", (100.0, 0.0)).unwrap().id.clone();
        workflow.add_connection(&m1, "value", &m2, "value").unwrap();

        // Wrong handle filter removes nothing
        assert_eq!(workflow.remove_connections(&m1, &m2, Some("other"), None), 0);
        // Wildcard handles remove the match
        assert_eq!(workflow.remove_connections(&m1, &m2, None, None), 1);
        assert!(workflow.connections.is_empty());
    }

    #[test]
    fn test_update_config_shallow_merge() {
        let registry = test_registry();
        let mut workflow = Workflow::new("Test");
        let id = workflow.add_module(&registry, "double", (0.0, 0.0)).unwrap().id.clone();

        workflow.update_config(
            &id,
            [("a".to_string(), serde_json::json!(1)), ("b".to_string(), serde_json::json!(2))],
        );
        workflow.update_config(&id, [("b".to_string(), serde_json::json!(3))]);

        let module = workflow.find_module(&id).unwrap();
        assert_eq!(module.config["a"], serde_json::json!(1));
        assert_eq!(module.config["b"], serde_json::json!(3));
    }

    #[test]
    fn test_update_missing_module_is_noop() {
        let mut workflow = Workflow::new("Test");
        workflow.update_position("ghost", (1.0, 1.0));
        workflow.update_config("ghost", [("k".to_string(), serde_json::json!(true))]);
        workflow.set_display_name("ghost", "Ghost");
        assert!(workflow.modules.is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let registry = test_registry();
        let mut workflow = Workflow::with_id("wf-rt", "Roundtrip");
        let m1 = workflow.add_module(&registry, "source", (0.0, 0.0)).unwrap().id.clone();
        let m2 = workflow.add_module(&registry, "double", (100.0, 0.0)).unwrap().id.clone();
        workflow.add_connection(&m1, "value", &m2, "value").unwrap();

        let json = serde_json::to_string(&workflow).unwrap();
        let restored: Workflow = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, "wf-rt");
        assert_eq!(restored.modules.len(), 2);
        assert_eq!(restored.connections.len(), 1);
    }
}
