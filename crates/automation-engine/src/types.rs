//! Core types for automation workflows
//!
//! These types define the structure of a workflow graph: module types
//! (the registry catalog), module instances, ports, and connections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Unique identifier for a module instance
pub type ModuleId = String;

/// Unique identifier for a port on a module type
pub type PortId = String;

/// Unique identifier for a workflow
pub type WorkflowId = String;

/// The data type carried by a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Text string
    String,
    /// Numeric value
    Number,
    /// Boolean value
    Boolean,
    /// Ordered list of values
    Array,
    /// JSON object
    Object,
    /// Accepts any type
    Any,
}

impl DataType {
    /// Check if this type can connect to another type
    pub fn is_compatible_with(&self, other: &DataType) -> bool {
        // Any type is compatible with everything
        if matches!(self, DataType::Any) || matches!(other, DataType::Any) {
            return true;
        }

        // Exact type match
        self == other
    }
}

/// Category of a module type, used for palette grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleCategory {
    /// Modules that start a workflow (manual runs, schedules)
    Triggers,
    /// Modules that talk to the marketplace (search, listings)
    Marketplace,
    /// Generative modules (copywriting, captioning)
    Ai,
    /// Control and data-shaping modules (conditions, filters)
    Logic,
}

/// Definition of a port (input or output) on a module type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortSpec {
    /// Unique identifier for this port within the module type
    pub id: PortId,
    /// Human-readable label
    pub label: String,
    /// Data type of the port
    pub data_type: DataType,
    /// Whether this port is required (for inputs)
    pub required: bool,
    /// Default value (for optional inputs)
    pub default_value: Option<serde_json::Value>,
}

impl PortSpec {
    /// Create a required port
    pub fn required(id: impl Into<String>, label: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data_type,
            required: true,
            default_value: None,
        }
    }

    /// Create an optional port
    pub fn optional(id: impl Into<String>, label: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data_type,
            required: false,
            default_value: None,
        }
    }

    /// Set a default value for this port
    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// Widget kind for a configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigFieldType {
    /// Single-line text
    Text,
    /// Multi-line text
    TextArea,
    /// Numeric input
    Number,
    /// Boolean toggle
    Toggle,
    /// Selection from a fixed option list
    Select,
}

/// Definition of a configuration field on a module type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFieldSpec {
    /// Unique identifier for this field within the module type
    pub id: String,
    /// Human-readable label
    pub label: String,
    /// Widget kind
    pub field_type: ConfigFieldType,
    /// Whether the module is incomplete until this field is set
    pub required: bool,
    /// Allowed values for `Select` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl ConfigFieldSpec {
    /// Create a required field
    pub fn required(
        id: impl Into<String>,
        label: impl Into<String>,
        field_type: ConfigFieldType,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            required: true,
            options: None,
        }
    }

    /// Create an optional field
    pub fn optional(
        id: impl Into<String>,
        label: impl Into<String>,
        field_type: ConfigFieldType,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            required: false,
            options: None,
        }
    }

    /// Create an optional `Select` field with its allowed values
    pub fn select(
        id: impl Into<String>,
        label: impl Into<String>,
        options: Vec<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type: ConfigFieldType::Select,
            required: false,
            options: Some(options.into_iter().map(String::from).collect()),
        }
    }
}

/// Definition of a module type (registry entry, immutable)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleType {
    /// Unique type identifier (e.g., "listing-search")
    pub id: String,
    /// Category for palette grouping
    pub category: ModuleCategory,
    /// Human-readable label
    pub label: String,
    /// Description of what the module does
    pub description: String,
    /// Input port definitions
    pub inputs: Vec<PortSpec>,
    /// Output port definitions
    pub outputs: Vec<PortSpec>,
    /// Configuration field definitions
    pub config_fields: Vec<ConfigFieldSpec>,
}

impl ModuleType {
    /// Find an input port by id
    pub fn input(&self, port_id: &str) -> Option<&PortSpec> {
        self.inputs.iter().find(|p| p.id == port_id)
    }

    /// Find an output port by id
    pub fn output(&self, port_id: &str) -> Option<&PortSpec> {
        self.outputs.iter().find(|p| p.id == port_id)
    }
}

/// A placed, configured module within one workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInstance {
    /// Unique identifier for this instance, stable for its lifetime
    pub id: ModuleId,
    /// Module type (references a `ModuleType` in the registry)
    pub type_id: String,
    /// User-editable label, defaults to the type's label
    pub display_name: String,
    /// Position on the canvas (x, y), purely presentational
    pub position: (f64, f64),
    /// Configuration values keyed by `ConfigFieldSpec` id
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

/// A directed edge from an output port to an input port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Source module instance ID
    pub source_id: ModuleId,
    /// Output port ID on the source module's type
    pub source_handle: PortId,
    /// Target module instance ID
    pub target_id: ModuleId,
    /// Input port ID on the target module's type
    pub target_handle: PortId,
}
