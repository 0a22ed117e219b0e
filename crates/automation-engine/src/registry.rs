//! Module type registry
//!
//! The registry is the static catalog of module types: what ports they
//! expose, how they are configured, and (optionally) how to obtain a handler
//! that executes them. It is built once at process start, wrapped in an
//! `Arc`, and injected into the mutation API and the run engine. It is never
//! mutated afterwards.
//!
//! # Usage
//!
//! ```ignore
//! use automation_engine::ModuleRegistry;
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register_handler(MyModule::spec(), Arc::new(MyModule));
//!
//! let engine = RunEngine::new(Arc::new(registry));
//! ```

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ModuleCategory, ModuleType};

/// Per-module-type handler
///
/// A handler is a function from resolved inputs and instance config to output
/// values keyed by output port id. It may fail; failures are recorded
/// per-module by the run engine and never abort a run.
#[async_trait]
pub trait ModuleHandler: Send + Sync {
    /// Execute one module instance with its resolved inputs and config
    async fn run(
        &self,
        module_id: &str,
        inputs: &HashMap<String, serde_json::Value>,
        config: &HashMap<String, serde_json::Value>,
    ) -> Result<HashMap<String, serde_json::Value>>;
}

/// Factory for creating or returning a shared ModuleHandler
pub trait HandlerFactory: Send + Sync {
    fn create_handler(&self) -> Arc<dyn ModuleHandler>;
}

/// A registration entry combining a type spec with an optional handler factory
struct RegistryEntry {
    spec: ModuleType,
    factory: Option<Arc<dyn HandlerFactory>>,
}

/// Registry of module types with their specs and handlers
///
/// Lookup is by type id; listing preserves declaration order, which is the
/// order the palette displays.
///
/// # Composability
///
/// Registries can be composed by merging:
/// ```ignore
/// let mut registry = ModuleRegistry::new();
/// // Register built-in modules...
/// registry.merge(tenant_registry); // Add tenant-specific modules
/// ```
pub struct ModuleRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a registry populated with every module type submitted via
    /// `inventory`. Specs only: handlers need their runtime dependencies and
    /// are wired separately.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in inventory::iter::<DescriptorFn> {
            registry.register_spec((descriptor.0)());
        }
        registry
    }

    /// Register a module type with a handler factory
    pub fn register(&mut self, spec: ModuleType, factory: Arc<dyn HandlerFactory>) {
        self.insert(RegistryEntry {
            spec,
            factory: Some(factory),
        });
    }

    /// Register a module type with a shared handler instance
    pub fn register_handler(&mut self, spec: ModuleType, handler: Arc<dyn ModuleHandler>) {
        self.register(spec, Arc::new(SharedHandlerFactory { handler }));
    }

    /// Register a module type using an async callback function
    ///
    /// The callback receives (module_id, inputs, config) and returns outputs.
    pub fn register_callback<F, Fut>(&mut self, spec: ModuleType, callback: F)
    where
        F: Fn(String, HashMap<String, serde_json::Value>, HashMap<String, serde_json::Value>) -> Fut
            + Send
            + Sync
            + 'static,
        Fut: std::future::Future<Output = Result<HashMap<String, serde_json::Value>>>
            + Send
            + 'static,
    {
        let handler = Arc::new(CallbackHandler {
            callback: Box::new(move |module_id, inputs, config| {
                Box::pin(callback(module_id, inputs, config))
            }),
        });
        self.register_handler(spec, handler);
    }

    /// Register a module type with its spec only (no handler)
    ///
    /// Used for spec-only registrations (e.g., palette display).
    pub fn register_spec(&mut self, spec: ModuleType) {
        self.insert(RegistryEntry {
            spec,
            factory: None,
        });
    }

    fn insert(&mut self, entry: RegistryEntry) {
        match self.index.get(&entry.spec.id) {
            // Re-registration overrides in place, preserving declaration order
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.spec.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Look up a module type by id
    ///
    /// Not-found is a normal condition (e.g., a workflow saved against an
    /// older catalog); callers skip rather than fail.
    pub fn get(&self, type_id: &str) -> Option<&ModuleType> {
        self.index.get(type_id).map(|&pos| &self.entries[pos].spec)
    }

    /// List all module types in declaration order
    pub fn list(&self) -> Vec<&ModuleType> {
        self.entries.iter().map(|e| &e.spec).collect()
    }

    /// List module types in one category, in declaration order
    pub fn list_by_category(&self, category: ModuleCategory) -> Vec<&ModuleType> {
        self.entries
            .iter()
            .map(|e| &e.spec)
            .filter(|s| s.category == category)
            .collect()
    }

    /// Get the handler for a module type
    pub fn handler(&self, type_id: &str) -> Option<Arc<dyn ModuleHandler>> {
        self.index
            .get(type_id)
            .and_then(|&pos| self.entries[pos].factory.as_ref())
            .map(|f| f.create_handler())
    }

    /// Check if a module type is registered
    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    /// List all registered type id strings in declaration order
    pub fn type_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.spec.id.as_str()).collect()
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries in `self` if they share a type
    /// id; new entries are appended in `other`'s declaration order.
    pub fn merge(&mut self, other: ModuleRegistry) {
        for entry in other.entries {
            self.insert(entry);
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Link-time registration of a module type descriptor
///
/// Built-in modules submit their spec function at link time:
///
/// ```ignore
/// inventory::submit!(automation_engine::DescriptorFn(MyModule::spec));
/// ```
pub struct DescriptorFn(pub fn() -> ModuleType);

inventory::collect!(DescriptorFn);

/// Async callback-based ModuleHandler
///
/// Wraps an async closure as a handler, for tests and embedding hosts that
/// dispatch module execution to foreign code.
pub struct CallbackHandler {
    #[allow(clippy::type_complexity)]
    callback: Box<
        dyn Fn(
                String,
                HashMap<String, serde_json::Value>,
                HashMap<String, serde_json::Value>,
            ) -> Pin<
                Box<
                    dyn std::future::Future<Output = Result<HashMap<String, serde_json::Value>>>
                        + Send,
                >,
            > + Send
            + Sync,
    >,
}

#[async_trait]
impl ModuleHandler for CallbackHandler {
    async fn run(
        &self,
        module_id: &str,
        inputs: &HashMap<String, serde_json::Value>,
        config: &HashMap<String, serde_json::Value>,
    ) -> Result<HashMap<String, serde_json::Value>> {
        (self.callback)(module_id.to_string(), inputs.clone(), config.clone()).await
    }
}

/// Factory that returns a shared handler instance
struct SharedHandlerFactory {
    handler: Arc<dyn ModuleHandler>,
}

impl HandlerFactory for SharedHandlerFactory {
    fn create_handler(&self) -> Arc<dyn ModuleHandler> {
        self.handler.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, PortSpec};

    fn test_spec(type_id: &str, category: ModuleCategory) -> ModuleType {
        ModuleType {
            id: type_id.to_string(),
            category,
            label: format!("Test {}", type_id),
            description: "Test module".to_string(),
            inputs: vec![PortSpec::optional("input", "Input", DataType::String)],
            outputs: vec![PortSpec::optional("output", "Output", DataType::String)],
            config_fields: vec![],
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ModuleRegistry::new();
        registry.register_spec(test_spec("test-module", ModuleCategory::Logic));

        assert!(registry.contains("test-module"));
        assert!(!registry.contains("unknown"));

        let spec = registry.get("test-module").unwrap();
        assert_eq!(spec.label, "Test test-module");
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_list_preserves_declaration_order() {
        let mut registry = ModuleRegistry::new();
        registry.register_spec(test_spec("zeta", ModuleCategory::Logic));
        registry.register_spec(test_spec("alpha", ModuleCategory::Triggers));
        registry.register_spec(test_spec("mid", ModuleCategory::Logic));

        let ids: Vec<&str> = registry.list().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_list_by_category() {
        let mut registry = ModuleRegistry::new();
        registry.register_spec(test_spec("a", ModuleCategory::Triggers));
        registry.register_spec(test_spec("b", ModuleCategory::Logic));
        registry.register_spec(test_spec("c", ModuleCategory::Triggers));

        let triggers = registry.list_by_category(ModuleCategory::Triggers);
        let ids: Vec<&str> = triggers.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(registry.list_by_category(ModuleCategory::Ai).is_empty());
    }

    #[test]
    fn test_merge_override_keeps_position() {
        let mut registry1 = ModuleRegistry::new();
        registry1.register_spec(test_spec("a", ModuleCategory::Logic));
        registry1.register_spec(test_spec("b", ModuleCategory::Logic));

        let mut registry2 = ModuleRegistry::new();
        let mut override_spec = test_spec("a", ModuleCategory::Logic);
        override_spec.label = "Override".to_string();
        registry2.register_spec(override_spec);
        registry2.register_spec(test_spec("c", ModuleCategory::Logic));

        registry1.merge(registry2);
        assert_eq!(registry1.get("a").unwrap().label, "Override");
        let ids: Vec<&str> = registry1.list().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_register_with_callback() {
        let mut registry = ModuleRegistry::new();
        registry.register_callback(
            test_spec("echo", ModuleCategory::Logic),
            |_module_id, inputs, _config| async move { Ok(inputs) },
        );

        assert!(registry.contains("echo"));
        let handler = registry.handler("echo").unwrap();

        let mut inputs = HashMap::new();
        inputs.insert("value".to_string(), serde_json::json!("hello"));

        let result = handler.run("echo-1", &inputs, &HashMap::new()).await.unwrap();
        assert_eq!(result.get("value").unwrap(), "hello");
    }

    #[test]
    fn test_no_handler_for_spec_only() {
        let mut registry = ModuleRegistry::new();
        registry.register_spec(test_spec("spec-only", ModuleCategory::Logic));

        assert!(registry.contains("spec-only"));
        assert!(registry.handler("spec-only").is_none());
    }
}
