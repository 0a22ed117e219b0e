//! Registry wiring for the built-in module catalog
//!
//! `ModuleRegistry::with_builtins()` collects specs submitted via inventory
//! and is enough for palette display. Executable registries additionally need
//! runtime dependencies (the marketplace proxy, a row sink), which
//! `builtin_registry` wires in.

use std::sync::Arc;

use atelier_marketplace_adapter::{MarketplaceProxy, RollingWindowLimiter, SimulatedBackend};
use automation_engine::ModuleRegistry;

use crate::ai::TextGeneratorModule;
use crate::logic::{ApplyTemplateModule, ConditionalModule, FilterItemsModule, MergeModule};
use crate::marketplace::{ListingSearchModule, ListingUpsertModule};
use crate::sink::{MemoryRowSink, RowSink};
use crate::triggers::{ManualTriggerModule, ScheduleTriggerModule};

/// Runtime dependencies for the built-in modules
pub struct ModuleDeps {
    /// Proxy used by marketplace modules
    pub proxy: Arc<MarketplaceProxy>,
    /// Destination for table-writing modules
    pub rows: Arc<dyn RowSink>,
}

impl ModuleDeps {
    /// Dependencies backed by the simulated marketplace and an in-memory sink
    pub fn simulated() -> Self {
        Self {
            proxy: Arc::new(MarketplaceProxy::new(
                Arc::new(SimulatedBackend),
                RollingWindowLimiter::per_minute(60),
            )),
            rows: Arc::new(MemoryRowSink::new()),
        }
    }
}

/// Build an executable registry containing every built-in module
pub fn builtin_registry(deps: &ModuleDeps) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();

    registry.register_handler(ManualTriggerModule::spec(), Arc::new(ManualTriggerModule));
    registry.register_handler(ScheduleTriggerModule::spec(), Arc::new(ScheduleTriggerModule));
    registry.register_handler(
        ListingSearchModule::spec(),
        Arc::new(ListingSearchModule::new(deps.proxy.clone())),
    );
    registry.register_handler(
        ListingUpsertModule::spec(),
        Arc::new(ListingUpsertModule::new(deps.rows.clone())),
    );
    registry.register_handler(TextGeneratorModule::spec(), Arc::new(TextGeneratorModule));
    registry.register_handler(ConditionalModule::spec(), Arc::new(ConditionalModule));
    registry.register_handler(FilterItemsModule::spec(), Arc::new(FilterItemsModule));
    registry.register_handler(MergeModule::spec(), Arc::new(MergeModule));
    registry.register_handler(ApplyTemplateModule::spec(), Arc::new(ApplyTemplateModule));

    registry
}
