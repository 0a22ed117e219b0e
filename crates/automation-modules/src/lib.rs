//! Automation Modules
//!
//! Built-in module implementations for the Atelier automation engine.
//! Each module is an atomic building block that can be composed into
//! workflows.
//!
//! # Categories
//!
//! - **Triggers**: Modules that start a workflow (manual runs, schedules)
//! - **Marketplace**: Modules that talk to the marketplace (search, listings)
//! - **Ai**: Generative modules (simulated copywriting)
//! - **Logic**: Control flow and data shaping (conditions, filters, templates)

pub mod ai;
pub mod logic;
pub mod marketplace;
pub mod setup;
pub mod sink;
pub mod triggers;

// Re-export all modules for convenience
pub use ai::*;
pub use logic::*;
pub use marketplace::*;
pub use setup::{builtin_registry, ModuleDeps};
pub use sink::{MemoryRowSink, RowSink};
pub use triggers::*;
