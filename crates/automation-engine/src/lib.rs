//! Automation Engine - workflow graph model and execution for Atelier
//!
//! This crate is the core of the seller-operations automation builder: a
//! typed module catalog, a mutable workflow graph with validated structural
//! edits, and a dependency-ordered run engine. It supports:
//!
//! - A registry of module types with typed input/output ports
//! - Incremental graph mutation with cascade deletes and duplicate suppression
//! - Concurrent execution of independent modules with per-module failure
//!   isolation, timeouts, and cancellation
//! - Listing template variable extraction and rendering
//! - Compressed snapshot-based undo/redo
//!
//! # Architecture
//!
//! The registry is built once at startup, wrapped in an `Arc`, and injected
//! into everything else. `Workflow` is the single-writer aggregate for graph
//! state; `RunEngine` consumes a finalized snapshot and reports per-module
//! outcomes through an `EventSink`.
//!
//! # Example
//!
//! ```ignore
//! use automation_engine::{ModuleRegistry, RunEngine, RunOptions, Workflow};
//!
//! let registry = Arc::new(ModuleRegistry::with_builtins());
//! let mut workflow = Workflow::new("Restock copy");
//! let module = workflow.add_module(&registry, "listing-search", (0.0, 0.0))?;
//!
//! let engine = RunEngine::new(registry);
//! let report = engine.run(&workflow, &RunOptions::default(), &sink).await;
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod executor;
pub mod interaction;
pub mod registry;
pub mod template;
pub mod types;
pub mod undo;
pub mod validation;
pub mod workflow;

// Re-export key types
pub use builder::WorkflowBuilder;
pub use error::{EngineError, Result};
pub use events::{EventError, EventSink, NullEventSink, RunEvent, VecEventSink};
pub use executor::{
    CancelHandle, ModuleFailure, ModuleRunRecord, ModuleStatus, RunEngine, RunOptions, RunReport,
};
pub use interaction::{LinkCursor, LinkCursorState};
pub use registry::{DescriptorFn, HandlerFactory, ModuleHandler, ModuleRegistry};
pub use template::{extract_variables, render};
pub use types::{
    ConfigFieldSpec, ConfigFieldType, Connection, DataType, ModuleCategory, ModuleId,
    ModuleInstance, ModuleType, PortId, PortSpec, WorkflowId,
};
pub use undo::UndoStack;
pub use validation::{validate_workflow, ValidationError};
pub use workflow::{GraphError, Workflow};
