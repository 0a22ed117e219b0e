//! Atelier Workflow Service
//!
//! Host-agnostic application services around the automation engine: workflow
//! persistence over a generic row-store collaborator, run session management
//! with busy-flag mutual exclusion and cancellation, and the identity
//! contract the dashboard's auth layer implements.

pub mod error;
pub mod identity;
pub mod persistence;
pub mod sessions;
pub mod workflows;

// Re-export key types
pub use error::{Result, ServiceError};
pub use identity::{IdentityProvider, Role, StaticIdentity, UserIdentity};
pub use persistence::{JsonDirPersistence, MemoryPersistence, Persistence, RowFilter};
pub use sessions::ExecutionSessions;
pub use workflows::{WorkflowStore, WorkflowSummary, WORKFLOWS_TABLE};
