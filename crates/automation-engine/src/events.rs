//! Event types for streaming run progress
//!
//! Events are sent from the run engine to the frontend (or any consumer)
//! to report per-module progress and run outcomes.

use serde::{Deserialize, Serialize};

/// Trait for sending run events
///
/// This abstracts over the transport mechanism (websocket, mpsc, etc.)
/// allowing the engine to be used in different contexts.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be sent (e.g., channel closed)
    fn send(&self, event: RunEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Events emitted during a workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RunEvent {
    /// A run started
    #[serde(rename_all = "camelCase")]
    RunStarted {
        workflow_id: String,
        run_id: String,
        module_count: usize,
    },

    /// A run completed with every module succeeding
    #[serde(rename_all = "camelCase")]
    RunCompleted {
        workflow_id: String,
        run_id: String,
    },

    /// A run completed with at least one module failing or skipped
    #[serde(rename_all = "camelCase")]
    RunFailed {
        workflow_id: String,
        run_id: String,
        failed_modules: Vec<String>,
    },

    /// A module started executing
    #[serde(rename_all = "camelCase")]
    ModuleStarted {
        module_id: String,
        run_id: String,
    },

    /// A module completed successfully
    #[serde(rename_all = "camelCase")]
    ModuleCompleted {
        module_id: String,
        run_id: String,
        outputs: serde_json::Value,
    },

    /// A module failed
    #[serde(rename_all = "camelCase")]
    ModuleFailed {
        module_id: String,
        run_id: String,
        error: String,
    },

    /// A module was never started (cancellation)
    #[serde(rename_all = "camelCase")]
    ModuleSkipped {
        module_id: String,
        run_id: String,
    },
}

/// A no-op event sink that discards all events
///
/// Useful for testing or when events aren't needed.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: RunEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<RunEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: RunEvent) -> Result<(), EventError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
