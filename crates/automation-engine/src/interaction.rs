//! Connection-drawing interaction state
//!
//! The canvas draws connections in two clicks: one on an output port, one on
//! an input port. That intent is modeled here as an explicit state machine
//! owned by the caller, decoupled from rendering, so it can be unit tested
//! without a UI harness. Only one pending link exists at a time.

use crate::types::Connection;
use crate::workflow::{GraphError, Workflow};

/// State of the link-drawing cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCursorState {
    /// No link in progress
    Idle,
    /// An output port has been picked; waiting for an input port
    Pending {
        source_id: String,
        source_handle: String,
    },
}

/// Single global cursor of link-drawing intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCursor {
    state: LinkCursorState,
}

impl LinkCursor {
    /// Create an idle cursor
    pub fn new() -> Self {
        Self {
            state: LinkCursorState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> &LinkCursorState {
        &self.state
    }

    /// Whether a link is in progress
    pub fn is_pending(&self) -> bool {
        matches!(self.state, LinkCursorState::Pending { .. })
    }

    /// Start a link from an output port
    ///
    /// Starting while a link is already pending replaces the pending source.
    pub fn begin_at(&mut self, source_id: impl Into<String>, source_handle: impl Into<String>) {
        self.state = LinkCursorState::Pending {
            source_id: source_id.into(),
            source_handle: source_handle.into(),
        };
    }

    /// Abandon the pending link, if any
    pub fn cancel(&mut self) {
        self.state = LinkCursorState::Idle;
    }

    /// Complete the pending link at an input port.
    ///
    /// Always returns the cursor to idle. Returns `None` when no link was
    /// pending, or when the target is a port on the pending source module
    /// itself (dropped without emitting). Otherwise emits `add_connection`
    /// on the workflow and returns its outcome.
    pub fn complete_at(
        &mut self,
        workflow: &mut Workflow,
        target_id: &str,
        target_handle: &str,
    ) -> Option<Result<Connection, GraphError>> {
        let state = std::mem::replace(&mut self.state, LinkCursorState::Idle);
        let LinkCursorState::Pending {
            source_id,
            source_handle,
        } = state
        else {
            return None;
        };

        if source_id == target_id {
            return None;
        }

        Some(
            workflow
                .add_connection(&source_id, &source_handle, target_id, target_handle)
                .map(Clone::clone),
        )
    }
}

impl Default for LinkCursor {
    fn default() -> Self {
        Self::new()
    }
}
