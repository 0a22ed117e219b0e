//! Undo/redo for the interactive builder, using compressed snapshots
//!
//! Every committed edit pushes a full snapshot of the workflow; undo and redo
//! walk the stack. Snapshots are zstd-compressed JSON, which stays cheap even
//! for large canvases and works with any mutation without inverse operations.

use std::collections::VecDeque;

use crate::error::{EngineError, Result};
use crate::workflow::Workflow;

/// Undo/redo stack using compressed snapshots
pub struct UndoStack {
    /// Compressed workflow states (zstd)
    snapshots: VecDeque<Vec<u8>>,
    /// Current position in the stack
    current: usize,
    /// Maximum number of snapshots to keep
    max_snapshots: usize,
}

impl UndoStack {
    /// Create a new undo stack with the specified maximum size
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: 0,
            max_snapshots: max_snapshots.max(1),
        }
    }

    /// Push a new snapshot onto the stack
    ///
    /// This truncates any redo history (snapshots after the current position).
    pub fn push(&mut self, workflow: &Workflow) -> Result<()> {
        let json = serde_json::to_vec(workflow)?;
        let compressed = zstd::encode_all(&json[..], 3)
            .map_err(|e| EngineError::Compression(e.to_string()))?;

        while self.snapshots.len() > self.current + 1 {
            self.snapshots.pop_back();
        }

        self.snapshots.push_back(compressed);
        self.current = self.snapshots.len() - 1;

        while self.snapshots.len() > self.max_snapshots {
            self.snapshots.pop_front();
            if self.current > 0 {
                self.current -= 1;
            }
        }

        Ok(())
    }

    /// Undo: move back one snapshot
    ///
    /// Returns the previous workflow state, or None if at the beginning.
    pub fn undo(&mut self) -> Option<Result<Workflow>> {
        if self.current > 0 {
            self.current -= 1;
            Some(self.decompress(self.current))
        } else {
            None
        }
    }

    /// Redo: move forward one snapshot
    ///
    /// Returns the next workflow state, or None if at the end.
    pub fn redo(&mut self) -> Option<Result<Workflow>> {
        if self.current + 1 < self.snapshots.len() {
            self.current += 1;
            Some(self.decompress(self.current))
        } else {
            None
        }
    }

    /// Get the current workflow state without moving the cursor
    pub fn current(&self) -> Option<Result<Workflow>> {
        if self.snapshots.is_empty() {
            None
        } else {
            Some(self.decompress(self.current))
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Clear all snapshots
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = 0;
    }

    /// Total compressed size of all snapshots
    pub fn compressed_size(&self) -> usize {
        self.snapshots.iter().map(|s| s.len()).sum()
    }

    fn decompress(&self, index: usize) -> Result<Workflow> {
        let compressed = &self.snapshots[index];
        let json = zstd::decode_all(&compressed[..])
            .map_err(|e| EngineError::Compression(e.to_string()))?;
        let workflow: Workflow = serde_json::from_slice(&json)?;
        Ok(workflow)
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(100)
    }
}
