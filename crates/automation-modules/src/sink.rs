//! Row sink for table-writing modules
//!
//! Modules that persist rows (e.g. `listing-upsert`) write through this seam
//! instead of a concrete store, so hosts can route writes to their own
//! persistence layer.

use std::collections::HashMap;

use automation_engine::Result;
use parking_lot::Mutex;
use serde_json::Value;

/// Destination for rows written by automation modules
pub trait RowSink: Send + Sync {
    /// Write one row to a named table, returning the stored row
    fn write(&self, table: &str, row: Value) -> Result<Value>;
}

/// In-memory row sink for tests and the simulated environment
#[derive(Default)]
pub struct MemoryRowSink {
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryRowSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows written to a table so far
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }
}

impl RowSink for MemoryRowSink {
    fn write(&self, table: &str, row: Value) -> Result<Value> {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_rows() {
        let sink = MemoryRowSink::new();
        sink.write("listings", serde_json::json!({"id": "l-1"})).unwrap();
        sink.write("listings", serde_json::json!({"id": "l-2"})).unwrap();

        let rows = sink.rows("listings");
        assert_eq!(rows.len(), 2);
        assert!(sink.rows("orders").is_empty());
    }
}
