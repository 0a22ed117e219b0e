//! Generic row persistence collaborator
//!
//! The service talks to storage through a narrow table contract: list,
//! insert (upsert), update, delete over JSON rows keyed by a string `id`
//! field. `MemoryPersistence` backs tests and the simulated environment;
//! `JsonDirPersistence` keeps one JSON file per row under a directory per
//! table, which is durable enough for a single-host deployment and trivially
//! inspectable.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, ServiceError};

/// Filter for `list`: match rows whose field equals a value
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    field: Option<String>,
    equals: Option<Value>,
}

impl RowFilter {
    /// Match every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Match rows where `field` equals `value`
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: Some(field.into()),
            equals: Some(value.into()),
        }
    }

    fn matches(&self, row: &Value) -> bool {
        match (&self.field, &self.equals) {
            (Some(field), Some(expected)) => row.get(field) == Some(expected),
            _ => true,
        }
    }
}

/// Generic persistence contract over JSON rows
pub trait Persistence: Send + Sync {
    /// List rows in a table matching the filter
    fn list(&self, table: &str, filter: &RowFilter) -> Result<Vec<Value>>;

    /// Insert or replace a row (upsert by `id`); returns the stored row.
    ///
    /// A row without an `id` gets a generated one.
    fn insert(&self, table: &str, row: Value) -> Result<Value>;

    /// Shallow-merge a patch into an existing row; returns the updated row
    fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value>;

    /// Delete a row; deleting an absent id is a no-op
    fn delete(&self, table: &str, id: &str) -> Result<()>;
}

/// Ensure the row is an object with a string id, generating one if absent
fn row_id(table: &str, row: &mut Value) -> Result<String> {
    let object = row
        .as_object_mut()
        .ok_or_else(|| ServiceError::MissingRowId(table.to_string()))?;

    match object.get("id").and_then(|v| v.as_str()) {
        Some(id) => Ok(id.to_string()),
        None => {
            let id = Uuid::new_v4().to_string();
            object.insert("id".to_string(), Value::String(id.clone()));
            Ok(id)
        }
    }
}

/// Shallow-merge patch keys into a row object
fn merge_patch(row: &mut Value, patch: Value) {
    if let (Some(target), Some(source)) = (row.as_object_mut(), patch.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// In-memory persistence for tests and the simulated environment
#[derive(Default)]
pub struct MemoryPersistence {
    tables: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryPersistence {
    fn list(&self, table: &str, filter: &RowFilter) -> Result<Vec<Value>> {
        let tables = self.tables.read();
        Ok(tables
            .get(table)
            .map(|rows| rows.values().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    fn insert(&self, table: &str, mut row: Value) -> Result<Value> {
        let id = row_id(table, &mut row)?;
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .insert(id, row.clone());
        Ok(row)
    }

    fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value> {
        let mut tables = self.tables.write();
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(id))
            .ok_or_else(|| ServiceError::RowNotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;
        merge_patch(row, patch);
        Ok(row.clone())
    }

    fn delete(&self, table: &str, id: &str) -> Result<()> {
        if let Some(rows) = self.tables.write().get_mut(table) {
            rows.remove(id);
        }
        Ok(())
    }
}

/// File-backed persistence: one directory per table, one JSON file per row
pub struct JsonDirPersistence {
    root: PathBuf,
}

impl JsonDirPersistence {
    /// Create a store rooted at the given directory
    ///
    /// Directories are created lazily on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn table_dir(&self, table: &str) -> PathBuf {
        self.root.join(table)
    }

    fn row_path(&self, table: &str, id: &str) -> PathBuf {
        self.table_dir(table).join(format!("{}.json", id))
    }

    fn read_row(&self, table: &str, id: &str) -> Result<Option<Value>> {
        let path = self.row_path(table, id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_row(&self, table: &str, id: &str, row: &Value) -> Result<()> {
        std::fs::create_dir_all(self.table_dir(table))?;
        let content = serde_json::to_string_pretty(row)?;
        std::fs::write(self.row_path(table, id), content)?;
        Ok(())
    }
}

impl Persistence for JsonDirPersistence {
    fn list(&self, table: &str, filter: &RowFilter) -> Result<Vec<Value>> {
        let dir = self.table_dir(table);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&content) {
                Ok(row) if filter.matches(&row) => rows.push(row),
                Ok(_) => {}
                Err(e) => {
                    log::warn!("Failed to parse row from {:?}: {}", path, e);
                }
            }
        }
        // read_dir order is platform-dependent; keep listings stable
        rows.sort_by(|a, b| {
            let key = |r: &Value| r.get("id").and_then(|v| v.as_str()).unwrap_or("").to_string();
            key(a).cmp(&key(b))
        });
        Ok(rows)
    }

    fn insert(&self, table: &str, mut row: Value) -> Result<Value> {
        let id = row_id(table, &mut row)?;
        self.write_row(table, &id, &row)?;
        log::debug!("Saved row '{}' to table '{}'", id, table);
        Ok(row)
    }

    fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value> {
        let mut row = self
            .read_row(table, id)?
            .ok_or_else(|| ServiceError::RowNotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;
        merge_patch(&mut row, patch);
        self.write_row(table, id, &row)?;
        Ok(row)
    }

    fn delete(&self, table: &str, id: &str) -> Result<()> {
        let path = self.row_path(table, id);
        if path.exists() {
            std::fs::remove_file(&path)?;
            log::debug!("Deleted row '{}' from table '{}'", id, table);
        }
        Ok(())
    }
}
