//! Workflow store
//!
//! Save/load/list/delete/duplicate for workflows, implemented purely in
//! terms of the generic persistence collaborator. A workflow serializes to a
//! single JSON document row in the `workflows` table.

use std::collections::HashMap;
use std::sync::Arc;

use automation_engine::Workflow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::persistence::{Persistence, RowFilter};

/// Table holding workflow documents
pub const WORKFLOWS_TABLE: &str = "workflows";

/// Listing entry for saved workflows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub module_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// Workflow persistence facade over the generic row store
pub struct WorkflowStore {
    persistence: Arc<dyn Persistence>,
}

impl WorkflowStore {
    /// Create a store over a persistence collaborator
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self { persistence }
    }

    /// Upsert a workflow, bumping its `updated_at` stamp
    pub fn save(&self, workflow: &mut Workflow) -> Result<()> {
        workflow.updated_at = Utc::now();
        let row = serde_json::to_value(&*workflow)?;
        self.persistence.insert(WORKFLOWS_TABLE, row)?;
        Ok(())
    }

    /// Load a workflow by id
    pub fn load(&self, id: &str) -> Result<Option<Workflow>> {
        let rows = self
            .persistence
            .list(WORKFLOWS_TABLE, &RowFilter::field_equals("id", id))?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// List summaries of every saved workflow
    pub fn list(&self) -> Result<Vec<WorkflowSummary>> {
        let rows = self.persistence.list(WORKFLOWS_TABLE, &RowFilter::all())?;
        let mut summaries = Vec::new();
        for row in rows {
            match serde_json::from_value::<Workflow>(row) {
                Ok(workflow) => summaries.push(WorkflowSummary {
                    id: workflow.id,
                    name: workflow.name,
                    description: workflow.description,
                    module_count: workflow.modules.len(),
                    updated_at: workflow.updated_at,
                }),
                Err(e) => {
                    log::warn!("Skipping unreadable workflow row: {}", e);
                }
            }
        }
        Ok(summaries)
    }

    /// Delete a workflow by id; deleting an absent id is a no-op
    pub fn delete(&self, id: &str) -> Result<()> {
        self.persistence.delete(WORKFLOWS_TABLE, id)
    }

    /// Deep-copy a workflow under a new id.
    ///
    /// Every module instance gets a fresh id and connections are remapped to
    /// the new ids, so the copy shares nothing with the original. Returns
    /// None when the source does not exist.
    pub fn duplicate(&self, id: &str, new_name: Option<&str>) -> Result<Option<Workflow>> {
        let Some(original) = self.load(id)? else {
            return Ok(None);
        };

        let now = Utc::now();
        let mut copy = original.clone();
        copy.id = Uuid::new_v4().to_string();
        copy.name = new_name
            .map(String::from)
            .unwrap_or_else(|| format!("{} (copy)", original.name));
        copy.created_at = now;
        copy.updated_at = now;

        let id_map: HashMap<String, String> = copy
            .modules
            .iter()
            .map(|m| (m.id.clone(), Uuid::new_v4().to_string()))
            .collect();
        for module in &mut copy.modules {
            if let Some(new_id) = id_map.get(&module.id) {
                module.id = new_id.clone();
            }
        }
        for conn in &mut copy.connections {
            if let Some(new_id) = id_map.get(&conn.source_id) {
                conn.source_id = new_id.clone();
            }
            if let Some(new_id) = id_map.get(&conn.target_id) {
                conn.target_id = new_id.clone();
            }
        }

        self.save(&mut copy)?;
        Ok(Some(copy))
    }
}
