//! Execution session manager
//!
//! Tracks which workflows have a run in flight. A busy workflow refuses new
//! runs and structural edits until its run completes or is cancelled, so an
//! in-progress dependency order can never be invalidated by an edit. One
//! workflow is edited by one session at a time; there is no cross-editor
//! conflict resolution here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use automation_engine::{
    CancelHandle, EventSink, ModuleRegistry, RunEngine, RunOptions, RunReport, Workflow,
    WorkflowId,
};
use tokio::sync::RwLock;

use crate::error::{Result, ServiceError};

/// State for one run in flight
struct ActiveRun {
    cancel: CancelHandle,
    started: Instant,
}

/// Manager for workflow runs
pub struct ExecutionSessions {
    engine: RunEngine,
    active: RwLock<HashMap<WorkflowId, ActiveRun>>,
    /// Runs older than this are assumed abandoned and get cancelled
    stale_timeout: Duration,
}

impl ExecutionSessions {
    /// Create a session manager running against the given registry
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self {
            engine: RunEngine::new(registry),
            active: RwLock::new(HashMap::new()),
            stale_timeout: Duration::from_secs(15 * 60),
        }
    }

    /// Override the stale-run timeout
    pub fn with_stale_timeout(mut self, timeout: Duration) -> Self {
        self.stale_timeout = timeout;
        self
    }

    /// Whether the workflow has a run in flight
    pub async fn is_busy(&self, workflow_id: &str) -> bool {
        self.active.read().await.contains_key(workflow_id)
    }

    /// Refuse structural edits while a run is in flight
    pub async fn guard_edit(&self, workflow_id: &str) -> Result<()> {
        if self.is_busy(workflow_id).await {
            return Err(ServiceError::WorkflowBusy(workflow_id.to_string()));
        }
        Ok(())
    }

    /// Run a workflow, holding its busy flag for the duration.
    ///
    /// Refuses with `WorkflowBusy` when a run is already in flight for the
    /// same workflow. Runs of different workflows proceed independently.
    pub async fn run(
        &self,
        workflow: &Workflow,
        options: RunOptions,
        sink: &dyn EventSink,
    ) -> Result<RunReport> {
        {
            let mut active = self.active.write().await;
            if active.contains_key(&workflow.id) {
                return Err(ServiceError::WorkflowBusy(workflow.id.clone()));
            }
            active.insert(
                workflow.id.clone(),
                ActiveRun {
                    cancel: options.cancel.clone(),
                    started: Instant::now(),
                },
            );
        }

        let report = self.engine.run(workflow, &options, sink).await;
        self.active.write().await.remove(&workflow.id);

        log::debug!(
            "Run {} for workflow '{}' finished (success: {})",
            report.run_id,
            workflow.id,
            report.success
        );
        Ok(report)
    }

    /// Request cancellation of a workflow's run in flight.
    ///
    /// Returns false when the workflow is not running.
    pub async fn cancel(&self, workflow_id: &str) -> bool {
        let active = self.active.read().await;
        match active.get(workflow_id) {
            Some(run) => {
                run.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of runs currently in flight
    pub async fn active_count(&self) -> usize {
        self.active.read().await.len()
    }

    /// Cancel runs older than the stale timeout and drop their busy flags.
    ///
    /// Returns the number of runs cleaned up.
    pub async fn cleanup_stale(&self) -> usize {
        let mut active = self.active.write().await;
        let stale_ids: Vec<WorkflowId> = active
            .iter()
            .filter(|(_, run)| run.started.elapsed() > self.stale_timeout)
            .map(|(id, _)| id.clone())
            .collect();

        let count = stale_ids.len();
        for id in stale_ids {
            if let Some(run) = active.remove(&id) {
                run.cancel.cancel();
                log::debug!("Cleaned up stale run for workflow '{}'", id);
            }
        }
        count
    }
}
