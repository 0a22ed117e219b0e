//! Workflow run engine
//!
//! Executes a finalized workflow snapshot in dependency order and produces a
//! run report without mutating the graph. A module becomes ready once every
//! module with connections into it has finished (success or failure);
//! independent ready modules execute concurrently in waves.
//!
//! Failures never abort a run: handler errors, timeouts, missing inputs and
//! unresolvable (cyclic) modules are all recorded per module and the report
//! always completes, surfacing whatever partial results exist.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::{EventSink, RunEvent};
use crate::registry::ModuleRegistry;
use crate::types::{ModuleId, ModuleInstance, ModuleType};
use crate::workflow::Workflow;

/// Shared cancellation flag for a run in progress
///
/// Cancelling stops scheduling of not-yet-started modules; modules already
/// in flight run to completion and keep their real status.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create a fresh, un-cancelled handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Per-run execution options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Time limit applied to each module invocation
    pub module_timeout: Option<Duration>,
    /// Cancellation handle shared with the caller
    pub cancel: CancelHandle,
}

impl RunOptions {
    /// Set a per-module timeout
    pub fn with_module_timeout(mut self, timeout: Duration) -> Self {
        self.module_timeout = Some(timeout);
        self
    }

    /// Use an externally held cancellation handle
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Why a module failed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModuleFailure {
    /// A required input had no supplying connection, config value, or default
    #[serde(rename_all = "camelCase")]
    MissingRequiredInput { port_id: String },

    /// A required config field was unset
    #[serde(rename_all = "camelCase")]
    MissingConfig { field_id: String },

    /// The module's type id is not in the registry
    #[serde(rename_all = "camelCase")]
    UnknownType { type_id: String },

    /// The type is registered spec-only, with no handler
    #[serde(rename_all = "camelCase")]
    NoHandler { type_id: String },

    /// The handler returned an error
    #[serde(rename_all = "camelCase")]
    HandlerError { message: String },

    /// The handler exceeded the per-module time limit
    Timeout,

    /// The module sits on or behind a cycle and could never become ready
    CyclicGraph,
}

impl std::fmt::Display for ModuleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredInput { port_id } => {
                write!(f, "Missing required input '{}'", port_id)
            }
            Self::MissingConfig { field_id } => {
                write!(f, "Missing required config field '{}'", field_id)
            }
            Self::UnknownType { type_id } => write!(f, "Unknown module type '{}'", type_id),
            Self::NoHandler { type_id } => {
                write!(f, "No handler registered for module type '{}'", type_id)
            }
            Self::HandlerError { message } => write!(f, "{}", message),
            Self::Timeout => write!(f, "Module timed out"),
            Self::CyclicGraph => write!(f, "Module is part of a dependency cycle"),
        }
    }
}

/// Outcome of one module within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ModuleStatus {
    /// Handler completed; outputs keyed by output port id
    #[serde(rename_all = "camelCase")]
    Succeeded {
        outputs: HashMap<String, serde_json::Value>,
    },

    /// Handler failed, timed out, or could not be invoked
    #[serde(rename_all = "camelCase")]
    Failed { error: ModuleFailure },

    /// Never started (run was cancelled first)
    Skipped,
}

impl ModuleStatus {
    /// Whether the module succeeded
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Outputs, when the module succeeded
    pub fn outputs(&self) -> Option<&HashMap<String, serde_json::Value>> {
        match self {
            Self::Succeeded { outputs } => Some(outputs),
            _ => None,
        }
    }
}

/// Per-module record in a run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRunRecord {
    /// The module instance that ran
    pub module_id: ModuleId,
    /// Outcome
    pub status: ModuleStatus,
    /// Wall-clock time spent in the module, zero when skipped
    pub elapsed_ms: u64,
}

/// Report of one workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Unique id for this run
    pub run_id: String,
    /// The workflow that ran
    pub workflow_id: String,
    /// True iff every module succeeded
    pub success: bool,
    /// Per-module outcomes, in the workflow's module declaration order
    pub results: Vec<ModuleRunRecord>,
    /// Wall-clock time for the whole run
    pub total_elapsed_ms: u64,
}

impl RunReport {
    /// Find the record for a module
    pub fn result(&self, module_id: &str) -> Option<&ModuleRunRecord> {
        self.results.iter().find(|r| r.module_id == module_id)
    }

    /// IDs of modules that did not succeed
    pub fn failed_modules(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.status.is_succeeded())
            .map(|r| r.module_id.as_str())
            .collect()
    }
}

/// Successful module output retained for downstream input resolution
struct CompletedModule {
    /// Completion order within the run; higher is more recent
    seq: usize,
    outputs: HashMap<String, serde_json::Value>,
}

/// Executor for workflow graphs
pub struct RunEngine {
    registry: Arc<ModuleRegistry>,
}

impl RunEngine {
    /// Create a new run engine over a registry
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self { registry }
    }

    /// Get the registry this engine dispatches through
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Execute a workflow and report per-module outcomes.
    ///
    /// Never fails as a whole: every error condition is recorded in the
    /// returned report.
    pub async fn run(
        &self,
        workflow: &Workflow,
        options: &RunOptions,
        sink: &dyn EventSink,
    ) -> RunReport {
        let run_id = format!("run-{}", Uuid::new_v4());
        let started = Instant::now();

        let _ = sink.send(RunEvent::RunStarted {
            workflow_id: workflow.id.clone(),
            run_id: run_id.clone(),
            module_count: workflow.modules.len(),
        });

        // Distinct predecessors per module, restricted to modules that exist
        let module_ids: HashSet<&str> = workflow.modules.iter().map(|m| m.id.as_str()).collect();
        let mut preds: HashMap<&str, HashSet<&str>> =
            module_ids.iter().map(|&id| (id, HashSet::new())).collect();
        for conn in &workflow.connections {
            if conn.source_id != conn.target_id
                && module_ids.contains(conn.source_id.as_str())
                && module_ids.contains(conn.target_id.as_str())
            {
                if let Some(sources) = preds.get_mut(conn.target_id.as_str()) {
                    sources.insert(&conn.source_id);
                }
            }
        }

        let mut pending: Vec<&ModuleInstance> = workflow.modules.iter().collect();
        let mut done: HashSet<&str> = HashSet::new();
        let mut completed: HashMap<ModuleId, CompletedModule> = HashMap::new();
        let mut statuses: HashMap<ModuleId, (ModuleStatus, u64)> = HashMap::new();
        let mut seq = 0usize;

        while !pending.is_empty() {
            if options.cancel.is_cancelled() {
                for module in &pending {
                    let _ = sink.send(RunEvent::ModuleSkipped {
                        module_id: module.id.clone(),
                        run_id: run_id.clone(),
                    });
                    statuses.insert(module.id.clone(), (ModuleStatus::Skipped, 0));
                }
                break;
            }

            let (ready, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|m| {
                preds
                    .get(m.id.as_str())
                    .map_or(true, |p| p.iter().all(|dep| done.contains(dep)))
            });

            if ready.is_empty() {
                // The remaining modules can never become ready: a cycle.
                for module in &rest {
                    log::warn!("Module '{}' is unreachable due to a cycle", module.id);
                    let failure = ModuleFailure::CyclicGraph;
                    let _ = sink.send(RunEvent::ModuleFailed {
                        module_id: module.id.clone(),
                        run_id: run_id.clone(),
                        error: failure.to_string(),
                    });
                    statuses.insert(
                        module.id.clone(),
                        (ModuleStatus::Failed { error: failure }, 0),
                    );
                }
                break;
            }

            let wave = join_all(
                ready
                    .iter()
                    .map(|m| self.run_module(m, workflow, &completed, options, sink, &run_id)),
            )
            .await;

            for (module, (status, elapsed)) in ready.iter().zip(wave) {
                seq += 1;
                if let ModuleStatus::Succeeded { outputs } = &status {
                    completed.insert(
                        module.id.clone(),
                        CompletedModule {
                            seq,
                            outputs: outputs.clone(),
                        },
                    );
                }
                done.insert(module.id.as_str());
                statuses.insert(module.id.clone(), (status, elapsed));
            }

            pending = rest;
        }

        let results: Vec<ModuleRunRecord> = workflow
            .modules
            .iter()
            .filter_map(|m| {
                statuses.remove(&m.id).map(|(status, elapsed_ms)| ModuleRunRecord {
                    module_id: m.id.clone(),
                    status,
                    elapsed_ms,
                })
            })
            .collect();

        let success = results.iter().all(|r| r.status.is_succeeded());
        let total_elapsed_ms = started.elapsed().as_millis() as u64;

        if success {
            let _ = sink.send(RunEvent::RunCompleted {
                workflow_id: workflow.id.clone(),
                run_id: run_id.clone(),
            });
        } else {
            let _ = sink.send(RunEvent::RunFailed {
                workflow_id: workflow.id.clone(),
                run_id: run_id.clone(),
                failed_modules: results
                    .iter()
                    .filter(|r| !r.status.is_succeeded())
                    .map(|r| r.module_id.clone())
                    .collect(),
            });
        }

        RunReport {
            run_id,
            workflow_id: workflow.id.clone(),
            success,
            results,
            total_elapsed_ms,
        }
    }

    /// Run one module and emit its lifecycle events
    async fn run_module(
        &self,
        module: &ModuleInstance,
        workflow: &Workflow,
        completed: &HashMap<ModuleId, CompletedModule>,
        options: &RunOptions,
        sink: &dyn EventSink,
        run_id: &str,
    ) -> (ModuleStatus, u64) {
        let _ = sink.send(RunEvent::ModuleStarted {
            module_id: module.id.clone(),
            run_id: run_id.to_string(),
        });

        let started = Instant::now();
        let status = self.execute_module(module, workflow, completed, options).await;
        let elapsed = started.elapsed().as_millis() as u64;

        match &status {
            ModuleStatus::Succeeded { outputs } => {
                log::debug!("Module '{}' succeeded in {}ms", module.id, elapsed);
                let _ = sink.send(RunEvent::ModuleCompleted {
                    module_id: module.id.clone(),
                    run_id: run_id.to_string(),
                    outputs: serde_json::to_value(outputs).unwrap_or_default(),
                });
            }
            ModuleStatus::Failed { error } => {
                log::debug!("Module '{}' failed: {}", module.id, error);
                let _ = sink.send(RunEvent::ModuleFailed {
                    module_id: module.id.clone(),
                    run_id: run_id.to_string(),
                    error: error.to_string(),
                });
            }
            ModuleStatus::Skipped => {
                let _ = sink.send(RunEvent::ModuleSkipped {
                    module_id: module.id.clone(),
                    run_id: run_id.to_string(),
                });
            }
        }

        (status, elapsed)
    }

    /// Resolve inputs and invoke the module's handler
    async fn execute_module(
        &self,
        module: &ModuleInstance,
        workflow: &Workflow,
        completed: &HashMap<ModuleId, CompletedModule>,
        options: &RunOptions,
    ) -> ModuleStatus {
        let Some(spec) = self.registry.get(&module.type_id) else {
            return ModuleStatus::Failed {
                error: ModuleFailure::UnknownType {
                    type_id: module.type_id.clone(),
                },
            };
        };

        let inputs = match resolve_inputs(module, spec, workflow, completed) {
            Ok(inputs) => inputs,
            Err(error) => return ModuleStatus::Failed { error },
        };

        let Some(handler) = self.registry.handler(&module.type_id) else {
            return ModuleStatus::Failed {
                error: ModuleFailure::NoHandler {
                    type_id: module.type_id.clone(),
                },
            };
        };

        let invocation = handler.run(&module.id, &inputs, &module.config);
        let outcome = match options.module_timeout {
            Some(limit) => match tokio::time::timeout(limit, invocation).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return ModuleStatus::Failed {
                        error: ModuleFailure::Timeout,
                    }
                }
            },
            None => invocation.await,
        };

        match outcome {
            Ok(outputs) => ModuleStatus::Succeeded { outputs },
            Err(e) => ModuleStatus::Failed {
                error: ModuleFailure::HandlerError {
                    message: e.to_string(),
                },
            },
        }
    }
}

/// Resolve values for every declared input port of a module.
///
/// Resolution order per port: most recently completed successful source among
/// supplying connections, then the module's config value under the port id,
/// then the port's default. A required port with no value fails the module;
/// an optional one resolves to null. Downstream modules of a failed source
/// therefore see their unresolved inputs as undefined rather than aborting
/// the run.
fn resolve_inputs(
    module: &ModuleInstance,
    spec: &ModuleType,
    workflow: &Workflow,
    completed: &HashMap<ModuleId, CompletedModule>,
) -> Result<HashMap<String, serde_json::Value>, ModuleFailure> {
    let mut inputs = HashMap::new();

    for port in &spec.inputs {
        let mut best: Option<(usize, serde_json::Value)> = None;
        for conn in workflow.incoming_connections(&module.id) {
            if conn.target_handle != port.id {
                continue;
            }
            if let Some(source) = completed.get(&conn.source_id) {
                if let Some(value) = source.outputs.get(&conn.source_handle) {
                    if best.as_ref().map_or(true, |(seq, _)| source.seq > *seq) {
                        best = Some((source.seq, value.clone()));
                    }
                }
            }
        }

        let resolved = best
            .map(|(_, value)| value)
            .or_else(|| module.config.get(&port.id).cloned())
            .or_else(|| port.default_value.clone());

        match resolved {
            Some(value) => {
                inputs.insert(port.id.clone(), value);
            }
            None if port.required => {
                return Err(ModuleFailure::MissingRequiredInput {
                    port_id: port.id.clone(),
                });
            }
            None => {
                inputs.insert(port.id.clone(), serde_json::Value::Null);
            }
        }
    }

    for field in &spec.config_fields {
        if field.required && !module.config.contains_key(&field.id) {
            return Err(ModuleFailure::MissingConfig {
                field_id: field.id.clone(),
            });
        }
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;
    use crate::error::EngineError;
    use crate::events::{NullEventSink, VecEventSink};
    use crate::types::{DataType, ModuleCategory, PortSpec};

    fn spec(type_id: &str, inputs: Vec<PortSpec>, outputs: Vec<PortSpec>) -> ModuleType {
        ModuleType {
            id: type_id.to_string(),
            category: ModuleCategory::Logic,
            label: type_id.to_string(),
            description: String::new(),
            inputs,
            outputs,
            config_fields: vec![],
        }
    }

    /// Registry with a number source and a doubler
    fn arithmetic_registry() -> Arc<ModuleRegistry> {
        let mut registry = ModuleRegistry::new();
        registry.register_callback(
            spec(
                "source",
                vec![],
                vec![PortSpec::optional("value", "Value", DataType::Number)],
            ),
            |_id, _inputs, _config| async move {
                let mut outputs = HashMap::new();
                outputs.insert("value".to_string(), serde_json::json!(5));
                Ok(outputs)
            },
        );
        registry.register_callback(
            spec(
                "double",
                vec![PortSpec::required("value", "Value", DataType::Number)],
                vec![PortSpec::optional("value", "Value", DataType::Number)],
            ),
            |_id, inputs, _config| async move {
                let value = inputs
                    .get("value")
                    .and_then(|v| v.as_f64())
                    .ok_or_else(|| EngineError::MissingInput("value".to_string()))?;
                let mut outputs = HashMap::new();
                outputs.insert("value".to_string(), serde_json::json!(value * 2.0));
                Ok(outputs)
            },
        );
        Arc::new(registry)
    }

    fn source_double_workflow(connected: bool) -> Workflow {
        let builder = WorkflowBuilder::new("wf", "Test")
            .add_module("m1", "source", (0.0, 0.0))
            .add_module("m2", "double", (100.0, 0.0));
        if connected {
            builder.connect("m1", "value", "m2", "value").build()
        } else {
            builder.build()
        }
    }

    #[tokio::test]
    async fn test_linear_run_threads_outputs() {
        let engine = RunEngine::new(arithmetic_registry());
        let workflow = source_double_workflow(true);

        let report = engine
            .run(&workflow, &RunOptions::default(), &NullEventSink)
            .await;

        assert!(report.success);
        assert_eq!(
            report.result("m1").unwrap().status.outputs().unwrap()["value"],
            serde_json::json!(5)
        );
        assert_eq!(
            report.result("m2").unwrap().status.outputs().unwrap()["value"],
            serde_json::json!(10.0)
        );
    }

    #[tokio::test]
    async fn test_missing_required_input_fails_module_only() {
        let engine = RunEngine::new(arithmetic_registry());
        let workflow = source_double_workflow(false);

        let report = engine
            .run(&workflow, &RunOptions::default(), &NullEventSink)
            .await;

        assert!(!report.success);
        assert!(report.result("m1").unwrap().status.is_succeeded());
        assert_eq!(
            report.result("m2").unwrap().status,
            ModuleStatus::Failed {
                error: ModuleFailure::MissingRequiredInput {
                    port_id: "value".to_string()
                }
            }
        );
    }

    #[tokio::test]
    async fn test_config_value_satisfies_required_input() {
        let engine = RunEngine::new(arithmetic_registry());
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("m2", "double", (0.0, 0.0))
            .with_config(serde_json::json!({"value": 7}))
            .build();

        let report = engine
            .run(&workflow, &RunOptions::default(), &NullEventSink)
            .await;

        assert!(report.success);
        assert_eq!(
            report.result("m2").unwrap().status.outputs().unwrap()["value"],
            serde_json::json!(14.0)
        );
    }

    #[tokio::test]
    async fn test_deterministic_across_runs() {
        let engine = RunEngine::new(arithmetic_registry());
        let workflow = source_double_workflow(true);

        let first = engine
            .run(&workflow, &RunOptions::default(), &NullEventSink)
            .await;
        let second = engine
            .run(&workflow, &RunOptions::default(), &NullEventSink)
            .await;

        for record in &first.results {
            assert_eq!(
                Some(&record.status),
                second.result(&record.module_id).map(|r| &r.status)
            );
        }
    }

    #[tokio::test]
    async fn test_partial_failure_isolation() {
        let mut registry = ModuleRegistry::new();
        registry.register_callback(
            spec(
                "ok",
                vec![],
                vec![PortSpec::optional("out", "Out", DataType::String)],
            ),
            |id, _inputs, _config| async move {
                let mut outputs = HashMap::new();
                outputs.insert("out".to_string(), serde_json::json!(id));
                Ok(outputs)
            },
        );
        registry.register_callback(
            spec(
                "explode",
                vec![PortSpec::optional("in", "In", DataType::String)],
                vec![],
            ),
            |_id, _inputs, _config| async move {
                Err(EngineError::failed("marketplace unavailable"))
            },
        );
        let engine = RunEngine::new(Arc::new(registry));

        // a -> b (fails); c is independent
        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("a", "ok", (0.0, 0.0))
            .add_module("b", "explode", (100.0, 0.0))
            .add_module("c", "ok", (0.0, 100.0))
            .connect("a", "out", "b", "in")
            .build();

        let sink = VecEventSink::new();
        let report = engine.run(&workflow, &RunOptions::default(), &sink).await;

        assert!(!report.success);
        assert!(report.result("a").unwrap().status.is_succeeded());
        assert!(report.result("c").unwrap().status.is_succeeded());
        assert_eq!(
            report.result("b").unwrap().status,
            ModuleStatus::Failed {
                error: ModuleFailure::HandlerError {
                    message: "Module execution failed: marketplace unavailable".to_string()
                }
            }
        );
        assert_eq!(report.failed_modules(), vec!["b"]);

        let events = sink.events();
        assert!(matches!(events.first(), Some(RunEvent::RunStarted { .. })));
        assert!(matches!(
            events.last(),
            Some(RunEvent::RunFailed { failed_modules, .. }) if failed_modules == &vec!["b".to_string()]
        ));
    }

    #[tokio::test]
    async fn test_module_timeout() {
        let mut registry = ModuleRegistry::new();
        registry.register_callback(
            spec("slow", vec![], vec![]),
            |_id, _inputs, _config| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(HashMap::new())
            },
        );
        let engine = RunEngine::new(Arc::new(registry));

        let workflow = WorkflowBuilder::new("wf", "Test")
            .add_module("s", "slow", (0.0, 0.0))
            .build();

        let options = RunOptions::default().with_module_timeout(Duration::from_millis(20));
        let report = engine.run(&workflow, &options, &NullEventSink).await;

        assert_eq!(
            report.result("s").unwrap().status,
            ModuleStatus::Failed {
                error: ModuleFailure::Timeout
            }
        );
    }

    #[tokio::test]
    async fn test_cancelled_run_skips_everything() {
        let engine = RunEngine::new(arithmetic_registry());
        let workflow = source_double_workflow(true);

        let cancel = CancelHandle::new();
        cancel.cancel();
        let options = RunOptions::default().with_cancel(cancel);

        let report = engine.run(&workflow, &options, &NullEventSink).await;

        assert!(!report.success);
        assert_eq!(report.result("m1").unwrap().status, ModuleStatus::Skipped);
        assert_eq!(report.result("m2").unwrap().status, ModuleStatus::Skipped);
    }

    #[tokio::test]
    async fn test_cycle_fails_without_hanging() {
        let engine = RunEngine::new(arithmetic_registry());

        let workflow = WorkflowBuilder::new("wf", "Cyclic")
            .add_module("a", "double", (0.0, 0.0))
            .add_module("b", "double", (100.0, 0.0))
            .add_module("c", "source", (0.0, 100.0))
            .connect("a", "value", "b", "value")
            .connect("b", "value", "a", "value")
            .build();

        let report = engine
            .run(&workflow, &RunOptions::default(), &NullEventSink)
            .await;

        assert!(!report.success);
        assert!(report.result("c").unwrap().status.is_succeeded());
        for id in ["a", "b"] {
            assert_eq!(
                report.result(id).unwrap().status,
                ModuleStatus::Failed {
                    error: ModuleFailure::CyclicGraph
                }
            );
        }
    }

    #[tokio::test]
    async fn test_multiple_sources_resolve_to_most_recent() {
        let mut registry = ModuleRegistry::new();
        registry.register_callback(
            spec(
                "emit",
                vec![],
                vec![PortSpec::optional("out", "Out", DataType::String)],
            ),
            |id, _inputs, _config| async move {
                let mut outputs = HashMap::new();
                outputs.insert("out".to_string(), serde_json::json!(id));
                Ok(outputs)
            },
        );
        registry.register_callback(
            spec(
                "take",
                vec![PortSpec::required("in", "In", DataType::String)],
                vec![PortSpec::optional("in", "In", DataType::String)],
            ),
            |_id, inputs, _config| async move { Ok(inputs) },
        );
        let engine = RunEngine::new(Arc::new(registry));

        let workflow = WorkflowBuilder::new("wf", "Fan-in")
            .add_module("s1", "emit", (0.0, 0.0))
            .add_module("s2", "emit", (0.0, 100.0))
            .add_module("t", "take", (100.0, 50.0))
            .connect("s1", "out", "t", "in")
            .connect("s2", "out", "t", "in")
            .build();

        let report = engine
            .run(&workflow, &RunOptions::default(), &NullEventSink)
            .await;

        // s2 completes after s1 within the wave, so its value wins
        assert_eq!(
            report.result("t").unwrap().status.outputs().unwrap()["in"],
            serde_json::json!("s2")
        );
    }

    #[tokio::test]
    async fn test_unknown_type_is_recorded_not_crashed() {
        let engine = RunEngine::new(Arc::new(ModuleRegistry::new()));
        let workflow = WorkflowBuilder::new("wf", "Stale")
            .add_module("m", "retired-type", (0.0, 0.0))
            .build();

        let report = engine
            .run(&workflow, &RunOptions::default(), &NullEventSink)
            .await;

        assert_eq!(
            report.result("m").unwrap().status,
            ModuleStatus::Failed {
                error: ModuleFailure::UnknownType {
                    type_id: "retired-type".to_string()
                }
            }
        );
    }

    #[tokio::test]
    async fn test_empty_workflow_succeeds() {
        let engine = RunEngine::new(arithmetic_registry());
        let workflow = WorkflowBuilder::new("wf", "Empty").build();

        let report = engine
            .run(&workflow, &RunOptions::default(), &NullEventSink)
            .await;

        assert!(report.success);
        assert!(report.results.is_empty());
    }
}
