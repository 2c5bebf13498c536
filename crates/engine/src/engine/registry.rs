//! Workflow registry for type-erased workflow creation
//!
//! The registry allows registering workflow factories that create workflow
//! instances from JSON input without knowing the concrete type at runtime.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::workflow::{SignalOutcome, Workflow, WorkflowAction, WorkflowError};

/// Type-erased workflow interface
///
/// This trait allows the executor to work with workflows without knowing
/// their concrete types. Results are JSON.
pub trait AnyWorkflow: Send + Sync {
    /// Get the workflow type identifier
    fn workflow_type(&self) -> &'static str;

    /// Called when workflow starts
    fn on_start(&mut self) -> Vec<WorkflowAction>;

    /// Called when a timer fires
    fn on_timer_fired(&mut self, timer_id: &str) -> Vec<WorkflowAction>;

    /// Called when a signal wait resolves
    fn on_signal(&mut self, outcome: &SignalOutcome) -> Vec<WorkflowAction>;

    /// Check if workflow has completed
    fn is_completed(&self) -> bool;

    /// Get the result as JSON (if completed successfully)
    fn result_json(&self) -> Option<Value>;

    /// Get the error (if failed)
    fn error(&self) -> Option<WorkflowError>;
}

/// Wrapper to implement AnyWorkflow for any Workflow
struct WorkflowWrapper<W: Workflow> {
    inner: W,
}

impl<W: Workflow> AnyWorkflow for WorkflowWrapper<W> {
    fn workflow_type(&self) -> &'static str {
        W::TYPE
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        self.inner.on_start()
    }

    fn on_timer_fired(&mut self, timer_id: &str) -> Vec<WorkflowAction> {
        self.inner.on_timer_fired(timer_id)
    }

    fn on_signal(&mut self, outcome: &SignalOutcome) -> Vec<WorkflowAction> {
        self.inner.on_signal(outcome)
    }

    fn is_completed(&self) -> bool {
        self.inner.is_completed()
    }

    fn result_json(&self) -> Option<Value> {
        self.inner
            .result()
            .map(|r| serde_json::to_value(r).unwrap_or(Value::Null))
    }

    fn error(&self) -> Option<WorkflowError> {
        self.inner.error()
    }
}

/// Factory function type for creating workflows from JSON input
pub type WorkflowFactory =
    Box<dyn Fn(Value) -> Result<Box<dyn AnyWorkflow>, serde_json::Error> + Send + Sync>;

/// Registry of workflow factories
///
/// The registry maps workflow type names to factory functions that create
/// workflow instances from JSON input.
pub struct WorkflowRegistry {
    factories: HashMap<String, WorkflowFactory>,
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a workflow type
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut registry = WorkflowRegistry::new();
    /// registry.register::<HelloWorkflow>();
    /// ```
    pub fn register<W: Workflow>(&mut self) {
        let factory: WorkflowFactory = Box::new(|input: Value| {
            let typed_input: W::Input = serde_json::from_value(input)?;
            let workflow = W::new(typed_input);
            Ok(Box::new(WorkflowWrapper { inner: workflow }) as Box<dyn AnyWorkflow>)
        });

        self.factories.insert(W::TYPE.to_string(), factory);
    }

    /// Check if a workflow type is registered
    pub fn contains(&self, workflow_type: &str) -> bool {
        self.factories.contains_key(workflow_type)
    }

    /// Create a workflow instance from type name and JSON input
    pub fn create(
        &self,
        workflow_type: &str,
        input: Value,
    ) -> Result<Box<dyn AnyWorkflow>, RegistryError> {
        let factory = self
            .factories
            .get(workflow_type)
            .ok_or_else(|| RegistryError::UnknownWorkflowType(workflow_type.to_string()))?;

        factory(input).map_err(RegistryError::Deserialization)
    }

    /// Get the number of registered workflow types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Get all registered workflow type names
    pub fn workflow_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|s| s.as_str())
    }
}

impl fmt::Debug for WorkflowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowRegistry")
            .field("workflow_types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Errors from registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Workflow type not registered
    #[error("unknown workflow type: {0}")]
    UnknownWorkflowType(String),

    /// Failed to deserialize workflow input
    #[error("failed to deserialize workflow input: {0}")]
    Deserialization(#[source] serde_json::Error),
}
