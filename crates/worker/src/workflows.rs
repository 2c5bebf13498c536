// Hello Workflows - greeting state machine and its three registered variants
//
// Every variant runs the same machine:
//   Started → (DelayWait) → (SignalWait) → Completed
// and differs only in its suspension policy:
// - HelloWorkflow: SignalWait, or Immediate when auto_start is set
// - ScheduleWorkflow: Immediate (no client is around to signal a scheduled run)
// - DelayWorkflow: DelayThenSignal(max(delay_minutes, 1) minutes)
//
// The greeting is computed in exactly one place (`complete`), so the variants
// cannot drift apart.

use std::time::Duration;

use hello_core::{
    greeting, DelayWorkflowInput, ScheduleWorkflowInput, WorkflowInput, DELAY_WORKFLOW_NAME,
    SCHEDULE_WORKFLOW_NAME, SIGNAL_UPDATE_NAME, WORKFLOW_NAME,
};
use hello_engine::{SignalOutcome, Workflow, WorkflowAction};
use serde_json::json;
use tracing::{info, warn};

/// Timer ID used for the delay variant's wait
pub const DELAY_TIMER_ID: &str = "delay";

// ============================================================================
// Greeting Machine
// ============================================================================

/// Whether and how long to suspend before greeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspensionPolicy {
    /// Greet right away
    Immediate,
    /// Wait for one `update-name` signal
    SignalWait,
    /// Sleep, then wait for one `update-name` signal
    DelayThenSignal(Duration),
}

/// Where the machine is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreetingState {
    Started,
    DelayWait,
    SignalWait,
    Completed { greeting: String },
}

/// The state machine shared by every hello workflow
#[derive(Debug)]
pub struct GreetingMachine {
    workflow_type: &'static str,
    name: String,
    policy: SuspensionPolicy,
    state: GreetingState,
}

impl GreetingMachine {
    pub fn new(workflow_type: &'static str, name: String, policy: SuspensionPolicy) -> Self {
        Self {
            workflow_type,
            name,
            policy,
            state: GreetingState::Started,
        }
    }

    pub fn state(&self) -> &GreetingState {
        &self.state
    }

    /// Name the greeting will use
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> SuspensionPolicy {
        self.policy
    }

    /// Enter the machine
    pub fn start(&mut self) -> Vec<WorkflowAction> {
        info!(
            workflow_type = self.workflow_type,
            name = %self.name,
            policy = ?self.policy,
            "workflow started"
        );

        match self.policy {
            SuspensionPolicy::Immediate => self.complete(),
            SuspensionPolicy::SignalWait => self.wait_for_signal(),
            SuspensionPolicy::DelayThenSignal(delay) => {
                info!(
                    workflow_type = self.workflow_type,
                    delay_secs = delay.as_secs(),
                    "waiting for delay"
                );
                self.state = GreetingState::DelayWait;
                vec![WorkflowAction::timer(DELAY_TIMER_ID, delay)]
            }
        }
    }

    /// The delay elapsed
    pub fn timer_fired(&mut self, timer_id: &str) -> Vec<WorkflowAction> {
        if self.state != GreetingState::DelayWait || timer_id != DELAY_TIMER_ID {
            warn!(workflow_type = self.workflow_type, %timer_id, "unexpected timer ignored");
            return vec![];
        }

        info!(workflow_type = self.workflow_type, "delay completed");
        self.wait_for_signal()
    }

    /// The signal wait resolved
    ///
    /// Only a non-empty string payload replaces the name; an empty payload, a
    /// timeout or a cancellation keeps the original one.
    pub fn signal_resolved(&mut self, outcome: &SignalOutcome) -> Vec<WorkflowAction> {
        if self.state != GreetingState::SignalWait {
            warn!(workflow_type = self.workflow_type, "signal outcome outside of a wait ignored");
            return vec![];
        }

        match outcome {
            SignalOutcome::Received(signal) => match signal.payload_str() {
                Some(new_name) if !new_name.is_empty() => {
                    info!(workflow_type = self.workflow_type, %new_name, "received signal");
                    self.name = new_name.to_string();
                }
                Some(_) => {
                    info!(workflow_type = self.workflow_type, "received empty signal, keeping name");
                }
                None => {
                    warn!(
                        workflow_type = self.workflow_type,
                        payload = %signal.payload,
                        "received non-string signal payload, keeping name"
                    );
                }
            },
            SignalOutcome::TimedOut | SignalOutcome::Canceled => {
                info!(
                    workflow_type = self.workflow_type,
                    ?outcome,
                    "signal channel closed without delivery, keeping name"
                );
            }
        }

        self.complete()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, GreetingState::Completed { .. })
    }

    pub fn result(&self) -> Option<String> {
        match &self.state {
            GreetingState::Completed { greeting } => Some(greeting.clone()),
            _ => None,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn wait_for_signal(&mut self) -> Vec<WorkflowAction> {
        info!(
            workflow_type = self.workflow_type,
            signal = SIGNAL_UPDATE_NAME,
            "waiting for signal"
        );
        self.state = GreetingState::SignalWait;
        vec![WorkflowAction::await_signal(SIGNAL_UPDATE_NAME)]
    }

    fn complete(&mut self) -> Vec<WorkflowAction> {
        let result = greeting(&self.name);
        info!(workflow_type = self.workflow_type, %result, "completing workflow");
        self.state = GreetingState::Completed {
            greeting: result.clone(),
        };
        vec![WorkflowAction::complete(json!(result))]
    }
}

// ============================================================================
// Registered Workflows
// ============================================================================

/// Manual or auto-started hello workflow
#[derive(Debug)]
pub struct HelloWorkflow(GreetingMachine);

impl Workflow for HelloWorkflow {
    const TYPE: &'static str = WORKFLOW_NAME;
    type Input = WorkflowInput;
    type Output = String;

    fn new(input: Self::Input) -> Self {
        let policy = if input.auto_start {
            SuspensionPolicy::Immediate
        } else {
            SuspensionPolicy::SignalWait
        };
        Self(GreetingMachine::new(Self::TYPE, input.name, policy))
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        self.0.start()
    }

    fn on_signal(&mut self, outcome: &SignalOutcome) -> Vec<WorkflowAction> {
        self.0.signal_resolved(outcome)
    }

    fn is_completed(&self) -> bool {
        self.0.is_completed()
    }

    fn result(&self) -> Option<Self::Output> {
        self.0.result()
    }
}

/// Workflow started by schedules; never waits
#[derive(Debug)]
pub struct ScheduleWorkflow(GreetingMachine);

impl Workflow for ScheduleWorkflow {
    const TYPE: &'static str = SCHEDULE_WORKFLOW_NAME;
    type Input = ScheduleWorkflowInput;
    type Output = String;

    fn new(input: Self::Input) -> Self {
        Self(GreetingMachine::new(
            Self::TYPE,
            input.name,
            SuspensionPolicy::Immediate,
        ))
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        self.0.start()
    }

    fn is_completed(&self) -> bool {
        self.0.is_completed()
    }

    fn result(&self) -> Option<Self::Output> {
        self.0.result()
    }
}

/// Sleeps, then behaves like the signal-gated hello workflow
#[derive(Debug)]
pub struct DelayWorkflow(GreetingMachine);

impl Workflow for DelayWorkflow {
    const TYPE: &'static str = DELAY_WORKFLOW_NAME;
    type Input = DelayWorkflowInput;
    type Output = String;

    fn new(input: Self::Input) -> Self {
        let delay = input.delay();
        Self(GreetingMachine::new(
            Self::TYPE,
            input.name,
            SuspensionPolicy::DelayThenSignal(delay),
        ))
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        self.0.start()
    }

    fn on_timer_fired(&mut self, timer_id: &str) -> Vec<WorkflowAction> {
        self.0.timer_fired(timer_id)
    }

    fn on_signal(&mut self, outcome: &SignalOutcome) -> Vec<WorkflowAction> {
        self.0.signal_resolved(outcome)
    }

    fn is_completed(&self) -> bool {
        self.0.is_completed()
    }

    fn result(&self) -> Option<Self::Output> {
        self.0.result()
    }
}
