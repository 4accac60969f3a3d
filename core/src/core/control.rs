// core/src/core/control.rs

//! Signals for steering a flow and the outcome of a complete run.

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Run the remaining handlers and steps.
  Continue,
  /// Stop right here. No further handler of this step or any later step runs.
  Halt,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  Halted,
}

impl FlowOutcome {
  pub fn is_completed(self) -> bool {
    matches!(self, FlowOutcome::Completed)
  }
}
