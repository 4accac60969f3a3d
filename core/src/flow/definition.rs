// core/src/flow/definition.rs

//! The `Flow<TData, Err>` struct and its structural editing methods.

use crate::core::handler::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

/// An ordered list of named steps over a context `TData`, whose handlers fail
/// with `Err`.
///
/// `Err` must be constructible from [`FlowError`] so that engine-level
/// problems (a required step with no handler) surface through the same type.
pub struct Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: &str, steps: impl IntoIterator<Item = StepDef<TData>>) -> Self {
    let steps: Vec<StepDef<TData>> = steps.into_iter().collect();
    for (idx, step) in steps.iter().enumerate() {
      if steps[..idx].iter().any(|s| s.name == step.name) {
        panic!("Flow '{}' setup error: duplicate step '{}'.", name, step.name);
      }
    }
    Self {
      name: name.to_string(),
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Panics on an unknown step; a typo in a step name is a programming error.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "Flow '{}' setup error: step '{}' not found in flow definition.",
        self.name, step_name
      );
    }
  }

  fn position_of(&self, step_name: &str) -> Result<usize, FlowError> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  pub fn insert_before_step(&mut self, existing_step: &str, step: StepDef<TData>) -> Result<(), FlowError> {
    let idx = self.position_of(existing_step)?;
    self.insert_at(idx, step)
  }

  pub fn insert_after_step(&mut self, existing_step: &str, step: StepDef<TData>) -> Result<(), FlowError> {
    let idx = self.position_of(existing_step)?;
    self.insert_at(idx + 1, step)
  }

  fn insert_at(&mut self, idx: usize, step: StepDef<TData>) -> Result<(), FlowError> {
    if self.steps.iter().any(|s| s.name == step.name) {
      return Err(FlowError::Internal(format!(
        "step '{}' already exists in flow '{}'",
        step.name, self.name
      )));
    }
    self.steps.insert(idx, step);
    Ok(())
  }

  /// Removes a step together with its handlers. Unknown names are a no-op.
  pub fn remove_step(&mut self, step_name: &str) {
    if let Ok(idx) = self.position_of(step_name) {
      self.steps.remove(idx);
      self.before.remove(step_name);
      self.on.remove(step_name);
      self.after.remove(step_name);
    }
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> Result<(), FlowError> {
    let idx = self.position_of(step_name)?;
    self.steps[idx].optional = optional;
    Ok(())
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) -> Result<(), FlowError> {
    let idx = self.position_of(step_name)?;
    self.steps[idx].skip_if = skip_if;
    Ok(())
  }
}
