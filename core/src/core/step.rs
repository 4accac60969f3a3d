// core/src/core/step.rs

use super::context::FlowContext;
use std::sync::Arc;

/// Evaluated right before a step runs; returning `true` skips the step.
pub type SkipCondition<TData> = Arc<dyn Fn(&FlowContext<TData>) -> bool + Send + Sync + 'static>;

/// Name, optionality and skip condition of one step.
#[derive(Clone)]
pub struct StepDef<T: 'static + Send + Sync> {
  pub name: String,
  /// An optional step without handlers is silently passed over.
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: 'static + Send + Sync> StepDef<T> {
  pub fn required(name: &str) -> Self {
    Self {
      name: name.to_string(),
      optional: false,
      skip_if: None,
    }
  }

  pub fn optional(name: &str) -> Self {
    Self {
      name: name.to_string(),
      optional: true,
      skip_if: None,
    }
  }

  pub fn skip_if(mut self, cond: impl Fn(&FlowContext<T>) -> bool + Send + Sync + 'static) -> Self {
    self.skip_if = Some(Arc::new(cond));
    self
  }
}

impl<T: 'static + Send + Sync> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
