// core/src/flow/hooks.rs

//! Registration of `before`, `on` and `after` handlers.
//!
//! Handlers may fail with any error that converts into the flow's `Err`, so a
//! step can use `?` on its own domain errors without manual mapping.

use crate::core::context::FlowContext;
use crate::core::control::StepControl;
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::flow::definition::Flow;
use std::collections::HashMap;
use std::future::Future;
use tracing::{event, Level};

#[derive(Debug, Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn before<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.register(Phase::Before, step_name, handler_fn);
  }

  pub fn on<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.register(Phase::On, step_name, handler_fn);
  }

  pub fn after<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.register(Phase::After, step_name, handler_fn);
  }

  fn register<F, UserErr>(
    &mut self,
    phase: Phase,
    step_name: &str,
    handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<TData, Err> = Box::new(move |ctx| {
      let fut = handler_fn(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    let table: &mut HashMap<String, Vec<Handler<TData, Err>>> = match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    };
    table.entry(step_name.to_string()).or_default().push(handler);
    event!(Level::TRACE, flow = %self.name, step_name, ?phase, "Handler registered.");
  }
}
