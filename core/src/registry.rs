// core/src/registry.rs

//! `FlowRegistry<E>`: one flow per context type, run by handing over a context.
//!
//! Flows are stored type-erased. A flow's handler error type may differ from
//! the registry's error type `E` as long as it converts into it.

use crate::core::context::FlowContext;
use crate::core::control::FlowOutcome;
use crate::error::FlowError;
use crate::flow::definition::Flow;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[async_trait]
trait ErasedFlow<E>: Send + Sync
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn name(&self) -> &str;

  /// `ctx` must hold a `FlowContext<TData>` for the wrapped flow's `TData`.
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, E>;
}

struct FlowRunner<TData, FlowErr, E>
where
  TData: 'static + Send + Sync,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flow: Flow<TData, FlowErr>,
  _app_err: PhantomData<fn() -> E>,
}

#[async_trait]
impl<TData, FlowErr, E> ErasedFlow<E> for FlowRunner<TData, FlowErr, E>
where
  TData: 'static + Send + Sync,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  E: std::error::Error + From<FlowErr> + From<FlowError> + Send + Sync + 'static,
{
  fn name(&self) -> &str {
    self.flow.name()
  }

  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, E> {
    let typed = ctx.downcast::<FlowContext<TData>>().map_err(|_| {
      E::from(FlowError::TypeMismatch {
        expected_type: std::any::type_name::<FlowContext<TData>>().to_string(),
      })
    })?;
    self.flow.run(*typed).await.map_err(E::from)
  }
}

/// Type-keyed collection of flows returning `E` on failure.
pub struct FlowRegistry<E = FlowError>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flows: RwLock<HashMap<TypeId, Arc<dyn ErasedFlow<E>>>>,
}

impl<E> Default for FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<E> FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flows: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `flow` for its context type, replacing any earlier flow for
  /// that type.
  pub fn register<TData, FlowErr>(&self, flow: Flow<TData, FlowErr>)
  where
    TData: 'static + Send + Sync,
    FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    E: From<FlowErr>,
  {
    event!(Level::DEBUG, flow = %flow.name(), context_type = %std::any::type_name::<TData>(), "Registering flow.");
    let runner: Arc<dyn ErasedFlow<E>> = Arc::new(FlowRunner::<TData, FlowErr, E> {
      flow,
      _app_err: PhantomData,
    });
    if let Some(previous) = self.flows.write().insert(TypeId::of::<TData>(), runner) {
      event!(Level::WARN, replaced = %previous.name(), "Flow registration replaced an existing flow.");
    }
  }

  pub fn is_registered<TData: 'static + Send + Sync>(&self) -> bool {
    self.flows.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the flow registered for `TData`.
  #[instrument(name = "FlowRegistry::run", skip_all, fields(context_type = %std::any::type_name::<TData>()))]
  pub async fn run<TData>(&self, ctx: FlowContext<TData>) -> Result<FlowOutcome, E>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self.flows.read().get(&TypeId::of::<TData>()).cloned().ok_or_else(|| {
      let context_type = std::any::type_name::<TData>().to_string();
      event!(Level::ERROR, %context_type, "No flow registered.");
      E::from(FlowError::NotRegistered { context_type })
    })?;
    runner.run_erased(Box::new(ctx)).await
  }
}
