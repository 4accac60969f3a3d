// core/src/core/handler.rs

use crate::core::context::FlowContext;
use crate::core::control::StepControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future produced by a handler.
pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>;

/// A step handler: receives a clone of the flow context and resolves to a
/// [`StepControl`] or the flow's error.
///
/// Handlers must release context guards before awaiting.
pub type Handler<TData, Err> = Box<dyn Fn(FlowContext<TData>) -> HandlerFuture<Err> + Send + Sync>;
