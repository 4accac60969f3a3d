// core/tests/common/mod.rs
#![allow(dead_code)]

use curio_flow::{FlowContext, FlowError, Handler, StepControl};
use once_cell::sync::Lazy;
use tracing::Level;

/// A miniature checkout-like context: steps append to `trail` and add to
/// `total`, mimicking a flow that reserves and prices line items.
#[derive(Clone, Debug, Default)]
pub struct TallyCtx {
  pub total: i64,
  pub trail: Vec<String>,
  pub halt_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow engine error: {0}")]
  Engine(String),

  #[error("step rejected: {0}")]
  Rejected(String),
}

impl From<FlowError> for TestError {
  fn from(err: FlowError) -> Self {
    TestError::Engine(format!("{:?}", err))
  }
}

/// Handler that records `step` in the trail, adds `amount` to the total and
/// halts when the context asks it to.
pub fn add_amount(step: &'static str, amount: i64) -> Handler<TallyCtx, TestError> {
  Box::new(move |ctx: FlowContext<TallyCtx>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total += amount;
      guard.trail.push(step.to_string());
      if guard.halt_at.as_deref() == Some(step) {
        return Ok(StepControl::Halt);
      }
      Ok(StepControl::Continue)
    })
  })
}

pub fn reject(step: &'static str, reason: &'static str) -> Handler<TallyCtx, TestError> {
  Box::new(move |ctx: FlowContext<TallyCtx>| {
    Box::pin(async move {
      ctx.write().trail.push(step.to_string());
      Err(TestError::Rejected(reason.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
