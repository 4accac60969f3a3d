// core/src/flow/execution.rs

//! `Flow::run`: walks the steps in order and drives their handlers.

use crate::core::context::FlowContext;
use crate::core::control::{FlowOutcome, StepControl};
use crate::core::handler::Handler;
use crate::core::step::StepDef;
use crate::error::FlowError;
use crate::flow::definition::Flow;
use tracing::{event, info_span, Instrument, Level};

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx`.
  ///
  /// Within a step, all `before` handlers run, then `on`, then `after`, each
  /// group in registration order. The first `Halt` ends the run with
  /// [`FlowOutcome::Halted`]; the first error ends it with that error.
  pub async fn run(&self, ctx: FlowContext<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, flow = %self.name, num_steps = self.steps.len(), "Flow run starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let span = info_span!(
        "flow_step",
        flow = %self.name,
        step_name = %step_def.name,
        step_index = step_idx,
        optional = step_def.optional
      );
      if self.run_step(step_def, &ctx).instrument(span).await? == StepControl::Halt {
        event!(Level::INFO, flow = %self.name, step_name = %step_def.name, "Flow halted.");
        return Ok(FlowOutcome::Halted);
      }
    }

    event!(Level::DEBUG, flow = %self.name, "Flow run completed.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx: &FlowContext<TData>) -> Result<StepControl, Err> {
    if let Some(skip) = &step_def.skip_if {
      if skip(ctx) {
        event!(Level::DEBUG, "Step skipped by condition.");
        return Ok(StepControl::Continue);
      }
    }

    let name = step_def.name.as_str();
    let phases = [
      ("before", self.before.get(name)),
      ("on", self.on.get(name)),
      ("after", self.after.get(name)),
    ];

    if phases.iter().all(|(_, handlers)| handlers.map_or(true, |h| h.is_empty())) {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers, passing over it.");
        return Ok(StepControl::Continue);
      }
      event!(Level::ERROR, "Required step has no handlers.");
      return Err(Err::from(FlowError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for (phase, handlers) in phases {
      if let Some(handlers) = handlers {
        if run_handlers(phase, handlers, ctx).await? == StepControl::Halt {
          return Ok(StepControl::Halt);
        }
      }
    }
    Ok(StepControl::Continue)
  }
}

async fn run_handlers<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx: &FlowContext<TData>,
) -> Result<StepControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for handler in handlers {
    match handler(ctx.clone()).await {
      Ok(StepControl::Continue) => {}
      Ok(StepControl::Halt) => {
        event!(Level::INFO, phase, "Handler halted the flow.");
        return Ok(StepControl::Halt);
      }
      Err(e) => {
        event!(Level::WARN, phase, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(StepControl::Continue)
}
