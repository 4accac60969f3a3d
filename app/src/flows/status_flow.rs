// app/src/flows/status_flow.rs
use crate::errors::AppError;
use crate::flows::common_steps;
use crate::flows::contexts::StatusUpdateCtx;
use crate::notifications::Notification;
use curio_flow::{Flow, FlowContext, FlowRegistry, StepControl, StepDef};
use tracing::{info, instrument, warn};

pub fn build_status_flow() -> Flow<StatusUpdateCtx, AppError> {
  let mut flow = Flow::<StatusUpdateCtx, AppError>::new(
    "order_status_update",
    [
      StepDef::required("load_order"),
      StepDef::required("apply_transition"),
      StepDef::required("save_order"),
      StepDef::optional("dispatch_status_notification"),
    ],
  );

  flow.on("load_order", load_order);
  flow.on("apply_transition", apply_transition);
  flow.on("save_order", save_order);
  flow.on("dispatch_status_notification", dispatch_status_notification);
  flow
}

pub fn register_status_flow(registry: &FlowRegistry<AppError>) {
  registry.register(build_status_flow());
}

async fn load_order(ctx: FlowContext<StatusUpdateCtx>) -> Result<StepControl, AppError> {
  let (app_state, order_id) = {
    let guard = ctx.read();
    (guard.app_state.clone(), guard.order_id)
  };
  let order = app_state
    .store
    .find_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
  ctx.write().order = Some(order);
  Ok(StepControl::Continue)
}

async fn apply_transition(ctx: FlowContext<StatusUpdateCtx>) -> Result<StepControl, AppError> {
  let mut guard = ctx.write();
  let target = guard.target;
  let order = guard
    .order
    .as_mut()
    .ok_or_else(|| AppError::Internal("Order was not loaded before the transition".to_string()))?;
  let previous = order.order_status;
  order.transition_to(target)?;
  guard.previous_status = Some(previous);
  Ok(StepControl::Continue)
}

/// Compare-and-set against the status read in `load_order`; a concurrent
/// update or cancellation in between makes this transition illegal.
#[instrument(name = "status_flow::save_order", skip_all)]
async fn save_order(ctx: FlowContext<StatusUpdateCtx>) -> Result<StepControl, AppError> {
  let (app_state, order, previous) = {
    let guard = ctx.read();
    (guard.app_state.clone(), guard.order.clone(), guard.previous_status)
  };
  let order = order.ok_or_else(|| AppError::Internal("No order to save".to_string()))?;
  let previous = previous.ok_or_else(|| AppError::Internal("Transition was not applied before saving".to_string()))?;

  if !app_state.store.update_order_status(&order, previous).await? {
    let current = app_state
      .store
      .find_order(order.id)
      .await?
      .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    warn!(order_id = %order.id, read = %previous, now = %current.order_status, "Order status changed concurrently.");
    return Err(AppError::InvalidTransition {
      from: current.order_status,
      to: order.order_status,
    });
  }

  info!(
    order_id = %order.id,
    from = %previous,
    to = %order.order_status,
    "Order status updated."
  );
  Ok(StepControl::Continue)
}

async fn dispatch_status_notification(ctx: FlowContext<StatusUpdateCtx>) -> Result<StepControl, AppError> {
  let (app_state, order) = {
    let guard = ctx.read();
    (guard.app_state.clone(), guard.order.clone())
  };
  if let Some(order) = order {
    let queued = common_steps::notify_order_owner(&app_state, &order, Notification::status_changed(&order)).await;
    ctx.write().notification_queued = queued;
  }
  Ok(StepControl::Continue)
}
