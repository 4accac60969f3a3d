// app/src/flows/cancel_flow.rs
use crate::errors::AppError;
use crate::flows::common_steps;
use crate::flows::contexts::CancelCtx;
use crate::models::CancelledBy;
use crate::notifications::Notification;
use curio_flow::{Flow, FlowContext, FlowRegistry, StepControl, StepDef};
use tracing::{info, instrument, warn};

pub fn build_cancel_flow() -> Flow<CancelCtx, AppError> {
  let mut flow = Flow::<CancelCtx, AppError>::new(
    "order_cancellation",
    [
      StepDef::required("load_order"),
      StepDef::required("resolve_actor"),
      StepDef::required("apply_cancellation"),
      StepDef::required("save_order"),
      StepDef::optional("dispatch_cancellation_notification"),
    ],
  );

  flow.on("load_order", load_order);
  flow.on("resolve_actor", resolve_actor);
  flow.on("apply_cancellation", apply_cancellation);
  flow.on("save_order", save_order);
  flow.on("dispatch_cancellation_notification", dispatch_cancellation_notification);
  flow
}

pub fn register_cancel_flow(registry: &FlowRegistry<AppError>) {
  registry.register(build_cancel_flow());
}

async fn load_order(ctx: FlowContext<CancelCtx>) -> Result<StepControl, AppError> {
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

/// The owner cancels as `user`; anyone else needs the admin role.
async fn resolve_actor(ctx: FlowContext<CancelCtx>) -> Result<StepControl, AppError> {
  let mut guard = ctx.write();
  let owned = guard
    .order
    .as_ref()
    .map(|order| order.is_owned_by(guard.requester.id))
    .ok_or_else(|| AppError::Internal("Order was not loaded before resolving the actor".to_string()))?;

  let actor = if owned {
    CancelledBy::User
  } else if guard.requester.is_admin() {
    CancelledBy::Admin
  } else {
    warn!(requester = %guard.requester.id, order_id = %guard.order_id, "Cancellation refused for non-owner.");
    return Err(AppError::Forbidden("You are not allowed to cancel this order".to_string()));
  };
  guard.actor = Some(actor);
  Ok(StepControl::Continue)
}

async fn apply_cancellation(ctx: FlowContext<CancelCtx>) -> Result<StepControl, AppError> {
  let mut guard = ctx.write();
  let actor = guard
    .actor
    .ok_or_else(|| AppError::Internal("Cancelling actor was not resolved".to_string()))?;
  let order = guard
    .order
    .as_mut()
    .ok_or_else(|| AppError::Internal("Order was not loaded before cancellation".to_string()))?;
  let previous = order.order_status;
  order.cancel(actor)?;
  guard.previous_status = Some(previous);
  Ok(StepControl::Continue)
}

/// Only succeeds while the stored status is still the one that was checked.
#[instrument(name = "cancel_flow::save_order", skip_all)]
async fn save_order(ctx: FlowContext<CancelCtx>) -> Result<StepControl, AppError> {
  let (app_state, order, previous) = {
    let guard = ctx.read();
    (guard.app_state.clone(), guard.order.clone(), guard.previous_status)
  };
  let order = order.ok_or_else(|| AppError::Internal("No order to save".to_string()))?;
  let previous =
    previous.ok_or_else(|| AppError::Internal("Cancellation was not applied before saving".to_string()))?;

  if !app_state.store.update_order_status(&order, previous).await? {
    let current = app_state
      .store
      .find_order(order.id)
      .await?
      .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    warn!(order_id = %order.id, now = %current.order_status, "Order status changed before cancellation was saved.");
    return Err(AppError::CannotCancel {
      status: current.order_status,
    });
  }

  info!(order_id = %order.id, cancelled_by = ?order.cancelled_by, "Order cancelled.");
  Ok(StepControl::Continue)
}

async fn dispatch_cancellation_notification(ctx: FlowContext<CancelCtx>) -> Result<StepControl, AppError> {
  let (app_state, order, actor) = {
    let guard = ctx.read();
    (guard.app_state.clone(), guard.order.clone(), guard.actor)
  };
  if let (Some(order), Some(actor)) = (order, actor) {
    let queued =
      common_steps::notify_order_owner(&app_state, &order, Notification::cancelled(order.id, actor)).await;
    ctx.write().notification_queued = queued;
  }
  Ok(StepControl::Continue)
}
