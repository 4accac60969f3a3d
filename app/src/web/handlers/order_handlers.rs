// app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use curio_flow::{FlowContext, FlowOutcome};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::flows::contexts::CancelCtx;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::my_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn my_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.store.list_orders_for_user(auth_user.user.id).await?;
  info!(count = orders.len(), "Fetched caller's orders.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "Orders fetched successfully.",
    "orders": orders
  })))
}

#[instrument(
    name = "handler::get_my_order",
    skip(app_state, auth_user, path),
    fields(user_id = %auth_user.user.id, order_id = %path.as_ref())
)]
pub async fn get_my_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = app_state
    .store
    .find_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

  if !order.is_owned_by(auth_user.user.id) {
    warn!("Order read refused for non-owner.");
    return Err(AppError::Forbidden("You are not allowed to view this order".to_string()));
  }

  Ok(HttpResponse::Ok().json(json!({
    "message": "Order fetched successfully.",
    "order": order
  })))
}

#[instrument(
    name = "handler::cancel_order",
    skip(app_state, auth_user, path),
    fields(user_id = %auth_user.user.id, order_id = %path.as_ref())
)]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let ctx = FlowContext::new(CancelCtx::new(
    app_state.get_ref().clone(),
    path.into_inner(),
    auth_user.user,
  ));

  match app_state.flows.run(ctx.clone()).await {
    Ok(FlowOutcome::Completed) => {
      let order = ctx
        .read()
        .order
        .clone()
        .ok_or_else(|| AppError::Internal("Cancellation completed without an order.".to_string()))?;
      Ok(HttpResponse::Ok().json(json!({
        "message": "Order cancelled successfully.",
        "order": order
      })))
    }
    Ok(FlowOutcome::Halted) => Err(AppError::Internal(
      "Cancellation was halted before completion.".to_string(),
    )),
    Err(app_err) => {
      warn!(error = %app_err, "Cancellation failed.");
      Err(app_err)
    }
  }
}
