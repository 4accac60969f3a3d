// app/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use curio_flow::{FlowContext, FlowOutcome};
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::flows::contexts::StatusUpdateCtx;
use crate::models::Order;
use crate::state::AppState;
use crate::web::dto::{AdminOrderView, OwnerSummary, StatusUpdateRequest};
use crate::web::extractors::AdminUser;

/// Attaches each order's owner. Orders whose owner record is gone get `null`.
async fn with_owners(app_state: &AppState, orders: Vec<Order>) -> Result<Vec<AdminOrderView>> {
  let mut owner_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
  owner_ids.sort_unstable();
  owner_ids.dedup();

  let owners: HashMap<Uuid, OwnerSummary> = app_state
    .store
    .find_users(&owner_ids)
    .await?
    .iter()
    .map(|user| (user.id, OwnerSummary::from(user)))
    .collect();

  Ok(
    orders
      .into_iter()
      .map(|order| {
        let user = owners.get(&order.user_id).cloned();
        AdminOrderView { order, user }
      })
      .collect(),
  )
}

#[instrument(name = "handler::admin_list_orders", skip(app_state, admin), fields(admin_id = %admin.user.id))]
pub async fn list_all_orders_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
) -> Result<HttpResponse> {
  let orders = app_state.store.list_all_orders().await?;
  let views = with_owners(&app_state, orders).await?;
  info!(count = views.len(), "Fetched all orders.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "Orders fetched successfully.",
    "orders": views
  })))
}

#[instrument(
    name = "handler::admin_get_order",
    skip(app_state, admin, path),
    fields(admin_id = %admin.user.id, order_id = %path.as_ref())
)]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  let order = app_state
    .store
    .find_order(path.into_inner())
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
  let view = with_owners(&app_state, vec![order])
    .await?
    .pop()
    .ok_or_else(|| AppError::Internal("Order view could not be built.".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({
    "message": "Order fetched successfully.",
    "order": view
  })))
}

#[instrument(
    name = "handler::admin_update_status",
    skip(app_state, admin, path, req_payload),
    fields(admin_id = %admin.user.id, order_id = %path.as_ref())
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse> {
  let target = req_payload.into_inner().validate()?;
  let ctx = FlowContext::new(StatusUpdateCtx::new(
    app_state.get_ref().clone(),
    path.into_inner(),
    target,
  ));

  match app_state.flows.run(ctx.clone()).await {
    Ok(FlowOutcome::Completed) => {
      let order = ctx
        .read()
        .order
        .clone()
        .ok_or_else(|| AppError::Internal("Status update completed without an order.".to_string()))?;
      Ok(HttpResponse::Ok().json(json!({
        "message": "Order status updated successfully.",
        "order": order
      })))
    }
    Ok(FlowOutcome::Halted) => Err(AppError::Internal(
      "Status update was halted before completion.".to_string(),
    )),
    Err(app_err) => {
      warn!(error = %app_err, %target, "Status update failed.");
      Err(app_err)
    }
  }
}
