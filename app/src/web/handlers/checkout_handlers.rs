// app/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use curio_flow::{FlowContext, FlowOutcome};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::flows::contexts::CheckoutCtx;
use crate::state::AppState;
use crate::web::dto::CheckoutRequest;
use crate::web::extractors::AuthenticatedUser;

#[instrument(
    name = "handler::checkout",
    skip(app_state, auth_user, req_payload),
    fields(user_id = %auth_user.user.id)
)]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  let checkout = req_payload.into_inner().validate()?;
  info!(lines = checkout.lines.len(), payment_method = %checkout.payment_method, "Checkout requested.");

  let ctx = FlowContext::new(CheckoutCtx::new(
    app_state.get_ref().clone(),
    auth_user.user,
    checkout.lines,
    checkout.shipping_address,
    checkout.payment_method,
  ));

  match app_state.flows.run(ctx.clone()).await {
    Ok(FlowOutcome::Completed) => {
      let guard = ctx.read();
      let order = guard.order.clone().ok_or_else(|| {
        AppError::Internal("Checkout completed but no order was recorded.".to_string())
      })?;
      if !guard.confirmation_queued {
        warn!(order_id = %order.id, "Order placed without a queued confirmation email.");
      }
      Ok(HttpResponse::Created().json(json!({
        "message": "Order placed successfully.",
        "order": order
      })))
    }
    Ok(FlowOutcome::Halted) => Err(AppError::Internal(
      "Checkout was halted before an order was placed.".to_string(),
    )),
    Err(app_err) => {
      warn!(error = %app_err, "Checkout failed.");
      Err(app_err)
    }
  }
}
