// app/src/flows/common_steps.rs

//! Notification helpers shared by the order flows. Both only log on failure:
//! an email problem never fails the flow that triggered it.

use tracing::{debug, instrument, warn};

use crate::models::Order;
use crate::notifications::Notification;
use crate::state::AppState;

/// Queues `notification` for `to`. Returns whether it was accepted.
pub fn enqueue_notification(app_state: &AppState, to: &str, notification: Notification) -> bool {
  let kind = notification.kind();
  let order_id = notification.order_id();
  match app_state.notifier.enqueue(to, notification) {
    Ok(()) => {
      debug!(kind, %order_id, "Notification queued.");
      true
    }
    Err(e) => {
      warn!(kind, %order_id, error = %e, "Notification not queued.");
      false
    }
  }
}

/// Looks up the owner of `order` and queues `notification` to them.
#[instrument(name = "common_step::notify_order_owner", skip_all, fields(order_id = %order.id))]
pub async fn notify_order_owner(app_state: &AppState, order: &Order, notification: Notification) -> bool {
  match app_state.store.find_user(order.user_id).await {
    Ok(Some(owner)) => enqueue_notification(app_state, &owner.email, notification),
    Ok(None) => {
      warn!(user_id = %order.user_id, "Order owner not found; notification skipped.");
      false
    }
    Err(e) => {
      warn!(error = %e, "Order owner lookup failed; notification skipped.");
      false
    }
  }
}
