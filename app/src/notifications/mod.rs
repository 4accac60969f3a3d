// app/src/notifications/mod.rs

//! Order emails. Requests enqueue a [`Notification`] on the
//! [`NotificationDispatcher`]; a background worker renders it and hands it to
//! a [`Mailer`], retrying transient failures. Nothing here can fail or roll
//! back the order operation that triggered it.

pub mod dispatcher;
pub mod mailer;

pub use dispatcher::{NotificationDispatcher, RetryPolicy};
pub use mailer::{LogMailer, Mailer, OutgoingEmail};

use uuid::Uuid;

use crate::models::{CancelledBy, LineItem, Order, OrderStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
  OrderConfirmed {
    order_id: Uuid,
    items: Vec<LineItem>,
    total_amount: i64,
  },
  StatusChanged {
    order_id: Uuid,
    status: OrderStatus,
  },
  OrderCancelled {
    order_id: Uuid,
    by: CancelledBy,
  },
}

impl Notification {
  pub fn confirmed(order: &Order) -> Self {
    Notification::OrderConfirmed {
      order_id: order.id,
      items: order.items.clone(),
      total_amount: order.total_amount,
    }
  }

  pub fn status_changed(order: &Order) -> Self {
    Notification::StatusChanged {
      order_id: order.id,
      status: order.order_status,
    }
  }

  pub fn cancelled(order_id: Uuid, by: CancelledBy) -> Self {
    Notification::OrderCancelled { order_id, by }
  }

  pub fn order_id(&self) -> Uuid {
    match self {
      Notification::OrderConfirmed { order_id, .. }
      | Notification::StatusChanged { order_id, .. }
      | Notification::OrderCancelled { order_id, .. } => *order_id,
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Notification::OrderConfirmed { .. } => "order_confirmed",
      Notification::StatusChanged { .. } => "status_changed",
      Notification::OrderCancelled { .. } => "order_cancelled",
    }
  }

  pub fn subject(&self) -> String {
    match self {
      Notification::OrderConfirmed { order_id, .. } => format!("Your order {} is confirmed", order_id),
      Notification::StatusChanged { order_id, status } => {
        format!("Order {} is now {}", order_id, status)
      }
      Notification::OrderCancelled { order_id, .. } => format!("Order {} has been cancelled", order_id),
    }
  }

  pub fn render_html(&self) -> String {
    match self {
      Notification::OrderConfirmed {
        order_id,
        items,
        total_amount,
      } => {
        let rows: String = items
          .iter()
          .map(|item| {
            format!(
              "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
              item.name, item.qty, item.price
            )
          })
          .collect();
        format!(
          "<h1>Thank you for your order</h1>\
           <p>Order <strong>{}</strong> has been placed.</p>\
           <table><tr><th>Item</th><th>Qty</th><th>Price</th></tr>{}</table>\
           <p>Total: <strong>{}</strong></p>",
          order_id, rows, total_amount
        )
      }
      Notification::StatusChanged { order_id, status } => format!(
        "<p>The status of order <strong>{}</strong> changed to <strong>{}</strong>.</p>",
        order_id, status
      ),
      Notification::OrderCancelled { order_id, by } => match by {
        CancelledBy::User => format!(
          "<p>You cancelled order <strong>{}</strong>. No further action is needed.</p>",
          order_id
        ),
        CancelledBy::Admin => format!(
          "<p>Order <strong>{}</strong> was cancelled by our team. \
           Please contact support if you have questions.</p>",
          order_id
        ),
      },
    }
  }
}

/// A notification addressed to a recipient, as it travels through the queue.
#[derive(Debug, Clone)]
pub struct Envelope {
  pub to: String,
  pub notification: Notification,
}
