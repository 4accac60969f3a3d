// app/src/flows/contexts.rs

//! Per-request data carried through each order flow. A context is created by
//! the HTTP handler, threaded through every step and read back once the flow
//! finishes.

use uuid::Uuid;

use crate::models::{CancelledBy, LineItem, Order, OrderStatus, PaymentMethod, Product, ShippingAddress, User};
use crate::state::AppState;

/// One requested cart line: which product and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutLine {
  pub product_id: Uuid,
  pub qty: i64,
}

pub struct CheckoutCtx {
  pub app_state: AppState,
  pub requester: User,
  pub lines: Vec<CheckoutLine>,
  pub shipping_address: ShippingAddress,
  pub payment_method: PaymentMethod,

  // Populated by the flow
  /// Products in the same order as `lines`.
  pub products: Vec<Product>,
  pub line_items: Vec<LineItem>,
  /// Stock already taken by this checkout; handed back if a later step fails.
  pub reserved: Vec<CheckoutLine>,
  pub total_amount: Option<i64>,
  pub order: Option<Order>,
  pub confirmation_queued: bool,
}

impl CheckoutCtx {
  pub fn new(
    app_state: AppState,
    requester: User,
    lines: Vec<CheckoutLine>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
  ) -> Self {
    Self {
      app_state,
      requester,
      lines,
      shipping_address,
      payment_method,
      products: Vec::new(),
      line_items: Vec::new(),
      reserved: Vec::new(),
      total_amount: None,
      order: None,
      confirmation_queued: false,
    }
  }
}

pub struct StatusUpdateCtx {
  pub app_state: AppState,
  pub order_id: Uuid,
  pub target: OrderStatus,

  pub order: Option<Order>,
  pub previous_status: Option<OrderStatus>,
  pub notification_queued: bool,
}

impl StatusUpdateCtx {
  pub fn new(app_state: AppState, order_id: Uuid, target: OrderStatus) -> Self {
    Self {
      app_state,
      order_id,
      target,
      order: None,
      previous_status: None,
      notification_queued: false,
    }
  }
}

pub struct CancelCtx {
  pub app_state: AppState,
  pub order_id: Uuid,
  pub requester: User,

  pub order: Option<Order>,
  pub actor: Option<CancelledBy>,
  pub previous_status: Option<OrderStatus>,
  pub notification_queued: bool,
}

impl CancelCtx {
  pub fn new(app_state: AppState, order_id: Uuid, requester: User) -> Self {
    Self {
      app_state,
      order_id,
      requester,
      order: None,
      actor: None,
      previous_status: None,
      notification_queued: false,
    }
  }
}
