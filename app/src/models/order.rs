// app/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, Result};

/// Fulfillment (logistics) state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

text_enum!(OrderStatus, "order status", {
  Processing => "processing",
  Shipped => "shipped",
  Delivered => "delivered",
  Cancelled => "cancelled",
});

impl OrderStatus {
  pub const ALL: [OrderStatus; 4] = [
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  /// The transition table. Both the admin status update and cancellation go
  /// through this; nothing else decides legality.
  pub fn allowed_next(self) -> &'static [OrderStatus] {
    match self {
      OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
      OrderStatus::Shipped => &[OrderStatus::Delivered],
      OrderStatus::Delivered | OrderStatus::Cancelled => &[],
    }
  }

  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    self.allowed_next().contains(&next)
  }

  pub fn is_terminal(self) -> bool {
    self.allowed_next().is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Paid,
  Failed,
}

text_enum!(PaymentStatus, "payment status", {
  Pending => "pending",
  Paid => "paid",
  Failed => "failed",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
  Cod,
  Card,
  Upi,
  Paypal,
}

text_enum!(PaymentMethod, "payment method", {
  Cod => "cod",
  Card => "card",
  Upi => "upi",
  Paypal => "paypal",
});

impl PaymentMethod {
  /// Cash on delivery is collected later; every other method is settled
  /// before checkout reaches the backend.
  pub fn initial_payment_status(self) -> PaymentStatus {
    match self {
      PaymentMethod::Cod => PaymentStatus::Pending,
      _ => PaymentStatus::Paid,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
  User,
  Admin,
}

text_enum!(CancelledBy, "cancelling actor", {
  User => "user",
  Admin => "admin",
});

/// Snapshot of a product taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
  pub product: Uuid,
  pub name: String,
  pub price: i64,
  pub qty: i64,
  pub image: Option<String>,
}

impl LineItem {
  pub fn subtotal(&self) -> Option<i64> {
    self.price.checked_mul(self.qty)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
  pub full_name: String,
  pub street: String,
  pub city: String,
  pub state: String,
  pub zip: String,
  pub country: String,
  pub address_tag: String,
}

impl ShippingAddress {
  /// Used when checkout arrives without a usable address.
  pub fn fallback() -> Self {
    let unknown = || "Not provided".to_string();
    Self {
      full_name: unknown(),
      street: unknown(),
      city: unknown(),
      state: unknown(),
      zip: unknown(),
      country: unknown(),
      address_tag: "home".to_string(),
    }
  }

  pub fn is_complete(&self) -> bool {
    [
      &self.full_name,
      &self.street,
      &self.city,
      &self.state,
      &self.zip,
      &self.country,
    ]
    .iter()
    .all(|field| !field.trim().is_empty())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub items: Vec<LineItem>,
  pub shipping_address: ShippingAddress,
  pub total_amount: i64,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  pub order_status: OrderStatus,
  pub is_deleted: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cancelled_by: Option<CancelledBy>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// Builds a fresh `processing` order. The total is computed from the line
  /// items here and never recomputed afterwards.
  pub fn place(
    user_id: Uuid,
    items: Vec<LineItem>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
  ) -> Result<Self> {
    let total_amount = Self::total_of(&items)
      .ok_or_else(|| AppError::Validation("Order total is out of range".to_string()))?;
    Self::place_with_total(user_id, items, shipping_address, payment_method, total_amount)
  }

  /// Like [`Order::place`], for callers that already hold the total from
  /// [`Order::total_of`] over the same items.
  pub fn place_with_total(
    user_id: Uuid,
    items: Vec<LineItem>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    total_amount: i64,
  ) -> Result<Self> {
    if items.is_empty() {
      return Err(AppError::Validation("Order must contain at least one item".to_string()));
    }
    let now = Utc::now();
    Ok(Self {
      id: Uuid::new_v4(),
      user_id,
      items,
      shipping_address,
      total_amount,
      payment_method,
      payment_status: payment_method.initial_payment_status(),
      order_status: OrderStatus::Processing,
      is_deleted: false,
      cancelled_by: None,
      created_at: now,
      updated_at: now,
    })
  }

  /// Σ price × qty, or `None` on overflow.
  pub fn total_of(items: &[LineItem]) -> Option<i64> {
    items
      .iter()
      .try_fold(0i64, |acc, item| item.subtotal().and_then(|s| acc.checked_add(s)))
  }

  /// Moves the fulfillment status along the transition table. Cancellation
  /// has its own entry point because it records who cancelled.
  pub fn transition_to(&mut self, next: OrderStatus) -> Result<()> {
    if next == OrderStatus::Cancelled {
      return Err(AppError::Validation(
        "Orders are cancelled through the cancel endpoint, not a status update".to_string(),
      ));
    }
    if !self.order_status.can_transition_to(next) {
      return Err(AppError::InvalidTransition {
        from: self.order_status,
        to: next,
      });
    }
    self.order_status = next;
    self.updated_at = Utc::now();
    Ok(())
  }

  pub fn cancel(&mut self, by: CancelledBy) -> Result<()> {
    if !self.order_status.can_transition_to(OrderStatus::Cancelled) {
      return Err(AppError::CannotCancel {
        status: self.order_status,
      });
    }
    self.order_status = OrderStatus::Cancelled;
    self.cancelled_by = Some(by);
    self.updated_at = Utc::now();
    Ok(())
  }

  pub fn is_owned_by(&self, user_id: Uuid) -> bool {
    self.user_id == user_id
  }
}
