// app/src/web/dto.rs

//! Request and response bodies. Requests are strict (unknown fields are
//! rejected) and are validated here before any flow runs.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::flows::contexts::CheckoutLine;
use crate::models::{Order, OrderStatus, PaymentMethod, ShippingAddress, User};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct CheckoutItemRequest {
  pub product: Uuid,
  pub qty: i64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckoutRequest {
  #[serde(default)]
  pub items: Vec<CheckoutItemRequest>,
  /// Kept loose on purpose: an unusable address falls back to a placeholder
  /// instead of failing the checkout.
  #[serde(default)]
  pub shipping_address: Option<serde_json::Value>,
  #[serde(default)]
  pub payment_method: Option<String>,
}

#[derive(Debug)]
pub struct ValidatedCheckout {
  pub lines: Vec<CheckoutLine>,
  pub shipping_address: ShippingAddress,
  pub payment_method: PaymentMethod,
}

impl CheckoutRequest {
  /// Empty carts and bad quantities are left to the checkout flow, which owns
  /// those rules.
  pub fn validate(self) -> Result<ValidatedCheckout> {
    let payment_method: PaymentMethod = match self.payment_method.as_deref().map(str::trim) {
      None | Some("") => return Err(AppError::Validation("Payment method is required".to_string())),
      Some(raw) => raw.parse()?,
    };

    Ok(ValidatedCheckout {
      lines: self
        .items
        .into_iter()
        .map(|item| CheckoutLine {
          product_id: item.product,
          qty: item.qty,
        })
        .collect(),
      shipping_address: resolve_shipping_address(self.shipping_address),
      payment_method,
    })
  }
}

fn resolve_shipping_address(raw: Option<serde_json::Value>) -> ShippingAddress {
  match raw.map(serde_json::from_value::<ShippingAddress>) {
    Some(Ok(address)) if address.is_complete() => address,
    Some(Ok(_)) => {
      debug!("Shipping address incomplete; using fallback.");
      ShippingAddress::fallback()
    }
    Some(Err(e)) => {
      debug!(error = %e, "Shipping address malformed; using fallback.");
      ShippingAddress::fallback()
    }
    None => ShippingAddress::fallback(),
  }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdateRequest {
  pub status: Option<String>,
}

impl StatusUpdateRequest {
  pub fn validate(self) -> Result<OrderStatus> {
    match self.status.as_deref().map(str::trim) {
      None | Some("") => Err(AppError::Validation("Status is required".to_string())),
      Some(raw) => raw.parse(),
    }
  }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
  pub id: Uuid,
  pub name: String,
  pub email: String,
}

impl From<&User> for OwnerSummary {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      name: user.name.clone(),
      email: user.email.clone(),
    }
  }
}

/// An order as administrators see it: the order fields plus its owner.
#[derive(Serialize, Debug)]
pub struct AdminOrderView {
  #[serde(flatten)]
  pub order: Order,
  pub user: Option<OwnerSummary>,
}
