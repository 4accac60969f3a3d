// app/src/models/mod.rs

//! Records owned (orders) or read (products, users) by the order backend.

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum stored as
/// lowercase text, keeping the text form identical to its serde form.
macro_rules! text_enum {
  ($ty:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
    impl $ty {
      pub fn as_str(self) -> &'static str {
        match self {
          $($ty::$variant => $text,)+
        }
      }
    }

    impl std::fmt::Display for $ty {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl std::str::FromStr for $ty {
      type Err = crate::errors::AppError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
          $($text => Ok($ty::$variant),)+
          other => Err(crate::errors::AppError::Validation(format!("Unknown {} '{}'", $what, other))),
        }
      }
    }
  };
}

pub mod order;
pub mod product;
pub mod user;

pub use order::{
  CancelledBy, LineItem, Order, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress,
};
pub use product::Product;
pub use user::{Role, User};
