// app/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::LineItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub price: i64,
  pub stock: i64,
  pub image: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn new(name: &str, price: i64, stock: i64, image: Option<&str>) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: name.to_string(),
      price,
      stock,
      image: image.map(str::to_string),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn snapshot(&self, qty: i64) -> LineItem {
    LineItem {
      product: self.id,
      name: self.name.clone(),
      price: self.price,
      qty,
      image: self.image.clone(),
    }
  }
}
