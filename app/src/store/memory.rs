// app/src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{OrderStore, ProductStore, UserStore};
use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus, Product, User};

/// In-process store. Each collection sits behind its own lock; no guard is
/// ever held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryStore {
  orders: RwLock<HashMap<Uuid, Order>>,
  products: RwLock<HashMap<Uuid, Product>>,
  users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Marks an order as soft-deleted. Nothing in the HTTP surface does this;
  /// it exists for maintenance tooling and tests.
  pub fn soft_delete_order(&self, id: Uuid) -> bool {
    match self.orders.write().get_mut(&id) {
      Some(order) => {
        order.is_deleted = true;
        true
      }
      None => false,
    }
  }

  fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  #[instrument(name = "memory_store::insert_order", skip_all, fields(order_id = %order.id))]
  async fn insert_order(&self, order: &Order) -> Result<()> {
    let mut orders = self.orders.write();
    if orders.contains_key(&order.id) {
      return Err(AppError::Internal(format!("Order {} already exists", order.id)));
    }
    orders.insert(order.id, order.clone());
    debug!("Order inserted.");
    Ok(())
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.orders.read().get(&id).filter(|o| !o.is_deleted).cloned())
  }

  #[instrument(name = "memory_store::update_order_status", skip_all, fields(order_id = %order.id))]
  async fn update_order_status(&self, order: &Order, expected: OrderStatus) -> Result<bool> {
    let mut orders = self.orders.write();
    match orders.get_mut(&order.id) {
      Some(stored) if !stored.is_deleted && stored.order_status == expected => {
        stored.order_status = order.order_status;
        stored.cancelled_by = order.cancelled_by;
        stored.updated_at = order.updated_at;
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let orders = self
      .orders
      .read()
      .values()
      .filter(|o| !o.is_deleted && o.user_id == user_id)
      .cloned()
      .collect();
    Ok(Self::newest_first(orders))
  }

  async fn list_all_orders(&self) -> Result<Vec<Order>> {
    let orders = self.orders.read().values().filter(|o| !o.is_deleted).cloned().collect();
    Ok(Self::newest_first(orders))
  }
}

#[async_trait]
impl ProductStore for MemoryStore {
  async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.products.read().get(&id).cloned())
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let mut products: Vec<Product> = self.products.read().values().cloned().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  #[instrument(name = "memory_store::decrement_stock", skip(self))]
  async fn decrement_stock_if_available(&self, id: Uuid, qty: i64) -> Result<bool> {
    let mut products = self.products.write();
    match products.get_mut(&id) {
      Some(product) if product.stock >= qty => {
        product.stock -= qty;
        product.updated_at = Utc::now();
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  #[instrument(name = "memory_store::restock", skip(self))]
  async fn restock(&self, id: Uuid, qty: i64) -> Result<()> {
    let mut products = self.products.write();
    let product = products
      .get_mut(&id)
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;
    product.stock += qty;
    product.updated_at = Utc::now();
    Ok(())
  }

  async fn upsert_product(&self, product: &Product) -> Result<()> {
    self.products.write().insert(product.id, product.clone());
    Ok(())
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.users.read().get(&id).cloned())
  }

  async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
    let users = self.users.read();
    Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
  }

  async fn upsert_user(&self, user: &User) -> Result<bool> {
    let mut users = self.users.write();
    if users.values().any(|u| u.email == user.email && u.id != user.id) {
      return Ok(false);
    }
    users.insert(user.id, user.clone());
    Ok(true)
  }
}
