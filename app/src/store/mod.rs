// app/src/store/mod.rs

//! Keyed record storage for orders, and read/stock access to the product and
//! user collections.
//!
//! Two implementations exist: [`MemoryStore`] (tests, local runs without a
//! database) and [`PgStore`] (PostgreSQL with JSONB document columns).

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Order, OrderStatus, Product, User};

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert_order(&self, order: &Order) -> Result<()>;

  /// Soft-deleted orders are treated as absent.
  async fn find_order(&self, id: Uuid) -> Result<Option<Order>>;

  /// Persists the mutable part of an order: fulfillment status, cancelling
  /// actor and update timestamp. Items, address and amounts are never
  /// rewritten after creation.
  ///
  /// The write only happens while the stored status is still `expected`.
  /// Returns `false` when another update got there first or the order is gone.
  async fn update_order_status(&self, order: &Order, expected: OrderStatus) -> Result<bool>;

  /// Newest first.
  async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;

  /// Newest first.
  async fn list_all_orders(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  async fn find_product(&self, id: Uuid) -> Result<Option<Product>>;

  /// Ordered by name.
  async fn list_products(&self) -> Result<Vec<Product>>;

  /// Decrements stock by `qty` only if at least `qty` remain. Returns whether
  /// the decrement happened; `false` means a concurrent checkout got there
  /// first (or the product vanished).
  async fn decrement_stock_if_available(&self, id: Uuid, qty: i64) -> Result<bool>;

  /// Returns previously reserved stock.
  async fn restock(&self, id: Uuid, qty: i64) -> Result<()>;

  async fn upsert_product(&self, product: &Product) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
  async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

  /// Unknown ids are skipped.
  async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>>;

  /// Inserts or updates by id. Returns `false`, writing nothing, when the email
  /// already belongs to a different account.
  async fn upsert_user(&self, user: &User) -> Result<bool>;
}

/// Everything the application needs from persistence.
pub trait Store: OrderStore + ProductStore + UserStore {}

impl<T: OrderStore + ProductStore + UserStore> Store for T {}
