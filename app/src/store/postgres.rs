// app/src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{OrderStore, ProductStore, UserStore};
use crate::errors::{AppError, Result};
use crate::models::{CancelledBy, LineItem, Order, OrderStatus, Product, ShippingAddress, User};

const SCHEMA: &str = include_str!("../../schema.sql");

const ORDER_COLUMNS: &str = "id, user_id, items, shipping_address, total_amount, payment_method, \
   payment_status, order_status, is_deleted, cancelled_by, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPool::connect(database_url).await?;
    info!("Database connection pool created.");
    Ok(Self::new(pool))
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  /// Creates the tables and indexes if they are missing.
  pub async fn ensure_schema(&self) -> Result<()> {
    for statement in SCHEMA
      .split(';')
      .map(strip_sql_comments)
      .filter(|s| !s.is_empty())
    {
      sqlx::query(&statement).execute(&self.pool).await?;
    }
    info!("Database schema ensured.");
    Ok(())
  }
}

fn strip_sql_comments(chunk: &str) -> String {
  chunk
    .lines()
    .filter(|line| !line.trim_start().starts_with("--"))
    .collect::<Vec<_>>()
    .join("\n")
    .trim()
    .to_string()
}

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  items: Json<Vec<LineItem>>,
  shipping_address: Json<ShippingAddress>,
  total_amount: i64,
  payment_method: String,
  payment_status: String,
  order_status: String,
  is_deleted: bool,
  cancelled_by: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = AppError;

  fn try_from(row: OrderRow) -> Result<Self> {
    let id = row.id;
    let corrupt = move |e: AppError| AppError::Internal(format!("Stored order {} is corrupt: {}", id, e));
    Ok(Order {
      id: row.id,
      user_id: row.user_id,
      items: row.items.0,
      shipping_address: row.shipping_address.0,
      total_amount: row.total_amount,
      payment_method: row.payment_method.parse().map_err(corrupt)?,
      payment_status: row.payment_status.parse().map_err(corrupt)?,
      order_status: row.order_status.parse().map_err(corrupt)?,
      is_deleted: row.is_deleted,
      cancelled_by: row
        .cancelled_by
        .as_deref()
        .map(|s| s.parse::<CancelledBy>())
        .transpose()
        .map_err(corrupt)?,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>> {
  rows.into_iter().map(Order::try_from).collect()
}

#[derive(FromRow)]
struct UserRow {
  id: Uuid,
  name: String,
  email: String,
  role: String,
}

impl TryFrom<UserRow> for User {
  type Error = AppError;

  fn try_from(row: UserRow) -> Result<Self> {
    Ok(User {
      id: row.id,
      name: row.name,
      email: row.email,
      role: row.role.parse()?,
    })
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "pg_store::insert_order", skip_all, fields(order_id = %order.id))]
  async fn insert_order(&self, order: &Order) -> Result<()> {
    sqlx::query(
      "INSERT INTO orders (id, user_id, items, shipping_address, total_amount, payment_method, \
       payment_status, order_status, is_deleted, cancelled_by, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(Json(&order.items))
    .bind(Json(&order.shipping_address))
    .bind(order.total_amount)
    .bind(order.payment_method.as_str())
    .bind(order.payment_status.as_str())
    .bind(order.order_status.as_str())
    .bind(order.is_deleted)
    .bind(order.cancelled_by.map(|by| by.as_str()))
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE id = $1 AND is_deleted = FALSE",
      ORDER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    row.map(Order::try_from).transpose()
  }

  #[instrument(name = "pg_store::update_order_status", skip_all, fields(order_id = %order.id, %expected))]
  async fn update_order_status(&self, order: &Order, expected: OrderStatus) -> Result<bool> {
    let result = sqlx::query(
      "UPDATE orders SET order_status = $2, cancelled_by = $3, updated_at = $4 \
       WHERE id = $1 AND order_status = $5 AND is_deleted = FALSE",
    )
    .bind(order.id)
    .bind(order.order_status.as_str())
    .bind(order.cancelled_by.map(|by| by.as_str()))
    .bind(order.updated_at)
    .bind(expected.as_str())
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() == 1)
  }

  async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 AND is_deleted = FALSE ORDER BY created_at DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    into_orders(rows)
  }

  async fn list_all_orders(&self) -> Result<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE is_deleted = FALSE ORDER BY created_at DESC",
      ORDER_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await?;
    into_orders(rows)
  }
}

#[async_trait]
impl ProductStore for PgStore {
  async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
      "SELECT id, name, price, stock, image, created_at, updated_at FROM products WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(product)
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
      "SELECT id, name, price, stock, image, created_at, updated_at FROM products ORDER BY name ASC",
    )
    .fetch_all(&self.pool)
    .await?;
    Ok(products)
  }

  #[instrument(name = "pg_store::decrement_stock", skip(self))]
  async fn decrement_stock_if_available(&self, id: Uuid, qty: i64) -> Result<bool> {
    let result = sqlx::query(
      "UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1 AND stock >= $2",
    )
    .bind(id)
    .bind(qty)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "pg_store::restock", skip(self))]
  async fn restock(&self, id: Uuid, qty: i64) -> Result<()> {
    let result = sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
      .bind(id)
      .bind(qty)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::NotFound(format!("Product {} not found", id)));
    }
    Ok(())
  }

  async fn upsert_product(&self, product: &Product) -> Result<()> {
    sqlx::query(
      "INSERT INTO products (id, name, price, stock, image, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) \
       ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, price = EXCLUDED.price, \
       stock = EXCLUDED.stock, image = EXCLUDED.image, updated_at = EXCLUDED.updated_at",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.stock)
    .bind(&product.image)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }
}

#[async_trait]
impl UserStore for PgStore {
  async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as("SELECT id, name, email, role FROM users WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    row.map(User::try_from).transpose()
  }

  async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let rows: Vec<UserRow> = sqlx::query_as("SELECT id, name, email, role FROM users WHERE id = ANY($1)")
      .bind(ids)
      .fetch_all(&self.pool)
      .await?;
    rows.into_iter().map(User::try_from).collect()
  }

  async fn upsert_user(&self, user: &User) -> Result<bool> {
    // An email held by another id is left alone instead of tripping the
    // unique constraint.
    let result = sqlx::query(
      "INSERT INTO users (id, name, email, role) \
       SELECT $1, $2, $3, $4 \
       WHERE NOT EXISTS (SELECT 1 FROM users WHERE email = $3 AND id <> $1) \
       ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email, role = EXCLUDED.role",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.role.as_str())
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() == 1)
  }
}
