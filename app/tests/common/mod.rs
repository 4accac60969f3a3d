// app/tests/common/mod.rs
#![allow(dead_code, unused_macros)]

use async_trait::async_trait;
use curio_shop::config::AppConfig;
use curio_shop::errors::{AppError, Result};
use curio_shop::models::{Order, OrderStatus, PaymentMethod, Product, Role, ShippingAddress, User};
use curio_shop::notifications::{Mailer, NotificationDispatcher, OutgoingEmail, RetryPolicy};
use curio_shop::state::AppState;
use curio_shop::store::{MemoryStore, OrderStore, ProductStore, Store, UserStore};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

pub const TEST_JWT_SECRET: &str = "curio-test-secret";

static TRACING: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

/// Mailer that records what it was asked to send. It can be told to fail a
/// number of times first.
#[derive(Default)]
pub struct RecordingMailer {
  sent: Mutex<Vec<OutgoingEmail>>,
  attempts: AtomicU32,
  failures_left: AtomicU32,
}

impl RecordingMailer {
  pub fn failing_first(failures: u32) -> Self {
    Self {
      failures_left: AtomicU32::new(failures),
      ..Self::default()
    }
  }

  pub fn sent(&self) -> Vec<OutgoingEmail> {
    self.sent.lock().clone()
  }

  pub fn attempts(&self) -> u32 {
    self.attempts.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl Mailer for RecordingMailer {
  async fn send(&self, email: &OutgoingEmail) -> Result<String> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    let should_fail = self
      .failures_left
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
      .is_ok();
    if should_fail {
      return Err(AppError::Notification("simulated mail outage".to_string()));
    }
    self.sent.lock().push(email.clone());
    Ok(format!("test-{}", uuid::Uuid::new_v4()))
  }
}

/// Polls until `mailer` has recorded at least `count` emails or two seconds pass.
pub async fn wait_for_emails(mailer: &RecordingMailer, count: usize) -> Vec<OutgoingEmail> {
  for _ in 0..200 {
    let sent = mailer.sent();
    if sent.len() >= count {
      return sent;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  mailer.sent()
}

/// Memory store that pauses after every order and product read, so flows run
/// side by side interleave between what they read and what they write.
pub struct SlowReadStore {
  inner: Arc<MemoryStore>,
  pause: Duration,
}

impl SlowReadStore {
  pub fn new(inner: Arc<MemoryStore>, pause: Duration) -> Self {
    Self { inner, pause }
  }
}

#[async_trait]
impl OrderStore for SlowReadStore {
  async fn insert_order(&self, order: &Order) -> Result<()> {
    self.inner.insert_order(order).await
  }
  async fn find_order(&self, id: uuid::Uuid) -> Result<Option<Order>> {
    let order = self.inner.find_order(id).await?;
    tokio::time::sleep(self.pause).await;
    Ok(order)
  }
  async fn update_order_status(&self, order: &Order, expected: OrderStatus) -> Result<bool> {
    self.inner.update_order_status(order, expected).await
  }
  async fn list_orders_for_user(&self, user_id: uuid::Uuid) -> Result<Vec<Order>> {
    self.inner.list_orders_for_user(user_id).await
  }
  async fn list_all_orders(&self) -> Result<Vec<Order>> {
    self.inner.list_all_orders().await
  }
}

#[async_trait]
impl ProductStore for SlowReadStore {
  async fn find_product(&self, id: uuid::Uuid) -> Result<Option<Product>> {
    let product = self.inner.find_product(id).await?;
    tokio::time::sleep(self.pause).await;
    Ok(product)
  }
  async fn list_products(&self) -> Result<Vec<Product>> {
    self.inner.list_products().await
  }
  async fn decrement_stock_if_available(&self, id: uuid::Uuid, qty: i64) -> Result<bool> {
    self.inner.decrement_stock_if_available(id, qty).await
  }
  async fn restock(&self, id: uuid::Uuid, qty: i64) -> Result<()> {
    self.inner.restock(id, qty).await
  }
  async fn upsert_product(&self, product: &Product) -> Result<()> {
    self.inner.upsert_product(product).await
  }
}

#[async_trait]
impl UserStore for SlowReadStore {
  async fn find_user(&self, id: uuid::Uuid) -> Result<Option<User>> {
    self.inner.find_user(id).await
  }
  async fn find_users(&self, ids: &[uuid::Uuid]) -> Result<Vec<User>> {
    self.inner.find_users(ids).await
  }
  async fn upsert_user(&self, user: &User) -> Result<bool> {
    self.inner.upsert_user(user).await
  }
}

pub struct TestCtx {
  pub state: AppState,
  pub memory: Arc<MemoryStore>,
  pub mailer: Arc<RecordingMailer>,
  pub admin: User,
  pub alice: User,
  pub bob: User,
}

impl TestCtx {
  pub async fn new() -> Self {
    let memory = Arc::new(MemoryStore::new());
    Self::with_store(memory.clone(), memory).await
  }

  /// `store` is what the application talks to; `memory` is the backing store
  /// the test inspects (they are the same unless a test wraps the store).
  pub async fn with_store(memory: Arc<MemoryStore>, store: Arc<dyn Store>) -> Self {
    setup_tracing();
    let config = AppConfig::for_tests(TEST_JWT_SECRET);
    let mailer = Arc::new(RecordingMailer::default());
    let (notifier, _worker) = NotificationDispatcher::spawn(
      mailer.clone(),
      config.mail_sender.clone(),
      RetryPolicy::new(config.notify_max_attempts, config.notify_retry_backoff),
      config.notify_queue_capacity,
    );

    let admin = User::new("Iris Admin", "iris@curio.example", Role::Admin);
    let alice = User::new("Alice Buyer", "alice@curio.example", Role::User);
    let bob = User::new("Bob Browser", "bob@curio.example", Role::User);
    for user in [&admin, &alice, &bob] {
      memory.upsert_user(user).await.expect("seed user");
    }

    Self {
      state: AppState::new(store, notifier, config),
      memory,
      mailer,
      admin,
      alice,
      bob,
    }
  }

  pub fn bearer(&self, user: &User) -> (&'static str, String) {
    let token = self
      .state
      .tokens
      .issue(user.id, chrono::Duration::hours(1))
      .expect("sign token");
    ("Authorization", format!("Bearer {}", token))
  }

  pub async fn add_product(&self, name: &str, price: i64, stock: i64) -> Product {
    let product = Product::new(name, price, stock, Some("/img/test.jpg"));
    self.memory.upsert_product(&product).await.expect("seed product");
    product
  }

  pub async fn stock_of(&self, product: &Product) -> i64 {
    self
      .memory
      .find_product(product.id)
      .await
      .expect("read product")
      .expect("product exists")
      .stock
  }

  /// Inserts a `processing` order for `owner` directly, bypassing checkout.
  pub async fn seed_order(&self, owner: &User, product: &Product, qty: i64) -> Order {
    let order = Order::place(
      owner.id,
      vec![product.snapshot(qty)],
      ShippingAddress::fallback(),
      PaymentMethod::Card,
    )
    .expect("valid order");
    self.memory.insert_order(&order).await.expect("insert order");
    order
  }

  pub async fn stored_order(&self, id: uuid::Uuid) -> Option<Order> {
    self.memory.find_order(id).await.expect("read order")
  }
}

/// Builds the actix test service for a `TestCtx`. Needs `#[macro_use] mod common;`.
macro_rules! init_app {
  ($ctx:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($ctx.state.clone()))
        .configure(curio_shop::web::configure_app_routes),
    )
    .await
  };
}
