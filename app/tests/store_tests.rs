// app/tests/store_tests.rs

use curio_shop::errors::AppError;
use curio_shop::models::{Order, OrderStatus, PaymentMethod, Product, Role, ShippingAddress, User};
use curio_shop::store::memory::MemoryStore;
use curio_shop::store::seed::{seed_demo_data, DEMO_ADMIN_ID, DEMO_USER_ID};
use curio_shop::store::{OrderStore, ProductStore, UserStore};
use uuid::Uuid;

async fn stocked(store: &MemoryStore, stock: i64) -> Product {
  let product = Product::new("Walnut Writing Box", 180, stock, None);
  store.upsert_product(&product).await.unwrap();
  product
}

fn order_for(user_id: Uuid, product: &Product) -> Order {
  Order::place(
    user_id,
    vec![product.snapshot(1)],
    ShippingAddress::fallback(),
    PaymentMethod::Card,
  )
  .unwrap()
}

#[tokio::test]
async fn decrement_never_goes_below_zero() {
  let store = MemoryStore::new();
  let product = stocked(&store, 3).await;

  assert!(store.decrement_stock_if_available(product.id, 2).await.unwrap());
  assert!(!store.decrement_stock_if_available(product.id, 2).await.unwrap());
  assert!(store.decrement_stock_if_available(product.id, 1).await.unwrap());
  assert!(!store.decrement_stock_if_available(product.id, 1).await.unwrap());

  let after = store.find_product(product.id).await.unwrap().unwrap();
  assert_eq!(after.stock, 0);
}

#[tokio::test]
async fn restock_requires_existing_product() {
  let store = MemoryStore::new();
  let product = stocked(&store, 1).await;
  store.restock(product.id, 4).await.unwrap();
  assert_eq!(store.find_product(product.id).await.unwrap().unwrap().stock, 5);

  let missing = store.restock(Uuid::new_v4(), 1).await;
  assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn listings_are_newest_first_and_skip_deleted() {
  let store = MemoryStore::new();
  let product = stocked(&store, 10).await;
  let owner = Uuid::new_v4();

  let mut first = order_for(owner, &product);
  first.created_at -= chrono::Duration::minutes(5);
  let second = order_for(owner, &product);
  let other = order_for(Uuid::new_v4(), &product);
  for order in [&first, &second, &other] {
    store.insert_order(order).await.unwrap();
  }

  let mine: Vec<Uuid> = store
    .list_orders_for_user(owner)
    .await
    .unwrap()
    .iter()
    .map(|o| o.id)
    .collect();
  assert_eq!(mine, vec![second.id, first.id]);

  assert!(store.soft_delete_order(second.id));
  assert!(store.find_order(second.id).await.unwrap().is_none());
  assert_eq!(store.list_orders_for_user(owner).await.unwrap().len(), 1);
  assert_eq!(store.list_all_orders().await.unwrap().len(), 2);
}

#[tokio::test]
async fn status_write_needs_expected_status() {
  let store = MemoryStore::new();
  let product = stocked(&store, 1).await;
  let order = order_for(Uuid::new_v4(), &product);
  let mut shipped = order.clone();
  shipped.order_status = OrderStatus::Shipped;

  // Unknown orders are never written.
  assert!(!store.update_order_status(&shipped, OrderStatus::Processing).await.unwrap());

  store.insert_order(&order).await.unwrap();
  assert!(!store.update_order_status(&shipped, OrderStatus::Delivered).await.unwrap());
  assert!(store.update_order_status(&shipped, OrderStatus::Processing).await.unwrap());
  assert!(!store.update_order_status(&shipped, OrderStatus::Processing).await.unwrap());
  assert_eq!(
    store.find_order(order.id).await.unwrap().unwrap().order_status,
    OrderStatus::Shipped
  );
}

#[tokio::test]
async fn demo_seed_is_idempotent() {
  let store = MemoryStore::new();
  seed_demo_data(&store).await.unwrap();
  let catalog = store.list_products().await.unwrap();
  assert!(!catalog.is_empty());

  seed_demo_data(&store).await.unwrap();
  assert_eq!(store.list_products().await.unwrap().len(), catalog.len());

  let admin = store.find_user(DEMO_ADMIN_ID).await.unwrap().unwrap();
  assert_eq!(admin.role, Role::Admin);
  let users: Vec<User> = store.find_users(&[DEMO_USER_ID, Uuid::new_v4()]).await.unwrap();
  assert_eq!(users.len(), 1);
  assert_eq!(users[0].role, Role::User);
}

#[tokio::test]
async fn demo_seed_leaves_taken_emails_alone() {
  let store = MemoryStore::new();
  let existing = User::new("Existing Admin", "admin@curio.example", Role::User);
  assert!(store.upsert_user(&existing).await.unwrap());

  seed_demo_data(&store).await.unwrap();

  assert!(store.find_user(DEMO_ADMIN_ID).await.unwrap().is_none());
  assert_eq!(store.find_user(existing.id).await.unwrap(), Some(existing));
  assert!(store.find_user(DEMO_USER_ID).await.unwrap().is_some());

  let mut renamed = store.find_user(DEMO_USER_ID).await.unwrap().unwrap();
  renamed.name = "Ada Renamed".to_string();
  assert!(store.upsert_user(&renamed).await.unwrap());
  assert_eq!(store.find_user(DEMO_USER_ID).await.unwrap().unwrap().name, "Ada Renamed");
}
