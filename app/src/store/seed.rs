// app/src/store/seed.rs

use tracing::{info, warn};
use uuid::Uuid;

use super::Store;
use crate::errors::Result;
use crate::models::{Product, Role, User};

/// Fixed ids so tokens minted against a seeded store stay valid across restarts.
pub const DEMO_ADMIN_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_00000000a001);
pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_00000000c001);

fn demo_catalog() -> Vec<Product> {
  vec![
    Product::new("Victorian Brass Carriage Clock", 42_000, 3, Some("/img/carriage-clock.jpg")),
    Product::new("Art Deco Silver Cigarette Case", 18_500, 5, Some("/img/cigarette-case.jpg")),
    Product::new("Georgian Mahogany Writing Slope", 96_000, 1, Some("/img/writing-slope.jpg")),
    Product::new("Meissen Porcelain Figurine", 27_500, 2, None),
    Product::new("Edwardian Cut Glass Decanter", 9_900, 8, Some("/img/decanter.jpg")),
  ]
}

pub fn demo_users() -> Vec<User> {
  let mut admin = User::new("Curio Admin", "admin@curio.example", Role::Admin);
  admin.id = DEMO_ADMIN_ID;
  let mut user = User::new("Ada Collector", "ada@curio.example", Role::User);
  user.id = DEMO_USER_ID;
  vec![admin, user]
}

/// Loads a small antique catalog (only into an empty catalog) and two
/// accounts, one admin and one customer.
pub async fn seed_demo_data(store: &dyn Store) -> Result<()> {
  if store.list_products().await?.is_empty() {
    let products = demo_catalog();
    for product in &products {
      store.upsert_product(product).await?;
    }
    info!(products = products.len(), "Demo catalog seeded.");
  }
  for user in demo_users() {
    if !store.upsert_user(&user).await? {
      warn!(email = %user.email, "Demo account skipped; its email belongs to another user.");
    }
  }
  info!(admin_id = %DEMO_ADMIN_ID, user_id = %DEMO_USER_ID, "Demo accounts seeded.");
  Ok(())
}
