// app/src/lib.rs

//! Order lifecycle backend for the Curio antique shop: checkout, order reads,
//! admin status updates and cancellation over an actix-web JSON API.

pub mod config;
pub mod errors;
pub mod flows;
pub mod models;
pub mod notifications;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::store::{MemoryStore, PgStore, Store};

/// Connects to PostgreSQL when a database URL is configured, otherwise falls
/// back to the in-memory store. Seeds demo data when asked to.
pub async fn build_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
  let store: Arc<dyn Store> = match config.database_url.as_deref() {
    Some(url) => {
      let pg = PgStore::connect(url).await?;
      pg.ensure_schema().await?;
      Arc::new(pg)
    }
    None => {
      tracing::warn!("DATABASE_URL not set; using the in-memory store. Data is lost on restart.");
      Arc::new(MemoryStore::new())
    }
  };

  if config.seed_db {
    store::seed::seed_demo_data(store.as_ref()).await?;
  }
  Ok(store)
}
