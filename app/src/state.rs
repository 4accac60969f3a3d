// app/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::flows;
use crate::notifications::NotificationDispatcher;
use crate::services::auth_service::TokenVerifier;
use crate::store::Store;
use curio_flow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub notifier: NotificationDispatcher,
  pub tokens: Arc<TokenVerifier>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the shared services and registers every order flow.
  pub fn new(store: Arc<dyn Store>, notifier: NotificationDispatcher, config: AppConfig) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    flows::register_all_flows(&flows);
    Self {
      store,
      flows,
      notifier,
      tokens: Arc::new(TokenVerifier::new(&config.jwt_secret)),
      config: Arc::new(config),
    }
  }
}
