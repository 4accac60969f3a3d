// app/src/main.rs

use curio_shop::config::{AppConfig, LogFormat};
use curio_shop::notifications::{LogMailer, NotificationDispatcher, RetryPolicy};
use curio_shop::state::AppState;
use curio_shop::{build_store, web as shop_web};

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      eprintln!("Configuration error: {}", e);
      std::process::exit(1);
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!(config = ?app_config, "Starting curio order server...");

  let store = match build_store(&app_config).await {
    Ok(store) => store,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise the store.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let (notifier, _worker) = NotificationDispatcher::spawn(
    Arc::new(LogMailer),
    app_config.mail_sender.clone(),
    RetryPolicy::new(app_config.notify_max_attempts, app_config.notify_retry_backoff),
    app_config.notify_queue_capacity,
  );

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(store, notifier, app_config);

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(shop_web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
