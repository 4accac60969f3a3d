// app/src/web/routes.rs

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use tracing::debug;

use crate::errors::AppError;
use crate::web::handlers::{admin_handlers, checkout_handlers, order_handlers, product_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed or unexpected JSON bodies become a 400 with a `message` field.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err: JsonPayloadError, req: &HttpRequest| {
    debug!(path = %req.path(), error = %err, "Rejected request body.");
    AppError::Validation(format!("Invalid request body: {}", err)).into()
  })
}

/// Path segments that fail to parse (e.g. a malformed order id) are a 400.
pub fn path_config() -> web::PathConfig {
  web::PathConfig::default().error_handler(|err, _req| AppError::Validation(format!("Invalid path: {}", err)).into())
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.app_data(json_config()).app_data(path_config()).service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      .service(
        web::scope("/user")
          .route("/checkout", web::post().to(checkout_handlers::checkout_handler))
          // `/orders/my` is registered before `/orders/{id}` so it is not read as an id.
          .route("/orders/my", web::get().to(order_handlers::my_orders_handler))
          .route("/orders/{order_id}", web::get().to(order_handlers::get_my_order_handler))
          .route("/orders/{order_id}/cancel", web::patch().to(order_handlers::cancel_order_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/orders", web::get().to(admin_handlers::list_all_orders_handler))
          .route("/orders/{order_id}", web::get().to(admin_handlers::get_order_handler))
          .route(
            "/orders/{order_id}/status",
            web::patch().to(admin_handlers::update_order_status_handler),
          ),
      ),
  );
}
