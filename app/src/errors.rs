// app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use curio_flow::FlowError;
use serde_json::json;
use thiserror::Error;

use crate::models::OrderStatus;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),

  #[error("Insufficient stock for {product}. Available: {available}")]
  InsufficientStock { product: String, available: i64 },

  #[error("Cannot change order status from '{from}' to '{to}'")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Order cannot be cancelled because it is already {status}")]
  CannotCancel { status: OrderStatus },

  #[error("{0}")]
  Auth(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Notification Error: {0}")]
  Notification(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_)
      | AppError::InsufficientStock { .. }
      | AppError::InvalidTransition { .. }
      | AppError::CannotCancel { .. } => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Notification(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    match self {
      AppError::Sqlx(_) => {
        HttpResponse::build(status).json(json!({"message": "Database operation failed", "detail": self.to_string()}))
      }
      AppError::Config(_) | AppError::Notification(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        HttpResponse::build(status).json(json!({"message": "An internal error occurred", "detail": self.to_string()}))
      }
      _ => HttpResponse::build(status).json(json!({"message": self.to_string()})),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
