// app/src/web/extractors.rs

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

/// Raw token from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
  pub fn from_request_headers(req: &HttpRequest) -> Result<Self, AppError> {
    let header = req
      .headers()
      .get(actix_web::http::header::AUTHORIZATION)
      .and_then(|value| value.to_str().ok())
      .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let token = header
      .strip_prefix("Bearer ")
      .ok_or_else(|| AppError::Auth("Invalid authorization format. Expected 'Bearer <token>'".to_string()))?
      .trim();

    if token.is_empty() {
      return Err(AppError::Auth("Empty bearer token".to_string()));
    }
    Ok(Self(token.to_string()))
  }
}

/// The caller, verified from the bearer token and loaded from the store.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let token = BearerToken::from_request_headers(req);
    let app_state = req.app_data::<web::Data<AppState>>().cloned();

    Box::pin(async move {
      let token = token?;
      let app_state =
        app_state.ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;
      let user_id = app_state.tokens.verify(&token.0)?;
      let user = app_state.store.find_user(user_id).await?.ok_or_else(|| {
        warn!(%user_id, "Token subject does not match any user.");
        AppError::Auth("User not found".to_string())
      })?;
      Ok(AuthenticatedUser { user })
    })
  }
}

/// An authenticated caller whose stored role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser {
  pub user: User,
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let authenticated = AuthenticatedUser::from_request(req, payload);
    Box::pin(async move {
      let AuthenticatedUser { user } = authenticated.await?;
      if !user.is_admin() {
        warn!(user_id = %user.id, "Admin route refused for non-admin.");
        return Err(AppError::Forbidden("Admin access required".to_string()));
      }
      Ok(AdminUser { user })
    })
  }
}
