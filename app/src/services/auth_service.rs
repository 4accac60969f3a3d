// app/src/services/auth_service.rs

//! Bearer token verification. Tokens are issued by the account service; this
//! backend only checks them (HS256, shared secret) and reads the subject.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// User id.
  pub sub: String,
  /// Expiry, seconds since the epoch.
  pub exp: usize,
}

#[derive(Clone)]
pub struct TokenVerifier {
  decoding_key: DecodingKey,
  encoding_key: EncodingKey,
  validation: Validation,
}

impl TokenVerifier {
  pub fn new(secret: &str) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);
    Self {
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      validation,
    }
  }

  /// Verifies signature and expiry and returns the user id in `sub`.
  #[instrument(name = "auth_service::verify", skip_all, err(Display))]
  pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
    let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
      debug!(error = %e, "Token rejected.");
      AppError::Auth("Invalid or expired token".to_string())
    })?;
    Uuid::parse_str(&data.claims.sub)
      .map_err(|_| AppError::Auth("Invalid token subject".to_string()))
  }

  /// Mints a token for `user_id`. Used by local tooling and tests; production
  /// tokens come from the account service.
  pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
    let exp = (Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims {
      sub: user_id.to_string(),
      exp,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
  }
}
