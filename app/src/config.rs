// app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "pretty" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}' (expected pretty or json)", other))),
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Without a database URL the server runs on the in-memory store.
  pub database_url: Option<String>,
  pub jwt_secret: String,

  pub mail_sender: String,
  pub notify_max_attempts: u32,
  pub notify_retry_backoff: Duration,
  pub notify_queue_capacity: usize,

  pub seed_db: bool,
  pub log_format: LogFormat,
}

// The secret and the database URL (which can embed credentials) stay out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("jwt_secret", &"[REDACTED]")
      .field("mail_sender", &self.mail_sender)
      .field("notify_max_attempts", &self.notify_max_attempts)
      .field("notify_retry_backoff", &self.notify_retry_backoff)
      .field("notify_queue_capacity", &self.notify_queue_capacity)
      .field("seed_db", &self.seed_db)
      .field("log_format", &self.log_format)
      .finish()
  }
}

fn parse_var<T>(name: &str, raw: String) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", get_env("SERVER_PORT").unwrap_or_else(|_| "8080".to_string()))?;
    let database_url = get_env("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

    let jwt_secret = get_env("JWT_SECRET")?;
    if jwt_secret.trim().is_empty() {
      return Err(AppError::Config("JWT_SECRET must not be empty".to_string()));
    }

    let mail_sender = get_env("MAIL_SENDER").unwrap_or_else(|_| "noreply@curio.example".to_string());
    let notify_max_attempts: u32 = parse_var(
      "NOTIFY_MAX_ATTEMPTS",
      get_env("NOTIFY_MAX_ATTEMPTS").unwrap_or_else(|_| "3".to_string()),
    )?;
    if notify_max_attempts == 0 {
      return Err(AppError::Config("NOTIFY_MAX_ATTEMPTS must be at least 1".to_string()));
    }
    let notify_retry_backoff_ms: u64 = parse_var(
      "NOTIFY_RETRY_BACKOFF_MS",
      get_env("NOTIFY_RETRY_BACKOFF_MS").unwrap_or_else(|_| "200".to_string()),
    )?;
    let notify_queue_capacity: usize = parse_var(
      "NOTIFY_QUEUE_CAPACITY",
      get_env("NOTIFY_QUEUE_CAPACITY").unwrap_or_else(|_| "256".to_string()),
    )?;
    if notify_queue_capacity == 0 {
      return Err(AppError::Config("NOTIFY_QUEUE_CAPACITY must be at least 1".to_string()));
    }

    let seed_db = parse_var("SEED_DB", get_env("SEED_DB").unwrap_or_else(|_| "false".to_string()))?;
    let log_format = parse_var("LOG_FORMAT", get_env("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()))?;

    Ok(Self {
      server_host,
      server_port,
      database_url,
      jwt_secret,
      mail_sender,
      notify_max_attempts,
      notify_retry_backoff: Duration::from_millis(notify_retry_backoff_ms),
      notify_queue_capacity,
      seed_db,
      log_format,
    })
  }

  /// Defaults suitable for tests: in-memory store, fast retries.
  pub fn for_tests(jwt_secret: &str) -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: None,
      jwt_secret: jwt_secret.to_string(),
      mail_sender: "noreply@curio.example".to_string(),
      notify_max_attempts: 3,
      notify_retry_backoff: Duration::from_millis(5),
      notify_queue_capacity: 64,
      seed_db: false,
      log_format: LogFormat::Pretty,
    }
  }
}
