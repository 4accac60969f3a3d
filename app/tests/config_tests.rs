// app/tests/config_tests.rs

use curio_shop::config::{AppConfig, LogFormat};
use curio_shop::errors::AppError;
use serial_test::serial;
use std::env;
use std::time::Duration;

const VARS: [&str; 11] = [
  "SERVER_HOST",
  "SERVER_PORT",
  "DATABASE_URL",
  "JWT_SECRET",
  "MAIL_SENDER",
  "NOTIFY_MAX_ATTEMPTS",
  "NOTIFY_RETRY_BACKOFF_MS",
  "NOTIFY_QUEUE_CAPACITY",
  "SEED_DB",
  "LOG_FORMAT",
  "RUST_LOG",
];

fn with_env(pairs: &[(&str, &str)]) {
  for var in VARS {
    env::remove_var(var);
  }
  for (key, value) in pairs {
    env::set_var(key, value);
  }
}

fn config_error(result: curio_shop::errors::Result<AppConfig>) -> String {
  match result {
    Err(AppError::Config(message)) => message,
    other => panic!("expected a config error, got {:?}", other),
  }
}

#[test]
#[serial]
fn defaults_apply_when_only_the_secret_is_set() {
  with_env(&[("JWT_SECRET", "s3cret")]);
  let config = AppConfig::from_env().unwrap();

  assert_eq!(config.server_host, "127.0.0.1");
  assert_eq!(config.server_port, 8080);
  assert_eq!(config.database_url, None);
  assert_eq!(config.notify_max_attempts, 3);
  assert_eq!(config.notify_retry_backoff, Duration::from_millis(200));
  assert_eq!(config.notify_queue_capacity, 256);
  assert!(!config.seed_db);
  assert_eq!(config.log_format, LogFormat::Pretty);
}

#[test]
#[serial]
fn explicit_values_override_defaults() {
  with_env(&[
    ("JWT_SECRET", "s3cret"),
    ("SERVER_PORT", "9090"),
    ("DATABASE_URL", "postgres://curio:pw@localhost/curio"),
    ("NOTIFY_MAX_ATTEMPTS", "5"),
    ("NOTIFY_RETRY_BACKOFF_MS", "50"),
    ("SEED_DB", "true"),
    ("LOG_FORMAT", "JSON"),
  ]);
  let config = AppConfig::from_env().unwrap();

  assert_eq!(config.server_port, 9090);
  assert_eq!(config.database_url.as_deref(), Some("postgres://curio:pw@localhost/curio"));
  assert_eq!(config.notify_max_attempts, 5);
  assert_eq!(config.notify_retry_backoff, Duration::from_millis(50));
  assert!(config.seed_db);
  assert_eq!(config.log_format, LogFormat::Json);
}

#[test]
#[serial]
fn missing_or_blank_secret_is_rejected() {
  with_env(&[]);
  assert!(config_error(AppConfig::from_env()).contains("JWT_SECRET"));

  with_env(&[("JWT_SECRET", "   ")]);
  assert_eq!(config_error(AppConfig::from_env()), "JWT_SECRET must not be empty");
}

#[test]
#[serial]
fn malformed_numbers_and_formats_are_rejected() {
  with_env(&[("JWT_SECRET", "s3cret"), ("SERVER_PORT", "eighty")]);
  assert!(config_error(AppConfig::from_env()).starts_with("Invalid SERVER_PORT value 'eighty'"));

  with_env(&[("JWT_SECRET", "s3cret"), ("NOTIFY_MAX_ATTEMPTS", "0")]);
  assert_eq!(
    config_error(AppConfig::from_env()),
    "NOTIFY_MAX_ATTEMPTS must be at least 1"
  );

  with_env(&[("JWT_SECRET", "s3cret"), ("LOG_FORMAT", "xml")]);
  assert!(config_error(AppConfig::from_env()).contains("xml"));
}

#[test]
#[serial]
fn debug_output_redacts_credentials() {
  with_env(&[
    ("JWT_SECRET", "do-not-print"),
    ("DATABASE_URL", "postgres://curio:hunter2@db/curio"),
  ]);
  let rendered = format!("{:?}", AppConfig::from_env().unwrap());
  assert!(!rendered.contains("do-not-print"));
  assert!(!rendered.contains("hunter2"));
  assert!(rendered.contains("[REDACTED]"));
}
