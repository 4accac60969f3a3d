// app/src/notifications/mailer.rs

use async_trait::async_trait;
use tracing::info;

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub html_body: String,
}

/// Delivers one email. Returns a provider message id.
#[async_trait]
pub trait Mailer: Send + Sync {
  async fn send(&self, email: &OutgoingEmail) -> Result<String>;
}

/// Writes emails to the log instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
  async fn send(&self, email: &OutgoingEmail) -> Result<String> {
    let body_preview = email.html_body.chars().take(50).collect::<String>() + "...";
    let message_id = format!("log_email_{}", uuid::Uuid::new_v4());
    info!(
      to = %email.to,
      from = %email.from,
      subject = %email.subject,
      %body_preview,
      %message_id,
      "Email logged (no delivery configured)."
    );
    Ok(message_id)
  }
}
