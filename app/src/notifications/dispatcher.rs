// app/src/notifications/dispatcher.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::{Envelope, Mailer, Notification, OutgoingEmail};
use crate::errors::{AppError, Result};

/// How often and how patiently the worker retries a failed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts including the first one. Never below 1.
  pub max_attempts: u32,
  pub backoff: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      backoff: Duration::from_millis(200),
    }
  }
}

impl RetryPolicy {
  pub fn new(max_attempts: u32, backoff: Duration) -> Self {
    Self {
      max_attempts: max_attempts.max(1),
      backoff,
    }
  }

  /// Linear backoff: the wait after failed attempt `n` (1-based) is `n × backoff`.
  pub fn delay_after(&self, attempt: u32) -> Duration {
    self.backoff.saturating_mul(attempt)
  }
}

/// Cheap-to-clone handle for enqueueing notifications.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
  sender: mpsc::Sender<Envelope>,
}

impl NotificationDispatcher {
  /// Creates the queue and spawns its worker on the current tokio runtime.
  /// The worker exits once every dispatcher handle has been dropped and the
  /// queue has drained.
  pub fn spawn(
    mailer: Arc<dyn Mailer>,
    sender_address: String,
    policy: RetryPolicy,
    capacity: usize,
  ) -> (Self, JoinHandle<()>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let worker = NotificationWorker {
      receiver,
      mailer,
      sender_address,
      policy,
    };
    let handle = tokio::spawn(worker.run());
    (Self { sender }, handle)
  }

  /// Queues a notification without waiting. A full or closed queue drops it
  /// and reports [`AppError::Notification`]; callers log and move on.
  pub fn enqueue(&self, to: &str, notification: Notification) -> Result<()> {
    let envelope = Envelope {
      to: to.to_string(),
      notification,
    };
    match self.sender.try_send(envelope) {
      Ok(()) => Ok(()),
      Err(mpsc::error::TrySendError::Full(dropped)) => Err(AppError::Notification(format!(
        "Notification queue is full; dropped {} for order {}",
        dropped.notification.kind(),
        dropped.notification.order_id()
      ))),
      Err(mpsc::error::TrySendError::Closed(dropped)) => Err(AppError::Notification(format!(
        "Notification worker has stopped; dropped {} for order {}",
        dropped.notification.kind(),
        dropped.notification.order_id()
      ))),
    }
  }
}

struct NotificationWorker {
  receiver: mpsc::Receiver<Envelope>,
  mailer: Arc<dyn Mailer>,
  sender_address: String,
  policy: RetryPolicy,
}

impl NotificationWorker {
  async fn run(mut self) {
    info!("Notification worker started.");
    while let Some(envelope) = self.receiver.recv().await {
      self.deliver(envelope).await;
    }
    info!("Notification worker stopped.");
  }

  #[instrument(
    name = "notification::deliver",
    skip_all,
    fields(kind = envelope.notification.kind(), order_id = %envelope.notification.order_id())
  )]
  async fn deliver(&self, envelope: Envelope) {
    let email = OutgoingEmail {
      to: envelope.to,
      from: self.sender_address.clone(),
      subject: envelope.notification.subject(),
      html_body: envelope.notification.render_html(),
    };

    for attempt in 1..=self.policy.max_attempts {
      match self.mailer.send(&email).await {
        Ok(message_id) => {
          debug!(attempt, %message_id, "Notification sent.");
          return;
        }
        Err(e) if attempt < self.policy.max_attempts => {
          let delay = self.policy.delay_after(attempt);
          warn!(attempt, error = %e, ?delay, "Notification send failed; retrying.");
          tokio::time::sleep(delay).await;
        }
        Err(e) => {
          error!(attempt, error = %e, to = %email.to, "Notification send failed; giving up.");
        }
      }
    }
  }
}
