// app/tests/notification_tests.rs

mod common;

use common::{wait_for_emails, RecordingMailer};
use curio_shop::errors::AppError;
use curio_shop::models::{CancelledBy, LineItem, OrderStatus};
use curio_shop::notifications::{Notification, NotificationDispatcher, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
  RetryPolicy::new(max_attempts, Duration::from_millis(2))
}

fn status_notice() -> Notification {
  Notification::StatusChanged {
    order_id: Uuid::new_v4(),
    status: OrderStatus::Shipped,
  }
}

#[tokio::test]
async fn transient_failures_are_retried() {
  common::setup_tracing();
  let mailer = Arc::new(RecordingMailer::failing_first(2));
  let (dispatcher, _worker) =
    NotificationDispatcher::spawn(mailer.clone(), "shop@curio.example".to_string(), fast_policy(3), 8);

  dispatcher.enqueue("alice@curio.example", status_notice()).unwrap();

  let sent = wait_for_emails(&mailer, 1).await;
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].from, "shop@curio.example");
  assert_eq!(mailer.attempts(), 3);
}

#[tokio::test]
async fn permanent_failure_stops_at_the_attempt_limit() {
  common::setup_tracing();
  let mailer = Arc::new(RecordingMailer::failing_first(u32::MAX));
  let (dispatcher, worker) =
    NotificationDispatcher::spawn(mailer.clone(), "shop@curio.example".to_string(), fast_policy(4), 8);

  dispatcher.enqueue("alice@curio.example", status_notice()).unwrap();
  drop(dispatcher);
  // The worker drains the queue and exits once every handle is gone.
  tokio::time::timeout(Duration::from_secs(2), worker)
    .await
    .expect("worker finished")
    .expect("worker did not panic");

  assert_eq!(mailer.attempts(), 4);
  assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn full_queue_drops_instead_of_blocking() {
  let mailer = Arc::new(RecordingMailer::default());
  let (dispatcher, _worker) =
    NotificationDispatcher::spawn(mailer.clone(), "shop@curio.example".to_string(), fast_policy(1), 1);

  // The worker has not been polled yet on this single-threaded runtime, so the
  // one-slot queue is still occupied by the first notification.
  dispatcher.enqueue("a@curio.example", status_notice()).unwrap();
  let overflow = dispatcher.enqueue("b@curio.example", status_notice());
  assert!(matches!(overflow, Err(AppError::Notification(_))));

  let sent = wait_for_emails(&mailer, 1).await;
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].to, "a@curio.example");
}

#[tokio::test]
async fn stopped_worker_reports_closed_queue() {
  let mailer = Arc::new(RecordingMailer::default());
  let (dispatcher, worker) =
    NotificationDispatcher::spawn(mailer, "shop@curio.example".to_string(), fast_policy(1), 4);

  worker.abort();
  let _ = worker.await;

  let result = dispatcher.enqueue("a@curio.example", status_notice());
  match result {
    Err(AppError::Notification(message)) => assert!(message.contains("stopped"), "{}", message),
    other => panic!("expected a closed-queue error, got {:?}", other),
  }
}

#[test]
fn linear_backoff_grows_with_each_attempt() {
  let policy = RetryPolicy::new(3, Duration::from_millis(200));
  assert_eq!(policy.delay_after(1), Duration::from_millis(200));
  assert_eq!(policy.delay_after(2), Duration::from_millis(400));
  assert_eq!(RetryPolicy::new(0, Duration::from_millis(1)).max_attempts, 1);
}

#[test]
fn cancellation_wording_depends_on_actor() {
  let order_id = Uuid::new_v4();
  let by_user = Notification::cancelled(order_id, CancelledBy::User).render_html();
  let by_admin = Notification::cancelled(order_id, CancelledBy::Admin).render_html();
  assert!(by_user.contains("You cancelled"));
  assert!(by_admin.contains("cancelled by our team"));
  assert!(by_user.contains(&order_id.to_string()));
}

#[test]
fn confirmation_lists_items_and_total() {
  let notice = Notification::OrderConfirmed {
    order_id: Uuid::new_v4(),
    items: vec![LineItem {
      product: Uuid::new_v4(),
      name: "Carriage Clock".to_string(),
      price: 420,
      qty: 2,
      image: None,
    }],
    total_amount: 840,
  };
  let html = notice.render_html();
  assert!(html.contains("Carriage Clock"));
  assert!(html.contains("840"));
  assert_eq!(notice.kind(), "order_confirmed");
}
