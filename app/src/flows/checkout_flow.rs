// app/src/flows/checkout_flow.rs
use crate::errors::AppError;
use crate::flows::common_steps;
use crate::flows::contexts::{CheckoutCtx, CheckoutLine};
use crate::models::Order;
use crate::notifications::Notification;
use crate::state::AppState;
use curio_flow::{Flow, FlowContext, FlowRegistry, StepControl, StepDef};
use tracing::{error, info, instrument, warn};

pub const STEPS: [&str; 7] = [
  "validate_checkout_request",
  "load_and_check_stock",
  "snapshot_line_items",
  "reserve_stock",
  "compute_total",
  "persist_order",
  "dispatch_confirmation",
];

pub fn build_checkout_flow() -> Flow<CheckoutCtx, AppError> {
  let mut flow = Flow::<CheckoutCtx, AppError>::new(
    "checkout",
    STEPS.iter().map(|name| match *name {
      "dispatch_confirmation" => StepDef::optional(name),
      _ => StepDef::required(name),
    }),
  );

  flow.on("validate_checkout_request", validate_checkout_request);
  flow.on("load_and_check_stock", load_and_check_stock);
  flow.on("snapshot_line_items", snapshot_line_items);
  flow.on("reserve_stock", reserve_stock);
  flow.on("compute_total", compute_total);
  flow.on("persist_order", persist_order);
  flow.on("dispatch_confirmation", dispatch_confirmation);
  flow
}

pub fn register_checkout_flow(registry: &FlowRegistry<AppError>) {
  registry.register(build_checkout_flow());
}

async fn validate_checkout_request(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl, AppError> {
  let guard = ctx.read();
  if guard.lines.is_empty() {
    return Err(AppError::Validation("Cart is empty".to_string()));
  }
  if let Some(line) = guard.lines.iter().find(|line| line.qty < 1) {
    return Err(AppError::Validation(format!(
      "Quantity for product {} must be at least 1",
      line.product_id
    )));
  }
  Ok(StepControl::Continue)
}

#[instrument(name = "checkout::load_and_check_stock", skip_all)]
async fn load_and_check_stock(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl, AppError> {
  let (app_state, lines) = {
    let guard = ctx.read();
    (guard.app_state.clone(), guard.lines.clone())
  };

  let mut products = Vec::with_capacity(lines.len());
  for line in &lines {
    let product = app_state
      .store
      .find_product(line.product_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found", line.product_id)))?;
    if line.qty > product.stock {
      return Err(AppError::InsufficientStock {
        product: product.name,
        available: product.stock,
      });
    }
    products.push(product);
  }

  ctx.write().products = products;
  Ok(StepControl::Continue)
}

async fn snapshot_line_items(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl, AppError> {
  let mut guard = ctx.write();
  let line_items = guard
    .products
    .iter()
    .zip(guard.lines.iter())
    .map(|(product, line)| product.snapshot(line.qty))
    .collect();
  guard.line_items = line_items;
  Ok(StepControl::Continue)
}

/// Takes the stock with guarded decrements. Losing a race on any product
/// hands back what this checkout already took.
#[instrument(name = "checkout::reserve_stock", skip_all)]
async fn reserve_stock(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl, AppError> {
  let (app_state, lines) = {
    let guard = ctx.read();
    (guard.app_state.clone(), guard.lines.clone())
  };

  for line in &lines {
    let taken = match app_state
      .store
      .decrement_stock_if_available(line.product_id, line.qty)
      .await
    {
      Ok(taken) => taken,
      Err(e) => {
        release_reservations(&ctx).await;
        return Err(e);
      }
    };

    if !taken {
      warn!(product_id = %line.product_id, qty = line.qty, "Stock changed during checkout.");
      release_reservations(&ctx).await;
      let current = app_state.store.find_product(line.product_id).await?;
      return Err(match current {
        Some(product) => AppError::InsufficientStock {
          product: product.name,
          available: product.stock,
        },
        None => AppError::NotFound(format!("Product {} not found", line.product_id)),
      });
    }
    ctx.write().reserved.push(*line);
  }
  Ok(StepControl::Continue)
}

async fn compute_total(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl, AppError> {
  let total = Order::total_of(&ctx.read().line_items);
  match total {
    Some(total) => {
      ctx.write().total_amount = Some(total);
      Ok(StepControl::Continue)
    }
    None => {
      release_reservations(&ctx).await;
      Err(AppError::Validation("Order total is out of range".to_string()))
    }
  }
}

#[instrument(name = "checkout::persist_order", skip_all)]
async fn persist_order(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl, AppError> {
  let (app_state, placed) = {
    let guard = ctx.read();
    let placed = match guard.total_amount {
      Some(total) => Order::place_with_total(
        guard.requester.id,
        guard.line_items.clone(),
        guard.shipping_address.clone(),
        guard.payment_method,
        total,
      ),
      None => Err(AppError::Internal("Order total was not computed".to_string())),
    };
    (guard.app_state.clone(), placed)
  };

  let order = match placed {
    Ok(order) => order,
    Err(e) => {
      release_reservations(&ctx).await;
      return Err(e);
    }
  };

  if let Err(e) = app_state.store.insert_order(&order).await {
    error!(error = %e, "Order could not be saved; releasing reserved stock.");
    release_reservations(&ctx).await;
    return Err(e);
  }

  info!(order_id = %order.id, total = order.total_amount, "Order placed.");
  let mut guard = ctx.write();
  guard.reserved.clear();
  guard.order = Some(order);
  Ok(StepControl::Continue)
}

async fn dispatch_confirmation(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl, AppError> {
  let mut guard = ctx.write();
  if let Some(order) = guard.order.as_ref() {
    let queued = common_steps::enqueue_notification(
      &guard.app_state,
      &guard.requester.email,
      Notification::confirmed(order),
    );
    guard.confirmation_queued = queued;
  }
  Ok(StepControl::Continue)
}

/// Returns every reservation recorded in the context. Failures are logged;
/// the original error is what the caller reports.
async fn release_reservations(ctx: &FlowContext<CheckoutCtx>) {
  let (app_state, reserved): (AppState, Vec<CheckoutLine>) = {
    let mut guard = ctx.write();
    let reserved = std::mem::take(&mut guard.reserved);
    (guard.app_state.clone(), reserved)
  };

  for line in reserved {
    if let Err(e) = app_state.store.restock(line.product_id, line.qty).await {
      error!(product_id = %line.product_id, qty = line.qty, error = %e, "Failed to release reserved stock.");
    }
  }
}
