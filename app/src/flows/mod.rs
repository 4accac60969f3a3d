// app/src/flows/mod.rs

//! The order flows: checkout, admin status update and cancellation. Each is a
//! `curio_flow::Flow` over its own context type, registered once at startup.

use crate::errors::AppError;
use curio_flow::FlowRegistry;

pub mod cancel_flow;
pub mod checkout_flow;
pub mod common_steps;
pub mod contexts;
pub mod status_flow;

pub fn register_all_flows(registry: &FlowRegistry<AppError>) {
  tracing::info!("Registering order flows...");

  checkout_flow::register_checkout_flow(registry);
  status_flow::register_status_flow(registry);
  cancel_flow::register_cancel_flow(registry);

  tracing::info!("All order flows registered.");
}
