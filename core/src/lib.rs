// core/src/lib.rs

//! curio-flow: a small asynchronous step-workflow engine.
//!
//! A [`Flow`] is an ordered list of named steps run against a shared,
//! lock-protected [`FlowContext`]. Each step may carry `before`, `on` and
//! `after` handlers. Handlers are async, return a [`StepControl`] to either
//! continue or halt the flow, and may fail with the flow's error type.
//!
//! Steps can be marked optional (no handler required) or skipped at run time
//! through a condition evaluated on the context. A [`FlowRegistry`] keeps one
//! flow per context type so that callers only need to hand over a context.

pub mod core;
pub mod error;
pub mod flow;
pub mod registry;

pub use crate::core::context::FlowContext;
pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::flow::definition::Flow;
pub use crate::registry::FlowRegistry;
