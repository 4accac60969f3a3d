// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by the engine itself, as opposed to the domain errors
/// returned by user handlers. Every flow error type must be constructible
/// from this so the engine can report setup mistakes through it.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No flow registered for context type {context_type}")]
  NotRegistered { context_type: String },

  #[error("Type mismatch during context dispatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Error in handler for step '{step_name}'. Source: {source}")]
  Handler {
    step_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Internal flow error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for FlowError {
  fn from(err: AnyhowError) -> Self {
    FlowError::Handler {
      step_name: "<unknown>".to_string(),
      source: err,
    }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
