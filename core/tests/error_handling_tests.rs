// core/tests/error_handling_tests.rs
mod common;

use common::*;
use curio_flow::{Flow, FlowContext, FlowError, StepControl, StepDef};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn required_step_without_handlers_reports_handler_missing() {
  setup_tracing();
  let flow = Flow::<TallyCtx, TestError>::new("incomplete", [StepDef::required("persist")]);
  let err = flow.run(FlowContext::new(TallyCtx::default())).await.unwrap_err();
  match err {
    TestError::Engine(msg) => {
      assert!(msg.contains("HandlerMissing"));
      assert!(msg.contains("persist"));
    }
    other => panic!("expected engine error, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn flow_can_use_flow_error_directly() {
  setup_tracing();
  let mut flow = Flow::<TallyCtx, FlowError>::new("plain", [StepDef::required("task")]);
  flow.on("task", |_ctx: FlowContext<TallyCtx>| async move {
    Err::<StepControl, _>(FlowError::Internal("intentional".to_string()))
  });

  let err = flow.run(FlowContext::new(TallyCtx::default())).await.unwrap_err();
  assert!(matches!(err, FlowError::Internal(ref m) if m == "intentional"));
}

#[tokio::test]
#[serial]
async fn anyhow_errors_convert_into_handler_variant() {
  setup_tracing();
  let mut flow = Flow::<TallyCtx, FlowError>::new("opaque", [StepDef::required("task")]);
  flow.on("task", |_ctx: FlowContext<TallyCtx>| async move {
    Err::<StepControl, _>(anyhow::anyhow!("mailer unreachable"))
  });

  let err = flow.run(FlowContext::new(TallyCtx::default())).await.unwrap_err();
  match err {
    FlowError::Handler { source, .. } => assert_eq!(source.to_string(), "mailer unreachable"),
    other => panic!("expected handler error, got {:?}", other),
  }
}
