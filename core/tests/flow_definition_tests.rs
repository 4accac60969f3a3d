// core/tests/flow_definition_tests.rs
mod common;

use common::*;
use curio_flow::{Flow, FlowContext, FlowError, StepDef};

fn base_flow() -> Flow<TallyCtx, TestError> {
  let mut flow = Flow::new("editable", [StepDef::required("load"), StepDef::required("save")]);
  flow.on("load", add_amount("load", 1));
  flow.on("save", add_amount("save", 1));
  flow
}

#[tokio::test]
async fn insert_before_and_after_existing_steps() {
  setup_tracing();
  let mut flow = base_flow();
  flow.insert_before_step("save", StepDef::required("validate")).unwrap();
  flow.insert_after_step("save", StepDef::optional("notify")).unwrap();
  flow.on("validate", add_amount("validate", 1));

  assert_eq!(flow.step_names(), vec!["load", "validate", "save", "notify"]);

  let ctx = FlowContext::new(TallyCtx::default());
  flow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["load", "validate", "save"]);
}

#[test]
fn inserting_relative_to_unknown_step_fails() {
  let mut flow = base_flow();
  let err = flow.insert_after_step("missing", StepDef::required("x")).unwrap_err();
  assert!(matches!(err, FlowError::StepNotFound { step_name } if step_name == "missing"));
}

#[test]
fn inserting_duplicate_step_name_fails() {
  let mut flow = base_flow();
  assert!(flow.insert_after_step("load", StepDef::required("save")).is_err());
  assert_eq!(flow.step_names(), vec!["load", "save"]);
}

#[tokio::test]
async fn removed_step_and_its_handlers_are_gone() {
  setup_tracing();
  let mut flow = base_flow();
  flow.remove_step("load");
  flow.remove_step("does_not_exist");

  let ctx = FlowContext::new(TallyCtx::default());
  flow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["save"]);
}

#[tokio::test]
async fn set_skip_condition_after_construction() {
  setup_tracing();
  let mut flow = base_flow();
  flow
    .set_skip_condition("save", Some(std::sync::Arc::new(|_: &FlowContext<TallyCtx>| true)))
    .unwrap();

  let ctx = FlowContext::new(TallyCtx::default());
  flow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["load"]);
}

#[test]
#[should_panic(expected = "not found in flow definition")]
fn registering_handler_for_unknown_step_panics() {
  let mut flow = base_flow();
  flow.on("typo", add_amount("typo", 0));
}

#[test]
#[should_panic(expected = "duplicate step")]
fn duplicate_step_names_in_definition_panic() {
  let _flow = Flow::<TallyCtx, TestError>::new("dup", [StepDef::required("a"), StepDef::required("a")]);
}
