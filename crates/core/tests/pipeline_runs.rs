//! Integration tests for single-agent runs over a shared pipeline.
//!
//! Covers forward chaining, repeated runs, manual input edits, removal and
//! the one-run-at-a-time guard.

mod common;

use ar_core::agents::{estimate_tokens, is_substitute, InvocationRequest, ModelInvoker, SubstituteInvoker};
use ar_core::credentials::Credentials;
use ar_core::engine::AgentRunner;
use ar_core::state::{PipelineState, RunError};
use ar_protocol::{AgentOutput, Event, Provider, RunStatus};
use common::*;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

fn runner(state: PipelineState, invoker: Arc<dyn ModelInvoker>) -> AgentRunner {
    AgentRunner::new(Arc::new(Mutex::new(state)), invoker)
}

#[tokio::test]
async fn test_chaining_feeds_next_position() {
    let invoker = RecordingInvoker::new();
    let runner = runner(pipeline(3, "ABC"), invoker.clone());
    let (tx, _rx) = mpsc::channel(64);

    runner.run_agent(0, Credentials::default(), &tx).await.unwrap();
    runner.run_agent(1, Credentials::default(), &tx).await.unwrap();
    runner.run_agent(2, Credentials::default(), &tx).await.unwrap();

    assert_eq!(invoker.inputs(), ["ABC", "out(ABC)", "out(out(ABC))"]);

    let state = runner.state().lock().await;
    assert_eq!(state.outputs()[1].input, state.outputs()[0].output);
    assert_eq!(state.outputs()[2].input, state.outputs()[1].output);
    assert_eq!(state.outputs()[2].output, "out(out(out(ABC)))");
    assert_eq!(state.outputs().len(), 3);
}

#[tokio::test]
async fn test_later_position_without_input_gets_empty_string() {
    let invoker = RecordingInvoker::new();
    let runner = runner(pipeline(2, "ABC"), invoker.clone());
    let (tx, _rx) = mpsc::channel(64);

    runner.run_agent(1, Credentials::default(), &tx).await.unwrap();

    assert_eq!(invoker.inputs(), [""]);
}

#[tokio::test]
async fn test_repeated_run_overwrites_and_logs_twice() {
    let invoker = RecordingInvoker::new();
    let runner = runner(pipeline(2, "ABC"), invoker.clone());
    let (tx, _rx) = mpsc::channel(64);

    let first = runner.run_agent(0, Credentials::default(), &tx).await.unwrap();
    let after_first = runner.state().lock().await.outputs()[0].clone();
    let second = runner.run_agent(0, Credentials::default(), &tx).await.unwrap();

    assert_ne!(first.run_id, second.run_id);

    let state = runner.state().lock().await;
    assert_eq!(state.metrics().len(), 2);
    let slot = &state.outputs()[0];
    assert_eq!(slot.output, after_first.output);
    assert_eq!(slot.token_count, 7);
    assert_eq!(slot.provider_label, "OpenAI");
    assert_eq!(slot.resolved_model_id, "gpt-4o-mini");
    assert_eq!(slot.elapsed_seconds, second.latency_seconds);
}

/// Three agents over "ABC" with no credentials: the first run yields a
/// labelled substitute that is chained forward; a manual edit of the second
/// input then takes precedence over the chained value.
#[tokio::test]
async fn test_end_to_end_with_substitute_and_manual_edit() {
    let substitute: Arc<dyn ModelInvoker> = Arc::new(SubstituteInvoker::immediate());
    let runner = runner(pipeline(3, "ABC"), substitute);
    let (tx, mut rx) = mpsc::channel(64);

    runner.run_agent(0, Credentials::default(), &tx).await.unwrap();
    {
        let state = runner.state().lock().await;
        assert!(is_substitute(&state.outputs()[0].output));
        assert!(state.outputs()[0].output.contains("Analyze the following text:"));
        assert_eq!(state.outputs()[1].input, state.outputs()[0].output);
    }

    runner.state().lock().await.editor().set_input(1, "XYZ");
    runner.run_agent(1, Credentials::default(), &tx).await.unwrap();

    let state = runner.state().lock().await;
    assert_eq!(state.outputs()[1].input, "XYZ");
    assert!(state.outputs()[1].output.contains("XYZ"));
    assert_eq!(state.outputs()[2].input, state.outputs()[1].output);

    let events = drain_events(&mut rx);
    let missing = events
        .iter()
        .filter(|e| matches!(e, Event::CredentialMissing { provider: Provider::OpenAi, .. }))
        .count();
    assert_eq!(missing, 2);
}

#[tokio::test]
async fn test_chained_write_replaces_manual_edit() {
    let invoker = RecordingInvoker::new();
    let runner = runner(pipeline(2, "ABC"), invoker.clone());
    let (tx, _rx) = mpsc::channel(64);

    runner.state().lock().await.editor().set_input(1, "manual");
    runner.run_agent(0, Credentials::default(), &tx).await.unwrap();

    assert_eq!(runner.state().lock().await.outputs()[1].input, "out(ABC)");
}

#[tokio::test]
async fn test_removal_keeps_later_output_intact() {
    let invoker = RecordingInvoker::new();
    let runner = runner(pipeline(3, "ABC"), invoker);
    let (tx, _rx) = mpsc::channel(64);

    for position in 0..3 {
        runner.run_agent(position, Credentials::default(), &tx).await.unwrap();
    }
    let former_third: AgentOutput = runner.state().lock().await.outputs()[2].clone();

    let mut state = runner.state().lock().await;
    state.editor().remove_agent(1);

    assert_eq!(state.agents().len(), 2);
    assert_eq!(state.outputs().len(), 2);
    assert_eq!(state.outputs()[1], former_third);
    assert_eq!(state.metrics().len(), 3);
}

#[tokio::test]
async fn test_second_run_rejected_while_in_flight() {
    let invoker = GatedInvoker::new();
    let runner = Arc::new(runner(pipeline(2, "ABC"), invoker.clone()));
    let (tx, _rx) = mpsc::channel(64);

    let in_flight = {
        let runner = Arc::clone(&runner);
        let tx = tx.clone();
        tokio::spawn(async move { runner.run_agent(0, Credentials::default(), &tx).await })
    };
    invoker.started.notified().await;

    let before = runner.state().lock().await.clone();
    let err = runner
        .run_agent(1, Credentials::default(), &tx)
        .await
        .unwrap_err();

    assert_eq!(err, RunError::Busy { running: 0 });
    assert_eq!(*runner.state().lock().await, before);
    assert_eq!(runner.status(), RunStatus::Running { position: 0 });

    invoker.release.notify_one();
    let metric = in_flight.await.unwrap().unwrap();

    assert_eq!(metric.agent, "New Agent 1");
    assert_eq!(runner.status(), RunStatus::Idle);
    assert_eq!(runner.state().lock().await.outputs()[1].input, "released(ABC)");
}

#[tokio::test]
async fn test_substitute_token_estimate_for_412_characters() {
    let prompt = "a".repeat(412);
    let request = InvocationRequest::new("gpt-4o-mini".to_string(), String::new(), prompt.clone());

    let invocation = SubstituteInvoker::immediate().invoke(&request).await;

    assert_eq!(invocation.token_count, 103);
    assert_eq!(estimate_tokens(&prompt, 0), 103);
    assert_eq!(invocation.provider_label, "OpenAI");
}
