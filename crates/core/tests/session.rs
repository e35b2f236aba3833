//! Integration tests for a configured session driven through `Op`s.

mod common;

use ar_core::agents::ProviderRouter;
use ar_core::config::loader::load_config;
use ar_core::credentials::{Credentials, KeyRing};
use ar_core::document::{
    DocumentExtractor, DocumentRouter, ExtractError, PlainTextExtractor, SubstituteOcrExtractor,
};
use ar_core::state::{PipelineState, StateManager};
use ar_protocol::{Event, Op, Provider, RunStatus};
use async_trait::async_trait;
use common::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct FailingExtractor;

#[async_trait]
impl DocumentExtractor for FailingExtractor {
    async fn extract(&self, path: &Path, _credentials: &Credentials) -> Result<String, ExtractError> {
        Err(ExtractError::Unsupported {
            path: path.to_path_buf(),
            reason: "scanned image".to_string(),
        })
    }
}

/// Reports which providers had a key when it was called.
struct KeyReportingExtractor;

#[async_trait]
impl DocumentExtractor for KeyReportingExtractor {
    async fn extract(&self, _path: &Path, credentials: &Credentials) -> Result<String, ExtractError> {
        let providers: Vec<String> = credentials.providers().map(|p| p.to_string()).collect();
        Ok(providers.join(","))
    }
}

async fn configured_session() -> (StateManager, mpsc::Receiver<Event>, tempfile::TempDir) {
    let project = create_test_project().unwrap();
    let config = load_config(project.path()).await.unwrap();
    let agents = config.resolve_agents(Some("review")).unwrap();
    let router = ProviderRouter::from_config(&config.global).unwrap();

    let (tx, rx) = mpsc::channel(256);
    let manager = StateManager::new(
        PipelineState::new(agents),
        Arc::new(router),
        KeyRing::in_memory(),
        tx,
    );
    (manager, rx, project)
}

/// Wait for the background run to finish and return its events.
async fn wait_for_completion(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            Ok(Some(event)) => {
                let done = matches!(event, Event::RunCompleted { .. });
                events.push(event);
                if done {
                    return events;
                }
            }
            other => panic!("run did not complete: {:?}", other.map(|_| ())),
        }
    }
}

#[tokio::test]
async fn test_configured_pipeline_runs_with_substitutes() {
    let (manager, mut rx, _project) = configured_session().await;
    assert_eq!(manager.missing_credential(0).await, Some(Provider::Gemini));
    assert_eq!(manager.missing_credential(1).await, Some(Provider::Grok));

    manager
        .handle(Op::SetDocumentText {
            text: "Invoice from ACME".to_string(),
        })
        .await
        .unwrap();
    manager.handle(Op::RunAgent { position: 0 }).await.unwrap();
    let events = wait_for_completion(&mut rx).await;

    assert!(events.iter().any(|e| matches!(
        e,
        Event::CredentialMissing { position: 0, provider: Provider::Gemini }
    )));

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.status, RunStatus::Idle);
    assert!(snapshot.outputs[0]
        .output
        .starts_with("[MOCK OUTPUT for gemini-2.5-flash]"));
    assert_eq!(snapshot.outputs[0].provider_label, "Gemini");
    assert_eq!(snapshot.outputs[1].input, snapshot.outputs[0].output);

    manager.handle(Op::RunAgent { position: 1 }).await.unwrap();
    wait_for_completion(&mut rx).await;

    let summary = manager.metrics_summary().await;
    assert_eq!(summary.run_count(), 2);
    assert_eq!(summary.runs_by_provider.get("Gemini"), Some(&1));
    assert_eq!(summary.runs_by_provider.get("Grok"), Some(&1));
}

#[tokio::test]
async fn test_load_document_commits_only_on_success() {
    let (manager, mut rx, project) = configured_session().await;
    let path = project.path().join("document.txt");
    std::fs::write(&path, "第一頁\nPage two").unwrap();

    let length = manager
        .load_document(&PlainTextExtractor, &path)
        .await
        .unwrap();
    assert_eq!(length, 12);
    assert!(matches!(
        rx.recv().await,
        Some(Event::DocumentUpdated { length: 12 })
    ));

    let err = manager
        .load_document(&FailingExtractor, &path)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("scanned image"));
    assert_eq!(manager.snapshot().await.document_text, "第一頁\nPage two");
}

#[tokio::test]
async fn test_scanned_document_without_key_gets_simulated_text() {
    let (manager, _rx, project) = configured_session().await;
    let path = project.path().join("scan.pdf");
    std::fs::write(&path, [0x25, 0x50, 0x44, 0x46, 0xff]).unwrap();

    let router = DocumentRouter::new(None, SubstituteOcrExtractor::immediate());
    manager.load_document(&router, &path).await.unwrap();

    let document = manager.snapshot().await.document_text;
    assert!(document.starts_with("# OCR Result for scan.pdf"));
    assert!(document.contains("application/pdf"));
}

#[tokio::test]
async fn test_load_document_sees_current_credentials() {
    let (manager, _rx, project) = configured_session().await;
    let path = project.path().join("scan.pdf");

    manager
        .handle(Op::SetCredential {
            provider: Provider::Gemini,
            secret: "g-key".to_string(),
        })
        .await
        .unwrap();
    manager
        .load_document(&KeyReportingExtractor, &path)
        .await
        .unwrap();

    assert_eq!(manager.snapshot().await.document_text, "Gemini");
}

#[tokio::test]
async fn test_credential_round_trip_through_ops() {
    let (manager, mut rx, _project) = configured_session().await;

    manager
        .handle(Op::SetCredential {
            provider: Provider::Grok,
            secret: "xai-test".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(manager.missing_credential(1).await, None);

    manager
        .handle(Op::SetCredential {
            provider: Provider::Grok,
            secret: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(manager.missing_credential(1).await, Some(Provider::Grok));

    let events = drain_events(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [
            Event::CredentialUpdated { present: true, .. },
            Event::CredentialUpdated { present: false, .. },
        ]
    ));
}

#[tokio::test]
async fn test_snapshot_op_reports_full_state() {
    let (manager, mut rx, _project) = configured_session().await;
    manager.handle(Op::AddAgent).await.unwrap();
    manager.handle(Op::GetSnapshot).await.unwrap();

    let events = drain_events(&mut rx);
    match events.last() {
        Some(Event::Snapshot { snapshot }) => {
            assert_eq!(snapshot.agents.len(), 3);
            assert_eq!(snapshot.outputs.len(), 3);
            assert_eq!(snapshot.agents[2].name, "New Agent 3");
        }
        other => panic!("expected snapshot, got {:?}", other),
    }
}
