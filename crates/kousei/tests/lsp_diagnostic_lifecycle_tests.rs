//! Integration tests for the diagnostic lifecycle of open documents.
//!
//! These drive a [`kousei::session::Session`] the way the language server
//! does, with a fake engine and a host that records every publication:
//! 1. Opening and changing documents publishes complete diagnostic sets
//! 2. Closing a document clears its diagnostics
//! 3. Results of stale or orphaned passes never reach the editor
//! 4. Configuration changes re-resolve settings and revalidate

use std::sync::Arc;

use kousei_core::fix::FIX_TITLE;
use kousei_core::{RawLintMessage, SOURCE_TAG};
use serde_json::{Value, json};
use tower_lsp::lsp_types::{CodeActionKind, DiagnosticSeverity};

mod common;
use common::{FakeLinter, create_session, uri};

fn max_ten(line: i64) -> RawLintMessage {
    RawLintMessage::new("japanese/max-ten", "一つの文で\"、\"を4つ以上使用しています", 1, line, 1)
}

fn ra_nuki(line: i64) -> RawLintMessage {
    RawLintMessage::new("japanese/no-dropping-the-ra", "ら抜き言葉を使用しています。", 2, line, 3)
}

fn gozi(line: i64) -> RawLintMessage {
    RawLintMessage::new("prh", "行なう => 行う（誤字）", 2, line, 1).with_fix(0, 3, "行う")
}

// ============================================================================
// Publishing
// ============================================================================

#[tokio::test]
async fn test_open_publishes_diagnostics() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("本文", vec![max_ten(1), gozi(2)]);
    let session = create_session(linter.clone());
    let doc = uri("notes.md");

    session.open(doc.clone(), 3, "本文".to_string()).await;
    session.validate(&doc).await;

    let published = session.host().last_published(&doc).expect("published");
    assert_eq!(published.version, Some(3));
    assert_eq!(published.diagnostics.len(), 2);

    let warning = &published.diagnostics[0];
    assert_eq!(warning.severity, Some(DiagnosticSeverity::WARNING));
    assert_eq!(warning.source.as_deref(), Some(SOURCE_TAG));
    assert!(warning.message.ends_with("（japanese/max-ten）"));
    assert_eq!(warning.data, None);

    let fixable = &published.diagnostics[1];
    assert_eq!(fixable.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(fixable.message, "🪄 行なう => 行う（誤字）（prh）");
    assert_eq!(fixable.range.start.line, 1);
    assert_eq!(fixable.range.end.character, 3);
    assert_eq!(fixable.data, Some(Value::String("行う".to_string())));
}

#[tokio::test]
async fn test_clean_text_publishes_empty_set() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("before", vec![max_ten(1)]);
    let session = create_session(linter.clone());
    let doc = uri("notes.md");

    session.open(doc.clone(), 1, "before".to_string()).await;
    session.validate(&doc).await;
    session.change(doc.clone(), 2, "after".to_string()).await;
    session.validate(&doc).await;

    let published = session.host().published_for(&doc);
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].diagnostics.len(), 1);
    assert!(published[1].diagnostics.is_empty());
    assert_eq!(published[1].version, Some(2));
}

#[tokio::test]
async fn test_unsupported_extension_is_ignored() {
    let linter = Arc::new(FakeLinter::new());
    let session = create_session(linter.clone());
    let doc = uri("diagram.png");

    session.open(doc.clone(), 1, "binary".to_string()).await;
    session.validate(&doc).await;

    assert_eq!(linter.calls(), 0);
    assert!(session.host().published().is_empty());
}

#[tokio::test]
async fn test_engine_failure_keeps_previous_diagnostics() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("v1", vec![max_ten(1)]);
    let session = create_session(linter.clone());
    let doc = uri("notes.txt");

    session.open(doc.clone(), 1, "v1".to_string()).await;
    session.validate(&doc).await;

    linter.set_failing(true);
    session.change(doc.clone(), 2, "v2".to_string()).await;
    session.validate(&doc).await;

    let published = session.host().published_for(&doc);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].diagnostics.len(), 1);
}

#[tokio::test]
async fn test_disabled_rules_are_not_published() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("本文", vec![max_ten(1), ra_nuki(2)]);
    let session = create_session(linter.clone());
    let doc = uri("notes.md");

    session
        .configuration_changed(&json!({
            "japanese-proofreading": { "textlint": { "ら抜き言葉": false } }
        }))
        .await;
    session.open(doc.clone(), 1, "本文".to_string()).await;
    session.validate(&doc).await;

    let published = session.host().last_published(&doc).expect("published");
    assert_eq!(published.diagnostics.len(), 1);
    assert!(published.diagnostics[0].message.contains("japanese/max-ten"));
}

// ============================================================================
// Closing
// ============================================================================

#[tokio::test]
async fn test_close_clears_diagnostics() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("本文", vec![max_ten(1)]);
    let session = create_session(linter.clone());
    let doc = uri("notes.md");

    session.open(doc.clone(), 1, "本文".to_string()).await;
    session.validate(&doc).await;
    session.close(&doc).await;

    assert!(!session.is_open(&doc).await);
    let last = session.host().last_published(&doc).expect("published");
    assert!(last.diagnostics.is_empty());
    assert_eq!(last.version, None);

    // Nothing left to validate.
    session.validate(&doc).await;
    assert_eq!(linter.calls(), 1);
    assert_eq!(session.host().published_for(&doc).len(), 2);
}

#[tokio::test]
async fn test_close_of_unknown_document_still_clears() {
    let session = create_session(Arc::new(FakeLinter::new()));
    let doc = uri("never-opened.md");

    session.close(&doc).await;

    let published = session.host().published_for(&doc);
    assert_eq!(published.len(), 1);
    assert!(published[0].diagnostics.is_empty());
}

// ============================================================================
// Pass Ordering
// ============================================================================

#[tokio::test]
async fn test_stale_pass_does_not_overwrite_newer_result() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("old", vec![max_ten(1), max_ten(2)]);
    linter.respond("new", vec![max_ten(3)]);
    let gate = linter.hold("old");
    let session = create_session(linter.clone());
    let doc = uri("notes.md");

    session.open(doc.clone(), 1, "old".to_string()).await;
    tokio::join!(session.validate(&doc), async {
        linter.wait_for_calls(1).await;
        session.change(doc.clone(), 2, "new".to_string()).await;
        session.validate(&doc).await;
        gate.add_permits(1);
    });

    let published = session.host().published_for(&doc);
    assert_eq!(published.len(), 1, "the older pass must be dropped");
    assert_eq!(published[0].version, Some(2));
    assert_eq!(published[0].diagnostics.len(), 1);
}

#[tokio::test]
async fn test_pass_finishing_after_close_is_dropped() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("本文", vec![max_ten(1)]);
    let gate = linter.hold("本文");
    let session = create_session(linter.clone());
    let doc = uri("notes.md");

    session.open(doc.clone(), 1, "本文".to_string()).await;
    tokio::join!(session.validate(&doc), async {
        linter.wait_for_calls(1).await;
        session.close(&doc).await;
        gate.add_permits(1);
    });

    let published = session.host().published_for(&doc);
    assert_eq!(published.len(), 1);
    assert!(published[0].diagnostics.is_empty());
}

#[tokio::test]
async fn test_pass_from_before_reopen_is_dropped() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("本文", vec![max_ten(1)]);
    let gate = linter.hold("本文");
    let session = create_session(linter.clone());
    let doc = uri("notes.md");

    session.open(doc.clone(), 1, "本文".to_string()).await;
    tokio::join!(session.validate(&doc), async {
        linter.wait_for_calls(1).await;
        session.close(&doc).await;
        session.open(doc.clone(), 1, "本文".to_string()).await;
        gate.add_permits(1);
    });

    let published = session.host().published_for(&doc);
    assert_eq!(published.len(), 1, "only the close may have published");
    assert!(published[0].diagnostics.is_empty());

    // A pass of the reopened document publishes normally.
    session.validate(&doc).await;
    let last = session.host().last_published(&doc).expect("published");
    assert_eq!(last.diagnostics.len(), 1);
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_scoped_settings_are_cached_until_configuration_changes() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("本文", vec![max_ten(1), ra_nuki(2)]);
    let session = create_session(linter.clone());
    session.set_scoped_configuration(true);
    session
        .host()
        .set_configuration(Some(json!({ "textlint": { "ら抜き言葉": false } })));
    let doc = uri("notes.md");

    session.open(doc.clone(), 1, "本文".to_string()).await;
    session.validate(&doc).await;
    session.validate(&doc).await;
    assert_eq!(session.host().configuration_requests(), 1);
    assert_eq!(
        session.host().last_published(&doc).expect("published").diagnostics.len(),
        1
    );

    session.host().set_configuration(Some(json!({})));
    session.configuration_changed(&json!({})).await;

    assert_eq!(session.host().configuration_requests(), 2);
    assert_eq!(
        session.host().last_published(&doc).expect("published").diagnostics.len(),
        2
    );
}

#[tokio::test]
async fn test_failed_settings_fetch_uses_defaults_and_retries() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("本文", vec![max_ten(1), ra_nuki(2)]);
    let session = create_session(linter.clone());
    session.set_scoped_configuration(true);
    session.host().set_configuration(None);
    let doc = uri("notes.md");

    session.open(doc.clone(), 1, "本文".to_string()).await;
    session.validate(&doc).await;
    assert_eq!(
        session.host().last_published(&doc).expect("published").diagnostics.len(),
        2
    );

    session
        .host()
        .set_configuration(Some(json!({ "maxNumberOfProblems": 1 })));
    session.validate(&doc).await;
    assert_eq!(session.host().configuration_requests(), 2);
    assert_eq!(
        session.host().last_published(&doc).expect("published").diagnostics.len(),
        1
    );
}

#[tokio::test]
async fn test_global_configuration_change_revalidates_every_document() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("a", vec![max_ten(1), max_ten(2), max_ten(3)]);
    linter.respond("b", vec![max_ten(1), max_ten(2)]);
    let session = create_session(linter.clone());
    let (a, b) = (uri("a.md"), uri("b.txt"));

    session.open(a.clone(), 1, "a".to_string()).await;
    session.open(b.clone(), 1, "b".to_string()).await;
    session
        .configuration_changed(&json!({
            "japanese-proofreading": { "maxNumberOfProblems": 1 }
        }))
        .await;

    assert_eq!(linter.calls(), 2);
    assert_eq!(session.host().configuration_requests(), 0);
    for doc in [&a, &b] {
        let published = session.host().last_published(doc).expect("published");
        assert_eq!(published.diagnostics.len(), 1);
    }
}

// ============================================================================
// Code Actions
// ============================================================================

#[tokio::test]
async fn test_code_actions_offer_fixes_for_fixable_diagnostics() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("行なう", vec![max_ten(1), gozi(1)]);
    let session = create_session(linter.clone());
    let doc = uri("notes.md");

    session.open(doc.clone(), 7, "行なう".to_string()).await;
    session.validate(&doc).await;
    let diagnostics = session
        .host()
        .last_published(&doc)
        .expect("published")
        .diagnostics;

    let actions = session
        .code_actions(&doc, None, &diagnostics)
        .await
        .expect("known document");
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].title, FIX_TITLE);
    assert_eq!(actions[0].kind, Some(CodeActionKind::QUICKFIX));

    let quickfix_only = [CodeActionKind::QUICKFIX];
    let filtered = session
        .code_actions(&doc, Some(&quickfix_only[..]), &diagnostics)
        .await
        .expect("quickfix requested");
    assert_eq!(filtered.len(), 1);
}

#[tokio::test]
async fn test_code_actions_respect_only_filter_and_source() {
    let linter = Arc::new(FakeLinter::new());
    linter.respond("行なう", vec![gozi(1)]);
    let session = create_session(linter.clone());
    let doc = uri("notes.md");

    session.open(doc.clone(), 1, "行なう".to_string()).await;
    session.validate(&doc).await;
    let mut diagnostics = session
        .host()
        .last_published(&doc)
        .expect("published")
        .diagnostics;

    let refactor_only = [CodeActionKind::REFACTOR];
    assert!(
        session
            .code_actions(&doc, Some(&refactor_only[..]), &diagnostics)
            .await
            .is_none()
    );
    assert!(
        session
            .code_actions(&uri("unknown.md"), None, &diagnostics)
            .await
            .is_none()
    );

    diagnostics[0].source = Some("cspell".to_string());
    let actions = session
        .code_actions(&doc, None, &diagnostics)
        .await
        .expect("known document");
    assert!(actions.is_empty());
}
