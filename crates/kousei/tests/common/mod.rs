//! Common test utilities.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eyre::Result;
use kousei::session::{Host, Session};
use kousei_core::{Linter, RawLintMessage, RuleCatalog};
use serde_json::Value;
use tokio::sync::Semaphore;
use tower_lsp::lsp_types::{Diagnostic, Url};

/// One `publish_diagnostics` call seen by [`RecordingHost`].
#[derive(Debug, Clone)]
pub struct Published {
    pub uri: Url,
    pub diagnostics: Vec<Diagnostic>,
    pub version: Option<i32>,
}

/// Host that records publications and serves canned configuration.
#[derive(Default)]
pub struct RecordingHost {
    published: Mutex<Vec<Published>>,
    configuration: Mutex<Option<Value>>,
    configuration_requests: AtomicUsize,
}

impl RecordingHost {
    /// Answer configuration requests with `value`. `None` makes them fail.
    pub fn set_configuration(&self, value: Option<Value>) {
        *self.configuration.lock().expect("poisoned") = value;
    }

    pub fn configuration_requests(&self) -> usize {
        self.configuration_requests.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().expect("poisoned").clone()
    }

    pub fn published_for(&self, uri: &Url) -> Vec<Published> {
        self.published()
            .into_iter()
            .filter(|p| &p.uri == uri)
            .collect()
    }

    pub fn last_published(&self, uri: &Url) -> Option<Published> {
        self.published_for(uri).pop()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn publish_diagnostics(
        &self,
        uri: Url,
        diagnostics: Vec<Diagnostic>,
        version: Option<i32>,
    ) {
        self.published.lock().expect("poisoned").push(Published {
            uri,
            diagnostics,
            version,
        });
    }

    async fn workspace_configuration(&self, _scope: &Url) -> Result<Value> {
        self.configuration_requests.fetch_add(1, Ordering::SeqCst);
        match self.configuration.lock().expect("poisoned").clone() {
            Some(value) => Ok(value),
            None => eyre::bail!("client did not answer"),
        }
    }
}

/// Lint engine returning canned findings keyed by document text.
///
/// A text can be held with [`FakeLinter::hold`]; passes linting it block in
/// the engine until the returned semaphore gets a permit.
pub struct FakeLinter {
    extensions: Vec<String>,
    responses: Mutex<HashMap<String, Vec<RawLintMessage>>>,
    held: Mutex<HashMap<String, Arc<Semaphore>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeLinter {
    pub fn new() -> Self {
        Self {
            extensions: vec![".md".to_string(), ".txt".to_string()],
            responses: Mutex::new(HashMap::new()),
            held: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn respond(&self, text: &str, messages: Vec<RawLintMessage>) {
        self.responses
            .lock()
            .expect("poisoned")
            .insert(text.to_string(), messages);
    }

    pub fn hold(&self, text: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.held
            .lock()
            .expect("poisoned")
            .insert(text.to_string(), gate.clone());
        gate
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Yield until the engine has been entered `n` times in total.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Linter for FakeLinter {
    fn available_extensions(&self) -> &[String] {
        &self.extensions
    }

    async fn lint_text(&self, text: &str, _path: &Path) -> Result<Vec<RawLintMessage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.held.lock().expect("poisoned").get(text).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await?;
        }
        if self.failing.load(Ordering::SeqCst) {
            eyre::bail!("textlint crashed");
        }
        Ok(self
            .responses
            .lock()
            .expect("poisoned")
            .get(text)
            .cloned()
            .unwrap_or_default())
    }
}

/// A session over a recording host, the given engine and the built-in catalog.
pub fn create_session(linter: Arc<FakeLinter>) -> Session<RecordingHost> {
    Session::new(
        RecordingHost::default(),
        linter,
        Arc::new(RuleCatalog::builtin()),
    )
}

pub fn uri(path: &str) -> Url {
    Url::parse(&format!("file:///workspace/{path}")).expect("Failed to parse URI")
}
