//! Open documents, validation passes and code actions.
//!
//! The session is independent of the transport: everything it needs from the
//! editor goes through [`Host`], which the language server implements with a
//! tower-lsp `Client` and tests implement with a recorder.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use eyre::Result;
use futures_util::future::join_all;
use kousei_core::fix::{self, DocumentRef};
use kousei_core::pipeline::{self, PassOutcome};
use kousei_core::{Linter, RuleCatalog, SETTINGS_SECTION, SettingsResolver};
use serde_json::Value;
use tokio::sync::Mutex;
use tower_lsp::lsp_types::{self, CodeAction, CodeActionKind, Url};
use tracing::{debug, info, warn};

use crate::convert;

/// What the session needs from the editor.
#[async_trait]
pub trait Host: Send + Sync + 'static {
    /// Replace the diagnostics shown for `uri`.
    async fn publish_diagnostics(
        &self,
        uri: Url,
        diagnostics: Vec<lsp_types::Diagnostic>,
        version: Option<i32>,
    );

    /// The `japanese-proofreading` settings section scoped to `scope`.
    async fn workspace_configuration(&self, scope: &Url) -> Result<Value>;
}

#[derive(Debug)]
struct Document {
    text: String,
    version: i32,
    /// Pass counter value when the document was opened. Passes started
    /// before that belong to an earlier incarnation.
    epoch: u64,
    /// Highest pass that published for this document.
    published_pass: u64,
}

pub struct Session<H> {
    host: H,
    linter: Arc<dyn Linter>,
    catalog: Arc<RuleCatalog>,
    settings: SettingsResolver,
    documents: Mutex<HashMap<Url, Document>>,
    passes: AtomicU64,
}

impl<H: Host> Session<H> {
    pub fn new(host: H, linter: Arc<dyn Linter>, catalog: Arc<RuleCatalog>) -> Self {
        Self {
            host,
            linter,
            settings: SettingsResolver::new(&catalog),
            catalog,
            documents: Mutex::new(HashMap::new()),
            passes: AtomicU64::new(0),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Record whether the editor answers `workspace/configuration`.
    pub fn set_scoped_configuration(&self, scoped: bool) {
        self.settings.set_scoped(scoped);
    }

    pub fn has_scoped_configuration(&self) -> bool {
        self.settings.is_scoped()
    }

    pub async fn is_open(&self, uri: &Url) -> bool {
        self.documents.lock().await.contains_key(uri)
    }

    fn next_pass(&self) -> u64 {
        self.passes.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store a freshly opened document. Does not validate.
    pub async fn open(&self, uri: Url, version: i32, text: String) {
        let epoch = self.next_pass();
        debug!(%uri, version, "Document opened");
        self.documents.lock().await.insert(
            uri,
            Document {
                text,
                version,
                epoch,
                published_pass: epoch,
            },
        );
    }

    /// Replace a document's text. An unknown document is treated as opened.
    pub async fn change(&self, uri: Url, version: i32, text: String) {
        let mut documents = self.documents.lock().await;
        match documents.get_mut(&uri) {
            Some(doc) => {
                doc.text = text;
                doc.version = version;
            }
            None => {
                let epoch = self.next_pass();
                documents.insert(
                    uri,
                    Document {
                        text,
                        version,
                        epoch,
                        published_pass: epoch,
                    },
                );
            }
        }
    }

    /// Forget a document and clear its diagnostics in the editor.
    pub async fn close(&self, uri: &Url) {
        {
            let mut documents = self.documents.lock().await;
            documents.remove(uri);
            // Published under the lock so no pass can interleave a stale set.
            self.host
                .publish_diagnostics(uri.clone(), Vec::new(), None)
                .await;
        }
        self.settings.on_resource_closed(uri.as_str()).await;
        debug!(%uri, "Document closed");
    }

    /// Run one validation pass over the current text of `uri` and publish the
    /// result, unless a newer pass already did or the document went away.
    pub async fn validate(&self, uri: &Url) {
        let (pass, text, version) = {
            let documents = self.documents.lock().await;
            let Some(doc) = documents.get(uri) else {
                debug!(%uri, "Not validating unknown document");
                return;
            };
            (self.next_pass(), doc.text.clone(), doc.version)
        };

        let path = uri
            .to_file_path()
            .unwrap_or_else(|_| PathBuf::from(uri.path()));

        let settings = self
            .settings
            .resolve(uri.as_str(), || self.host.workspace_configuration(uri))
            .await;

        let diagnostics = match pipeline::validate(
            self.linter.as_ref(),
            &self.catalog,
            &settings,
            &path,
            &text,
        )
        .await
        {
            Ok(PassOutcome::Diagnostics(diagnostics)) => diagnostics,
            Ok(PassOutcome::Unsupported) => return,
            Err(e) => {
                warn!(%uri, "Validation failed, keeping previous diagnostics: {e:#}");
                return;
            }
        };

        let mut documents = self.documents.lock().await;
        let Some(doc) = documents.get_mut(uri) else {
            debug!(%uri, pass, "Document closed during pass, dropping result");
            return;
        };
        if pass <= doc.epoch || pass <= doc.published_pass {
            debug!(%uri, pass, published = doc.published_pass, "Dropping stale pass");
            return;
        }
        doc.published_pass = pass;

        let diagnostics = diagnostics.iter().map(convert::to_lsp_diagnostic).collect();
        // Held across the publish so results leave in pass order.
        self.host
            .publish_diagnostics(uri.clone(), diagnostics, Some(version))
            .await;
    }

    /// Validate every open document concurrently.
    pub async fn revalidate_all(&self) {
        let uris: Vec<Url> = self.documents.lock().await.keys().cloned().collect();
        info!(documents = uris.len(), "Revalidating open documents");
        join_all(uris.iter().map(|uri| self.validate(uri))).await;
    }

    /// Apply a `workspace/didChangeConfiguration` payload and revalidate.
    pub async fn configuration_changed(&self, settings: &Value) {
        if self.settings.is_scoped() {
            self.settings.invalidate_all().await;
        } else {
            self.settings
                .apply_global_change(settings.get(SETTINGS_SECTION))
                .await;
        }
        self.revalidate_all().await;
    }

    /// Quick fixes for the diagnostics the editor sent with a code action
    /// request.
    ///
    /// `None` when the document is unknown or the request's `only` filter
    /// leaves out quick fixes.
    pub async fn code_actions(
        &self,
        uri: &Url,
        only: Option<&[CodeActionKind]>,
        diagnostics: &[lsp_types::Diagnostic],
    ) -> Option<Vec<CodeAction>> {
        let version = self.documents.lock().await.get(uri)?.version;

        if let Some(kinds) = only
            && !kinds.contains(&CodeActionKind::QUICKFIX)
        {
            return None;
        }

        let document = DocumentRef {
            uri: uri.to_string(),
            version,
        };
        Some(
            diagnostics
                .iter()
                .map(convert::from_lsp_diagnostic)
                .filter_map(|diagnostic| fix::build_fix(&diagnostic, &document))
                .map(|action| convert::to_code_action(&action, uri))
                .collect(),
        )
    }
}
