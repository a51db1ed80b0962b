//! Language server over stdio.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Result, eyre};
use kousei_core::{Linter, RuleCatalog, SETTINGS_SECTION};
use serde_json::Value;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{info, warn};

use crate::session::{Host, Session};

const DID_CHANGE_CONFIGURATION: &str = "workspace/didChangeConfiguration";

/// Run the language server on stdin/stdout until the client exits.
pub async fn run(linter: Arc<dyn Linter>, catalog: Arc<RuleCatalog>) -> Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| Backend {
        session: Arc::new(Session::new(ClientHost { client }, linter, catalog)),
    });
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}

/// [`Host`] backed by the connected editor.
pub struct ClientHost {
    client: Client,
}

#[async_trait]
impl Host for ClientHost {
    async fn publish_diagnostics(
        &self,
        uri: Url,
        diagnostics: Vec<Diagnostic>,
        version: Option<i32>,
    ) {
        self.client
            .publish_diagnostics(uri, diagnostics, version)
            .await;
    }

    async fn workspace_configuration(&self, scope: &Url) -> Result<Value> {
        let mut values = self
            .client
            .configuration(vec![ConfigurationItem {
                scope_uri: Some(scope.clone()),
                section: Some(SETTINGS_SECTION.to_string()),
            }])
            .await
            .map_err(|e| eyre!("workspace/configuration request failed: {e}"))?;
        Ok(if values.is_empty() {
            Value::Null
        } else {
            values.swap_remove(0)
        })
    }
}

struct Backend {
    session: Arc<Session<ClientHost>>,
}

impl Backend {
    /// Validate in the background so notifications are not held up by the
    /// engine.
    fn spawn_validation(&self, uri: Url) {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            session.validate(&uri).await;
        });
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        let scoped = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.configuration)
            .unwrap_or(false);
        self.session.set_scoped_configuration(scoped);
        info!(scoped, "Initializing");

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        if !self.session.has_scoped_configuration() {
            return;
        }
        let registration = Registration {
            id: DID_CHANGE_CONFIGURATION.to_string(),
            method: DID_CHANGE_CONFIGURATION.to_string(),
            register_options: None,
        };
        if let Err(e) = self
            .session
            .host()
            .client
            .register_capability(vec![registration])
            .await
        {
            warn!("Failed to register {DID_CHANGE_CONFIGURATION}: {e}");
        }
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.session
            .open(doc.uri.clone(), doc.version, doc.text)
            .await;
        self.spawn_validation(doc.uri);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // Full sync: the last change carries the whole text.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.session
            .change(uri.clone(), params.text_document.version, change.text)
            .await;
        self.spawn_validation(uri);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.session.close(&params.text_document.uri).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            session.configuration_changed(&params.settings).await;
        });
    }

    async fn code_action(&self, params: CodeActionParams) -> LspResult<Option<CodeActionResponse>> {
        let actions = self
            .session
            .code_actions(
                &params.text_document.uri,
                params.context.only.as_deref(),
                &params.context.diagnostics,
            )
            .await;

        Ok(actions.map(|actions| {
            actions
                .into_iter()
                .map(CodeActionOrCommand::CodeAction)
                .collect()
        }))
    }
}
