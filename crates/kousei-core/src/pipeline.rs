//! One validation pass: document text in, filtered diagnostics out.

use std::path::Path;

use async_trait::async_trait;
use eyre::Result;
use tracing::debug;

use crate::catalog::RuleCatalog;
use crate::diagnostic::{self, Diagnostic};
use crate::message::RawLintMessage;
use crate::position;
use crate::settings::EffectiveSettings;

/// The external lint engine.
#[async_trait]
pub trait Linter: Send + Sync {
    /// File extensions the engine's plugins can parse, with the leading dot.
    fn available_extensions(&self) -> &[String];

    /// Lint `text`. `path` is a file-type hint, the file need not exist.
    async fn lint_text(&self, text: &str, path: &Path) -> Result<Vec<RawLintMessage>>;
}

/// What a pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The engine cannot parse this file type; it was not invoked.
    Unsupported,
    /// The complete diagnostic set for the document.
    Diagnostics(Vec<Diagnostic>),
}

/// `.md` for `notes.md`, `None` for `Makefile` or `.bashrc`.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

pub fn is_supported(linter: &dyn Linter, path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| linter.available_extensions().contains(&ext))
}

/// Turn engine findings into diagnostics, dropping disabled rules and
/// keeping at most `settings.max_problems`.
pub fn collect_diagnostics(
    catalog: &RuleCatalog,
    settings: &EffectiveSettings,
    messages: &[RawLintMessage],
) -> Vec<Diagnostic> {
    messages
        .iter()
        .filter_map(|message| {
            diagnostic::build(catalog, settings, message, position::to_range(message))
        })
        .take(settings.max_problems)
        .collect()
}

/// Run the engine once over `text` and build the document's diagnostics.
///
/// Engine failures are returned as errors; the caller keeps whatever it last
/// published for the document.
pub async fn validate(
    linter: &dyn Linter,
    catalog: &RuleCatalog,
    settings: &EffectiveSettings,
    path: &Path,
    text: &str,
) -> Result<PassOutcome> {
    if !is_supported(linter, path) {
        debug!(path = %path.display(), "Skipping unsupported file type");
        return Ok(PassOutcome::Unsupported);
    }

    let messages = linter.lint_text(text, path).await?;
    let diagnostics = collect_diagnostics(catalog, settings, &messages);
    debug!(
        path = %path.display(),
        reported = messages.len(),
        kept = diagnostics.len(),
        "Validation pass finished"
    );

    Ok(PassOutcome::Diagnostics(diagnostics))
}
