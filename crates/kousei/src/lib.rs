//! kousei - Japanese proofreading language server
//!
//! Runs textlint over open documents and publishes its findings as editor
//! diagnostics, with quick fixes for findings the engine can correct.
//!
//! The validation pipeline lives in `kousei-core`; this crate adds the
//! textlint process adapter, the document session and the LSP transport.

pub mod check;
pub mod config;
pub mod convert;
pub mod engine;
pub mod lsp;
pub mod session;

use std::sync::Arc;

use config::Config;
use eyre::{Result, WrapErr};
use kousei_core::{Linter, RuleCatalog};
use tracing::info;

/// The rule catalog named by the config, or the built-in one.
///
/// A catalog that fails to load is fatal: running with a partial catalog
/// would silently disable rules.
pub fn load_catalog(config: &Config) -> Result<RuleCatalog> {
    match &config.catalog {
        Some(path) => {
            let catalog = RuleCatalog::load(path)
                .wrap_err_with(|| format!("Failed to load rule catalog {}", path.display()))?;
            info!(rules = catalog.len(), path = %path.display(), "Loaded rule catalog");
            Ok(catalog)
        }
        None => Ok(RuleCatalog::builtin()),
    }
}

/// The lint engine described by the config.
pub fn build_linter(config: &Config) -> Arc<dyn Linter> {
    Arc::new(engine::TextlintEngine::new(&config.engine))
}
