//! Quick-fix actions built from fixable diagnostics.

use crate::diagnostic::{Diagnostic, SOURCE_TAG};
use crate::position::TextRange;

/// Title of every quick fix.
pub const FIX_TITLE: &str = "問題を自動修正する（テキスト校正くん）";

/// A document at a specific version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub uri: String,
    pub version: i32,
}

/// Replaces a diagnostic's whole range with its fix text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixAction {
    pub title: String,
    pub document: DocumentRef,
    pub range: TextRange,
    pub new_text: String,
    /// The diagnostic the fix resolves.
    pub diagnostic: Diagnostic,
}

/// Build the fix for `diagnostic`, or `None` when it has no fix text or was
/// produced by another source.
pub fn build_fix(diagnostic: &Diagnostic, document: &DocumentRef) -> Option<FixAction> {
    if diagnostic.source_tag != SOURCE_TAG {
        return None;
    }
    let new_text = diagnostic.fix_text.clone()?;

    Some(FixAction {
        title: FIX_TITLE.to_string(),
        document: document.clone(),
        range: diagnostic.range,
        new_text,
        diagnostic: diagnostic.clone(),
    })
}
