//! Diagnostic records handed to the editor.

use crate::catalog::RuleCatalog;
use crate::matcher;
use crate::message::RawLintMessage;
use crate::position::TextRange;
use crate::settings::EffectiveSettings;

/// Source tag attached to every diagnostic kousei produces.
pub const SOURCE_TAG: &str = "テキスト校正くん";

/// Prefix marking diagnostics that come with an automatic fix.
pub const FIX_MARKER: &str = "🪄 ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Information,
    Warning,
    Error,
}

impl Severity {
    /// Engine severity level to editor severity. Unknown levels become
    /// [`Severity::Information`].
    pub fn from_level(level: i64) -> Self {
        match level {
            1 => Self::Warning,
            2 => Self::Error,
            _ => Self::Information,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Information => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: TextRange,
    pub text: String,
    pub source_tag: String,
    /// Engine rule id, sent to the editor as the diagnostic code.
    pub rule_key: String,
    /// Replacement text for the range, when the engine offered a fix.
    pub fix_text: Option<String>,
}

impl Diagnostic {
    pub fn has_fix(&self) -> bool {
        self.fix_text.is_some()
    }
}

/// Build the diagnostic for one finding, or `None` when its rule is disabled.
pub fn build(
    catalog: &RuleCatalog,
    settings: &EffectiveSettings,
    message: &RawLintMessage,
    range: TextRange,
) -> Option<Diagnostic> {
    if !matcher::is_enabled(catalog, settings, &message.rule_id, &message.message) {
        return None;
    }

    let marker = if message.fix.is_some() { FIX_MARKER } else { "" };
    let text = format!("{marker}{}（{}）", message.message, message.rule_id);

    Some(Diagnostic {
        severity: Severity::from_level(message.severity_level),
        range,
        text,
        source_tag: SOURCE_TAG.to_string(),
        rule_key: message.rule_id.clone(),
        fix_text: message.fix.as_ref().map(|fix| fix.replacement_text.clone()),
    })
}
