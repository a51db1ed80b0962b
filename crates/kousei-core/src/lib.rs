//! kousei-core - Validation pipeline for Japanese proofreading diagnostics
//!
//! This crate turns the findings of an external lint engine (textlint with
//! Japanese rule presets) into editor diagnostics:
//! - [`RuleCatalog`] lists the known rules, their display names and defaults
//! - [`SettingsResolver`] merges user settings over those defaults, per resource
//! - [`matcher::is_enabled`] decides whether a finding belongs to an enabled rule
//! - [`position::to_range`] maps engine locations to zero-based ranges
//! - [`diagnostic::build`] assembles the diagnostic record
//! - [`fix::build_fix`] turns a fixable diagnostic into a replace edit
//!
//! The engine itself sits behind the [`Linter`] trait.
//!
//! ```
//! use kousei_core::{EffectiveSettings, RawLintMessage, RuleCatalog};
//! use kousei_core::pipeline::collect_diagnostics;
//!
//! let catalog = RuleCatalog::builtin();
//! let settings = EffectiveSettings::defaults(&catalog);
//! let messages = vec![
//!     RawLintMessage::new("prh", "「行なう」=>「行う」（誤字）", 2, 1, 5).with_fix(4, 7, "行う"),
//! ];
//!
//! let diagnostics = collect_diagnostics(&catalog, &settings, &messages);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].range.start.character, 4);
//! assert_eq!(diagnostics[0].fix_text.as_deref(), Some("行う"));
//! ```

pub mod catalog;
pub mod diagnostic;
pub mod fix;
pub mod matcher;
mod message;
pub mod pipeline;
pub mod position;
pub mod settings;

pub use catalog::{AGGREGATOR_RULE_ID, RuleCatalog, RuleDescriptor};
pub use diagnostic::{Diagnostic, SOURCE_TAG, Severity};
pub use fix::{DocumentRef, FixAction};
pub use message::{RawFix, RawLintMessage};
pub use pipeline::{Linter, PassOutcome};
pub use position::{Position, TextRange};
pub use settings::{EffectiveSettings, SETTINGS_SECTION, SettingsPayload, SettingsResolver};
