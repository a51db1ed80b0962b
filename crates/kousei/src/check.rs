//! `kousei check`: one validation pass per file, printed to the terminal.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use kousei_core::pipeline::{self, PassOutcome};
use kousei_core::{Diagnostic, EffectiveSettings, Linter, RuleCatalog, Severity};
use owo_colors::OwoColorize;
use serde_json::Value;

/// Totals across all checked files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub files: usize,
    pub skipped: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl CheckSummary {
    pub fn passed(&self) -> bool {
        self.errors == 0
    }

    fn record(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                Severity::Information => self.infos += 1,
            }
        }
    }
}

/// Parse the `--settings` argument, the same JSON object an editor would
/// send for the `japanese-proofreading` section.
pub fn parse_settings(raw: Option<&str>) -> Result<Option<Value>> {
    raw.map(|raw| serde_json::from_str(raw).wrap_err("--settings is not valid JSON"))
        .transpose()
}

/// Check `files`, printing one line per diagnostic to stdout.
pub async fn run(
    linter: &dyn Linter,
    catalog: &RuleCatalog,
    settings: Option<&Value>,
    files: &[PathBuf],
) -> Result<CheckSummary> {
    let defaults = EffectiveSettings::defaults(catalog);
    let settings = EffectiveSettings::from_payload(&defaults, settings);
    let mut summary = CheckSummary::default();

    for path in files {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.clone());

        match pipeline::validate(linter, catalog, &settings, &absolute, &text).await? {
            PassOutcome::Unsupported => {
                eprintln!(
                    "{} {} (unsupported file type)",
                    "skip".dimmed(),
                    path.display()
                );
                summary.skipped += 1;
            }
            PassOutcome::Diagnostics(diagnostics) => {
                for diagnostic in &diagnostics {
                    println!("{}", render_line(path, diagnostic));
                }
                summary.files += 1;
                summary.record(&diagnostics);
            }
        }
    }

    eprintln!("{}", render_summary(&summary));
    Ok(summary)
}

/// `path:line:col severity message`, with one-based line and column.
pub fn render_line(path: &Path, diagnostic: &Diagnostic) -> String {
    let start = diagnostic.range.start;
    let location = format!("{}:{}:{}", path.display(), start.line + 1, start.character + 1);
    let severity = match diagnostic.severity {
        Severity::Error => diagnostic.severity.label().red().bold().to_string(),
        Severity::Warning => diagnostic.severity.label().yellow().bold().to_string(),
        Severity::Information => diagnostic.severity.label().blue().to_string(),
    };
    format!("{} {} {}", location.bold(), severity, diagnostic.text)
}

fn render_summary(summary: &CheckSummary) -> String {
    let problems = summary.errors + summary.warnings + summary.infos;
    let headline = if summary.passed() {
        "✓".green().bold().to_string()
    } else {
        "✗".red().bold().to_string()
    };
    format!(
        "{} {} problem(s) in {} file(s) ({} errors, {} warnings, {} skipped)",
        headline, problems, summary.files, summary.errors, summary.warnings, summary.skipped
    )
}
