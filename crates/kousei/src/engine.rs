//! textlint process adapter.
//!
//! Each lint runs `textlint --format json --stdin --stdin-filename <path>`,
//! feeds the document on stdin and decodes the JSON formatter's output.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use kousei_core::{Linter, RawLintMessage};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::EngineConfig;

/// Exit status textlint uses when it reported lint errors.
const EXIT_LINT_ERRORS: i32 = 1;

/// Lint engine backed by the textlint CLI.
pub struct TextlintEngine {
    command: String,
    args: Vec<String>,
    textlintrc: Option<PathBuf>,
    extensions: Vec<String>,
}

impl TextlintEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            textlintrc: config.textlintrc.clone(),
            extensions: config.extensions.clone(),
        }
    }

    fn command_for(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg("--format")
            .arg("json")
            .arg("--stdin")
            .arg("--stdin-filename")
            .arg(path);
        if let Some(rc) = &self.textlintrc {
            cmd.arg("--config").arg(rc);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Linter for TextlintEngine {
    fn available_extensions(&self) -> &[String] {
        &self.extensions
    }

    async fn lint_text(&self, text: &str, path: &Path) -> Result<Vec<RawLintMessage>> {
        let mut child = self
            .command_for(path)
            .spawn()
            .wrap_err_with(|| format!("Failed to start {}", self.command))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .wrap_err("Failed to write document to textlint")?;
        }

        let output = child
            .wait_with_output()
            .await
            .wrap_err_with(|| format!("Failed to wait for {}", self.command))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let status = output.status.code();
        debug!(?status, bytes = stdout.len(), path = %path.display(), "textlint finished");

        if !output.status.success() && status != Some(EXIT_LINT_ERRORS) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("textlint exited with {}: {}", output.status, stderr.trim());
        }

        parse_output(&stdout).wrap_err_with(|| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            format!("Unexpected textlint output (stderr: {})", stderr.trim())
        })
    }
}

#[derive(Debug, Deserialize)]
struct TextlintResult {
    #[serde(default)]
    messages: Vec<TextlintMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextlintMessage {
    #[serde(default)]
    rule_id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    severity: i64,
    #[serde(default)]
    line: i64,
    #[serde(default)]
    column: i64,
    #[serde(default)]
    loc: Option<Location>,
    #[serde(default)]
    fix: Option<TextlintFix>,
}

#[derive(Debug, Deserialize)]
struct Location {
    start: LineColumn,
    end: LineColumn,
}

#[derive(Debug, Deserialize)]
struct LineColumn {
    line: i64,
    column: i64,
}

#[derive(Debug, Deserialize)]
struct TextlintFix {
    range: (i64, i64),
    text: String,
}

impl From<TextlintMessage> for RawLintMessage {
    fn from(m: TextlintMessage) -> Self {
        // Older textlint versions only report the start position.
        let (start, end) = match m.loc {
            Some(loc) => (
                (loc.start.line, loc.start.column),
                (loc.end.line, loc.end.column),
            ),
            None => ((m.line, m.column), (m.line, m.column)),
        };
        let mut raw = RawLintMessage::new(m.rule_id, m.message, m.severity, start.0, start.1);
        raw.end_line = end.0;
        raw.end_column = end.1;
        match m.fix {
            Some(fix) => raw.with_fix(fix.range.0, fix.range.1, fix.text),
            None => raw,
        }
    }
}

/// Decode textlint's JSON formatter output. Empty output means no findings.
pub fn parse_output(stdout: &str) -> Result<Vec<RawLintMessage>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let results: Vec<TextlintResult> =
        serde_json::from_str(stdout).wrap_err("textlint output is not a JSON result list")?;
    Ok(results
        .into_iter()
        .flat_map(|result| result.messages)
        .map(RawLintMessage::from)
        .collect())
}
