//! Findings as reported by the external lint engine.

/// A single-range replacement suggested by the engine.
///
/// The range is a pair of offsets into the document text; only its width is
/// used, the position itself comes from the message's line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFix {
    pub range_start: i64,
    pub range_end: i64,
    pub replacement_text: String,
}

impl RawFix {
    pub fn len(&self) -> i64 {
        self.range_end - self.range_start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

/// One finding from the engine. Lines and columns are 1-based; columns count
/// UTF-16 code units, the same unit LSP positions use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLintMessage {
    pub rule_id: String,
    pub message: String,
    /// 0 = info, 1 = warning, 2 = error. Anything else is treated as info.
    pub severity_level: i64,
    pub start_line: i64,
    pub start_column: i64,
    pub end_line: i64,
    pub end_column: i64,
    pub fix: Option<RawFix>,
}

impl RawLintMessage {
    /// A message spanning a single point, without a fix.
    pub fn new(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        severity_level: i64,
        line: i64,
        column: i64,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            message: message.into(),
            severity_level,
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column,
            fix: None,
        }
    }

    pub fn with_fix(mut self, range_start: i64, range_end: i64, text: impl Into<String>) -> Self {
        self.fix = Some(RawFix {
            range_start,
            range_end,
            replacement_text: text.into(),
        });
        self
    }
}
