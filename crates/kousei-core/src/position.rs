//! Converts engine locations into zero-based, half-open editor ranges.

use crate::message::RawLintMessage;

/// Rule whose reported column is one character past the offending character.
pub const DIACRITIC_RULE_ID: &str = "japanese/no-nfd";

/// Zero-based position. `character` counts UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Half-open `[start, end)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

fn clamp(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// The editor range of a finding.
///
/// The range stays on the start line. Its width is the width of the fix
/// payload when there is one and a single character otherwise; a reversed
/// fix range yields an empty range.
pub fn to_range(message: &RawLintMessage) -> TextRange {
    let adjustment = if message.rule_id == DIACRITIC_RULE_ID {
        -1
    } else {
        0
    };
    let length = message.fix.as_ref().map_or(1, |fix| fix.len());

    let line = clamp(message.start_line.saturating_sub(1));
    let start_column = message
        .start_column
        .saturating_sub(1)
        .saturating_add(adjustment)
        .max(0);
    let end_column = start_column.saturating_add(length.max(0));

    TextRange::new(
        Position::new(line, clamp(start_column)),
        Position::new(line, clamp(end_column)),
    )
}
