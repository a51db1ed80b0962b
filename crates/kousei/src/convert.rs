//! Conversions between kousei-core records and `lsp_types`.

use kousei_core::{Diagnostic, FixAction, Position, Severity, TextRange};
use serde_json::Value;
use std::collections::HashMap;
use tower_lsp::lsp_types::{
    self, CodeAction, CodeActionKind, DiagnosticSeverity, NumberOrString, TextEdit, Url,
    WorkspaceEdit,
};

pub fn to_lsp_position(position: Position) -> lsp_types::Position {
    lsp_types::Position {
        line: position.line,
        character: position.character,
    }
}

pub fn to_lsp_range(range: TextRange) -> lsp_types::Range {
    lsp_types::Range {
        start: to_lsp_position(range.start),
        end: to_lsp_position(range.end),
    }
}

pub fn from_lsp_range(range: lsp_types::Range) -> TextRange {
    TextRange::new(
        Position::new(range.start.line, range.start.character),
        Position::new(range.end.line, range.end.character),
    )
}

fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Error => DiagnosticSeverity::ERROR,
    }
}

fn from_lsp_severity(severity: Option<DiagnosticSeverity>) -> Severity {
    match severity {
        Some(DiagnosticSeverity::ERROR) => Severity::Error,
        Some(DiagnosticSeverity::WARNING) => Severity::Warning,
        _ => Severity::Information,
    }
}

/// The fix text rides along in `data` so it survives the round trip through
/// the editor and comes back with code action requests.
pub fn to_lsp_diagnostic(diagnostic: &Diagnostic) -> lsp_types::Diagnostic {
    lsp_types::Diagnostic {
        range: to_lsp_range(diagnostic.range),
        severity: Some(to_lsp_severity(diagnostic.severity)),
        code: Some(NumberOrString::String(diagnostic.rule_key.clone())),
        source: Some(diagnostic.source_tag.clone()),
        message: diagnostic.text.clone(),
        data: diagnostic.fix_text.clone().map(Value::String),
        ..Default::default()
    }
}

pub fn from_lsp_diagnostic(diagnostic: &lsp_types::Diagnostic) -> Diagnostic {
    let rule_key = match &diagnostic.code {
        Some(NumberOrString::String(code)) => code.clone(),
        Some(NumberOrString::Number(code)) => code.to_string(),
        None => String::new(),
    };
    let fix_text = match &diagnostic.data {
        Some(Value::String(text)) => Some(text.clone()),
        _ => None,
    };

    Diagnostic {
        severity: from_lsp_severity(diagnostic.severity),
        range: from_lsp_range(diagnostic.range),
        text: diagnostic.message.clone(),
        source_tag: diagnostic.source.clone().unwrap_or_default(),
        rule_key,
        fix_text,
    }
}

/// A quick fix whose single edit targets the document version it was built for.
pub fn to_code_action(action: &FixAction, uri: &Url) -> CodeAction {
    let edit = TextEdit {
        range: to_lsp_range(action.range),
        new_text: action.new_text.clone(),
    };
    let document_changes = lsp_types::DocumentChanges::Edits(vec![lsp_types::TextDocumentEdit {
        text_document: lsp_types::OptionalVersionedTextDocumentIdentifier {
            uri: uri.clone(),
            version: Some(action.document.version),
        },
        edits: vec![lsp_types::OneOf::Left(edit)],
    }]);

    CodeAction {
        title: action.title.clone(),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![to_lsp_diagnostic(&action.diagnostic)]),
        edit: Some(WorkspaceEdit {
            changes: None::<HashMap<Url, Vec<TextEdit>>>,
            document_changes: Some(document_changes),
            change_annotations: None,
        }),
        ..Default::default()
    }
}
