//! YAML error diagnostics for configuration files

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("invalid configuration in {filename}: {message}")]
#[diagnostic(code(qasync::config::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    filename: String,

    /// The underlying error message
    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let width = source[offset..].chars().next().map_or(0, char::len_utf8);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset + width),
            help,
            filename: filename.to_string(),
            message,
        }
    }
}

/// Convert a 1-based line/column to a byte offset, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        match source
            .match_indices('\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)
        {
            Some(start) => start,
            None => return source.len(),
        }
    };

    source[line_start..]
        .char_indices()
        .take_while(|(_, c)| *c != '\n')
        .nth(column.saturating_sub(1))
        .map(|(i, _)| line_start + i)
        .unwrap_or_else(|| {
            source[line_start..]
                .find('\n')
                .map(|n| line_start + n)
                .unwrap_or(source.len())
        })
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg_lower.contains("unknown field") {
        return Some(
            "Known keys: document, sources, test_functions, header, totals_label, section_depth, sections, remap"
                .to_string(),
        );
    }

    if msg_lower.contains("malformed test case id") {
        return Some("Remap entries look like {from: TC-4.1.1-001, to: TC-4.1-001}".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    if msg_lower.contains("invalid type") {
        return Some("Check the value type: sources is a list, sections is a map of key: name.".to_string());
    }

    None
}
