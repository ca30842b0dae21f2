//! Check command - reconcile a document and report its problems

use super::{Sources, read};
use anyhow::{Result, bail};
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use bootprops_editor::{Diagnostic, Severity, YamlEditor};
use std::io::{IsTerminal, Write};
use std::ops::Range;
use std::path::Path;

pub fn execute(sources: &Sources, input: &Path, json: bool) -> Result<()> {
    let loaded = sources.load()?;
    let text = read(input)?;
    let editor =
        YamlEditor::new(&loaded.index, &loaded.types).with_settings(&loaded.settings);

    let diagnostics = editor.reconcile(&text);
    let name = input.display().to_string();
    tracing::info!(file = %name, problems = diagnostics.len(), "checked");

    let mut stdout = std::io::stdout().lock();
    for diagnostic in &diagnostics {
        if json {
            writeln!(stdout, "{}", to_json(&name, &text, diagnostic))?;
        } else {
            let color = std::io::stderr().is_terminal();
            eprint!("{}", render(&name, &text, diagnostic, color));
        }
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if errors > 0 {
        bail!("{errors} error(s) in {name}");
    }
    Ok(())
}

/// One diagnostic as a single-line JSON object.
pub fn to_json(name: &str, text: &str, diagnostic: &Diagnostic) -> String {
    let (line, column) = line_column(text, diagnostic.range.start);
    serde_json::json!({
        "file": name,
        "line": line,
        "column": column,
        "code": diagnostic.problem.code(),
        "severity": diagnostic.severity,
        "message": diagnostic.message,
        "range": diagnostic.range,
    })
    .to_string()
}

/// Render a diagnostic with the offending source lines underlined.
pub fn render(name: &str, text: &str, diagnostic: &Diagnostic, color: bool) -> String {
    let (kind, label_color) = match diagnostic.severity {
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
        _ => (ReportKind::Error, Color::Red),
    };
    let span = char_span(text, diagnostic.range.start..diagnostic.range.end);

    let report = Report::build(kind, name.to_string(), span.start)
        .with_config(Config::default().with_color(color))
        .with_message(format!(
            "[{}] {}",
            diagnostic.problem.code(),
            diagnostic.message
        ))
        .with_label(
            Label::new((name.to_string(), span))
                .with_message(&diagnostic.message)
                .with_color(label_color),
        )
        .finish();

    let mut output = Vec::new();
    match report.write((name.to_string(), Source::from(text)), &mut output) {
        Ok(()) => String::from_utf8_lossy(&output).into_owned(),
        Err(_) => {
            let (line, column) = line_column(text, diagnostic.range.start);
            format!("{name}:{line}:{column}: {}\n", diagnostic.message)
        }
    }
}

/// Convert a byte range into the char range the renderer expects. Empty
/// ranges are widened to one character so the label stays visible.
fn char_span(text: &str, range: Range<usize>) -> Range<usize> {
    let chars_before = |offset: usize| text[..offset.min(text.len())].chars().count();
    let start = chars_before(range.start);
    let end = chars_before(range.end).max(start);
    if end == start && start < text.chars().count() {
        start..start + 1
    } else {
        start..end
    }
}

/// 1-based line and column (in chars) of a byte offset.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootprops_editor::ProblemType;
    use bootprops_yaml::SourceRange;

    const TEXT: &str = "server:\n  port: eighty\n";

    fn mismatch() -> Diagnostic {
        let start = TEXT.find("eighty").unwrap();
        Diagnostic::new(
            ProblemType::TypeMismatch,
            SourceRange::new(start, start + "eighty".len()),
            "Expecting a 'Integer' but got 'eighty'",
        )
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column(TEXT, 0), (1, 1));
        assert_eq!(line_column(TEXT, TEXT.find("eighty").unwrap()), (2, 9));
        assert_eq!(line_column("é: x", "é: ".len()), (1, 4));
    }

    #[test]
    fn test_char_span() {
        assert_eq!(char_span("é: x", 4..5), 3..4);
        assert_eq!(char_span("abc", 1..1), 1..2);
        assert_eq!(char_span("abc", 3..3), 3..3);
    }

    #[test]
    fn test_json_line() {
        let value: serde_json::Value =
            serde_json::from_str(&to_json("app.yml", TEXT, &mismatch())).unwrap();
        assert_eq!(value["file"], "app.yml");
        assert_eq!(value["line"], 2);
        assert_eq!(value["column"], 9);
        assert_eq!(value["code"], "type-mismatch");
        assert_eq!(value["severity"], "error");
        assert_eq!(value["range"]["start"], 16);
    }

    #[test]
    fn test_render_shows_code_and_source() {
        let rendered = render("app.yml", TEXT, &mismatch(), false);
        assert!(rendered.contains("[type-mismatch] Expecting a 'Integer' but got 'eighty'"));
        assert!(rendered.contains("app.yml"));
        assert!(rendered.contains("port: eighty"));
    }

    #[test]
    fn test_render_warning() {
        let mut diagnostic = mismatch();
        diagnostic.severity = Severity::Warning;
        assert!(render("app.yml", TEXT, &diagnostic, false).contains("Warning"));
    }
}
