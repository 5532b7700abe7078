//! Pretty diagnostic rendering using ariadne.
//!
//! Diagnostics carry token-index spans. For display the tokens are laid out
//! on one line separated by spaces, and each span is mapped to the byte range
//! its tokens occupy on that line.

use std::io::{self, IsTerminal};
use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use argcursor_diagnostics::{Diagnostic, Severity, Span};

const SOURCE_NAME: &str = "<args>";

// ── Output format ───────────────────────────────────────────────────────

/// Output format for results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, token-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or detect from whether stdout is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            // Default: pretty for interactive terminals, JSON for pipes
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Token layout ────────────────────────────────────────────────────────

/// Tokens joined into a single displayable line.
#[derive(Debug)]
pub(crate) struct TokenLine {
    text: String,
    ranges: Vec<Range<usize>>,
}

impl TokenLine {
    pub(crate) fn new(tokens: &[String]) -> Self {
        let mut text = String::new();
        let mut ranges = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            let start = text.len();
            text.push_str(token);
            ranges.push(start..text.len());
        }
        Self { text, ranges }
    }

    /// Byte range on the line covered by a token span.
    ///
    /// Empty spans point just past the token before them, so "missing value"
    /// diagnostics land after the last consumed token.
    pub(crate) fn byte_range(&self, span: Span) -> Range<usize> {
        let end_of = |i: usize| self.ranges.get(i).map_or(self.text.len(), |r| r.end);
        if span.is_empty() {
            let at = if span.start == 0 {
                0
            } else {
                end_of(span.start - 1)
            };
            return at..at;
        }
        let start = self
            .ranges
            .get(span.start)
            .map_or(self.text.len(), |r| r.start);
        let end = end_of(span.end - 1).max(start);
        start..end
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warn => ReportKind::Warning,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        _ => Color::White,
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Render diagnostics to stderr, annotating the token line.
pub(crate) fn render_diagnostics_pretty(line: &TokenLine, diagnostics: &[Diagnostic]) {
    let config = Config::default().with_compact(false);
    let mut cache = (SOURCE_NAME, Source::from(line.text.as_str()));

    for diag in diagnostics {
        let Some(span) = diag.span else {
            eprintln!("{diag}");
            if let Some(note) = context_note(diag) {
                eprintln!("  = note: {note}");
            }
            continue;
        };

        let range = line.byte_range(span);
        let label = Label::new((SOURCE_NAME, range.clone()))
            .with_message(context_note(diag).unwrap_or_else(|| diag.message.clone()))
            .with_color(severity_color(&diag.severity));
        let mut builder = Report::build(report_kind(&diag.severity), (SOURCE_NAME, range))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(label);
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

// ── Unified entry point ─────────────────────────────────────────────────

/// Render diagnostics in the given format.
///
/// - `Pretty` → coloured output to stderr.
/// - `Json`   → nothing here; JSON callers embed diagnostics in their report.
pub(crate) fn render_diagnostics(line: &TokenLine, diagnostics: &[Diagnostic], format: Format) {
    if format == Format::Pretty && !diagnostics.is_empty() {
        render_diagnostics_pretty(line, diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(tokens: &[&str]) -> TokenLine {
        TokenLine::new(&tokens.iter().map(|s| (*s).to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn token_spans_map_to_bytes() {
        let l = line(&["LIMIT", "10", "WITHSCORES"]);
        assert_eq!(l.text, "LIMIT 10 WITHSCORES");
        assert_eq!(l.byte_range(Span::token(1)), 6..8);
        assert_eq!(l.byte_range(Span::new(0, 2)), 0..8);
    }

    #[test]
    fn empty_span_sits_after_previous_token() {
        let l = line(&["LIMIT"]);
        assert_eq!(l.byte_range(Span::empty(1)), 5..5);
        assert_eq!(l.byte_range(Span::empty(0)), 0..0);
    }

    #[test]
    fn spans_past_end_clamp() {
        let l = line(&["a", "b"]);
        assert_eq!(l.byte_range(Span::new(1, 4)), 2..3);
        assert_eq!(l.byte_range(Span::token(5)), 3..3);
    }
}
