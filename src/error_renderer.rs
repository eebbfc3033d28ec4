//! Error rendering using ariadne
//!
//! Errors that carry their expression source are printed with the source
//! snippet and the error span labelled. Errors without a source (for example
//! an invalid function name passed to `register`) print as a single line.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<expression>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use safeval::{Context, render_error};
///
/// if let Err(e) = safeval::evaluate("1 + + 2", &Context::new()) {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for web UIs, logs, etc.)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match (&error.expression, &error.span) {
        (Some(source), Some(_)) => {
            render_diagnostic(source, &error.to_diagnostic(), writer, use_color)
        }
        _ => writeln!(writer, "[{}] Error: {}", error.code.code(), error),
    }
}

fn render_diagnostic(
    source: &str,
    diag: &Diagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    let mut report = Report::build(kind, (SOURCE_ID, diag.span.0.clone()))
        .with_message(&diag.message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    let color = colors.next();
    report = report.with_label(
        Label::new((SOURCE_ID, diag.span.0.clone()))
            .with_message(&diag.message)
            .with_color(color),
    );

    if let Some(help) = &diag.help {
        report = report.with_help(help);
    }

    report
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}
