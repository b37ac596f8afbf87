//! Error rendering using ariadne
//!
//! Load errors carry their own span. Runtime failures are rendered
//! against the span the engine reports for them, if any.

use crate::{Error, Span};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use tumble::{Engine, EngineOptions, render_error};
///
/// let mut engine = Engine::new(EngineOptions::default(), |_| {}).unwrap();
/// let source = "1 + \"two\"";
/// if let Err(e) = engine.eval_str(source) {
///     render_error(&e, source, engine.failure_span());
/// }
/// ```
pub fn render_error(error: &Error, source: &str, span: Option<Span>) {
    render_error_to_writer(error, source, span, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(
    error: &Error,
    source: &str,
    span: Option<Span>,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_error_to_writer(error, source, span, writer, true)
}

/// Render an error to a String (useful for tests, web UIs, etc.)
pub fn render_error_to_string(error: &Error, source: &str, span: Option<Span>) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, span, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error, source: &str, span: Option<Span>) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, span, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    source: &str,
    span: Option<Span>,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Load(error) => {
            let message = error.message.to_string();
            render_report(source, error.span.clone(), &message, None, writer, use_color)
        }
        Error::Failed(error) | Error::Uncaught(error) => {
            let message = error.kind.to_string();
            let mut notes = Vec::new();
            if let Some(where_) = &error.where_ {
                notes.push(format!("in {}", where_));
            }
            if let Some(near) = &error.near {
                notes.push(format!("near {}", near));
            }
            let note = (!notes.is_empty()).then(|| notes.join(", "));
            match span {
                Some(span) => render_report(source, span, &message, note, writer, use_color),
                None => {
                    writeln!(writer, "Error: {}", message)?;
                    if let Some(note) = note {
                        writeln!(writer, "  {}", note)?;
                    }
                    Ok(())
                }
            }
        }
        Error::ResourceExceeded(error) => {
            writeln!(writer, "Resource limit exceeded: {}", error.kind)
        }
        Error::Halted => writeln!(writer, "Halted"),
        Error::Api(msg) => writeln!(writer, "API error: {}", msg),
    }
}

fn render_report(
    source: &str,
    span: Span,
    message: &str,
    note: Option<String>,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let mut report = Report::build(ReportKind::Error, ("<input>", span.0.clone()))
        .with_message(message)
        .with_config(ariadne::Config::default().with_color(use_color));

    let color = colors.next();
    let mut label = Label::new(("<input>", span.0)).with_color(color);
    if let Some(note) = note {
        label = label.with_message(note);
    }
    report = report.with_label(label);

    report
        .finish()
        .write(("<input>", Source::from(source)), &mut *writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Engine, EngineOptions};

    fn render(source: &str) -> String {
        let mut engine = Engine::new(EngineOptions::default(), |_| {}).unwrap();
        let error = engine.eval_str(source).unwrap_err();
        render_error_to_string_no_color(&error, source, engine.failure_span())
    }

    #[test]
    fn test_render_load_error() {
        let output = render("[1 2");
        assert!(output.contains("Error"));
        assert!(output.contains("[1 2"));
    }

    #[test]
    fn test_render_failure_with_source() {
        let output = render("x: 1\nfail \"boom\"");
        assert!(output.contains("boom"));
        assert!(output.contains("fail \"boom\""));
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_render_type_error_names_the_action() {
        let output = render("add 1 \"hello\"");
        assert!(output.contains("does not allow text!"));
        assert!(output.contains("in add"));
    }

    #[test]
    fn test_render_resource_error() {
        let output = render("f: func [] [f] f");
        assert!(output.starts_with("Resource limit exceeded: level stack overflow"));
    }
}
