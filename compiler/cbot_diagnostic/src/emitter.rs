//! Terminal rendering of errors over the program source.
//!
//! Uses `ariadne` to print a labelled report with the offending token
//! span highlighted, the way an editor would.

use ariadne::{Color, Label, Report, ReportKind, Source};
use cbot_ir::Span;

use crate::{CompileError, ErrorCode, RuntimeError};

/// Whether reports use ANSI colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Always,
    Never,
}

/// Renders errors for one source file.
pub struct TerminalEmitter<'a> {
    source: &'a str,
    path: &'a str,
    color: ColorMode,
}

impl<'a> TerminalEmitter<'a> {
    pub fn new(source: &'a str, path: &'a str) -> Self {
        TerminalEmitter {
            source,
            path,
            color: ColorMode::Never,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn render_compile_error(&self, error: &CompileError) -> String {
        self.render(
            error.code.code(),
            error.code.name(),
            error.code.message(),
            error.span,
        )
    }

    pub fn render_runtime_error(&self, error: &RuntimeError) -> String {
        match error.known() {
            Some(code) => self.render(error.code, code.name(), code.message(), error.span),
            None => self.render(error.code, "exception", "uncaught exception", error.span),
        }
    }

    fn render(&self, code: i32, name: &str, message: &str, span: Span) -> String {
        let range = self.clamp(span);
        let color = if ErrorCode::from_code(code).is_some_and(ErrorCode::is_runtime) {
            Color::Magenta
        } else {
            Color::Red
        };
        let report = Report::build(ReportKind::Error, self.path, range.start)
            .with_code(code)
            .with_message(message)
            .with_label(
                Label::new((self.path, range))
                    .with_message(name)
                    .with_color(color),
            )
            .with_config(ariadne::Config::default().with_color(self.color == ColorMode::Always))
            .finish();

        let mut out = Vec::new();
        if report
            .write((self.path, Source::from(self.source)), &mut out)
            .is_err()
        {
            return format!("{code} {name}: {message}");
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Keep the label inside the source; zero-length spans cover one byte
    /// so the report has something to point at.
    fn clamp(&self, span: Span) -> std::ops::Range<usize> {
        let len = self.source.len();
        let start = (span.start as usize).min(len);
        let end = (span.end as usize).clamp(start, len);
        if start == end && end < len {
            start..end + 1
        } else {
            start..end
        }
    }
}
