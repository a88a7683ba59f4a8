//! Diagnostic rendering.
//!
//! The semantic core (see `quill-sem`) never prints anything: it returns a
//! single structured `AnalysisError` and stops (spec §7 — all errors are
//! fatal for the run, none are recovered locally). This module is the
//! ambient piece that the driver uses to turn that structured value, or any
//! other fatal condition, into a message a user can read.
//!
//! # Examples
//!
//! ```
//! use quill_util::{Diagnostic, Handler, Span};
//!
//! let mut handler = Handler::new();
//! handler.emit(Diagnostic::error("unexpected token", Span::DUMMY));
//!
//! if handler.has_errors() {
//!     eprintln!("analysis failed");
//! }
//! ```

use crate::span::{Span, SourceMap};
use std::fmt;

/// Diagnostic severity.
///
/// # Examples
///
/// ```
/// use quill_util::Level;
///
/// assert_eq!(Level::Error.to_string(), "error");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
            Level::Help => "help",
        };
        f.write_str(s)
    }
}

/// A single diagnostic message with severity, location and optional notes.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity of this diagnostic.
    pub level: Level,
    /// Main diagnostic message.
    pub message: String,
    /// Source location the diagnostic points at.
    pub span: Span,
    /// Additional context lines, rendered after the main message.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Build an error-level diagnostic.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::{Diagnostic, Level, Span};
    ///
    /// let diag = Diagnostic::error("undefined name", Span::DUMMY);
    /// assert_eq!(diag.level, Level::Error);
    /// ```
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    /// Attach a note, shown under the main message when rendered.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::{Diagnostic, Span};
    ///
    /// let diag = Diagnostic::error("type mismatch", Span::DUMMY)
    ///     .note("expected `i32`, found `bool`");
    /// assert_eq!(diag.notes.len(), 1);
    /// ```
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Render the diagnostic, including a source snippet when `map` has the
    /// relevant file loaded.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::{Diagnostic, SourceMap};
    ///
    /// let mut map = SourceMap::new();
    /// let file = map.add_file("a.lang", "x = 1\n");
    /// let diag = Diagnostic::error("oops", quill_util::Span::new(file, 0, 1));
    /// assert!(diag.render(&map).contains("a.lang:1:1"));
    /// ```
    pub fn render(&self, map: &SourceMap) -> String {
        let mut out = format!("{}: {}", self.level, self.message);
        if let Some(file) = map.get(self.span.file) {
            let (line, col) = file.line_col(self.span.lo);
            out.push_str(&format!("\n  --> {}:{}:{}", file.name(), line, col));
        }
        for note in &self.notes {
            out.push_str(&format!("\n  note: {note}"));
        }
        out
    }
}

/// Accumulates diagnostics for the driver. The semantic core itself is
/// fail-fast (spec §7) and never touches a `Handler`; this exists purely so
/// the driver can collect warnings/notes emitted outside the core alongside
/// the core's single fatal error.
#[derive(Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    /// Create an empty handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::Handler;
    ///
    /// let handler = Handler::new();
    /// assert!(!handler.has_errors());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::{Diagnostic, Handler, Span};
    ///
    /// let mut handler = Handler::new();
    /// handler.emit(Diagnostic::error("boom", Span::DUMMY));
    /// assert_eq!(handler.diagnostics().len(), 1);
    /// ```
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Whether any recorded diagnostic is [`Level::Error`].
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::{Diagnostic, Handler, Span};
    ///
    /// let mut handler = Handler::new();
    /// handler.emit(Diagnostic::error("boom", Span::DUMMY).note("context"));
    /// assert!(handler.has_errors());
    /// ```
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    /// All diagnostics recorded so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::FileId;

    #[test]
    fn handler_tracks_error_presence() {
        let mut handler = Handler::new();
        assert!(!handler.has_errors());
        handler.emit(Diagnostic::error("boom", Span::new(FileId(0), 0, 1)));
        assert!(handler.has_errors());
    }

    #[test]
    fn render_includes_location_when_file_known() {
        let mut map = SourceMap::new();
        let file = map.add_file("a.lang", "x = 1\n");
        let diag = Diagnostic::error("oops", Span::new(file, 0, 1));
        let rendered = diag.render(&map);
        assert!(rendered.contains("a.lang:1:1"));
    }
}
