//! Source location tracking.
//!
//! The semantic core never computes spans itself — they arrive pre-attached
//! to every AST node by the upstream parser (see spec §1, out of scope) —
//! but every error the core raises must carry one through to the driver.
//!
//! # Examples
//!
//! ```
//! use quill_util::{SourceMap, Span};
//!
//! let mut map = SourceMap::new();
//! let file = map.add_file("a.lang", "let x = 1;\n");
//! let span = Span::new(file, 4, 5);
//! let (line, col) = map.get(file).unwrap().line_col(span.lo);
//! assert_eq!((line, col), (1, 5));
//! ```

use std::sync::Arc;

/// Identifies which source file a [`Span`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FileId(pub u32);

/// A byte-offset range into a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub file: FileId,
    pub lo: u32,
    pub hi: u32,
}

impl Span {
    /// A placeholder span for synthetic nodes that have no source location,
    /// e.g. constructs built directly by tests rather than a parser.
    pub const DUMMY: Span = Span {
        file: FileId(0),
        lo: 0,
        hi: 0,
    };

    /// # Examples
    ///
    /// ```
    /// use quill_util::{FileId, Span};
    ///
    /// let span = Span::new(FileId(0), 3, 5);
    /// assert_eq!((span.lo, span.hi), (3, 5));
    /// ```
    pub fn new(file: FileId, lo: u32, hi: u32) -> Self {
        Self { file, lo, hi }
    }

    /// The smallest span containing both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::{FileId, Span};
    ///
    /// let a = Span::new(FileId(0), 3, 5);
    /// let b = Span::new(FileId(0), 10, 12);
    /// let c = a.to(b);
    /// assert_eq!((c.lo, c.hi), (3, 12));
    /// ```
    pub fn to(self, other: Span) -> Span {
        Span {
            file: self.file,
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }
}

/// A loaded source file, kept around only so the driver can render a
/// line/column and a text snippet for a diagnostic.
#[derive(Clone)]
pub struct SourceFile {
    id: FileId,
    name: Arc<str>,
    content: Arc<str>,
    line_starts: Arc<[u32]>,
}

impl SourceFile {
    /// Index the file's line starts up front so later [`Self::line_col`]
    /// calls are a binary search rather than a rescan.
    pub fn new(id: FileId, name: impl Into<Arc<str>>, content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        let mut line_starts = vec![0u32];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self {
            id,
            name: name.into(),
            content,
            line_starts: line_starts.into(),
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// 1-based (line, column) for a byte offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::{FileId, SourceFile};
    ///
    /// let file = SourceFile::new(FileId(0), "t.lang", "ab\ncd\nef");
    /// assert_eq!(file.line_col(0), (1, 1));
    /// assert_eq!(file.line_col(3), (2, 1));
    /// ```
    pub fn line_col(&self, offset: u32) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let col = offset - self.line_starts[line];
        (line + 1, col as usize + 1)
    }

    pub fn snippet(&self, span: Span) -> &str {
        let lo = (span.lo as usize).min(self.content.len());
        let hi = (span.hi as usize).min(self.content.len()).max(lo);
        &self.content[lo..hi]
    }
}

/// Holds every source file seen in a run, indexed by [`FileId`].
#[derive(Default, Clone)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, returning the [`FileId`] future spans should reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_util::SourceMap;
    ///
    /// let mut map = SourceMap::new();
    /// let id = map.add_file("a.lang", "x = 1\n");
    /// assert_eq!(map.get(id).unwrap().name(), "a.lang");
    /// ```
    pub fn add_file(&mut self, name: impl Into<Arc<str>>, content: impl Into<Arc<str>>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name, content));
        id
    }

    /// Look up a previously added file. `None` if `id` was never added to
    /// this map — e.g. a span travelling from a different run's `SourceMap`.
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_to_covers_both() {
        let a = Span::new(FileId(0), 3, 5);
        let b = Span::new(FileId(0), 10, 12);
        let c = a.to(b);
        assert_eq!((c.lo, c.hi), (3, 12));
    }

    #[test]
    fn line_col_tracks_newlines() {
        let mut map = SourceMap::new();
        let id = map.add_file("t.lang", "ab\ncd\nef");
        let file = map.get(id).unwrap();
        assert_eq!(file.line_col(0), (1, 1));
        assert_eq!(file.line_col(3), (2, 1));
        assert_eq!(file.line_col(6), (3, 1));
    }
}
