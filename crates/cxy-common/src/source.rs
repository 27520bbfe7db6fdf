//! Registry of `(filename, content)` source buffers, with on-demand
//! byte-offset → (row, column) conversion and slice retrieval for
//! diagnostics and raw token text.
//!
//! Keyed by filename so one [`SourceManager`] can serve an entire
//! compilation unit, including included buffers, rather than a single
//! source string.

use std::cell::OnceCell;

use rustc_hash::FxHashMap;

use crate::span::{FileName, Location, Position};

/// One registered source buffer plus its lazily-computed line index.
struct SourceFile {
    content: String,
    /// Byte offset of the start of each line; first entry is always 0.
    /// Computed once, on first access, via a linear scan.
    line_starts: OnceCell<Vec<u32>>,
}

impl SourceFile {
    fn new(content: String) -> Self {
        Self {
            content,
            line_starts: OnceCell::new(),
        }
    }

    fn line_starts(&self) -> &[u32] {
        self.line_starts.get_or_init(|| {
            let mut starts = vec![0u32];
            for (i, byte) in self.content.bytes().enumerate() {
                if byte == b'\n' {
                    starts.push((i + 1) as u32);
                }
            }
            starts
        })
    }
}

/// Holds every registered source buffer for one compile unit and answers
/// line/column and slice queries for diagnostics.
///
/// Content is held by value and never mutated after registration; line
/// offsets are computed lazily and cached per file.
#[derive(Default)]
pub struct SourceManager {
    files: FxHashMap<FileName, SourceFile>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `content` under `filename`, overwriting any previous
    /// registration of the same name. Returns the canonical [`FileName`]
    /// handle to use in subsequent [`Location`]s.
    pub fn register(&mut self, filename: impl Into<FileName>, content: impl Into<String>) -> FileName {
        let filename = filename.into();
        self.files
            .insert(filename.clone(), SourceFile::new(content.into()));
        filename
    }

    pub fn is_registered(&self, filename: &str) -> bool {
        self.files.contains_key(filename)
    }

    pub fn content(&self, filename: &str) -> Option<&str> {
        self.files.get(filename).map(|f| f.content.as_str())
    }

    /// Convert a byte offset within `filename` to a 1-based (row, column).
    ///
    /// # Panics
    /// Panics if `filename` was never registered.
    pub fn line_col(&self, filename: &str, byte_offset: u32) -> (u32, u32) {
        let file = self
            .files
            .get(filename)
            .unwrap_or_else(|| panic!("source manager has no file registered as {filename:?}"));
        let starts = file.line_starts();
        let line_idx = starts.partition_point(|&start| start <= byte_offset);
        let line_idx = line_idx.saturating_sub(1);
        let row = (line_idx as u32) + 1;
        let column = byte_offset - starts[line_idx] + 1;
        (row, column)
    }

    /// Build a [`Location`] from a pair of byte offsets, filling in row/column
    /// via [`Self::line_col`].
    pub fn location(&self, filename: FileName, start_offset: u32, end_offset: u32) -> Location {
        let (sr, sc) = self.line_col(&filename, start_offset);
        let (er, ec) = self.line_col(&filename, end_offset);
        Location::new(
            filename,
            Position::new(sr, sc, start_offset),
            Position::new(er, ec, end_offset),
        )
    }

    /// The raw source text spanned by `location`.
    ///
    /// # Panics
    /// Panics if the file is unregistered or the offsets are not on a UTF-8
    /// boundary (both indicate a caller bug, never malformed input).
    pub fn slice(&self, location: &Location) -> &str {
        let file = self
            .files
            .get(&location.filename)
            .unwrap_or_else(|| panic!("source manager has no file registered as {:?}", location.filename));
        &file.content[location.start.byte_offset as usize..location.end.byte_offset as usize]
    }

    /// The full text of one line (1-based), without the trailing newline.
    pub fn line_text(&self, filename: &str, row: u32) -> Option<&str> {
        let file = self.files.get(filename)?;
        let starts = file.line_starts();
        let idx = (row.checked_sub(1)?) as usize;
        let start = *starts.get(idx)? as usize;
        let end = starts
            .get(idx + 1)
            .map(|&s| s as usize - 1)
            .unwrap_or(file.content.len());
        Some(file.content[start..end].trim_end_matches('\r'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_line_col_single_line() {
        let mut sm = SourceManager::new();
        let f = sm.register("a.cxy", "hello");
        assert_eq!(sm.line_col(&f, 0), (1, 1));
        assert_eq!(sm.line_col(&f, 4), (1, 5));
    }

    #[test]
    fn line_col_multiple_lines() {
        let mut sm = SourceManager::new();
        let f = sm.register("a.cxy", "hello\nworld\nfoo");
        assert_eq!(sm.line_col(&f, 0), (1, 1));
        assert_eq!(sm.line_col(&f, 6), (2, 1));
        assert_eq!(sm.line_col(&f, 13), (3, 2));
    }

    #[test]
    fn slice_extracts_exact_bytes() {
        let mut sm = SourceManager::new();
        let f = sm.register("a.cxy", "let x = 42");
        let loc = sm.location(f, 8, 10);
        assert_eq!(sm.slice(&loc), "42");
    }

    #[test]
    fn line_text_strips_trailing_newline() {
        let mut sm = SourceManager::new();
        let f = sm.register("a.cxy", "first\r\nsecond\nthird");
        assert_eq!(sm.line_text(&f, 1), Some("first"));
        assert_eq!(sm.line_text(&f, 2), Some("second"));
        assert_eq!(sm.line_text(&f, 3), Some("third"));
        assert_eq!(sm.line_text(&f, 4), None);
    }

    #[test]
    fn multiple_files_are_independent() {
        let mut sm = SourceManager::new();
        let a = sm.register("a.cxy", "aaa");
        let b = sm.register("b.cxy", "bb\nbb");
        assert_eq!(sm.content(&a), Some("aaa"));
        assert_eq!(sm.line_col(&b, 3), (2, 1));
    }
}
