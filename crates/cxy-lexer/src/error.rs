//! The lexical error taxonomy.
//!
//! Every kind here is reported through [`cxy_common::DiagnosticLogger`] as a
//! plain `error`-severity message; the kind only shapes the message prefix
//! so tests and callers can match on it without parsing free text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    InvalidCharacter,
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape,
    InvalidUnicodeEscape,
    InvalidNumber,
    InvalidInterpolation,
    FileNotFound,
    RecursiveInclude,
    BufferOverflow,
    InvalidUtf8,
}

impl LexErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            LexErrorKind::InvalidCharacter => "InvalidCharacter",
            LexErrorKind::UnterminatedString => "UnterminatedString",
            LexErrorKind::UnterminatedComment => "UnterminatedComment",
            LexErrorKind::InvalidEscape => "InvalidEscape",
            LexErrorKind::InvalidUnicodeEscape => "InvalidUnicodeEscape",
            LexErrorKind::InvalidNumber => "InvalidNumber",
            LexErrorKind::InvalidInterpolation => "InvalidInterpolation",
            LexErrorKind::FileNotFound => "FileNotFound",
            LexErrorKind::RecursiveInclude => "RecursiveInclude",
            LexErrorKind::BufferOverflow => "BufferOverflow",
            LexErrorKind::InvalidUtf8 => "InvalidUtf8",
        }
    }
}

impl std::fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
