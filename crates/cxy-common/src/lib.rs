//! Shared vocabulary for the cxy frontend: source positions, the source
//! manager, the arena and string interner every later stage allocates
//! into, the token kinds the lexer produces, and the diagnostic machinery
//! that every stage reports through.

pub mod arena;
pub mod diagnostics;
pub mod interner;
pub mod session;
pub mod source;
pub mod span;
pub mod token;

pub use arena::{Arena, ArenaVec};
pub use diagnostics::{ConsoleSink, DiagnosticLogger, DiagnosticMessage, DiagnosticSink, InMemorySink, Severity};
pub use interner::{InternedStr, Interner};
pub use session::Session;
pub use source::SourceManager;
pub use span::{FileName, Location, Position};
pub use token::{FloatKind, IntegerKind, Token, TokenKind, Value};
