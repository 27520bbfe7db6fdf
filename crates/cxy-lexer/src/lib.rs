//! The tokenizer for cxy source text.
//!
//! [`Lexer`] pulls one [`cxy_common::Token`] at a time from an include-stack
//! of source buffers, decoding literals eagerly and driving the
//! string-interpolation and template-context state machines the parser
//! depends on. See [`lexer`] for the entry point.

mod buffer;
mod cursor;
pub mod error;
mod escapes;
mod lexer;

pub use error::LexErrorKind;
pub use lexer::Lexer;
