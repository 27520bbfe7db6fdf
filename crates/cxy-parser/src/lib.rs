//! Recursive-descent parser for the cxy compiler frontend.
//!
//! [`Parser`] and the token-window primitives live in [`parser`]; the
//! grammar itself is spread across sibling modules as further `impl`
//! blocks on the same struct:
//!   - [`decl`]  — declarations: variables, functions, types, enums,
//!     structs/classes, generics, imports, the module entry point.
//!   - [`stmt`]  — statements: blocks and all control flow.
//!   - [`expr`]  — the expression precedence ladder and primaries.
//!   - [`types`] — type expressions.

mod decl;
pub mod error;
mod expr;
mod parser;
mod stmt;
mod types;

pub use error::{ParseError, ParseErrorKind};
pub use parser::Parser;

use cxy_ast::Node;
use cxy_common::{FileName, Session};

/// Parse `content` (registered under `filename`) into a module AST.
///
/// This is the frontend's single entry point. It never fails outright --
/// malformed input yields `Error` placeholder nodes and logged
/// diagnostics rather than a `Result::Err`, so parsing never panics and
/// never silently drops a syntax error. Callers that need to know
/// whether parsing was clean should check `session.diagnostics.has_errors()`
/// or inspect the returned parse errors directly.
pub fn parse_module<'bump>(filename: FileName, content: &'bump str, session: &mut Session<'bump>) -> (&'bump Node<'bump>, Vec<ParseError>) {
    let mut parser = Parser::new(filename, content, session);
    let root = parser.parse_module(session);
    (root, parser.errors)
}
