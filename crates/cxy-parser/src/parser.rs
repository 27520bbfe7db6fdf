//! The `Parser` itself: the four-token window, the token-matching
//! primitives every other module builds on, and `synchronize()`. The
//! grammar methods live in sibling modules ([`crate::decl`], [`crate::stmt`],
//! [`crate::expr`], [`crate::types`]) as further `impl` blocks on this
//! same struct.

use cxy_ast::{AstArena, Node, NodeKind};
use cxy_common::{FileName, InternedStr, Location, Session, Token, TokenKind};
use cxy_lexer::Lexer;

use crate::error::{ParseError, ParseErrorKind};

/// Synchronization-point keywords: tokens that plausibly start a new
/// declaration or statement, used by [`Parser::synchronize`] to find a
/// safe place to resume after an error.
const SYNC_KEYWORDS: &[TokenKind] = &[
    TokenKind::Func,
    TokenKind::Var,
    TokenKind::Const,
    TokenKind::Type,
    TokenKind::Struct,
    TokenKind::Enum,
];

pub struct Parser<'bump> {
    pub(crate) lexer: Lexer<'bump>,
    pub ast: AstArena<'bump>,
    pub(crate) filename: FileName,
    pub(crate) previous: Option<Token<'bump>>,
    pub(crate) current: Token<'bump>,
    pub(crate) lookahead1: Token<'bump>,
    pub(crate) lookahead2: Token<'bump>,
    pub errors: Vec<ParseError>,
    /// Suppresses struct-literal parsing (`Type { ... }`) while parsing an
    /// `if`/`while`/`for`/`switch` condition, where a bare `{` must instead
    /// start the body/block (same ambiguity Rust resolves the same way).
    no_struct_literal: bool,
}

impl<'bump> Parser<'bump> {
    pub fn new(filename: FileName, content: &'bump str, session: &mut Session<'bump>) -> Self {
        let mut lexer = Lexer::new(filename.clone(), content, session);
        let current = lexer.next_token(session);
        let lookahead1 = lexer.next_token(session);
        let lookahead2 = lexer.next_token(session);
        Self {
            ast: AstArena::new(session.arena),
            lexer,
            filename,
            previous: None,
            current,
            lookahead1,
            lookahead2,
            errors: Vec::new(),
            no_struct_literal: false,
        }
    }

    pub fn struct_literal_allowed(&self) -> bool {
        !self.no_struct_literal
    }

    /// Run `f` with struct-literal parsing suppressed, restoring the prior
    /// setting afterward (condition parsers nest, e.g. a ternary inside an
    /// `if` condition).
    pub fn without_struct_literal<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.no_struct_literal;
        self.no_struct_literal = true;
        let result = f(self);
        self.no_struct_literal = saved;
        result
    }

    // ── Token window ──────────────────────────────────────────────────

    pub fn current(&self) -> Token<'bump> {
        self.current
    }

    pub fn previous(&self) -> Option<Token<'bump>> {
        self.previous
    }

    pub fn lookahead(&self, n: usize) -> Token<'bump> {
        match n {
            0 => self.current,
            1 => self.lookahead1,
            2 => self.lookahead2,
            _ => panic!("lookahead window only holds two tokens beyond current"),
        }
    }

    /// Shift the window one slot and pull a fresh token from the lexer.
    /// Returns the token that was `current` before the shift.
    pub fn advance(&mut self, session: &mut Session<'bump>) -> Token<'bump> {
        let consumed = self.current;
        self.previous = Some(consumed);
        self.current = self.lookahead1;
        self.lookahead1 = self.lookahead2;
        self.lookahead2 = self.lexer.next_token(session);
        consumed
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub fn check_next(&self, kind: TokenKind) -> bool {
        self.lookahead1.kind == kind
    }

    /// `::` is not its own token; a qualified-path root prefix is two
    /// adjacent `Colon` tokens, consumed together here.
    pub fn match_double_colon(&mut self, session: &mut Session<'bump>) -> bool {
        if self.check(TokenKind::Colon) && self.check_next(TokenKind::Colon) {
            self.advance(session);
            self.advance(session);
            true
        } else {
            false
        }
    }

    pub fn at_eof(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    /// Consume `current` iff it matches `kind`.
    pub fn match_tok(&mut self, kind: TokenKind, session: &mut Session<'bump>) -> bool {
        if self.check(kind) {
            self.advance(session);
            true
        } else {
            false
        }
    }

    /// Consume `current` iff it matches `kind`, else record a
    /// `MissingToken` diagnostic and leave the window untouched so the
    /// caller can attempt recovery.
    pub fn expect(&mut self, kind: TokenKind, msg: &str, session: &mut Session<'bump>) -> Option<Token<'bump>> {
        if self.check(kind) {
            Some(self.advance(session))
        } else {
            let loc = self.current.location;
            let actual = self.current.kind;
            self.error_at(ParseErrorKind::MissingToken, loc, msg, actual, session);
            None
        }
    }

    // ── Errors and recovery ───────────────────────────────────────────

    pub fn error_at(
        &mut self,
        kind: ParseErrorKind,
        location: Location,
        message: impl Into<String>,
        actual: TokenKind,
        session: &mut Session<'bump>,
    ) {
        let message = message.into();
        session.diagnostics.error(location, message.clone(), &session.sources);
        self.errors.push(ParseError::new(kind, location, message, actual));
    }

    /// Skip tokens until the next synchronization point: `;` (consumed),
    /// `}` `)` `]` (left for the caller to see), a declaration/statement-
    /// starting keyword, or `EoF`.
    pub fn synchronize(&mut self, session: &mut Session<'bump>) {
        while !self.at_eof() {
            if self.check(TokenKind::Semicolon) {
                self.advance(session);
                return;
            }
            if self.check(TokenKind::RBrace) || self.check(TokenKind::RParen) || self.check(TokenKind::RBracket) {
                return;
            }
            if SYNC_KEYWORDS.contains(&self.current.kind) {
                return;
            }
            self.advance(session);
        }
    }

    // ── Node/interning helpers ────────────────────────────────────────

    pub fn intern(&self, session: &mut Session<'bump>, text: &str) -> InternedStr<'bump> {
        session.interner.intern(text)
    }

    pub fn error_node(&self, location: Location) -> &'bump Node<'bump> {
        self.ast.alloc(NodeKind::Error, location)
    }

    pub fn merge(&self, start: Location, end: Location) -> Location {
        start.merge(&end)
    }
}
