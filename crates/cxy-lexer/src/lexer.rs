//! The tokenizer: include-stack driven, pull-based (`next_token` until
//! `Eof`), with an embedded string-interpolation state machine and full
//! numeric/escape handling.
//!
//! A `Cursor`-wrapping struct with one dispatch function per leading byte
//! and small per-operator helpers (`lex_eq`, `lex_lt`, ...). String
//! interpolation (`{expr}` inside a literal) is tracked with an explicit
//! state stack (`InterpContext`) rather than a single flag, since
//! interpolations can nest; the include-buffer stack and template-context
//! counter are separate pieces of state layered on top of the same
//! dispatch loop.

use cxy_common::{FileName, FloatKind, IntegerKind, Location, Position, Session, Token, TokenKind, Value};

use crate::buffer::BufferStack;
use crate::escapes::{self, EscapeResult};

/// One in-flight `"..."` interpolated string: tracks whether we are
/// currently scanning the literal-text portion or the embedded-expression
/// portion, the `{`/`}` nesting depth of the current expression (so a
/// struct literal `{...}` inside the expression doesn't prematurely close
/// the interpolation), how many tokens the current expression has produced
/// (to catch `"{}"` as empty), and the location of the `{` that opened it.
struct InterpContext {
    in_expr: bool,
    brace_depth: u32,
    token_count: u32,
    open_loc: Location,
}

/// One boundary a string-body scan can stop at.
enum StringBoundary {
    /// An unescaped `{`: interpolation begins (or continues) here.
    Brace,
    /// The closing `"`.
    Quote,
    /// Ran off the end of the buffer before finding either.
    Unterminated,
}

/// A saved `(row, column, byte_offset, filename)` snapshot, used to build
/// the [`Location`] of a token once its end position is known.
struct Mark {
    filename: FileName,
    row: u32,
    column: u32,
    byte: u32,
}

/// The lexer. Owns the include-buffer stack and the interpolation/template
/// state machines; every other shared resource (interner, source manager,
/// diagnostics) is borrowed per call via [`Session`].
pub struct Lexer<'bump> {
    buffers: BufferStack<'bump>,
    interp_stack: Vec<InterpContext>,
    template_depth: u32,
}

impl<'bump> Lexer<'bump> {
    /// Start a lexer over the top-level (never-popped) buffer. `content`
    /// must already be allocated with a lifetime outliving the lexer --
    /// callers typically copy source text into the same bump arena the
    /// rest of the compile unit uses (`arena.alloc_str`). Also registers
    /// `content` with `session.sources` so diagnostics can render source
    /// lines for locations in this buffer.
    pub fn new(filename: FileName, content: &'bump str, session: &mut Session<'bump>) -> Self {
        session.sources.register(filename.clone(), content);
        let mut buffers = BufferStack::new();
        buffers.push_root(filename, content);
        Self {
            buffers,
            interp_stack: Vec::new(),
            template_depth: 0,
        }
    }

    /// Push an include buffer. Returns `false` (and refuses the push,
    /// without registering it) if `filename` is already on the stack.
    pub fn push_include(&mut self, filename: FileName, content: &'bump str, session: &mut Session<'bump>) -> bool {
        if !self.buffers.push_include(filename.clone(), content) {
            return false;
        }
        session.sources.register(filename, content);
        true
    }

    pub fn include_depth(&self) -> usize {
        self.buffers.depth()
    }

    /// Enter template (generic-argument) context: a subsequent `>>` lexes
    /// as two `>` tokens instead of `Shr`.
    pub fn enter_template_context(&mut self) {
        self.template_depth += 1;
    }

    pub fn exit_template_context(&mut self) {
        self.template_depth = self.template_depth.saturating_sub(1);
    }

    pub fn in_template_context(&self) -> bool {
        self.template_depth > 0
    }

    /// Produce the next token. Loops internally over whitespace, comments,
    /// and interpolation bookkeeping that don't themselves yield a token.
    pub fn next_token(&mut self, session: &mut Session<'bump>) -> Token<'bump> {
        loop {
            if let Some(ctx) = self.interp_stack.last() {
                if !ctx.in_expr {
                    return self.lex_string_fragment(session);
                }
            }
            self.skip_whitespace_and_pop();
            if self.is_exhausted() {
                return Token::new(TokenKind::Eof, self.loc(&self.mark()));
            }
            let c = self.peek_char().expect("checked not exhausted");

            if let Some(ctx) = self.interp_stack.last() {
                let (in_expr, brace_depth, token_count, open_loc) =
                    (ctx.in_expr, ctx.brace_depth, ctx.token_count, ctx.open_loc.clone());
                if in_expr && c == '}' {
                    if brace_depth == 0 {
                        if token_count == 0 {
                            self.report(session, crate::error::LexErrorKind::InvalidInterpolation, open_loc, "empty interpolation");
                        }
                        self.advance_char();
                        self.interp_stack.last_mut().unwrap().in_expr = false;
                        continue;
                    } else {
                        self.interp_stack.last_mut().unwrap().brace_depth -= 1;
                        let start = self.mark();
                        self.advance_char();
                        let token = self.tok(TokenKind::RBrace, &start);
                        return self.count_expr_token(token);
                    }
                }
                if in_expr && c == '{' {
                    self.interp_stack.last_mut().unwrap().brace_depth += 1;
                    let start = self.mark();
                    self.advance_char();
                    let token = self.tok(TokenKind::LBrace, &start);
                    return self.count_expr_token(token);
                }
            }

            if c == '/' && self.peek_next_char() == Some('/') {
                self.skip_line_comment();
                continue;
            }
            if c == '/' && self.peek_next_char() == Some('*') {
                self.skip_block_comment(session);
                continue;
            }

            let token = self.lex_normal_token(session, c);
            return self.count_expr_token(token);
        }
    }

    /// Called by the parser immediately after consuming a `` ` `` token to
    /// lex an operator name for an operator-overload declaration
    /// (`` `+` ``, `` `[]` ``, `` `()` ``, ...). Never invoked from ordinary
    /// dispatch; see the [`TokenKind::CallOp`]/[`TokenKind::IndexOp`]/
    /// [`TokenKind::IndexAssignOp`] doc comments.
    pub fn lex_operator_name(&mut self, session: &mut Session<'bump>) -> Token<'bump> {
        self.skip_whitespace_and_pop();
        let start = self.mark();
        match self.peek_char() {
            Some('(') => {
                self.advance_char();
                if self.peek_char() == Some(')') {
                    self.advance_char();
                    self.tok(TokenKind::CallOp, &start)
                } else {
                    self.tok(TokenKind::LParen, &start)
                }
            }
            Some('[') => {
                self.advance_char();
                if self.peek_char() == Some(']') {
                    self.advance_char();
                    if self.peek_char() == Some('=') {
                        self.advance_char();
                        self.tok(TokenKind::IndexAssignOp, &start)
                    } else {
                        self.tok(TokenKind::IndexOp, &start)
                    }
                } else {
                    self.tok(TokenKind::LBracket, &start)
                }
            }
            Some(c) => self.lex_normal_token(session, c),
            None => self.tok(TokenKind::Eof, &start),
        }
    }

    // ── Interpolation bookkeeping ───────────────────────────────────────

    /// If the token we are about to return belongs to an in-flight
    /// interpolation expression, count it (so `"{}"` can be detected as
    /// empty). Must be called with the *pre-dispatch* top-of-stack state in
    /// mind; since pushes only add above and this only ever touches the
    /// entry that was on top *before* dispatch ran, indexing by position is
    /// safe even if dispatch pushed a fresh (nested-string) context.
    fn count_expr_token(&mut self, token: Token<'bump>) -> Token<'bump> {
        if let Some(ctx) = self
            .interp_stack
            .iter_mut()
            .rev()
            .find(|c| c.in_expr)
        {
            ctx.token_count += 1;
        }
        token
    }

    // ── Buffer / position plumbing ───────────────────────────────────────

    fn top(&self) -> &crate::buffer::Buffer<'bump> {
        self.buffers.top()
    }

    fn peek_char(&self) -> Option<char> {
        self.top().cursor.peek()
    }

    fn peek_next_char(&self) -> Option<char> {
        self.top().cursor.peek_next()
    }

    fn advance_char(&mut self) -> Option<char> {
        let buf = self.buffers.top_mut();
        let c = buf.cursor.advance()?;
        if c == '\n' {
            buf.row += 1;
            buf.column = 1;
        } else {
            buf.column += 1;
        }
        Some(c)
    }

    fn current_byte_offset(&self) -> u32 {
        self.top().cursor.pos()
    }

    fn current_filename(&self) -> FileName {
        self.top().filename.clone()
    }

    fn buffer_slice(&self, start: u32, end: u32) -> &'bump str {
        self.top().cursor.slice(start, end)
    }

    fn mark(&self) -> Mark {
        Mark {
            filename: self.current_filename(),
            row: self.top().row,
            column: self.top().column,
            byte: self.current_byte_offset(),
        }
    }

    fn loc(&self, start: &Mark) -> Location {
        Location::new(
            start.filename.clone(),
            Position::new(start.row, start.column, start.byte),
            Position::new(self.top().row, self.top().column, self.current_byte_offset()),
        )
    }

    fn tok(&self, kind: TokenKind, start: &Mark) -> Token<'bump> {
        Token::new(kind, self.loc(start))
    }

    fn report(&mut self, session: &mut Session<'bump>, kind: crate::error::LexErrorKind, loc: Location, detail: impl std::fmt::Display) {
        let message = format!("{kind}: {detail}");
        session.diagnostics.error(loc, message, &session.sources);
    }

    /// Skip ASCII whitespace, then pop any exhausted include buffers.
    /// Does not touch `\n`/`\r` significance beyond tracking row/column --
    /// this language has no significant newlines.
    fn skip_whitespace_and_pop(&mut self) {
        loop {
            while matches!(self.peek_char(), Some(' ') | Some('\t') | Some('\n') | Some('\r')) {
                self.advance_char();
            }
            if self.top().cursor.is_eof() && self.buffers.depth() > 1 {
                self.buffers.pop();
                continue;
            }
            break;
        }
    }

    fn is_exhausted(&self) -> bool {
        self.top().cursor.is_eof() && self.buffers.depth() == 1
    }

    fn skip_line_comment(&mut self) {
        self.advance_char(); // first '/'
        self.advance_char(); // second '/'
        self.top_mut_cursor_eat_while(|c| c != '\n');
    }

    fn skip_block_comment(&mut self, session: &mut Session<'bump>) {
        let start = self.mark();
        self.advance_char(); // '/'
        self.advance_char(); // '*'
        let mut depth: u32 = 1;
        loop {
            match self.peek_char() {
                None => {
                    self.report(session, crate::error::LexErrorKind::UnterminatedComment, self.loc(&start), "unterminated block comment");
                    return;
                }
                Some('/') if self.peek_next_char() == Some('*') => {
                    self.advance_char();
                    self.advance_char();
                    depth += 1;
                }
                Some('*') if self.peek_next_char() == Some('/') => {
                    self.advance_char();
                    self.advance_char();
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                Some(_) => {
                    self.advance_char();
                }
            }
        }
    }

    fn top_mut_cursor_eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if predicate(c) {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    // ── Escape decoding, buffer-tracked ──────────────────────────────────

    /// Decode one escape sequence (leading `\` already consumed), updating
    /// row/column for the bytes consumed. Escape sequences never contain a
    /// literal newline byte, so only the column needs adjusting.
    fn decode_escape_tracked(&mut self, in_string: bool) -> EscapeResult {
        let buf = self.buffers.top_mut();
        let before = buf.cursor.pos();
        let result = escapes::decode_escape(&mut buf.cursor, in_string);
        let after = buf.cursor.pos();
        buf.column += after - before;
        result
    }

    // ── Main dispatch ────────────────────────────────────────────────────

    fn lex_normal_token(&mut self, session: &mut Session<'bump>, c: char) -> Token<'bump> {
        let start = self.mark();
        match c {
            '(' => self.single(TokenKind::LParen, &start),
            ')' => self.single(TokenKind::RParen, &start),
            '[' => self.single(TokenKind::LBracket, &start),
            ']' => self.single(TokenKind::RBracket, &start),
            '{' => self.single(TokenKind::LBrace, &start),
            '}' => self.single(TokenKind::RBrace, &start),
            '@' => self.single(TokenKind::At, &start),
            '~' => self.single(TokenKind::Tilde, &start),
            ',' => self.single(TokenKind::Comma, &start),
            ';' => self.single(TokenKind::Semicolon, &start),
            '?' => self.single(TokenKind::Question, &start),
            '`' => self.single(TokenKind::Backtick, &start),
            ':' => self.single(TokenKind::Colon, &start),
            '#' => self.lex_hash(&start),
            '!' => self.lex_bang(&start),
            '.' => self.lex_dot(&start),
            '=' => self.lex_eq(&start),
            '<' => self.lex_lt(&start),
            '>' => self.lex_gt(&start),
            '+' => self.lex_two(&start, '+', TokenKind::Plus, TokenKind::PlusPlus, Some(('=', TokenKind::PlusAssign))),
            '-' => self.lex_minus(&start),
            '*' => self.lex_assignable(&start, TokenKind::Star, TokenKind::StarAssign),
            '/' => self.lex_assignable(&start, TokenKind::Slash, TokenKind::SlashAssign),
            '%' => self.lex_assignable(&start, TokenKind::Percent, TokenKind::PercentAssign),
            '&' => self.lex_amp(&start),
            '^' => self.lex_assignable(&start, TokenKind::Caret, TokenKind::CaretAssign),
            '|' => self.lex_pipe(&start),
            '0'..='9' => self.lex_number(session, &start, c),
            '"' => self.lex_string_open(session, &start),
            _ if c == 'r' && self.peek_next_char() == Some('"') => self.lex_raw_string(session, &start),
            '\'' => self.lex_char(session, &start),
            _ if is_ident_start(c) => self.lex_ident_or_keyword(session, &start),
            _ => {
                self.advance_char();
                let loc = self.loc(&start);
                self.report(session, crate::error::LexErrorKind::InvalidCharacter, loc.clone(), format!("unexpected character '{c}'"));
                Token::new(TokenKind::Error, loc)
            }
        }
    }

    fn single(&mut self, kind: TokenKind, start: &Mark) -> Token<'bump> {
        self.advance_char();
        self.tok(kind, start)
    }

    /// `c` alone -> `one`; `c c` -> `two`; optionally `c =` -> the paired
    /// assign kind.
    fn lex_two(
        &mut self,
        start: &Mark,
        double: char,
        one: TokenKind,
        two: TokenKind,
        assign: Option<(char, TokenKind)>,
    ) -> Token<'bump> {
        self.advance_char();
        if self.peek_char() == Some(double) {
            self.advance_char();
            return self.tok(two, start);
        }
        if let Some((eq, assign_kind)) = assign {
            if self.peek_char() == Some(eq) {
                self.advance_char();
                return self.tok(assign_kind, start);
            }
        }
        self.tok(one, start)
    }

    fn lex_assignable(&mut self, start: &Mark, plain: TokenKind, assign: TokenKind) -> Token<'bump> {
        self.advance_char();
        if self.peek_char() == Some('=') {
            self.advance_char();
            return self.tok(assign, start);
        }
        self.tok(plain, start)
    }

    fn lex_hash(&mut self, start: &Mark) -> Token<'bump> {
        self.advance_char(); // '#'
        match self.peek_char() {
            Some('.') => {
                self.advance_char();
                self.tok(TokenKind::HashDot, start)
            }
            Some('#') => {
                self.advance_char();
                self.tok(TokenKind::HashHash, start)
            }
            _ => self.tok(TokenKind::Hash, start),
        }
    }

    fn lex_bang(&mut self, start: &Mark) -> Token<'bump> {
        self.advance_char(); // '!'
        match self.peek_char() {
            Some('=') => {
                self.advance_char();
                self.tok(TokenKind::Ne, start)
            }
            Some(':') => {
                self.advance_char();
                self.tok(TokenKind::BangColon, start)
            }
            _ => self.tok(TokenKind::Bang, start),
        }
    }

    fn lex_dot(&mut self, start: &Mark) -> Token<'bump> {
        self.advance_char(); // first '.'
        if self.peek_char() != Some('.') {
            return self.tok(TokenKind::Dot, start);
        }
        self.advance_char(); // second '.'
        if self.peek_char() == Some('.') {
            self.advance_char();
            return self.tok(TokenKind::DotDotDot, start);
        }
        self.tok(TokenKind::DotDot, start)
    }

    fn lex_eq(&mut self, start: &Mark) -> Token<'bump> {
        self.advance_char();
        match self.peek_char() {
            Some('=') => {
                self.advance_char();
                self.tok(TokenKind::Eq, start)
            }
            Some('>') => {
                self.advance_char();
                self.tok(TokenKind::FatArrow, start)
            }
            _ => self.tok(TokenKind::Assign, start),
        }
    }

    fn lex_lt(&mut self, start: &Mark) -> Token<'bump> {
        self.advance_char();
        match self.peek_char() {
            Some('=') => {
                self.advance_char();
                self.tok(TokenKind::Le, start)
            }
            Some('<') => {
                self.advance_char();
                if self.peek_char() == Some('=') {
                    self.advance_char();
                    self.tok(TokenKind::ShlAssign, start)
                } else {
                    self.tok(TokenKind::Shl, start)
                }
            }
            _ => self.tok(TokenKind::Lt, start),
        }
    }

    /// `>` is special-cased for template context: while the parser has
    /// called [`Self::enter_template_context`], `>>` must lex as two
    /// separate `>` tokens, so we never look past the first `>` there.
    fn lex_gt(&mut self, start: &Mark) -> Token<'bump> {
        self.advance_char();
        if self.in_template_context() {
            return self.tok(TokenKind::Gt, start);
        }
        match self.peek_char() {
            Some('=') => {
                self.advance_char();
                self.tok(TokenKind::Ge, start)
            }
            Some('>') => {
                self.advance_char();
                if self.peek_char() == Some('=') {
                    self.advance_char();
                    self.tok(TokenKind::ShrAssign, start)
                } else {
                    self.tok(TokenKind::Shr, start)
                }
            }
            _ => self.tok(TokenKind::Gt, start),
        }
    }

    fn lex_minus(&mut self, start: &Mark) -> Token<'bump> {
        self.advance_char();
        match self.peek_char() {
            Some('-') => {
                self.advance_char();
                self.tok(TokenKind::MinusMinus, start)
            }
            Some('=') => {
                self.advance_char();
                self.tok(TokenKind::MinusAssign, start)
            }
            Some('>') => {
                self.advance_char();
                self.tok(TokenKind::Arrow, start)
            }
            _ => self.tok(TokenKind::Minus, start),
        }
    }

    fn lex_amp(&mut self, start: &Mark) -> Token<'bump> {
        self.advance_char();
        match self.peek_char() {
            Some('&') => {
                self.advance_char();
                self.tok(TokenKind::AmpAmp, start)
            }
            Some('=') => {
                self.advance_char();
                self.tok(TokenKind::AmpAssign, start)
            }
            Some('.') => {
                self.advance_char();
                self.tok(TokenKind::AmpDot, start)
            }
            _ => self.tok(TokenKind::Amp, start),
        }
    }

    fn lex_pipe(&mut self, start: &Mark) -> Token<'bump> {
        self.advance_char();
        match self.peek_char() {
            Some('|') => {
                self.advance_char();
                self.tok(TokenKind::PipePipe, start)
            }
            Some('=') => {
                self.advance_char();
                self.tok(TokenKind::PipeAssign, start)
            }
            _ => self.tok(TokenKind::Pipe, start),
        }
    }

    // ── Identifiers / keywords ───────────────────────────────────────────

    fn lex_ident_or_keyword(&mut self, session: &mut Session<'bump>, start: &Mark) -> Token<'bump> {
        self.advance_char();
        while let Some(c) = self.peek_char() {
            if is_ident_continue(c) {
                self.advance_char();
            } else {
                break;
            }
        }
        let text = self.buffer_slice(start.byte, self.current_byte_offset());
        let loc = self.loc(start);
        match TokenKind::lookup_keyword(text) {
            Some(TokenKind::True) => Token::with_value(TokenKind::True, loc, Value::Bool(true)),
            Some(TokenKind::False) => Token::with_value(TokenKind::False, loc, Value::Bool(false)),
            Some(kind) => Token::new(kind, loc),
            None => {
                let interned = session.interner.intern(text);
                Token::with_value(TokenKind::Ident, loc, Value::Str(interned))
            }
        }
    }

    // ── Character literals ───────────────────────────────────────────────

    fn lex_char(&mut self, session: &mut Session<'bump>, start: &Mark) -> Token<'bump> {
        self.advance_char(); // opening '
        let scalar = match self.peek_char() {
            None | Some('\n') => {
                let loc = self.loc(start);
                self.report(session, crate::error::LexErrorKind::UnterminatedString, loc.clone(), "unterminated character literal");
                return Token::new(TokenKind::Error, loc);
            }
            Some('\\') => {
                self.advance_char();
                match self.decode_escape_tracked(false) {
                    EscapeResult::Scalar(c) => c,
                    EscapeResult::InvalidCodePoint => {
                        let loc = self.loc(start);
                        self.report(session, crate::error::LexErrorKind::InvalidUtf8, loc, "escape decodes to a surrogate half or a code point past U+10FFFF");
                        '\u{FFFD}'
                    }
                    EscapeResult::Invalid(msg) => {
                        let loc = self.loc(start);
                        let kind = if msg.contains("unicode") {
                            crate::error::LexErrorKind::InvalidUnicodeEscape
                        } else {
                            crate::error::LexErrorKind::InvalidEscape
                        };
                        self.report(session, kind, loc.clone(), msg);
                        if self.peek_char() == Some('\'') {
                            self.advance_char();
                        }
                        return Token::new(TokenKind::Error, self.loc(start));
                    }
                }
            }
            Some(c) => {
                self.advance_char();
                c
            }
        };
        if self.peek_char() == Some('\'') {
            self.advance_char();
            Token::with_value(TokenKind::CharLiteral, self.loc(start), Value::Char(scalar))
        } else {
            let loc = self.loc(start);
            self.report(session, crate::error::LexErrorKind::UnterminatedString, loc.clone(), "unterminated character literal");
            Token::new(TokenKind::Error, loc)
        }
    }

    // ── String literals (plain, interpolated, raw) ───────────────────────

    fn lex_raw_string(&mut self, session: &mut Session<'bump>, start: &Mark) -> Token<'bump> {
        self.advance_char(); // 'r'
        self.advance_char(); // opening '"'
        let content_start = self.current_byte_offset();
        loop {
            match self.peek_char() {
                None => {
                    let loc = self.loc(start);
                    self.report(session, crate::error::LexErrorKind::UnterminatedString, loc.clone(), "unterminated raw string");
                    return Token::new(TokenKind::Error, loc);
                }
                Some('"') => {
                    let content_end = self.current_byte_offset();
                    let text = self.buffer_slice(content_start, content_end);
                    self.advance_char(); // closing '"'
                    let interned = session.interner.intern(text);
                    return Token::with_value(TokenKind::StringLiteral, self.loc(start), Value::Str(interned));
                }
                Some(_) => {
                    self.advance_char();
                }
            }
        }
    }

    /// Entry point for a fresh `"`: either the whole literal (no brace
    /// found) or the opening `LString` fragment of an interpolated string.
    fn lex_string_open(&mut self, session: &mut Session<'bump>, start: &Mark) -> Token<'bump> {
        self.advance_char(); // opening '"'
        let (text, boundary) = self.consume_string_segment(session);
        let loc = self.loc(start);
        match boundary {
            StringBoundary::Unterminated => {
                self.report(session, crate::error::LexErrorKind::UnterminatedString, loc.clone(), "unterminated string literal");
                Token::new(TokenKind::Error, loc)
            }
            StringBoundary::Quote => {
                self.advance_char(); // closing '"'
                let interned = session.interner.intern(&text);
                Token::with_value(TokenKind::StringLiteral, self.loc(start), Value::Str(interned))
            }
            StringBoundary::Brace => {
                let brace_loc = Location::at(self.current_filename(), Position::new(self.top().row, self.top().column, self.current_byte_offset()));
                self.advance_char(); // the '{'
                self.interp_stack.push(InterpContext {
                    in_expr: true,
                    brace_depth: 0,
                    token_count: 0,
                    open_loc: brace_loc,
                });
                let interned = session.interner.intern(&text);
                Token::with_value(TokenKind::LString, self.loc(start), Value::Str(interned))
            }
        }
    }

    /// Continuation of an already-open interpolated string, called when
    /// the top interpolation context is in "scanning literal text" mode
    /// (i.e. we are between a `}` and either the next `{` or the closing
    /// `"`).
    fn lex_string_fragment(&mut self, session: &mut Session<'bump>) -> Token<'bump> {
        let start = self.mark();
        let (text, boundary) = self.consume_string_segment(session);
        let loc = self.loc(&start);
        match boundary {
            StringBoundary::Unterminated => {
                self.interp_stack.pop();
                self.report(session, crate::error::LexErrorKind::UnterminatedString, loc.clone(), "unterminated interpolated string");
                Token::new(TokenKind::Error, loc)
            }
            StringBoundary::Quote => {
                self.advance_char(); // closing '"'
                self.interp_stack.pop();
                let interned = session.interner.intern(&text);
                let token = Token::with_value(TokenKind::RString, self.loc(&start), Value::Str(interned));
                self.count_expr_token(token)
            }
            StringBoundary::Brace => {
                let brace_loc = Location::at(self.current_filename(), Position::new(self.top().row, self.top().column, self.current_byte_offset()));
                self.advance_char(); // the '{'
                let ctx = self.interp_stack.last_mut().expect("fragment scan requires an open interpolation context");
                ctx.in_expr = true;
                ctx.brace_depth = 0;
                ctx.token_count = 0;
                ctx.open_loc = brace_loc;
                let interned = session.interner.intern(&text);
                Token::with_value(TokenKind::StringLiteral, self.loc(&start), Value::Str(interned))
            }
        }
    }

    /// Scan and decode string body text up to (not including) an unescaped
    /// `{`, the closing `"`, or end of input. Shared by a fresh `"..."` and
    /// by post-`}` fragment continuation.
    fn consume_string_segment(&mut self, session: &mut Session<'bump>) -> (String, StringBoundary) {
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => return (text, StringBoundary::Unterminated),
                Some('"') => return (text, StringBoundary::Quote),
                Some('{') => return (text, StringBoundary::Brace),
                Some('\\') => {
                    let escape_loc_start = self.mark();
                    self.advance_char(); // backslash
                    let char_start = self.current_byte_offset();
                    match self.decode_escape_tracked(true) {
                        EscapeResult::Scalar(c) => text.push(c),
                        EscapeResult::InvalidCodePoint => {
                            let loc = self.loc(&escape_loc_start);
                            self.report(session, crate::error::LexErrorKind::InvalidUtf8, loc, "escape decodes to a surrogate half or a code point past U+10FFFF");
                            text.push('\u{FFFD}');
                        }
                        EscapeResult::Invalid(msg) => {
                            if msg == "unrecognized escape sequence" {
                                let raw = self.buffer_slice(char_start, self.current_byte_offset());
                                text.push('\\');
                                text.push_str(raw);
                            } else {
                                let kind = if msg.contains("unicode") {
                                    crate::error::LexErrorKind::InvalidUnicodeEscape
                                } else {
                                    crate::error::LexErrorKind::InvalidEscape
                                };
                                let loc = self.loc(&escape_loc_start);
                                self.report(session, kind, loc, msg);
                                text.push('\u{FFFD}');
                            }
                        }
                    }
                }
                Some(c) => {
                    self.advance_char();
                    text.push(c);
                }
            }
        }
    }

    // ── Numeric literals ─────────────────────────────────────────────────

    fn lex_number(&mut self, session: &mut Session<'bump>, start: &Mark, first: char) -> Token<'bump> {
        self.advance_char(); // consume `first`
        if first == '0' {
            match self.peek_char() {
                Some('x') | Some('X') => {
                    self.advance_char();
                    return self.lex_hex_number(session, start);
                }
                Some('b') | Some('B') => {
                    self.advance_char();
                    return self.lex_prefixed_int(session, start, 2, |c| c == '0' || c == '1');
                }
                Some('o') | Some('O') => {
                    self.advance_char();
                    return self.lex_prefixed_int(session, start, 8, |c| ('0'..='7').contains(&c));
                }
                _ => {}
            }
        }
        self.eat_digit_run();

        let mut is_float = false;
        if self.peek_char() == Some('.') && self.peek_next_char() != Some('.') {
            self.advance_char();
            is_float = true;
            self.eat_digit_run();
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            self.advance_char();
            is_float = true;
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.advance_char();
            }
            if self.peek_char().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                self.eat_digit_run();
            } else {
                let loc = self.loc(start);
                self.report(session, crate::error::LexErrorKind::InvalidNumber, loc, "no digits in exponent");
            }
        }

        let digits_end = self.current_byte_offset();
        let suffix_start = digits_end;
        self.eat_alnum_run();
        let suffix_end = self.current_byte_offset();
        let suffix = self.buffer_slice(suffix_start, suffix_end);
        let raw = self.buffer_slice(start.byte, digits_end);
        let loc = self.loc(start);

        // A bare decimal with no '.'/exponent still switches to float
        // parsing when the suffix is one of the float suffixes on their own
        // (`3f`, `10d`), as opposed to an integer suffix like `3u`.
        let is_float = is_float || matches!(suffix, "f" | "F" | "d" | "D");

        if is_float {
            let clean: String = raw.chars().filter(|c| *c != '_').collect();
            let value: f64 = clean.parse().unwrap_or(0.0);
            let kind = self.classify_float_suffix(session, suffix, &loc);
            Token::with_value(TokenKind::FloatLiteral, loc, Value::Float(value, kind))
        } else {
            let body = &raw[1..]; // everything after the leading '0'/digit already accounted
            let is_legacy_octal = first == '0' && !body.is_empty() && body.chars().all(|c| c == '_' || ('0'..='7').contains(&c));
            let value = if is_legacy_octal {
                self.parse_int_clamped(session, raw, 8, &loc)
            } else {
                self.parse_int_clamped(session, raw, 10, &loc)
            };
            let kind = self.classify_int_suffix(session, suffix, &loc);
            Token::with_value(TokenKind::IntLiteral, loc, Value::Integer(value, kind))
        }
    }

    fn lex_prefixed_int(
        &mut self,
        session: &mut Session<'bump>,
        start: &Mark,
        base: u32,
        is_digit: impl Fn(char) -> bool,
    ) -> Token<'bump> {
        let digits_start = self.current_byte_offset();
        while let Some(c) = self.peek_char() {
            if is_digit(c) || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }
        let digits_end = self.current_byte_offset();
        let digits = self.buffer_slice(digits_start, digits_end);
        let suffix_start = digits_end;
        self.eat_alnum_run();
        let suffix_end = self.current_byte_offset();
        let suffix = self.buffer_slice(suffix_start, suffix_end);
        let loc = self.loc(start);
        if digits.is_empty() || digits.chars().all(|c| c == '_') {
            self.report(session, crate::error::LexErrorKind::InvalidNumber, loc.clone(), "missing digits after numeric prefix");
        }
        let value = self.parse_int_clamped(session, digits, base, &loc);
        let kind = self.classify_int_suffix(session, suffix, &loc);
        Token::with_value(TokenKind::IntLiteral, loc, Value::Integer(value, kind))
    }

    /// `0x`/`0X` numbers: an integer when there is no `.` or `p`/`P`
    /// exponent, otherwise a hex float (`p`/`P` exponent, base 2, since hex
    /// digits would make `e`/`E` ambiguous with the hex digit `e`).
    fn lex_hex_number(&mut self, session: &mut Session<'bump>, start: &Mark) -> Token<'bump> {
        let digits_start = self.current_byte_offset();
        self.eat_hex_digit_run();
        let mut is_float = false;
        if self.peek_char() == Some('.') && self.peek_next_char() != Some('.') {
            self.advance_char();
            is_float = true;
            self.eat_hex_digit_run();
        }
        if matches!(self.peek_char(), Some('p') | Some('P')) {
            self.advance_char();
            is_float = true;
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.advance_char();
            }
            if self.peek_char().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                self.eat_digit_run();
            } else {
                let loc = self.loc(start);
                self.report(session, crate::error::LexErrorKind::InvalidNumber, loc, "no digits in exponent");
            }
        }
        let digits_end = self.current_byte_offset();
        let suffix_start = digits_end;
        self.eat_alnum_run();
        let suffix_end = self.current_byte_offset();
        let suffix = self.buffer_slice(suffix_start, suffix_end);
        let raw = self.buffer_slice(digits_start, digits_end);
        let loc = self.loc(start);
        if is_float {
            let value = parse_hex_float(raw).unwrap_or(0.0);
            let kind = self.classify_float_suffix(session, suffix, &loc);
            Token::with_value(TokenKind::FloatLiteral, loc, Value::Float(value, kind))
        } else {
            if raw.is_empty() || raw.chars().all(|c| c == '_') {
                self.report(session, crate::error::LexErrorKind::InvalidNumber, loc.clone(), "missing digits after numeric prefix");
            }
            let value = self.parse_int_clamped(session, raw, 16, &loc);
            let kind = self.classify_int_suffix(session, suffix, &loc);
            Token::with_value(TokenKind::IntLiteral, loc, Value::Integer(value, kind))
        }
    }

    fn eat_hex_digit_run(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_hexdigit() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn eat_digit_run(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn eat_alnum_run(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn parse_int_clamped(&mut self, session: &mut Session<'bump>, digits: &str, base: u32, loc: &Location) -> u128 {
        let mut value: u128 = 0;
        let mut overflowed = false;
        for ch in digits.chars() {
            if ch == '_' {
                continue;
            }
            let Some(d) = ch.to_digit(base) else { continue };
            match value.checked_mul(base as u128).and_then(|v| v.checked_add(d as u128)) {
                Some(v) => value = v,
                None => {
                    overflowed = true;
                    value = u128::MAX;
                }
            }
        }
        if overflowed {
            self.report(session, crate::error::LexErrorKind::InvalidNumber, loc.clone(), "integer literal overflow");
        }
        value
    }

    fn classify_int_suffix(&mut self, session: &mut Session<'bump>, suffix: &str, loc: &Location) -> IntegerKind {
        if suffix.is_empty() {
            return IntegerKind::Unsuffixed;
        }
        if let Some(kind) = native_int_suffix(suffix) {
            return kind;
        }
        if let Some(kind) = legacy_int_suffix(suffix) {
            return kind;
        }
        self.report(session, crate::error::LexErrorKind::InvalidNumber, loc.clone(), format!("invalid type suffix '{suffix}'"));
        IntegerKind::Unsuffixed
    }

    fn classify_float_suffix(&mut self, session: &mut Session<'bump>, suffix: &str, loc: &Location) -> FloatKind {
        match suffix {
            "" => FloatKind::Unsuffixed,
            "f" | "F" => FloatKind::F32,
            "d" | "D" => FloatKind::F64,
            _ => {
                self.report(session, crate::error::LexErrorKind::InvalidNumber, loc.clone(), format!("invalid type suffix '{suffix}'"));
                FloatKind::Unsuffixed
            }
        }
    }
}

fn native_int_suffix(s: &str) -> Option<IntegerKind> {
    use IntegerKind::*;
    Some(match s {
        "i8" => I8,
        "i16" => I16,
        "i32" => I32,
        "i64" => I64,
        "i128" => I128,
        "u8" => U8,
        "u16" => U16,
        "u32" => U32,
        "u64" => U64,
        "u128" => U128,
        _ => return None,
    })
}

fn legacy_int_suffix(s: &str) -> Option<IntegerKind> {
    use IntegerKind::*;
    let lower = s.to_ascii_lowercase();
    Some(match lower.as_str() {
        "u" => U32,
        "l" => I64,
        "ul" | "lu" => U64,
        "ll" => I64,
        "ull" | "llu" => U64,
        _ => return None,
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `hexDigits ('.' hexDigits)? ('p'|'P' ('+'|'-')? decDigits)?`, already
/// stripped of the `0x` prefix and any `_` separators are tolerated by
/// skipping them. Returns `None` only on a malformed exponent, which
/// [`Lexer::lex_hex_number`] has already reported as `InvalidNumber`
/// before falling back to `0.0`.
fn parse_hex_float(raw: &str) -> Option<f64> {
    let clean: String = raw.chars().filter(|c| *c != '_').collect();
    let (mantissa_part, exponent_part) = match clean.find(['p', 'P']) {
        Some(idx) => (&clean[..idx], Some(&clean[idx + 1..])),
        None => (clean.as_str(), None),
    };
    let (int_part, frac_part) = match mantissa_part.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa_part, ""),
    };
    let mut mantissa = 0f64;
    for c in int_part.chars() {
        mantissa = mantissa * 16.0 + c.to_digit(16)? as f64;
    }
    let mut scale = 1f64 / 16.0;
    for c in frac_part.chars() {
        mantissa += c.to_digit(16)? as f64 * scale;
        scale /= 16.0;
    }
    let exponent: i32 = match exponent_part {
        Some(e) if !e.is_empty() => e.parse().ok()?,
        _ => 0,
    };
    Some(mantissa * 2f64.powi(exponent))
}
