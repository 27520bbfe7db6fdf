//! Statement grammar: blocks, the control-flow statements, and the
//! permissive-semicolon expression statement. `if`/
//! `while`/`for`/`switch`/`match` share the parenthesized-vs-bare condition
//! disambiguation that also drives whether the body may be a single
//! statement or must be a block.

use cxy_ast::{flags, Literal, MatchArm, Node, NodeKind, SwitchCase};
use cxy_common::{Session, TokenKind};

use crate::error::ParseErrorKind;
use crate::parser::Parser;

impl<'bump> Parser<'bump> {
    /// `statement := block | break | continue | defer | return | yield
    ///             | if | for | while | switch | match
    ///             | varDecl | exprStmt`
    pub fn parse_statement(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        match self.current().kind {
            TokenKind::LBrace => self.parse_block(session),
            TokenKind::Break => self.parse_break_stmt(session),
            TokenKind::Continue => self.parse_continue_stmt(session),
            TokenKind::Defer => self.parse_defer_stmt(session),
            TokenKind::Return => self.parse_return_stmt(session),
            TokenKind::Yield => self.parse_yield_stmt(session),
            TokenKind::If => self.parse_if_stmt(session),
            TokenKind::For => self.parse_for_stmt(session),
            TokenKind::While => self.parse_while_stmt(session),
            TokenKind::Switch => self.parse_switch_stmt(session),
            TokenKind::Match => self.parse_match_stmt(session),
            TokenKind::Var | TokenKind::Const | TokenKind::Auto => {
                let start = self.current().location;
                self.parse_variable_declaration(session, start, false, self.ast.vec())
            }
            _ => self.parse_expr_stmt(session),
        }
    }

    /// `'{' statement* '}'`, statements separated by an optional `;`
    /// (handled by each statement's own trailing `match_tok(Semicolon)`).
    pub fn parse_block(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let open = self.expect(TokenKind::LBrace, "expected '{' to start a block", session)?;
        let mut stmts = self.ast.vec();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            match self.parse_statement(session) {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(session),
            }
        }
        let close = self.expect(TokenKind::RBrace, "expected '}' to close block", session)?;
        Some(self.ast.alloc(NodeKind::Block(stmts), self.merge(open.location, close.location)))
    }

    fn parse_expr_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let expr = self.parse_expression(session)?;
        self.consume_optional_semicolon(session);
        Some(self.ast.alloc(NodeKind::ExprStmt(expr), expr.location))
    }

    fn parse_break_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let loc = self.current().location;
        self.advance(session); // 'break'
        self.consume_optional_semicolon(session);
        Some(self.ast.alloc(NodeKind::Break, loc))
    }

    fn parse_continue_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let loc = self.current().location;
        self.advance(session); // 'continue'
        self.consume_optional_semicolon(session);
        Some(self.ast.alloc(NodeKind::Continue, loc))
    }

    /// `'defer' statement`: the wrapped statement may be any parse-level
    /// statement, including another block.
    fn parse_defer_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'defer'
        let inner = self.parse_statement(session)?;
        Some(self.ast.alloc(NodeKind::Defer(inner), self.merge(start, inner.location)))
    }

    fn parse_return_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'return'
        let expr = if self.starts_expression() {
            Some(self.parse_expression(session)?)
        } else {
            None
        };
        let end = expr.map(|e| e.location).unwrap_or(start);
        self.consume_optional_semicolon(session);
        Some(self.ast.alloc(NodeKind::Return(expr), self.merge(start, end)))
    }

    fn parse_yield_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'yield'
        let expr = if self.starts_expression() {
            Some(self.parse_expression(session)?)
        } else {
            None
        };
        let end = expr.map(|e| e.location).unwrap_or(start);
        self.consume_optional_semicolon(session);
        Some(self.ast.alloc(NodeKind::Yield(expr), self.merge(start, end)))
    }

    /// `'if' cond thenStmt ('else' elseStmt)?`
    fn parse_if_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'if'
        let (cond, parenthesized) = self.parse_condition(session)?;
        let then_branch = self.parse_body(session, parenthesized)?;
        let else_branch = if self.match_tok(TokenKind::Else, session) {
            Some(self.parse_else_branch(session)?)
        } else {
            None
        };
        let end = else_branch.map(|n| n.location).unwrap_or(then_branch.location);
        Some(self.ast.alloc(
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            },
            self.merge(start, end),
        ))
    }

    /// `else if ...` chains to another `If`; anything else is parsed as an
    /// ordinary statement (so `else { ... }` goes through the block arm of
    /// [`Self::parse_statement`]).
    fn parse_else_branch(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        if self.check(TokenKind::If) {
            self.parse_if_stmt(session)
        } else {
            self.parse_statement(session)
        }
    }

    /// `'while' cond? body`. A condition-less `while` (current token is
    /// already the body's `{`) lowers to `while true`.
    fn parse_while_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'while'
        if self.check(TokenKind::LBrace) {
            let body = self.parse_block(session)?;
            let cond = self.ast.alloc(NodeKind::Literal(Literal::Bool(true)), start);
            return Some(self.ast.alloc(NodeKind::While { cond: Some(cond), body }, self.merge(start, body.location)));
        }
        let (cond, parenthesized) = self.parse_condition(session)?;
        let body = self.parse_body(session, parenthesized)?;
        Some(self.ast.alloc(NodeKind::While { cond: Some(cond), body }, self.merge(start, body.location)))
    }

    /// `'for' '('? varList 'in' rangeExpr (',' condExpr)? ')'? body`.
    fn parse_for_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'for'
        let parenthesized = self.match_tok(TokenKind::LParen, session);

        let mut vars = Vec::new();
        loop {
            let tok = self.expect(TokenKind::Ident, "expected a loop variable name", session)?;
            vars.push(tok.text().expect("Ident always carries text"));
            if !self.match_tok(TokenKind::Comma, session) {
                break;
            }
            if self.check(TokenKind::In) {
                break;
            }
        }
        self.expect(TokenKind::In, "expected 'in' in a 'for' loop header", session)?;
        let range = self.without_struct_literal(|p| p.parse_range_expr(session))?;
        let cond = if self.match_tok(TokenKind::Comma, session) {
            Some(self.without_struct_literal(|p| p.parse_expression(session))?)
        } else {
            None
        };
        if parenthesized {
            self.expect(TokenKind::RParen, "expected ')' to close 'for' loop header", session)?;
        }
        let body = self.parse_body(session, parenthesized)?;
        Some(self.ast.alloc(NodeKind::For { vars, range, cond, body }, self.merge(start, body.location)))
    }

    /// `start? ('..' end?)?`: the one bound supplied either side of `..`,
    /// or a plain expression (e.g. an array/collection to iterate) when no
    /// `..` appears at all. Shaped around [`cxy_ast::NodeKind::Range`]'s
    /// `(start?, end?, inclusive?)` fields; there is no separate inclusive-
    /// range token, so `inclusive` is always `false` here.
    fn parse_range_expr(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start_loc = self.current().location;
        if self.match_tok(TokenKind::DotDot, session) {
            let end = if self.can_start_range_bound() {
                Some(self.parse_expression(session)?)
            } else {
                None
            };
            let loc = end.map(|n| self.merge(start_loc, n.location)).unwrap_or(start_loc);
            return Some(self.ast.alloc(
                NodeKind::Range {
                    start: None,
                    end,
                    inclusive: false,
                },
                loc,
            ));
        }
        let first = self.parse_expression(session)?;
        if self.match_tok(TokenKind::DotDot, session) {
            let end = if self.can_start_range_bound() {
                Some(self.parse_expression(session)?)
            } else {
                None
            };
            let loc = end.map(|n| self.merge(first.location, n.location)).unwrap_or(first.location);
            return Some(self.ast.alloc(
                NodeKind::Range {
                    start: Some(first),
                    end,
                    inclusive: false,
                },
                loc,
            ));
        }
        Some(first)
    }

    fn can_start_range_bound(&self) -> bool {
        !matches!(self.current().kind, TokenKind::Comma | TokenKind::RParen | TokenKind::LBrace | TokenKind::Eof)
    }

    /// `'switch' disc '{' case* '}'`.
    fn parse_switch_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'switch'
        let discriminant = self.parse_discriminant(session)?;
        self.expect(TokenKind::LBrace, "expected '{' to start switch body", session)?;
        let mut cases = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            match self.parse_switch_case(session) {
                Some(case) => cases.push(case),
                None => self.synchronize(session),
            }
        }
        let close = self.expect(TokenKind::RBrace, "expected '}' to close switch body", session)?;
        Some(self.ast.alloc(NodeKind::Switch { discriminant, cases }, self.merge(start, close.location)))
    }

    /// `casePattern ('=>' stmt | '=>' '{' stmt* '}')`,
    /// `casePattern := '...' | expr (',' expr)* (',')?`.
    fn parse_switch_case(&mut self, session: &mut Session<'bump>) -> Option<SwitchCase<'bump>> {
        let is_default = self.match_tok(TokenKind::DotDotDot, session);
        let mut values = self.ast.vec();
        if !is_default {
            loop {
                values.push(self.parse_expression(session)?);
                if !self.match_tok(TokenKind::Comma, session) {
                    break;
                }
                if self.check(TokenKind::FatArrow) {
                    break;
                }
            }
        }
        self.expect(TokenKind::FatArrow, "expected '=>' in switch case", session)?;
        let body = self.parse_case_body(session)?;
        Some(SwitchCase { values, is_default, body })
    }

    fn parse_case_body(&mut self, session: &mut Session<'bump>) -> Option<cxy_common::ArenaVec<'bump, &'bump Node<'bump>>> {
        let mut body = self.ast.vec();
        if self.match_tok(TokenKind::LBrace, session) {
            while !self.check(TokenKind::RBrace) && !self.at_eof() {
                match self.parse_statement(session) {
                    Some(stmt) => body.push(stmt),
                    None => self.synchronize(session),
                }
            }
            self.expect(TokenKind::RBrace, "expected '}' to close case body", session)?;
        } else {
            body.push(self.parse_statement(session)?);
        }
        Some(body)
    }

    /// `'match' disc '{' matchCase* '}'`.
    fn parse_match_stmt(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'match'
        let discriminant = self.without_struct_literal(|p| p.parse_expression(session))?;
        self.expect(TokenKind::LBrace, "expected '{' to start match body", session)?;
        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            match self.parse_match_arm(session) {
                Some(arm) => arms.push(arm),
                None => self.synchronize(session),
            }
        }
        let close = self.expect(TokenKind::RBrace, "expected '}' to close match body", session)?;
        Some(self.ast.alloc(NodeKind::Match { discriminant, arms }, self.merge(start, close.location)))
    }

    /// `matchPattern ('as' bindingIdent)? '=>' body`,
    /// `matchPattern := '...' | typeExpr (',' typeExpr)* (',')?`.
    fn parse_match_arm(&mut self, session: &mut Session<'bump>) -> Option<MatchArm<'bump>> {
        let is_default = self.match_tok(TokenKind::DotDotDot, session);
        let mut types = self.ast.vec();
        if !is_default {
            loop {
                types.push(self.parse_type(session)?);
                if !self.match_tok(TokenKind::Comma, session) {
                    break;
                }
                if self.check(TokenKind::As) || self.check(TokenKind::FatArrow) {
                    break;
                }
            }
        }
        let binding = if self.match_tok(TokenKind::As, session) {
            let tok = self.expect(TokenKind::Ident, "expected a binding name after 'as'", session)?;
            Some(tok.text().expect("Ident always carries text"))
        } else {
            None
        };
        self.expect(TokenKind::FatArrow, "expected '=>' in match case", session)?;
        let body = self.parse_match_body(session)?;
        Some(MatchArm {
            types,
            is_default,
            binding,
            body,
        })
    }

    fn parse_match_body(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        if self.check(TokenKind::LBrace) {
            self.parse_block(session)
        } else {
            self.parse_statement(session)
        }
    }

    /// Shared `if`/`while`/`for` condition: a parenthesized expression or
    /// conditional declaration, a bare expression, or a single-name
    /// conditional variable declaration. Returns the condition node and
    /// whether it was parenthesized, which in turn decides whether the
    /// body may be a single statement.
    fn parse_condition(&mut self, session: &mut Session<'bump>) -> Option<(&'bump Node<'bump>, bool)> {
        if self.check(TokenKind::LParen) {
            self.advance(session); // '('
            let inner = if self.is_conditional_decl_start() {
                self.parse_conditional_var_decl(session)?
            } else {
                self.parse_expression(session)?
            };
            self.expect(TokenKind::RParen, "expected ')' to close condition", session)?;
            Some((inner, true))
        } else if self.is_conditional_decl_start() {
            Some((self.parse_conditional_var_decl(session)?, false))
        } else {
            // Bare condition: suppress struct-literal parsing so a trailing
            // `{` is read as the body, not as `Type { ... }`.
            let cond = self.without_struct_literal(|p| p.parse_expression(session))?;
            Some((cond, false))
        }
    }

    /// `disc := expr | singleNameVarDecl`, used by `switch` (no
    /// parenthesized/bare distinction — there is no body-form choice to
    /// make, so only the struct-literal suppression matters).
    fn parse_discriminant(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        if self.is_conditional_decl_start() {
            self.parse_conditional_var_decl(session)
        } else {
            self.without_struct_literal(|p| p.parse_expression(session))
        }
    }

    fn is_conditional_decl_start(&self) -> bool {
        matches!(self.current().kind, TokenKind::Var | TokenKind::Const | TokenKind::Auto)
    }

    /// `('const'|'var'|'auto') ident (':' type)? '=' expr`. Multi-name
    /// conditional declarations are rejected: a trailing comma after the
    /// one accepted name is reported and the extra names are consumed for
    /// recovery, not added to the declaration.
    fn parse_conditional_var_decl(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        let is_const = self.check(TokenKind::Const);
        self.advance(session); // var/const/auto
        let name_tok = self.expect(TokenKind::Ident, "expected a variable name", session)?;
        let name = name_tok.text().expect("Ident always carries text");

        if self.check(TokenKind::Comma) {
            self.error_at(
                ParseErrorKind::InvalidDeclaration,
                self.current().location,
                "a conditional variable declaration can only name one variable",
                self.current().kind,
                session,
            );
            while self.match_tok(TokenKind::Comma, session) {
                self.expect(TokenKind::Ident, "expected a variable name", session);
            }
        }

        let type_expr = if self.match_tok(TokenKind::Colon, session) {
            Some(self.parse_type(session)?)
        } else {
            None
        };
        self.expect(TokenKind::Assign, "expected '=' in conditional variable declaration", session)?;
        let init = self.parse_expression(session)?;
        let decl = self.ast.alloc(
            NodeKind::Variable {
                names: vec![name],
                type_expr,
                init: Some(init),
            },
            self.merge(start, init.location),
        );
        if is_const {
            decl.set_flag(flags::CONST);
        }
        Some(decl)
    }

    /// When `parenthesized` is true the body may be a single statement or a
    /// block; otherwise (bare condition, or a `for` header with no parens)
    /// a block is required.
    fn parse_body(&mut self, session: &mut Session<'bump>, parenthesized: bool) -> Option<&'bump Node<'bump>> {
        if parenthesized && !self.check(TokenKind::LBrace) {
            self.parse_statement(session)
        } else {
            self.parse_block(session)
        }
    }

    fn consume_optional_semicolon(&mut self, session: &mut Session<'bump>) {
        self.match_tok(TokenKind::Semicolon, session);
    }

    /// Whether `current` can begin an expression, used to tell `return`/
    /// `yield` with no operand apart from one with an operand: a statement
    /// boundary is `}`, another statement-starting keyword, or `;`/`Eof`.
    /// A source newline immediately after `return`/`yield` would also be a
    /// boundary in some grammars, but [`cxy_lexer`] does not track
    /// newline-adjacency on tokens, so that case isn't distinguishable here.
    fn starts_expression(&self) -> bool {
        !matches!(
            self.current().kind,
            TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::Eof
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Defer
                | TokenKind::Return
                | TokenKind::Yield
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Switch
                | TokenKind::Match
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::Auto
                | TokenKind::LBrace
        )
    }
}
