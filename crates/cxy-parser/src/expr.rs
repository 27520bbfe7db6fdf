//! Expression grammar: the precedence ladder, qualified-path expressions,
//! and primary/postfix parsing.
//!
//! The ladder is written as one function per precedence level rather than
//! a binding-power table, since the grammar names levels (assignment,
//! logical-or, logical-and, equality, relational, ...) rather than
//! binding powers, and a direct level-by-level ladder reads closer to
//! that grammar than a Pratt parser would.

use cxy_ast::{AssignOp, BinaryOp, CastKind, FieldInit, Literal, Node, NodeKind, PathSegment, StringPart, UnaryOp};
use cxy_common::{Session, TokenKind, Value};

use crate::error::ParseErrorKind;
use crate::parser::Parser;

impl<'bump> Parser<'bump> {
    pub fn parse_expression(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_assignment(session)
    }

    // ── assignment (right-assoc) ──────────────────────────────────────

    fn parse_assignment(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let target = self.parse_conditional(session)?;
        let op = assign_op(self.current().kind);
        let Some(op) = op else { return Some(target) };
        self.advance(session);
        let value = self.parse_assignment(session)?;
        let loc = self.merge(target.location, value.location);
        Some(self.ast.alloc(NodeKind::Assignment { op, target, value }, loc))
    }

    // ── conditional ────────────────────────────────────────────────────

    fn parse_conditional(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let cond = self.parse_logical_or(session)?;
        if !self.match_tok(TokenKind::Question, session) {
            return Some(cond);
        }
        let then_branch = self.parse_expression(session)?;
        self.expect(TokenKind::Colon, "expected ':' in conditional expression", session)?;
        let else_branch = self.parse_conditional(session)?;
        let loc = self.merge(cond.location, else_branch.location);
        Some(self.ast.alloc(
            NodeKind::Ternary {
                cond,
                then_branch,
                else_branch,
            },
            loc,
        ))
    }

    // ── binary precedence ladder ──────────────────────────────────────

    fn parse_logical_or(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(session, Self::parse_logical_and, &[(TokenKind::PipePipe, BinaryOp::Or)])
    }

    fn parse_logical_and(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(session, Self::parse_bit_or, &[(TokenKind::AmpAmp, BinaryOp::And)])
    }

    fn parse_bit_or(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(session, Self::parse_bit_xor, &[(TokenKind::Pipe, BinaryOp::BitOr)])
    }

    fn parse_bit_xor(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(session, Self::parse_bit_and, &[(TokenKind::Caret, BinaryOp::BitXor)])
    }

    fn parse_bit_and(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(session, Self::parse_equality, &[(TokenKind::Amp, BinaryOp::BitAnd)])
    }

    fn parse_equality(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(
            session,
            Self::parse_relational,
            &[(TokenKind::Eq, BinaryOp::Eq), (TokenKind::Ne, BinaryOp::Ne)],
        )
    }

    fn parse_relational(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(
            session,
            Self::parse_shift,
            &[
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Le, BinaryOp::Le),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::Ge, BinaryOp::Ge),
            ],
        )
    }

    fn parse_shift(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(
            session,
            Self::parse_additive,
            &[(TokenKind::Shl, BinaryOp::Shl), (TokenKind::Shr, BinaryOp::Shr)],
        )
    }

    fn parse_additive(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(
            session,
            Self::parse_multiplicative,
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
        )
    }

    fn parse_multiplicative(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_left_assoc(
            session,
            Self::parse_cast,
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Rem),
            ],
        )
    }

    /// Shared left-associative binary loop: `next (op next)*`.
    fn parse_left_assoc(
        &mut self,
        session: &mut Session<'bump>,
        mut next: impl FnMut(&mut Self, &mut Session<'bump>) -> Option<&'bump Node<'bump>>,
        ops: &[(TokenKind, BinaryOp)],
    ) -> Option<&'bump Node<'bump>> {
        let mut lhs = next(self, session)?;
        loop {
            let current = self.current().kind;
            let Some(&(_, op)) = ops.iter().find(|(k, _)| *k == current) else {
                break;
            };
            self.advance(session);
            let rhs = next(self, session)?;
            let loc = self.merge(lhs.location, rhs.location);
            lhs = self.ast.alloc(NodeKind::Binary { op, lhs, rhs }, loc);
        }
        Some(lhs)
    }

    /// `cast := unary (('as' | '!:' | 'is') typeExpr)*`, left-assoc. `is`
    /// shares this slot as the type-test keyword; the distilled grammar
    /// names `as`/`!:` explicitly but reserves the `is` keyword without
    /// spelling out its production, so it is wired in here alongside them.
    fn parse_cast(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let mut expr = self.parse_unary(session)?;
        loop {
            if self.match_tok(TokenKind::As, session) {
                let type_expr = self.parse_type(session)?;
                let loc = self.merge(expr.location, type_expr.location);
                expr = self.ast.alloc(
                    NodeKind::Cast {
                        expr,
                        type_expr,
                        kind: CastKind::As,
                    },
                    loc,
                );
            } else if self.match_tok(TokenKind::BangColon, session) {
                let type_expr = self.parse_type(session)?;
                let loc = self.merge(expr.location, type_expr.location);
                expr = self.ast.alloc(
                    NodeKind::Cast {
                        expr,
                        type_expr,
                        kind: CastKind::Retype,
                    },
                    loc,
                );
            } else if self.match_tok(TokenKind::Is, session) {
                let type_expr = self.parse_type(session)?;
                let loc = self.merge(expr.location, type_expr.location);
                expr = self.ast.alloc(NodeKind::Is { expr, type_expr }, loc);
            } else {
                break;
            }
        }
        Some(expr)
    }

    // ── unary / postfix / primary ──────────────────────────────────────

    /// `unary := prefixOp unary | postfix`.
    fn parse_unary(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let tok = self.current();
        let (op, prefix) = match tok.kind {
            TokenKind::PlusPlus => (UnaryOp::Inc, true),
            TokenKind::MinusMinus => (UnaryOp::Dec, true),
            TokenKind::Plus => (UnaryOp::Plus, true),
            TokenKind::Minus => (UnaryOp::Neg, true),
            TokenKind::Bang => (UnaryOp::Not, true),
            TokenKind::Tilde => (UnaryOp::BitNot, true),
            TokenKind::Caret => (UnaryOp::Caret, true),
            TokenKind::Amp => (UnaryOp::AddrOf, true),
            TokenKind::AmpAmp => {
                // Two prefix `&` rolled into one token by the lexer.
                self.advance(session);
                let inner = self.parse_unary(session)?;
                let loc = self.merge(tok.location, inner.location);
                let once = self.ast.alloc(
                    NodeKind::Unary {
                        op: UnaryOp::AddrOf,
                        prefix: true,
                        operand: inner,
                    },
                    loc,
                );
                return Some(self.ast.alloc(
                    NodeKind::Unary {
                        op: UnaryOp::AddrOf,
                        prefix: true,
                        operand: once,
                    },
                    loc,
                ));
            }
            _ => return self.parse_postfix(session),
        };
        self.advance(session);
        let operand = self.parse_unary(session)?;
        let loc = self.merge(tok.location, operand.location);
        Some(self.ast.alloc(NodeKind::Unary { op, prefix, operand }, loc))
    }

    /// `postfix := primary postfixSuffix*`.
    fn parse_postfix(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let mut expr = self.parse_primary(session)?;
        loop {
            let tok = self.current();
            expr = match tok.kind {
                TokenKind::PlusPlus => {
                    self.advance(session);
                    self.ast.alloc(
                        NodeKind::Unary {
                            op: UnaryOp::Inc,
                            prefix: false,
                            operand: expr,
                        },
                        self.merge(expr.location, tok.location),
                    )
                }
                TokenKind::MinusMinus => {
                    self.advance(session);
                    self.ast.alloc(
                        NodeKind::Unary {
                            op: UnaryOp::Dec,
                            prefix: false,
                            operand: expr,
                        },
                        self.merge(expr.location, tok.location),
                    )
                }
                TokenKind::LBracket => {
                    self.advance(session);
                    let index = self.parse_expression(session)?;
                    let close = self.expect(TokenKind::RBracket, "expected ']' to close index expression", session)?;
                    self.ast.alloc(NodeKind::Index { object: expr, index }, self.merge(expr.location, close.location))
                }
                TokenKind::Dot => {
                    self.advance(session);
                    let name_tok = self.expect(TokenKind::Ident, "expected a member name after '.'", session)?;
                    let name = name_tok.text().expect("Ident always carries text");
                    self.ast.alloc(
                        NodeKind::Member {
                            object: expr,
                            name,
                            arrow: false,
                        },
                        self.merge(expr.location, name_tok.location),
                    )
                }
                TokenKind::AmpDot => {
                    self.advance(session);
                    let name_tok = self.expect(TokenKind::Ident, "expected a member name after '&.'", session)?;
                    let name = name_tok.text().expect("Ident always carries text");
                    self.ast.alloc(
                        NodeKind::Member {
                            object: expr,
                            name,
                            arrow: true,
                        },
                        self.merge(expr.location, name_tok.location),
                    )
                }
                TokenKind::LParen => {
                    self.advance(session);
                    let mut args = self.ast.vec();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expression(session)?);
                            if !self.match_tok(TokenKind::Comma, session) {
                                break;
                            }
                            if self.check(TokenKind::RParen) {
                                break;
                            }
                        }
                    }
                    let close = self.expect(TokenKind::RParen, "expected ')' to close call arguments", session)?;
                    self.ast.alloc(NodeKind::Call { callee: expr, args }, self.merge(expr.location, close.location))
                }
                TokenKind::LBrace if self.struct_literal_allowed() && matches!(expr.kind, NodeKind::Identifier { .. } | NodeKind::QualifiedPath { .. }) => {
                    self.parse_struct_literal_fields(expr, session)?
                }
                _ => break,
            };
        }
        Some(expr)
    }

    fn parse_struct_literal_fields(
        &mut self,
        type_expr: &'bump Node<'bump>,
        session: &mut Session<'bump>,
    ) -> Option<&'bump Node<'bump>> {
        let start = type_expr.location;
        self.advance(session); // '{'
        let mut fields = Vec::new();
        if !self.check(TokenKind::RBrace) {
            loop {
                let name_tok = self.expect(TokenKind::Ident, "expected a field name in struct literal", session)?;
                let name = name_tok.text().expect("Ident always carries text");
                self.expect(TokenKind::Colon, "expected ':' after field name in struct literal", session)?;
                let value = self.parse_expression(session)?;
                fields.push(FieldInit { name, value });
                if !self.match_tok(TokenKind::Comma, session) {
                    break;
                }
                if self.check(TokenKind::RBrace) {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RBrace, "expected '}' to close struct literal", session)?;
        Some(self.ast.alloc(
            NodeKind::StructLiteral {
                type_expr: Some(type_expr),
                fields,
            },
            self.merge(start, close.location),
        ))
    }

    fn parse_primary(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let tok = self.current();
        match tok.kind {
            TokenKind::True => {
                self.advance(session);
                Some(self.ast.alloc(NodeKind::Literal(Literal::Bool(true)), tok.location))
            }
            TokenKind::False => {
                self.advance(session);
                Some(self.ast.alloc(NodeKind::Literal(Literal::Bool(false)), tok.location))
            }
            TokenKind::Null => {
                self.advance(session);
                Some(self.ast.alloc(NodeKind::Literal(Literal::Null), tok.location))
            }
            TokenKind::IntLiteral => {
                self.advance(session);
                let Some(Value::Integer(v, k)) = tok.value else {
                    unreachable!("IntLiteral token always carries an Integer value")
                };
                Some(self.ast.alloc(NodeKind::Literal(Literal::Int(v, k)), tok.location))
            }
            TokenKind::FloatLiteral => {
                self.advance(session);
                let Some(Value::Float(v, k)) = tok.value else {
                    unreachable!("FloatLiteral token always carries a Float value")
                };
                Some(self.ast.alloc(NodeKind::Literal(Literal::Float(v, k)), tok.location))
            }
            TokenKind::CharLiteral => {
                self.advance(session);
                let Some(Value::Char(c)) = tok.value else {
                    unreachable!("CharLiteral token always carries a Char value")
                };
                Some(self.ast.alloc(NodeKind::Literal(Literal::Char(c)), tok.location))
            }
            TokenKind::StringLiteral => {
                self.advance(session);
                let Some(Value::Str(s)) = tok.value else {
                    unreachable!("StringLiteral token always carries a Str value")
                };
                Some(self.ast.alloc(NodeKind::Literal(Literal::Str(s)), tok.location))
            }
            TokenKind::LString => self.parse_interpolated_string(session),
            TokenKind::Ident => {
                self.advance(session);
                let name = tok.text().expect("Ident always carries interned text");
                Some(self.ast.alloc(
                    NodeKind::Identifier {
                        name,
                        resolved: std::cell::Cell::new(None),
                    },
                    tok.location,
                ))
            }
            TokenKind::Colon if self.check_next(TokenKind::Colon) => self.parse_qualified_path_expr(session),
            TokenKind::LParen => self.parse_tuple_or_grouped_expr(session),
            TokenKind::LBracket => self.parse_array_literal(session),
            TokenKind::DotDotDot => self.parse_spread(session),
            TokenKind::Func => self.parse_closure(session),
            _ => {
                self.error_at(
                    ParseErrorKind::InvalidExpression,
                    tok.location,
                    format!("unexpected token {:?} while parsing an expression", tok.kind),
                    tok.kind,
                    session,
                );
                self.advance(session);
                None
            }
        }
    }

    fn parse_spread(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // '...'
        let inner = self.parse_expression(session)?;
        Some(self.ast.alloc(NodeKind::Spread(inner), self.merge(start, inner.location)))
    }

    /// `'::'? segment ('.' segment)*`, `segment := ident ('<' typeArgs '>')?`.
    fn parse_qualified_path_expr(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        let rooted = self.match_double_colon(session);
        let mut segments = Vec::new();
        let mut end = start;
        loop {
            let name_tok = self.expect(TokenKind::Ident, "expected a path segment name", session)?;
            let name = name_tok.text().expect("Ident always carries text");
            end = name_tok.location;
            let type_args = if self.check(TokenKind::Lt) {
                self.lexer.enter_template_context();
                self.advance(session); // '<'
                let args = self.parse_generic_arg_list(session)?;
                let close = self.expect(TokenKind::Gt, "expected '>' to close type arguments", session)?;
                self.lexer.exit_template_context();
                end = close.location;
                args
            } else {
                self.ast.vec()
            };
            segments.push(PathSegment { name, type_args });
            if !self.match_tok(TokenKind::Dot, session) {
                break;
            }
        }
        Some(self.ast.alloc(NodeKind::QualifiedPath { rooted, segments }, self.merge(start, end)))
    }

    /// `'(' expr (',' expr)* (',')? ')'`: no elements or >1 elements or a
    /// trailing comma makes a `Tuple`; exactly one element with no trailing
    /// comma is a `Group`.
    fn parse_tuple_or_grouped_expr(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // '('
        let mut elements = self.ast.vec();
        let mut trailing_comma = false;
        if !self.check(TokenKind::RParen) {
            loop {
                elements.push(self.parse_expression(session)?);
                if self.match_tok(TokenKind::Comma, session) {
                    trailing_comma = true;
                    if self.check(TokenKind::RParen) {
                        break;
                    }
                    trailing_comma = false;
                    continue;
                }
                trailing_comma = false;
                break;
            }
        }
        let close = self.expect(TokenKind::RParen, "expected ')' to close expression", session)?;
        let loc = self.merge(start, close.location);
        if elements.len() == 1 && !trailing_comma {
            return Some(self.ast.alloc(NodeKind::Group(elements[0]), loc));
        }
        Some(self.ast.alloc(NodeKind::Tuple(elements), loc))
    }

    fn parse_array_literal(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // '['
        let mut elements = self.ast.vec();
        if !self.check(TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expression(session)?);
                if !self.match_tok(TokenKind::Comma, session) {
                    break;
                }
                if self.check(TokenKind::RBracket) {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RBracket, "expected ']' to close array literal", session)?;
        Some(self.ast.alloc(NodeKind::Array(elements), self.merge(start, close.location)))
    }

    /// `func '(' paramList ')' ('=>' expr | block)`, the anonymous-function
    /// expression form of a [`NodeKind::Closure`]. Reuses the declaration
    /// parameter grammar since closure params have the same shape as
    /// function params.
    fn parse_closure(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'func'
        self.expect(TokenKind::LParen, "expected '(' to start closure parameters", session)?;
        let mut params = self.ast.vec();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_func_param(session)?);
                if !self.match_tok(TokenKind::Comma, session) {
                    break;
                }
                if self.check(TokenKind::RParen) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' to close closure parameters", session)?;
        let body = if self.match_tok(TokenKind::FatArrow, session) {
            self.parse_expression(session)?
        } else {
            self.parse_block(session)?
        };
        Some(self.ast.alloc(NodeKind::Closure { params, body }, self.merge(start, body.location)))
    }

    /// `"PRE{E1}MID{E2}POST"` → `StringExpr([Text(PRE), Expr(E1), Text(MID), Expr(E2), Text(POST)])`.
    fn parse_interpolated_string(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let open = self.current();
        let Some(Value::Str(first)) = open.value else {
            unreachable!("LString token always carries a Str value")
        };
        self.advance(session);
        let mut parts = vec![StringPart::Text(first)];
        let mut end = open.location;
        loop {
            let expr = self.parse_expression(session)?;
            end = expr.location;
            parts.push(StringPart::Expr(expr));
            let frag = self.current();
            match frag.kind {
                TokenKind::StringLiteral => {
                    let Some(Value::Str(text)) = frag.value else {
                        unreachable!("StringLiteral fragment always carries a Str value")
                    };
                    self.advance(session);
                    end = frag.location;
                    parts.push(StringPart::Text(text));
                }
                TokenKind::RString => {
                    let Some(Value::Str(text)) = frag.value else {
                        unreachable!("RString token always carries a Str value")
                    };
                    self.advance(session);
                    end = frag.location;
                    parts.push(StringPart::Text(text));
                    break;
                }
                _ => {
                    self.error_at(
                        ParseErrorKind::InvalidExpression,
                        frag.location,
                        "expected a string fragment or the closing part of an interpolated string",
                        frag.kind,
                        session,
                    );
                    break;
                }
            }
        }
        Some(self.ast.alloc(NodeKind::StringExpr(parts), self.merge(open.location, end)))
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::PlusAssign => AssignOp::Add,
        TokenKind::MinusAssign => AssignOp::Sub,
        TokenKind::StarAssign => AssignOp::Mul,
        TokenKind::SlashAssign => AssignOp::Div,
        TokenKind::PercentAssign => AssignOp::Rem,
        TokenKind::AmpAssign => AssignOp::BitAnd,
        TokenKind::CaretAssign => AssignOp::BitXor,
        TokenKind::PipeAssign => AssignOp::BitOr,
        TokenKind::ShlAssign => AssignOp::Shl,
        TokenKind::ShrAssign => AssignOp::Shr,
        _ => return None,
    })
}
