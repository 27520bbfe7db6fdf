//! Type-expression grammar: primitive/named/pointer/array/function/tuple
//! types, qualified-path type names, and generic-argument lists, which
//! enter template context so a trailing `>>` splits into two `>` tokens.

use cxy_ast::{Node, NodeKind, PathSegment};
use cxy_common::{Session, TokenKind};

use crate::error::ParseErrorKind;
use crate::parser::Parser;

impl<'bump> Parser<'bump> {
    /// `type := unionType`
    pub fn parse_type(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        self.parse_union_type(session)
    }

    /// `unionType := postfixType ('|' postfixType)*`, ≥2 members form a
    /// `UnionType`.
    fn parse_union_type(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let first = self.parse_primary_type(session)?;
        if !self.check(TokenKind::Pipe) {
            return Some(first);
        }
        let start = first.location;
        let mut members = self.ast.vec();
        members.push(first);
        let mut end = first.location;
        while self.match_tok(TokenKind::Pipe, session) {
            let member = self.parse_primary_type(session)?;
            end = member.location;
            members.push(member);
        }
        Some(self.ast.alloc(NodeKind::UnionType(members), self.merge(start, end)))
    }

    fn parse_primary_type(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let tok = self.current();
        match tok.kind {
            k if k.is_primitive_type() => {
                self.advance(session);
                Some(self.ast.alloc(NodeKind::PrimitiveType(k), tok.location))
            }
            TokenKind::Star => {
                self.advance(session);
                let target = self.parse_primary_type(session)?;
                Some(self.ast.alloc(NodeKind::PointerType(target), self.merge(tok.location, target.location)))
            }
            TokenKind::Amp => {
                self.advance(session);
                let target = self.parse_primary_type(session)?;
                Some(self.ast.alloc(NodeKind::ReferenceType(target), self.merge(tok.location, target.location)))
            }
            TokenKind::Question => {
                self.advance(session);
                let target = self.parse_primary_type(session)?;
                Some(self.ast.alloc(NodeKind::OptionalType(target), self.merge(tok.location, target.location)))
            }
            TokenKind::Bang => {
                self.advance(session);
                let target = self.parse_primary_type(session)?;
                Some(self.ast.alloc(NodeKind::ResultType(target), self.merge(tok.location, target.location)))
            }
            // `&&T`: the lexer has already merged the two `&` into `AmpAmp`.
            // Rejected as a type position rather than silently split back
            // into two reference levels.
            TokenKind::AmpAmp => {
                self.error_at(
                    ParseErrorKind::InvalidExpression,
                    tok.location,
                    "'&&' cannot start a type; the lexer has already merged it into a single token",
                    tok.kind,
                    session,
                );
                self.advance(session);
                None
            }
            TokenKind::LBracket => self.parse_array_type(session),
            TokenKind::LParen => self.parse_tuple_or_grouped_type(session),
            TokenKind::Func => self.parse_function_type(session),
            _ => self.parse_qualified_path_type(session),
        }
    }

    /// `'[' expr? ']' type` — fixed-size (with a size expression) or
    /// dynamic (bare `[]`) array type, right-recursive in `type`.
    fn parse_array_type(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // '['
        let size = if self.check(TokenKind::RBracket) {
            None
        } else {
            Some(self.parse_expression(session)?)
        };
        self.expect(TokenKind::RBracket, "expected ']' to close array type", session)?;
        let element = self.parse_type(session)?;
        let loc = self.merge(start, element.location);
        Some(self.ast.alloc(NodeKind::ArrayType { size, element }, loc))
    }

    /// `'(' typeList ')'`: one element with no trailing comma is a grouped
    /// type (just that type); otherwise (including the empty list) it is a
    /// `TupleType`. `(x,)` is the one legal trailing comma.
    fn parse_tuple_or_grouped_type(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // '('
        let mut elements = self.ast.vec();
        let mut trailing_comma = false;
        if !self.check(TokenKind::RParen) {
            loop {
                let element = self.parse_type(session)?;
                elements.push(element);
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
        let end_tok = self.expect(TokenKind::RParen, "expected ')' to close type list", session)?;
        let loc = self.merge(start, end_tok.location);
        if elements.len() == 1 && !trailing_comma {
            return Some(elements[0]);
        }
        Some(self.ast.alloc(NodeKind::TupleType(elements), loc))
    }

    /// `'func' '(' typeList ')' '->' type`
    fn parse_function_type(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'func'
        self.expect(TokenKind::LParen, "expected '(' after 'func' in function type", session)?;
        let mut params = self.ast.vec();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_type(session)?);
                if !self.match_tok(TokenKind::Comma, session) {
                    break;
                }
                if self.check(TokenKind::RParen) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' to close function type parameter list", session)?;
        self.expect(TokenKind::Arrow, "expected '->' in function type", session)?;
        let return_type = self.parse_type(session)?;
        let loc = self.merge(start, return_type.location);
        Some(self.ast.alloc(NodeKind::FunctionType { params, return_type }, loc))
    }

    /// `qualifiedPath := '::'? segment ('.' segment)*` used as a type;
    /// inside a type expression `<` always starts a type-argument list,
    /// unlike in expression context where it could be a comparison.
    fn parse_qualified_path_type(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        let rooted = self.match_double_colon(session);
        let mut segments = Vec::new();
        let mut end = start;
        loop {
            let name_tok = self.expect(TokenKind::Ident, "expected a type name", session)?;
            let name = name_tok.text().expect("Ident token always carries interned text");
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
        let loc = self.merge(start, end);
        Some(self.ast.alloc(NodeKind::QualifiedPath { rooted, segments }, loc))
    }

    pub(crate) fn parse_generic_arg_list(&mut self, session: &mut Session<'bump>) -> Option<cxy_common::ArenaVec<'bump, &'bump Node<'bump>>> {
        let mut args = self.ast.vec();
        if self.check(TokenKind::Gt) {
            return Some(args);
        }
        loop {
            args.push(self.parse_type(session)?);
            if !self.match_tok(TokenKind::Comma, session) {
                break;
            }
            if self.check(TokenKind::Gt) {
                break;
            }
        }
        Some(args)
    }
}
