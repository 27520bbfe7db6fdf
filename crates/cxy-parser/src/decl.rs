//! Declaration grammar: attribute lists, visibility/`extern` validation,
//! variable/func/type/enum/struct-class declarations, generic parameter
//! lists, and the module/import forms.

use cxy_ast::{flags, ImportItem, ImportKind, Node, NodeKind};
use cxy_common::{Location, Session, TokenKind, Value};

use crate::error::ParseErrorKind;
use crate::parser::Parser;

impl<'bump> Parser<'bump> {
    /// Entry point: a translation unit is a `ModuleDeclaration`. Never
    /// returns `None` -- parse failures are recorded and recovered from
    /// item by item.
    pub fn parse_module(&mut self, session: &mut Session<'bump>) -> &'bump Node<'bump> {
        let start = self.current().location;
        let name = if self.check(TokenKind::Module) {
            self.advance(session);
            let tok = self.expect(TokenKind::Ident, "expected a module name after 'module'", session);
            tok.and_then(|t| t.text())
        } else {
            None
        };

        let mut top_level = self.ast.vec();
        let mut main_content = self.ast.vec();
        while !self.at_eof() {
            if self.check(TokenKind::Import) {
                if let Some(import) = self.parse_import_declaration(session) {
                    top_level.push(import);
                } else {
                    self.synchronize(session);
                }
                continue;
            }
            match self.parse_declaration(session) {
                Some(decl) => main_content.push(decl),
                None => self.synchronize(session),
            }
        }
        let end = self.previous().map(|t| t.location).unwrap_or(start);
        self.ast.alloc(
            NodeKind::Module {
                name,
                top_level,
                main_content,
            },
            self.merge(start, end),
        )
    }

    /// Dispatch order: attribute list, then visibility, then the
    /// declaration-starting keyword.
    pub fn parse_declaration(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let attributes = self.parse_attribute_list(session)?;
        let start = self.current().location;
        let is_public = self.match_tok(TokenKind::Pub, session);
        let is_extern = self.match_tok(TokenKind::Extern, session);

        let decl = match self.current().kind {
            TokenKind::Var | TokenKind::Const | TokenKind::Auto => self.parse_variable_declaration(session, start, is_extern, attributes)?,
            TokenKind::Func => self.parse_func_declaration(session, start, is_extern, attributes)?,
            TokenKind::Type => self.parse_type_alias_declaration(session, start, attributes)?,
            TokenKind::Enum => self.parse_enum_declaration(session, start, is_extern, attributes)?,
            TokenKind::Struct | TokenKind::Class => self.parse_struct_or_class_declaration(session, start, is_extern, attributes)?,
            _ => {
                let tok = self.current();
                self.error_at(
                    ParseErrorKind::InvalidDeclaration,
                    tok.location,
                    format!("expected a declaration, found {:?}", tok.kind),
                    tok.kind,
                    session,
                );
                self.advance(session);
                return None;
            }
        };

        if is_public {
            decl.set_flag(flags::PUBLIC);
        }
        if is_extern {
            decl.set_flag(flags::EXTERN);
        }
        Some(decl)
    }

    /// `@name(args)*` preceding a declaration.
    fn parse_attribute_list(&mut self, session: &mut Session<'bump>) -> Option<cxy_common::ArenaVec<'bump, &'bump Node<'bump>>> {
        let mut attributes = self.ast.vec();
        while self.check(TokenKind::At) {
            let start = self.current().location;
            self.advance(session); // '@'
            let name_tok = self.expect(TokenKind::Ident, "expected an attribute name after '@'", session)?;
            let name = name_tok.text().expect("Ident always carries text");
            let callee = self.ast.alloc(
                NodeKind::Identifier {
                    name,
                    resolved: std::cell::Cell::new(None),
                },
                name_tok.location,
            );
            let mut args = self.ast.vec();
            let mut end = name_tok.location;
            if self.match_tok(TokenKind::LParen, session) {
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
                let close = self.expect(TokenKind::RParen, "expected ')' to close attribute arguments", session)?;
                end = close.location;
            }
            attributes.push(self.ast.alloc(NodeKind::Call { callee, args }, self.merge(start, end)));
        }
        Some(attributes)
    }

    // ── Variable declaration ───────────────────────────────────────────

    /// `('var' | 'const' | 'auto') name (',' name)* (',')? (':' type)? ('=' expr)?`
    pub(crate) fn parse_variable_declaration(
        &mut self,
        session: &mut Session<'bump>,
        start: Location,
        is_extern: bool,
        attributes: cxy_common::ArenaVec<'bump, &'bump Node<'bump>>,
    ) -> Option<&'bump Node<'bump>> {
        let is_const = self.check(TokenKind::Const);
        self.advance(session); // var/const/auto

        let mut names = Vec::new();
        loop {
            let tok = self.expect(TokenKind::Ident, "expected a variable name", session)?;
            names.push(tok.text().expect("Ident always carries text"));
            if !self.match_tok(TokenKind::Comma, session) {
                break;
            }
            if self.check(TokenKind::Colon) || self.check(TokenKind::Assign) {
                break;
            }
        }

        let type_expr = if self.match_tok(TokenKind::Colon, session) {
            Some(self.parse_type(session)?)
        } else {
            None
        };
        let init = if self.match_tok(TokenKind::Assign, session) {
            Some(self.parse_expression(session)?)
        } else {
            None
        };

        if type_expr.is_none() && init.is_none() {
            let loc = self.current().location;
            self.error_at(
                ParseErrorKind::InvalidDeclaration,
                loc,
                "a variable declaration needs at least a type or an initializer",
                self.current().kind,
                session,
            );
        }
        if is_extern && init.is_some() {
            self.error_at(
                ParseErrorKind::InvalidDeclaration,
                start.clone(),
                "an 'extern' variable cannot have an initializer",
                self.current().kind,
                session,
            );
        }
        if is_extern && type_expr.is_none() {
            self.error_at(
                ParseErrorKind::InvalidDeclaration,
                start.clone(),
                "an 'extern' variable requires an explicit type",
                self.current().kind,
                session,
            );
        }

        let end = init.map(|n| n.location).or(type_expr.map(|n| n.location)).unwrap_or_else(|| start.clone());
        self.match_tok(TokenKind::Semicolon, session);
        let decl = self.ast.alloc_with_attributes(
            NodeKind::Variable {
                names,
                type_expr,
                init,
            },
            self.merge(start, end),
            attributes,
        );
        if is_const {
            decl.set_flag(flags::CONST);
        }
        Some(decl)
    }

    // ── Function declaration ───────────────────────────────────────────

    pub(crate) fn parse_func_declaration(
        &mut self,
        session: &mut Session<'bump>,
        start: Location,
        is_extern: bool,
        attributes: cxy_common::ArenaVec<'bump, &'bump Node<'bump>>,
    ) -> Option<&'bump Node<'bump>> {
        self.advance(session); // 'func'

        let (name, operator_name) = if self.match_tok(TokenKind::Backtick, session) {
            let op_name = self.parse_operator_name(session)?;
            self.expect(TokenKind::Backtick, "expected closing '`' after operator name", session)?;
            (None, Some(op_name))
        } else {
            let tok = self.expect(TokenKind::Ident, "expected a function name", session)?;
            (Some(tok.text().expect("Ident always carries text")), None)
        };

        let generic_params = if self.check(TokenKind::Lt) {
            Some(self.parse_generic_param_list(session)?)
        } else {
            None
        };

        self.expect(TokenKind::LParen, "expected '(' to start parameter list", session)?;
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
        self.expect(TokenKind::RParen, "expected ')' to close parameter list", session)?;

        let return_type = if self.check(TokenKind::FatArrow) || self.check(TokenKind::LBrace) || self.check(TokenKind::Semicolon) {
            None
        } else {
            self.expect(TokenKind::Arrow, "expected '->' before a return type", session)?;
            Some(self.parse_type(session)?)
        };

        let body = if self.match_tok(TokenKind::FatArrow, session) {
            Some(self.parse_expression(session)?)
        } else if self.check(TokenKind::LBrace) {
            Some(self.parse_block(session)?)
        } else {
            None
        };

        if is_extern {
            if return_type.is_none() {
                self.error_at(
                    ParseErrorKind::InvalidDeclaration,
                    start.clone(),
                    "an 'extern' function requires an explicit return type",
                    self.current().kind,
                    session,
                );
            }
            if body.is_some() {
                self.error_at(
                    ParseErrorKind::InvalidDeclaration,
                    start.clone(),
                    "an 'extern' function cannot have a body",
                    self.current().kind,
                    session,
                );
            }
            if generic_params.is_some() {
                self.error_at(
                    ParseErrorKind::InvalidDeclaration,
                    start.clone(),
                    "an 'extern' function cannot have generic parameters",
                    self.current().kind,
                    session,
                );
            }
        }

        let end = body
            .map(|n| n.location)
            .or(return_type.map(|n| n.location))
            .unwrap_or_else(|| start.clone());
        let func = self.ast.alloc_with_attributes(
            NodeKind::Func {
                name,
                operator_name,
                params,
                return_type,
                body,
            },
            self.merge(start, end),
            attributes,
        );
        Some(self.wrap_generic(func, generic_params))
    }

    /// The four-token window already holds whatever follows the backtick as
    /// ordinary tokens (it was prefetched before the parser knew an operator
    /// name was coming), so this reads the name off the window directly
    /// rather than asking the lexer to re-tokenize in a special mode: `()`
    /// and `[]`/`[]=` are two or three ordinary tokens glued back together,
    /// everything else is a single operator token.
    fn parse_operator_name(&mut self, session: &mut Session<'bump>) -> Option<cxy_common::InternedStr<'bump>> {
        let tok = self.current();
        let text: &str = match tok.kind {
            TokenKind::LParen if self.check_next(TokenKind::RParen) => {
                self.advance(session);
                self.advance(session);
                "()"
            }
            TokenKind::LBracket if self.check_next(TokenKind::RBracket) => {
                self.advance(session);
                self.advance(session);
                if self.match_tok(TokenKind::Assign, session) {
                    "[]="
                } else {
                    "[]"
                }
            }
            k if operator_symbol(k).is_some() => {
                self.advance(session);
                operator_symbol(k).unwrap()
            }
            _ => {
                self.error_at(
                    ParseErrorKind::InvalidDeclaration,
                    tok.location,
                    format!("{:?} cannot be used as an operator-overload name", tok.kind),
                    tok.kind,
                    session,
                );
                self.advance(session);
                return None;
            }
        };
        Some(self.intern(session, text))
    }

    /// `param := ident type ('=' expr)? | '...' ident type`
    pub(crate) fn parse_func_param(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        let is_variadic = self.match_tok(TokenKind::DotDotDot, session);
        let name_tok = self.expect(TokenKind::Ident, "expected a parameter name", session)?;
        let name = name_tok.text().expect("Ident always carries text");
        let type_expr = self.parse_type(session)?;
        let default = if !is_variadic && self.match_tok(TokenKind::Assign, session) {
            Some(self.parse_expression(session)?)
        } else {
            None
        };
        let end = default.map(|n| n.location).unwrap_or(type_expr.location);
        let param = self.ast.alloc(
            NodeKind::FuncParam {
                name,
                type_expr,
                default,
            },
            self.merge(start, end),
        );
        if is_variadic {
            param.set_flag(flags::VARIADIC);
        }
        Some(param)
    }

    // ── Type alias ──────────────────────────────────────────────────────

    /// `'type' name genericParams? '=' typeExpr`
    fn parse_type_alias_declaration(
        &mut self,
        session: &mut Session<'bump>,
        start: Location,
        attributes: cxy_common::ArenaVec<'bump, &'bump Node<'bump>>,
    ) -> Option<&'bump Node<'bump>> {
        self.advance(session); // 'type'
        let name_tok = self.expect(TokenKind::Ident, "expected a type name", session)?;
        let name = name_tok.text().expect("Ident always carries text");
        let generic_params = if self.check(TokenKind::Lt) {
            Some(self.parse_generic_param_list(session)?)
        } else {
            None
        };
        self.expect(TokenKind::Assign, "expected '=' in type declaration", session)?;
        let type_expr = self.parse_type(session)?;
        let alias = self.ast.alloc_with_attributes(
            NodeKind::TypeAlias { name, type_expr },
            self.merge(start, type_expr.location),
            attributes,
        );
        Some(self.wrap_generic(alias, generic_params))
    }

    // ── Enum ─────────────────────────────────────────────────────────────

    /// `'enum' name (':' typeExpr)? '{' (option (',' option)* (',')?)? '}'`
    fn parse_enum_declaration(
        &mut self,
        session: &mut Session<'bump>,
        start: Location,
        is_extern: bool,
        attributes: cxy_common::ArenaVec<'bump, &'bump Node<'bump>>,
    ) -> Option<&'bump Node<'bump>> {
        self.advance(session); // 'enum'
        if is_extern {
            self.error_at(ParseErrorKind::InvalidDeclaration, start.clone(), "'extern enum' is not allowed", self.current().kind, session);
        }
        let name_tok = self.expect(TokenKind::Ident, "expected an enum name", session)?;
        let name = name_tok.text().expect("Ident always carries text");
        let base_type = if self.match_tok(TokenKind::Colon, session) {
            Some(self.parse_type(session)?)
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "expected '{' to start enum body", session)?;
        let mut options = self.ast.vec();
        if !self.check(TokenKind::RBrace) {
            loop {
                options.push(self.parse_enum_option(session)?);
                if !self.match_tok(TokenKind::Comma, session) {
                    break;
                }
                if self.check(TokenKind::RBrace) {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RBrace, "expected '}' to close enum body", session)?;
        Some(self.ast.alloc_with_attributes(
            NodeKind::Enum {
                name,
                base_type,
                options,
            },
            self.merge(start, close.location),
            attributes,
        ))
    }

    fn parse_enum_option(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let name_tok = self.expect(TokenKind::Ident, "expected an enum option name", session)?;
        let name = name_tok.text().expect("Ident always carries text");
        let value = if self.match_tok(TokenKind::Assign, session) {
            Some(self.parse_expression(session)?)
        } else {
            None
        };
        let end = value.map(|n| n.location).unwrap_or(name_tok.location);
        Some(self.ast.alloc(NodeKind::EnumOption { name, value }, self.merge(name_tok.location, end)))
    }

    // ── Struct / class ──────────────────────────────────────────────────

    /// `('struct' | 'class') name genericParams? (':' typeExpr)? '{' member* '}'`
    fn parse_struct_or_class_declaration(
        &mut self,
        session: &mut Session<'bump>,
        start: Location,
        is_extern: bool,
        attributes: cxy_common::ArenaVec<'bump, &'bump Node<'bump>>,
    ) -> Option<&'bump Node<'bump>> {
        let is_class = self.check(TokenKind::Class);
        self.advance(session); // struct/class
        if is_extern {
            self.error_at(
                ParseErrorKind::InvalidDeclaration,
                start.clone(),
                "'extern struct'/'extern class' is not allowed",
                self.current().kind,
                session,
            );
        }
        let name_tok = self.expect(TokenKind::Ident, "expected a type name", session)?;
        let name = name_tok.text().expect("Ident always carries text");
        let generic_params = if self.check(TokenKind::Lt) {
            Some(self.parse_generic_param_list(session)?)
        } else {
            None
        };
        let base = if is_class && self.match_tok(TokenKind::Colon, session) {
            Some(self.parse_type(session)?)
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "expected '{' to start type body", session)?;
        let mut members = self.ast.vec();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            if self.check(TokenKind::Backtick) {
                members.push(self.parse_annotation(session)?);
                continue;
            }
            match self.parse_member(session) {
                Some(member) => members.push(member),
                None => self.synchronize(session),
            }
        }
        let close = self.expect(TokenKind::RBrace, "expected '}' to close type body", session)?;
        let decl = self.ast.alloc_with_attributes(
            NodeKind::Struct {
                name,
                is_class,
                base,
                members,
            },
            self.merge(start, close.location),
            attributes,
        );
        Some(self.wrap_generic(decl, generic_params))
    }

    /// `` `ident = expr` ``, a struct/class-body annotation.
    fn parse_annotation(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // '`'
        let name_tok = self.expect(TokenKind::Ident, "expected an annotation name", session)?;
        let callee = self.ast.alloc(
            NodeKind::Identifier {
                name: name_tok.text().expect("Ident always carries text"),
                resolved: std::cell::Cell::new(None),
            },
            name_tok.location,
        );
        self.expect(TokenKind::Assign, "expected '=' in annotation", session)?;
        let value = self.parse_expression(session)?;
        let mut args = self.ast.vec();
        args.push(value);
        Some(self.ast.alloc(NodeKind::Call { callee, args }, self.merge(start, value.location)))
    }

    /// `member := visibility? (field | funcDecl | typeDecl)`,
    /// `visibility := 'pub' | 'priv'`. Members are public by default (see
    /// DESIGN.md); a leading `pub` is accepted but redundant, while `priv`
    /// flips visibility off.
    fn parse_member(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.match_tok(TokenKind::Pub, session);
        let is_private = self.match_tok(TokenKind::Priv, session);

        match self.current().kind {
            TokenKind::Func => self.parse_func_declaration(session, start, false, self.ast.vec()),
            TokenKind::Type => self.parse_type_alias_declaration(session, start, self.ast.vec()),
            TokenKind::Ident => self.parse_field(session, is_private),
            _ => {
                let tok = self.current();
                self.error_at(
                    ParseErrorKind::InvalidDeclaration,
                    tok.location,
                    format!("expected a struct/class member, found {:?}", tok.kind),
                    tok.kind,
                    session,
                );
                None
            }
        }
    }

    /// `field := name type ('=' expr)? (';' optional)`. Public by default
    /// unless prefixed by `priv` (see DESIGN.md): absence of a modifier
    /// inside a struct/class body means public, and `priv` clears
    /// [`flags::PUBLIC`].
    fn parse_field(&mut self, session: &mut Session<'bump>, is_private: bool) -> Option<&'bump Node<'bump>> {
        let name_tok = self.expect(TokenKind::Ident, "expected a field name", session)?;
        let name = name_tok.text().expect("Ident always carries text");
        let type_expr = self.parse_type(session)?;
        let init = if self.match_tok(TokenKind::Assign, session) {
            Some(self.parse_expression(session)?)
        } else {
            None
        };
        self.match_tok(TokenKind::Semicolon, session);
        let end = init.map(|n| n.location).unwrap_or(type_expr.location);
        let field = self.ast.alloc(
            NodeKind::Field { name, type_expr, init },
            self.merge(name_tok.location, end),
        );
        if is_private {
            field.set_flag(flags::EXPLICIT_PRIVATE);
        } else {
            field.set_flag(flags::PUBLIC);
        }
        Some(field)
    }

    // ── Generic parameters ──────────────────────────────────────────────

    /// `'<' typeParam (',' typeParam)* (',')? '>'`
    fn parse_generic_param_list(&mut self, session: &mut Session<'bump>) -> Option<cxy_common::ArenaVec<'bump, &'bump Node<'bump>>> {
        self.lexer.enter_template_context();
        self.advance(session); // '<'
        let mut params = self.ast.vec();
        let mut seen_variadic = false;
        let mut seen_default = false;
        if !self.check(TokenKind::Gt) {
            loop {
                let param = self.parse_type_parameter(session)?;
                if seen_variadic {
                    self.error_at(
                        ParseErrorKind::InvalidDeclaration,
                        param.location,
                        "at most one variadic type parameter is allowed, and it must be last",
                        self.current().kind,
                        session,
                    );
                }
                let is_variadic = param.has_flag(flags::VARIADIC);
                let has_default = matches!(param.kind, NodeKind::TypeParameter { default: Some(_), .. });
                if has_default {
                    seen_default = true;
                } else if seen_default {
                    self.error_at(
                        ParseErrorKind::InvalidDeclaration,
                        param.location,
                        "non-defaulted type parameters must come before defaulted ones",
                        self.current().kind,
                        session,
                    );
                }
                if is_variadic {
                    seen_variadic = true;
                }
                params.push(param);
                if !self.match_tok(TokenKind::Comma, session) {
                    break;
                }
                if self.check(TokenKind::Gt) {
                    break;
                }
            }
        }
        self.expect(TokenKind::Gt, "expected '>' to close generic parameter list", session)?;
        self.lexer.exit_template_context();
        Some(params)
    }

    /// `typeParam := '...'? name (':' typeExpr)? ('=' typeExpr)?`
    fn parse_type_parameter(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        let variadic = self.match_tok(TokenKind::DotDotDot, session);
        let name_tok = self.expect(TokenKind::Ident, "expected a type parameter name", session)?;
        let name = name_tok.text().expect("Ident always carries text");
        let constraint = if self.match_tok(TokenKind::Colon, session) {
            Some(self.parse_type(session)?)
        } else {
            None
        };
        let default = if self.match_tok(TokenKind::Assign, session) {
            Some(self.parse_type(session)?)
        } else {
            None
        };
        let end = default
            .map(|n| n.location)
            .or(constraint.map(|n| n.location))
            .unwrap_or(name_tok.location);
        let param = self.ast.alloc(
            NodeKind::TypeParameter {
                name,
                variadic,
                constraint,
                default,
            },
            self.merge(start, end),
        );
        if variadic {
            param.set_flag(flags::VARIADIC);
        }
        Some(param)
    }

    fn wrap_generic(
        &self,
        decl: &'bump Node<'bump>,
        generic_params: Option<cxy_common::ArenaVec<'bump, &'bump Node<'bump>>>,
    ) -> &'bump Node<'bump> {
        match generic_params {
            Some(type_params) => self.ast.alloc(NodeKind::Generic { type_params, decl }, decl.location),
            None => decl,
        }
    }

    // ── Import ───────────────────────────────────────────────────────────

    /// Four accepted forms: `import "path"`, `import "path" as name`,
    /// `import { a, b } from "path"`, and `import * as name from "path"`.
    fn parse_import_declaration(&mut self, session: &mut Session<'bump>) -> Option<&'bump Node<'bump>> {
        let start = self.current().location;
        self.advance(session); // 'import'
        let is_test = self.match_tok(TokenKind::Test, session);

        if self.check(TokenKind::StringLiteral) {
            let path_tok = self.advance(session);
            let path = string_value(path_tok);
            let alias = if self.match_tok(TokenKind::As, session) {
                let tok = self.expect(TokenKind::Ident, "expected an alias after 'as'", session)?;
                Some(tok.text().expect("Ident always carries text"))
            } else {
                None
            };
            let kind = if alias.is_some() {
                ImportKind::ModuleAlias
            } else {
                ImportKind::WholeModule
            };
            if kind == ImportKind::WholeModule && path.as_str().ends_with(".h") {
                self.error_at(
                    ParseErrorKind::InvalidDeclaration,
                    path_tok.location,
                    "a header file import requires an alias ('as') or a named-imports form",
                    path_tok.kind,
                    session,
                );
            }
            let kind = if is_test { ImportKind::ConditionalTest } else { kind };
            let end = self.previous().map(|t| t.location).unwrap_or(path_tok.location);
            return Some(self.ast.alloc(
                NodeKind::Import {
                    kind,
                    path,
                    alias,
                    entities: Vec::new(),
                },
                self.merge(start, end),
            ));
        }

        let entities = if self.match_tok(TokenKind::LBrace, session) {
            let mut items = Vec::new();
            if self.check(TokenKind::RBrace) {
                self.error_at(
                    ParseErrorKind::InvalidDeclaration,
                    self.current().location,
                    "an import list cannot be empty",
                    self.current().kind,
                    session,
                );
            }
            loop {
                let name_tok = self.expect(TokenKind::Ident, "expected an import name", session)?;
                let name = name_tok.text().expect("Ident always carries text");
                let alias = if self.match_tok(TokenKind::As, session) {
                    let tok = self.expect(TokenKind::Ident, "expected an alias after 'as'", session)?;
                    Some(tok.text().expect("Ident always carries text"))
                } else {
                    None
                };
                items.push(ImportItem { name, alias });
                if !self.match_tok(TokenKind::Comma, session) {
                    break;
                }
                if self.check(TokenKind::RBrace) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace, "expected '}' to close import list", session)?;
            items
        } else {
            let name_tok = self.expect(TokenKind::Ident, "expected an import name", session)?;
            let name = name_tok.text().expect("Ident always carries text");
            let alias = if self.match_tok(TokenKind::As, session) {
                let tok = self.expect(TokenKind::Ident, "expected an alias after 'as'", session)?;
                Some(tok.text().expect("Ident always carries text"))
            } else {
                None
            };
            vec![ImportItem { name, alias }]
        };
        self.expect(TokenKind::From, "expected 'from' in named import", session)?;
        let path_tok = self.expect(TokenKind::StringLiteral, "expected a module path string after 'from'", session)?;
        let path = string_value(path_tok);
        let kind = if is_test { ImportKind::ConditionalTest } else { ImportKind::MultipleImports };
        let end = path_tok.location;
        Some(self.ast.alloc(
            NodeKind::Import {
                kind,
                path,
                alias: None,
                entities,
            },
            self.merge(start, end),
        ))
    }
}

fn string_value(tok: cxy_common::Token<'_>) -> cxy_common::InternedStr<'_> {
    match tok.value {
        Some(Value::Str(s)) => s,
        _ => unreachable!("StringLiteral token always carries a Str value"),
    }
}

/// Spelling for the single-token operators allowed as overload names:
/// arithmetic, comparison, bitwise binary, logical binary, inc/dec, and
/// compound-assignment forms. `()`/`[]`/`[]=` are handled separately in
/// [`Parser::parse_operator_name`] since they are two or three tokens in the
/// ordinary token stream.
fn operator_symbol(kind: TokenKind) -> Option<&'static str> {
    use TokenKind::*;
    Some(match kind {
        Plus => "+",
        Minus => "-",
        Star => "*",
        Slash => "/",
        Percent => "%",
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Le => "<=",
        Gt => ">",
        Ge => ">=",
        Amp => "&",
        Pipe => "|",
        Caret => "^",
        Shl => "<<",
        Shr => ">>",
        AmpAmp => "&&",
        PipePipe => "||",
        PlusPlus => "++",
        MinusMinus => "--",
        PlusAssign => "+=",
        MinusAssign => "-=",
        StarAssign => "*=",
        SlashAssign => "/=",
        PercentAssign => "%=",
        AmpAssign => "&=",
        PipeAssign => "|=",
        CaretAssign => "^=",
        ShlAssign => "<<=",
        ShrAssign => ">>=",
        _ => return None,
    })
}
