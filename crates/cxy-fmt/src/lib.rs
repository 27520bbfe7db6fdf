//! S-expression dump formatter: renders any AST node as
//! `(Tag atom... child...)`, the shape the golden-file test suite and the
//! debug dumps compare against. Uses [`cxy_ast::NodeKind::tag`] for the
//! display name of each variant; the atoms/children printed alongside that
//! tag are driven by a direct match over `NodeKind` here rather than
//! [`cxy_ast::NodeKind::children`], since several variants print a name or
//! operator as a leading atom (e.g. `(FuncDeclaration (Identifier max) ...)`)
//! that `children()` deliberately omits (it only walks sub-nodes).
//!
//! Convention followed throughout [`write_node`]: every atom or child a
//! variant prints is preceded by exactly one space written at its own call
//! site (`out.push(' ')` then the content), so `(Tag` never needs special
//! casing for "first vs. rest".

use cxy_ast::{AssignOp, BinaryOp, CastKind, ImportKind, Literal, MatchArm, Node, NodeKind, StringPart, SwitchCase, UnaryOp};

/// Render `node` and its whole subtree as one S-expression.
pub fn format_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_ident(name: &str, out: &mut String) {
    out.push_str("(Identifier ");
    out.push_str(name);
    out.push(')');
}

fn write_node(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::Literal(lit) => write_literal(lit, out),

        NodeKind::Identifier { name, .. } => write_ident(name.as_str(), out),
        NodeKind::QualifiedPath { rooted, segments } => open(node.kind.tag(), out, |out| {
            for (i, seg) in segments.iter().enumerate() {
                out.push(' ');
                if i == 0 && *rooted {
                    out.push_str("::");
                }
                out.push_str(seg.name.as_str());
                for arg in seg.type_args.iter() {
                    out.push(' ');
                    write_node(arg, out);
                }
            }
        }),

        NodeKind::Unary { op, prefix, operand } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            out.push_str(&unary_op_text(*op, *prefix));
            out.push(' ');
            write_node(operand, out);
        }),
        NodeKind::Binary { op, lhs, rhs } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            out.push_str(binary_op_text(*op));
            out.push(' ');
            write_node(lhs, out);
            out.push(' ');
            write_node(rhs, out);
        }),
        NodeKind::Ternary { cond, then_branch, else_branch } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(cond, out);
            out.push(' ');
            write_node(then_branch, out);
            out.push(' ');
            write_node(else_branch, out);
        }),
        NodeKind::Assignment { op, target, value } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            out.push_str(assign_op_text(*op));
            out.push(' ');
            write_node(target, out);
            out.push(' ');
            write_node(value, out);
        }),
        NodeKind::Group(inner) => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(inner, out);
        }),
        NodeKind::Cast { expr, type_expr, kind } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            out.push_str(cast_kind_text(*kind));
            out.push(' ');
            write_node(expr, out);
            out.push(' ');
            write_node(type_expr, out);
        }),
        NodeKind::Is { expr, type_expr } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(expr, out);
            out.push(' ');
            write_node(type_expr, out);
        }),
        NodeKind::Call { callee, args } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(callee, out);
            write_each(args.iter().copied(), out);
        }),
        NodeKind::Index { object, index } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(object, out);
            out.push(' ');
            write_node(index, out);
        }),
        NodeKind::Member { object, name, arrow } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(object, out);
            out.push(' ');
            out.push_str(if *arrow { "&." } else { "." });
            out.push_str(name.as_str());
        }),
        NodeKind::Array(elems) | NodeKind::Tuple(elems) => open(node.kind.tag(), out, |out| {
            write_each(elems.iter().copied(), out);
        }),
        NodeKind::StructLiteral { type_expr, fields } => open(node.kind.tag(), out, |out| {
            if let Some(t) = type_expr {
                out.push(' ');
                write_node(t, out);
            }
            for f in fields {
                out.push_str(" (Field ");
                out.push_str(f.name.as_str());
                out.push(' ');
                write_node(f.value, out);
                out.push(')');
            }
        }),
        NodeKind::MacroCall { name, args } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            out.push_str(name.as_str());
            write_each(args.iter().copied(), out);
        }),
        NodeKind::Closure { params, body } => open(node.kind.tag(), out, |out| {
            write_each(params.iter().copied(), out);
            out.push(' ');
            write_node(body, out);
        }),
        NodeKind::Range { start, end, inclusive } => open(node.kind.tag(), out, |out| {
            if let Some(s) = start {
                out.push(' ');
                write_node(s, out);
            }
            out.push(' ');
            out.push_str(if *inclusive { "..=" } else { ".." });
            if let Some(e) = end {
                out.push(' ');
                write_node(e, out);
            }
        }),
        NodeKind::Spread(inner) => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(inner, out);
        }),
        NodeKind::StringExpr(parts) => open(node.kind.tag(), out, |out| {
            for part in parts {
                out.push(' ');
                match part {
                    StringPart::Text(text) => {
                        out.push('"');
                        escape_into(text.as_str(), out);
                        out.push('"');
                    }
                    StringPart::Expr(e) => write_node(e, out),
                }
            }
        }),

        NodeKind::ExprStmt(e) | NodeKind::Defer(e) => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(e, out);
        }),
        NodeKind::Break | NodeKind::Continue | NodeKind::Error => {
            out.push('(');
            out.push_str(node.kind.tag());
            out.push(')');
        }
        NodeKind::Return(e) | NodeKind::Yield(e) => open(node.kind.tag(), out, |out| {
            if let Some(e) = e {
                out.push(' ');
                write_node(e, out);
            }
        }),
        NodeKind::Block(stmts) => open(node.kind.tag(), out, |out| write_each(stmts.iter().copied(), out)),
        NodeKind::If { cond, then_branch, else_branch } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(cond, out);
            out.push(' ');
            write_node(then_branch, out);
            if let Some(e) = else_branch {
                out.push(' ');
                write_node(e, out);
            }
        }),
        NodeKind::For { vars, range, cond, body } => open(node.kind.tag(), out, |out| {
            for v in vars {
                out.push(' ');
                write_ident(v.as_str(), out);
            }
            out.push(' ');
            write_node(range, out);
            if let Some(c) = cond {
                out.push(' ');
                write_node(c, out);
            }
            out.push(' ');
            write_node(body, out);
        }),
        NodeKind::While { cond, body } => open(node.kind.tag(), out, |out| {
            if let Some(c) = cond {
                out.push(' ');
                write_node(c, out);
            }
            out.push(' ');
            write_node(body, out);
        }),
        NodeKind::Switch { discriminant, cases } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(discriminant, out);
            for case in cases {
                out.push(' ');
                write_switch_case(case, out);
            }
        }),
        NodeKind::Match { discriminant, arms } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_node(discriminant, out);
            for arm in arms {
                out.push(' ');
                write_match_arm(arm, out);
            }
        }),

        NodeKind::Variable { names, type_expr, init } => open(node.kind.tag(), out, |out| {
            for n in names {
                out.push(' ');
                write_ident(n.as_str(), out);
            }
            if let Some(t) = type_expr {
                out.push(' ');
                write_node(t, out);
            }
            if let Some(i) = init {
                out.push(' ');
                write_node(i, out);
            }
        }),
        NodeKind::Func {
            name,
            operator_name,
            params,
            return_type,
            body,
        } => open(node.kind.tag(), out, |out| {
            if let Some(n) = name.or(*operator_name) {
                out.push(' ');
                write_ident(n.as_str(), out);
            }
            write_each(params.iter().copied(), out);
            if let Some(r) = return_type {
                out.push(' ');
                write_node(r, out);
            }
            if let Some(b) = body {
                out.push(' ');
                write_node(b, out);
            }
        }),
        NodeKind::FuncParam { name, type_expr, default } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_ident(name.as_str(), out);
            out.push(' ');
            write_node(type_expr, out);
            if let Some(d) = default {
                out.push(' ');
                write_node(d, out);
            }
        }),
        NodeKind::TypeAlias { name, type_expr } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_ident(name.as_str(), out);
            out.push(' ');
            write_node(type_expr, out);
        }),
        NodeKind::Enum { name, base_type, options } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_ident(name.as_str(), out);
            if let Some(b) = base_type {
                out.push(' ');
                write_node(b, out);
            }
            write_each(options.iter().copied(), out);
        }),
        NodeKind::EnumOption { name, value } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_ident(name.as_str(), out);
            if let Some(v) = value {
                out.push(' ');
                write_node(v, out);
            }
        }),
        NodeKind::Struct { name, base, members, .. } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_ident(name.as_str(), out);
            if let Some(b) = base {
                out.push(' ');
                write_node(b, out);
            }
            write_each(members.iter().copied(), out);
        }),
        NodeKind::Field { name, type_expr, init } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_ident(name.as_str(), out);
            out.push(' ');
            write_node(type_expr, out);
            if let Some(i) = init {
                out.push(' ');
                write_node(i, out);
            }
        }),
        NodeKind::Module { name, top_level, main_content } => open(node.kind.tag(), out, |out| {
            if let Some(n) = name {
                out.push(' ');
                write_ident(n.as_str(), out);
            }
            write_each(top_level.iter().copied(), out);
            write_each(main_content.iter().copied(), out);
        }),
        NodeKind::Import { kind, path, alias, entities } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            out.push_str(import_kind_text(*kind));
            out.push_str(" \"");
            escape_into(path.as_str(), out);
            out.push('"');
            if let Some(a) = alias {
                out.push(' ');
                write_ident(a.as_str(), out);
            }
            for item in entities {
                out.push_str(" (ImportItem ");
                out.push_str(item.name.as_str());
                if let Some(a) = item.alias {
                    out.push(' ');
                    write_ident(a.as_str(), out);
                }
                out.push(')');
            }
        }),
        NodeKind::Generic { type_params, decl } => open(node.kind.tag(), out, |out| {
            write_each(type_params.iter().copied(), out);
            out.push(' ');
            write_node(decl, out);
        }),
        NodeKind::TypeParameter {
            name,
            variadic,
            constraint,
            default,
        } => open(node.kind.tag(), out, |out| {
            out.push(' ');
            write_ident(name.as_str(), out);
            if *variadic {
                out.push_str(" ...");
            }
            if let Some(c) = constraint {
                out.push(' ');
                write_node(c, out);
            }
            if let Some(d) = default {
                out.push(' ');
                write_node(d, out);
            }
        }),

        NodeKind::PrimitiveType(tok) => open(node.kind.tag(), out, |out| {
            out.push(' ');
            out.push_str(tok.keyword_text().unwrap_or("?"));
        }),
        NodeKind::ArrayType { size, element } => open(node.kind.tag(), out, |out| {
            if let Some(s) = size {
                out.push(' ');
                write_node(s, out);
            }
            out.push(' ');
            write_node(element, out);
        }),
        NodeKind::TupleType(elems) | NodeKind::UnionType(elems) => open(node.kind.tag(), out, |out| {
            write_each(elems.iter().copied(), out);
        }),
        NodeKind::PointerType(t) | NodeKind::ReferenceType(t) | NodeKind::OptionalType(t) | NodeKind::ResultType(t) => {
            open(node.kind.tag(), out, |out| {
                out.push(' ');
                write_node(t, out);
            })
        }
        NodeKind::FunctionType { params, return_type } => open(node.kind.tag(), out, |out| {
            write_each(params.iter().copied(), out);
            out.push(' ');
            write_node(return_type, out);
        }),
    }
}

/// Wrap `body(out)`'s output in `(tag...)`. `body` is responsible for
/// writing its own leading space before every atom/child it emits.
fn open(tag: &str, out: &mut String, body: impl FnOnce(&mut String)) {
    out.push('(');
    out.push_str(tag);
    body(out);
    out.push(')');
}

fn write_each<'a, 'bump: 'a>(nodes: impl Iterator<Item = &'a Node<'bump>>, out: &mut String) {
    for n in nodes {
        out.push(' ');
        write_node(n, out);
    }
}

fn write_switch_case(case: &SwitchCase, out: &mut String) {
    out.push_str("(Case");
    if case.is_default {
        out.push_str(" ...");
    } else {
        write_each(case.values.iter().copied(), out);
    }
    write_each(case.body.iter().copied(), out);
    out.push(')');
}

fn write_match_arm(arm: &MatchArm, out: &mut String) {
    out.push_str("(Arm");
    if arm.is_default {
        out.push_str(" ...");
    } else {
        write_each(arm.types.iter().copied(), out);
    }
    if let Some(b) = arm.binding {
        out.push(' ');
        write_ident(b.as_str(), out);
    }
    out.push(' ');
    write_node(arm.body, out);
    out.push(')');
}

fn write_literal(lit: &Literal, out: &mut String) {
    match lit {
        Literal::Int(v, _) => {
            out.push_str("(Int ");
            out.push_str(&v.to_string());
            out.push(')');
        }
        Literal::Float(v, _) => {
            out.push_str("(Float ");
            out.push_str(&v.to_string());
            out.push(')');
        }
        Literal::Char(c) => {
            out.push_str("(Char '");
            out.push(*c);
            out.push_str("')");
        }
        Literal::Str(s) => {
            out.push_str("(String \"");
            escape_into(s.as_str(), out);
            out.push_str("\")");
        }
        Literal::Bool(b) => {
            out.push_str("(Bool ");
            out.push_str(if *b { "true" } else { "false" });
            out.push(')');
        }
        Literal::Null => out.push_str("(Null)"),
    }
}

fn escape_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
}

fn binary_op_text(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Rem => "%",
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Le => "<=",
        Gt => ">",
        Ge => ">=",
        And => "&&",
        Or => "||",
        BitAnd => "&",
        BitOr => "|",
        BitXor => "^",
        Shl => "<<",
        Shr => ">>",
    }
}

/// Prefix forms print the bare symbol (`++x` => `++`); postfix forms
/// (only possible for `Inc`/`Dec`) are distinguished with a `post` prefix
/// on the atom since the symbol itself is identical either way.
fn unary_op_text(op: UnaryOp, prefix: bool) -> String {
    use UnaryOp::*;
    let symbol = match op {
        Plus => "+",
        Neg => "-",
        Not => "!",
        BitNot => "~",
        Inc => "++",
        Dec => "--",
        AddrOf => "&",
        Caret => "^",
    };
    if prefix || !matches!(op, Inc | Dec) {
        symbol.to_string()
    } else {
        format!("post{symbol}")
    }
}

fn assign_op_text(op: AssignOp) -> &'static str {
    use AssignOp::*;
    match op {
        Assign => "=",
        Add => "+=",
        Sub => "-=",
        Mul => "*=",
        Div => "/=",
        Rem => "%=",
        BitAnd => "&=",
        BitOr => "|=",
        BitXor => "^=",
        Shl => "<<=",
        Shr => ">>=",
    }
}

fn cast_kind_text(kind: CastKind) -> &'static str {
    match kind {
        CastKind::As => "as",
        CastKind::Retype => "!:",
    }
}

fn import_kind_text(kind: ImportKind) -> &'static str {
    use ImportKind::*;
    match kind {
        WholeModule => "whole",
        ModuleAlias => "alias",
        MultipleImports => "multiple",
        ConditionalTest => "test",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxy_ast::{flags, AstArena};
    use cxy_common::{Arena, FloatKind, IntegerKind, Position};
    use std::sync::Arc;

    fn loc() -> cxy_common::Location {
        cxy_common::Location::at(Arc::from("a.cxy"), Position::start())
    }

    #[test]
    fn literal_int_renders_bare_value() {
        let arena = Arena::new();
        let ast = AstArena::new(&arena);
        let n = ast.alloc(NodeKind::Literal(Literal::Int(42, IntegerKind::Unsuffixed)), loc());
        assert_eq!(format_node(n), "(Int 42)");
    }

    #[test]
    fn literal_string_is_quoted() {
        let arena = Arena::new();
        let ast = AstArena::new(&arena);
        let mut interner = cxy_common::Interner::new(arena.bump());
        let s = interner.intern("hello");
        let n = ast.alloc(NodeKind::Literal(Literal::Str(s)), loc());
        assert_eq!(format_node(n), "(String \"hello\")");
    }

    #[test]
    fn binary_expression_nests_operands() {
        let arena = Arena::new();
        let ast = AstArena::new(&arena);
        let mut interner = cxy_common::Interner::new(arena.bump());
        let a = ast.alloc(NodeKind::Identifier { name: interner.intern("a"), resolved: Default::default() }, loc());
        let b = ast.alloc(NodeKind::Identifier { name: interner.intern("b"), resolved: Default::default() }, loc());
        let add = ast.alloc(NodeKind::Binary { op: BinaryOp::Add, lhs: a, rhs: b }, loc());
        assert_eq!(format_node(add), "(Binary + (Identifier a) (Identifier b))");
    }

    #[test]
    fn field_visibility_does_not_affect_the_dump() {
        let arena = Arena::new();
        let ast = AstArena::new(&arena);
        let mut interner = cxy_common::Interner::new(arena.bump());
        let ty = ast.alloc(NodeKind::PrimitiveType(cxy_common::TokenKind::I32), loc());
        let field = ast.alloc(
            NodeKind::Field {
                name: interner.intern("x"),
                type_expr: ty,
                init: None,
            },
            loc(),
        );
        field.set_flag(flags::PUBLIC);
        assert_eq!(format_node(field), "(FieldDeclaration (Identifier x) (Type i32))");
    }

    #[test]
    fn float_literal_renders_without_forced_decimal() {
        let arena = Arena::new();
        let ast = AstArena::new(&arena);
        let n = ast.alloc(NodeKind::Literal(Literal::Float(1.5, FloatKind::F64)), loc());
        assert_eq!(format_node(n), "(Float 1.5)");
    }
}
