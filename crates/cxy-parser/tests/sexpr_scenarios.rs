//! End-to-end parse-then-dump tests over the public `Parser` API.
//!
//! One test per small source snippet: each parses a fixed input and
//! compares the `cxy-fmt` S-expression dump against the expected
//! structural output.

use std::sync::Arc;

use cxy_common::{Arena, FileName, Session};
use cxy_parser::Parser;

fn filename(name: &str) -> FileName {
    Arc::from(name)
}

fn parse_expr_sexpr(source: &str) -> String {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(source);
    let mut parser = Parser::new(filename("t.cxy"), content, &mut session);
    let expr = parser.parse_expression(&mut session).expect("expression should parse");
    assert_eq!(session.diagnostics.error_count(), 0);
    cxy_fmt::format_node(expr)
}

fn parse_stmt_sexpr(source: &str) -> String {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(source);
    let mut parser = Parser::new(filename("t.cxy"), content, &mut session);
    let stmt = parser.parse_statement(&mut session).expect("statement should parse");
    assert_eq!(session.diagnostics.error_count(), 0);
    cxy_fmt::format_node(stmt)
}

fn parse_decl_sexpr(source: &str) -> String {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(source);
    let mut parser = Parser::new(filename("t.cxy"), content, &mut session);
    let decl = parser.parse_declaration(&mut session).expect("declaration should parse");
    assert_eq!(session.diagnostics.error_count(), 0);
    cxy_fmt::format_node(decl)
}

/// Operator precedence: `a + b * c == d && e` nests `*` inside `+` inside
/// `==` inside `&&`. Identifiers render fully wrapped as `(Identifier x)`
/// throughout, matching every other case in this file.
#[test]
fn operator_precedence_nests_by_binding_strength() {
    let dump = parse_expr_sexpr("a + b * c == d && e");
    assert_eq!(
        dump,
        "(Binary && (Binary == (Binary + (Identifier a) (Binary * (Identifier b) (Identifier c))) (Identifier d)) (Identifier e))"
    );
}

/// Conditional variable in `if`: `if const x = getValue() { println(x) }`.
#[test]
fn conditional_variable_declaration_in_if() {
    let dump = parse_stmt_sexpr("if const x = getValue() { println(x) }");
    assert_eq!(
        dump,
        "(IfStmt (VariableDeclaration (Identifier x) (CallExpr (Identifier getValue))) (BlockStmt (ExprStmt (CallExpr (Identifier println) (Identifier x)))))"
    );
}

/// Generic function: `func max<T>(a i32, b i32) i32 => a`.
#[test]
fn generic_function_declaration() {
    let dump = parse_decl_sexpr("func max<T>(a i32, b i32) i32 => a");
    assert_eq!(
        dump,
        "(GenericDeclaration (TypeParameterDeclaration (Identifier T)) (FuncDeclaration (Identifier max) (FuncParamDeclaration (Identifier a) (Type i32)) (FuncParamDeclaration (Identifier b) (Type i32)) (Type i32) (Identifier a)))"
    );
}

/// Array-of-optionals type in a declaration: `var buf: [10]?i32`.
#[test]
fn array_of_optionals_type_declaration() {
    let dump = parse_decl_sexpr("var buf: [10]?i32");
    assert_eq!(dump, "(VariableDeclaration (Identifier buf) (ArrayType (Int 10) (OptionalType (Type i32))))");
}

/// A whole-module import of a header file requires an alias or
/// named-imports form.
#[test]
fn whole_module_import_of_header_requires_alias() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("import \"foo.h\"");
    let mut parser = Parser::new(filename("t.cxy"), content, &mut session);
    parser.parse_declaration(&mut session);
    assert_eq!(session.diagnostics.error_count(), 1);
}

/// The same header import is fine once it has an alias.
#[test]
fn aliased_header_import_is_accepted() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("import \"foo.h\" as foo");
    let mut parser = Parser::new(filename("t.cxy"), content, &mut session);
    parser.parse_declaration(&mut session);
    assert_eq!(session.diagnostics.error_count(), 0);
}

/// Snapshot of a `while` loop's S-expression dump, inline rather than an
/// external `.snap` fixture so the baseline is readable without running
/// the suite that would otherwise generate it.
#[test]
fn snapshot_of_while_loop() {
    let dump = parse_stmt_sexpr("while i < 10 { i = i + 1 }");
    insta::assert_snapshot!(dump, @"(WhileStmt (Binary < (Identifier i) (Int 10)) (BlockStmt (ExprStmt (AssignExpr = (Identifier i) (Binary + (Identifier i) (Int 1))))))");
}
