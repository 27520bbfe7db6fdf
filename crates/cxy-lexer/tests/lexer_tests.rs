//! Integration tests over the public `Lexer` API.
//!
//! One test per construct: tokenize a small source string and assert on
//! the resulting token sequence. Assertions are direct on `TokenKind`
//! sequences and decoded `Value`s rather than snapshots, since a snapshot
//! baseline can't be hand-written without ever running the suite that
//! would generate it.

use std::sync::Arc;

use cxy_common::{Arena, FileName, IntegerKind, Session, TokenKind, Value};
use cxy_lexer::Lexer;

fn filename(name: &str) -> FileName {
    Arc::from(name)
}

/// Tokenize `source` to completion (through `Eof`), returning the kind
/// sequence and the number of errors the lexer reported along the way.
fn kinds_of(source: &str) -> (Vec<TokenKind>, usize) {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(source);
    let mut lexer = Lexer::new(filename("test.cxy"), content, &mut session);
    let mut kinds = Vec::new();
    loop {
        let token = lexer.next_token(&mut session);
        let done = token.kind == TokenKind::Eof;
        kinds.push(token.kind);
        if done {
            break;
        }
    }
    (kinds, session.diagnostics.error_count())
}

#[test]
fn punctuation_and_grouping() {
    let (kinds, errors) = kinds_of("( ) [ ] { } , ; ? ~ @ :");
    assert_eq!(errors, 0);
    assert_eq!(
        kinds,
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::Question,
            TokenKind::Tilde,
            TokenKind::At,
            TokenKind::Colon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn multi_character_operators() {
    let (kinds, errors) = kinds_of("== != <= >= && || -> => .. ... << >> ++ --");
    assert_eq!(errors, 0);
    assert_eq!(
        kinds,
        vec![
            TokenKind::Eq,
            TokenKind::Ne,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::Arrow,
            TokenKind::FatArrow,
            TokenKind::DotDot,
            TokenKind::DotDotDot,
            TokenKind::Shl,
            TokenKind::Shr,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn compound_assignment_operators() {
    let (kinds, _) = kinds_of("+= -= *= /= %= &= |= ^= <<= >>=");
    assert_eq!(
        kinds,
        vec![
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
            TokenKind::PercentAssign,
            TokenKind::AmpAssign,
            TokenKind::PipeAssign,
            TokenKind::CaretAssign,
            TokenKind::ShlAssign,
            TokenKind::ShrAssign,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn dot_variants_and_range_disambiguation() {
    // A lone `.` followed by another `.` never starts a float; `3..5` is
    // int, range, int, not a malformed float.
    let (kinds, _) = kinds_of("3..5");
    assert_eq!(
        kinds,
        vec![TokenKind::IntLiteral, TokenKind::DotDot, TokenKind::IntLiteral, TokenKind::Eof]
    );
}

#[test]
fn ampersand_dot_and_hash_variants() {
    let (kinds, _) = kinds_of("&. #. ## !: `");
    assert_eq!(
        kinds,
        vec![
            TokenKind::AmpDot,
            TokenKind::HashDot,
            TokenKind::HashHash,
            TokenKind::BangColon,
            TokenKind::Backtick,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_are_case_sensitive_and_distinct_from_identifiers() {
    let (kinds, _) = kinds_of("this This module func var struct myVar Structure");
    assert_eq!(
        kinds,
        vec![
            TokenKind::This,
            TokenKind::ThisType,
            TokenKind::Module,
            TokenKind::Func,
            TokenKind::Var,
            TokenKind::Struct,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn template_context_splits_shr_into_two_gt() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(">>");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    lexer.enter_template_context();
    let first = lexer.next_token(&mut session);
    let second = lexer.next_token(&mut session);
    lexer.exit_template_context();

    assert_eq!(first.kind, TokenKind::Gt);
    assert_eq!(second.kind, TokenKind::Gt);
}

#[test]
fn shr_outside_template_context_is_one_token() {
    let (kinds, _) = kinds_of(">>");
    assert_eq!(kinds, vec![TokenKind::Shr, TokenKind::Eof]);
}

#[test]
fn prefixed_integer_literals() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("0x1F 0b101 0o17");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let hex = lexer.next_token(&mut session);
    let bin = lexer.next_token(&mut session);
    let oct = lexer.next_token(&mut session);

    assert!(matches!(hex.value, Some(Value::Integer(31, IntegerKind::Unsuffixed))));
    assert!(matches!(bin.value, Some(Value::Integer(5, IntegerKind::Unsuffixed))));
    assert!(matches!(oct.value, Some(Value::Integer(15, IntegerKind::Unsuffixed))));
}

#[test]
fn hex_float_with_p_exponent() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("0x1.8p3 0x1p-1 0x2A");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let a = lexer.next_token(&mut session);
    let b = lexer.next_token(&mut session);
    let c = lexer.next_token(&mut session);

    assert_eq!(a.kind, TokenKind::FloatLiteral);
    assert!(matches!(a.value, Some(Value::Float(v, _)) if (v - 12.0).abs() < 1e-9));
    assert_eq!(b.kind, TokenKind::FloatLiteral);
    assert!(matches!(b.value, Some(Value::Float(v, _)) if (v - 0.5).abs() < 1e-9));
    assert_eq!(c.kind, TokenKind::IntLiteral);
    assert!(matches!(c.value, Some(Value::Integer(42, _))));
    assert_eq!(session.diagnostics.error_count(), 0);
}

#[test]
fn legacy_leading_zero_octal_is_reclassified() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("017 089");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let octal = lexer.next_token(&mut session);
    let decimal = lexer.next_token(&mut session);

    assert!(matches!(octal.value, Some(Value::Integer(15, _))), "017 is octal 15, got {:?}", octal.value);
    assert!(matches!(decimal.value, Some(Value::Integer(89, _))), "089 has an invalid octal digit, stays decimal 89");
}

#[test]
fn native_and_legacy_integer_suffixes() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("42i32 7u 10ul 5ll");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let a = lexer.next_token(&mut session);
    let b = lexer.next_token(&mut session);
    let c = lexer.next_token(&mut session);
    let d = lexer.next_token(&mut session);

    assert!(matches!(a.value, Some(Value::Integer(42, IntegerKind::I32))));
    assert!(matches!(b.value, Some(Value::Integer(7, IntegerKind::U32))));
    assert!(matches!(c.value, Some(Value::Integer(10, IntegerKind::U64))));
    assert!(matches!(d.value, Some(Value::Integer(5, IntegerKind::I64))));
    assert_eq!(session.diagnostics.error_count(), 0);
}

#[test]
fn integer_literal_overflow_clamps_and_reports() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("99999999999999999999999999999999999999999999");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let token = lexer.next_token(&mut session);
    assert!(matches!(token.value, Some(Value::Integer(u128::MAX, _))));
    assert!(session.diagnostics.error_count() > 0);
}

#[test]
fn float_literals_with_exponent_and_suffix() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("3.14 2e10 1.5e-3f 9.0d");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let a = lexer.next_token(&mut session);
    let b = lexer.next_token(&mut session);
    let c = lexer.next_token(&mut session);
    let d = lexer.next_token(&mut session);

    assert!(matches!(a.value, Some(Value::Float(v, _)) if (v - 3.14).abs() < 1e-9));
    assert!(matches!(b.value, Some(Value::Float(v, _)) if (v - 2e10).abs() < 1.0));
    assert!(matches!(c.value, Some(Value::Float(_, cxy_common::FloatKind::F32))));
    assert!(matches!(d.value, Some(Value::Float(_, cxy_common::FloatKind::F64))));
}

#[test]
fn bare_decimal_with_float_suffix_and_no_dot_or_exponent() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("3f 10d 42D");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let a = lexer.next_token(&mut session);
    let b = lexer.next_token(&mut session);
    let c = lexer.next_token(&mut session);

    assert_eq!(a.kind, TokenKind::FloatLiteral);
    assert!(matches!(a.value, Some(Value::Float(v, cxy_common::FloatKind::F32)) if (v - 3.0).abs() < 1e-9));
    assert_eq!(b.kind, TokenKind::FloatLiteral);
    assert!(matches!(b.value, Some(Value::Float(v, cxy_common::FloatKind::F64)) if (v - 10.0).abs() < 1e-9));
    assert_eq!(c.kind, TokenKind::FloatLiteral);
    assert!(matches!(c.value, Some(Value::Float(v, cxy_common::FloatKind::F64)) if (v - 42.0).abs() < 1e-9));
    assert_eq!(session.diagnostics.error_count(), 0);
}

#[test]
fn char_literal_with_simple_and_hex_escapes() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(r"'a' '\n' '\x41' '\u{1F600}'");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let a = lexer.next_token(&mut session);
    let newline = lexer.next_token(&mut session);
    let hex = lexer.next_token(&mut session);
    let emoji = lexer.next_token(&mut session);

    assert!(matches!(a.value, Some(Value::Char('a'))));
    assert!(matches!(newline.value, Some(Value::Char('\n'))));
    assert!(matches!(hex.value, Some(Value::Char('A'))));
    assert!(matches!(emoji.value, Some(Value::Char('\u{1F600}'))));
    assert_eq!(session.diagnostics.error_count(), 0);
}

#[test]
fn surrogate_escape_in_char_literal_substitutes_replacement_and_reports() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(r"'\u{D800}'");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let token = lexer.next_token(&mut session);
    assert_eq!(token.kind, TokenKind::CharLiteral);
    assert!(matches!(token.value, Some(Value::Char('\u{FFFD}'))));
    assert!(session.diagnostics.error_count() > 0);
}

#[test]
fn brace_escape_is_rejected_in_char_literal_but_accepted_in_string() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(r#"'\{' "\{\}""#);
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let bad_char = lexer.next_token(&mut session);
    assert_eq!(bad_char.kind, TokenKind::Error);
    assert!(session.diagnostics.has_errors());

    let errors_before_string = session.diagnostics.error_count();
    let string = lexer.next_token(&mut session);
    assert_eq!(string.kind, TokenKind::StringLiteral);
    assert!(matches!(string.value, Some(Value::Str(s)) if s.as_str() == "{}"));
    assert_eq!(session.diagnostics.error_count(), errors_before_string);
}

#[test]
fn unterminated_char_literal_is_an_error_token() {
    let (kinds, errors) = kinds_of("'a");
    assert_eq!(kinds, vec![TokenKind::Error, TokenKind::Eof]);
    assert!(errors > 0);
}

#[test]
fn plain_string_literal_round_trips_escapes() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(r#""hello\nworld""#);
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let token = lexer.next_token(&mut session);
    assert_eq!(token.kind, TokenKind::StringLiteral);
    match token.value {
        Some(Value::Str(s)) => assert_eq!(s.as_str(), "hello\nworld"),
        other => panic!("expected Str value, got {other:?}"),
    }
}

#[test]
fn raw_string_literal_keeps_backslashes_literal() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(r#"r"no \n escapes""#);
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let token = lexer.next_token(&mut session);
    assert_eq!(token.kind, TokenKind::StringLiteral);
    match token.value {
        Some(Value::Str(s)) => assert_eq!(s.as_str(), r"no \n escapes"),
        other => panic!("expected Str value, got {other:?}"),
    }
}

#[test]
fn string_interpolation_basic_fragments() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(r#""Hello {name}!""#);
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let open = lexer.next_token(&mut session);
    let ident = lexer.next_token(&mut session);
    let close = lexer.next_token(&mut session);
    let eof = lexer.next_token(&mut session);

    assert_eq!(open.kind, TokenKind::LString);
    match open.value {
        Some(Value::Str(s)) => assert_eq!(s.as_str(), "Hello "),
        other => panic!("expected Str value, got {other:?}"),
    }
    assert_eq!(ident.kind, TokenKind::Ident);
    assert_eq!(close.kind, TokenKind::RString);
    match close.value {
        Some(Value::Str(s)) => assert_eq!(s.as_str(), "!"),
        other => panic!("expected Str value, got {other:?}"),
    }
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(session.diagnostics.error_count(), 0);
}

#[test]
fn string_interpolation_tracks_nested_braces() {
    // The struct-literal braces inside the interpolated expression must
    // not be mistaken for the closing brace of the interpolation.
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str(r#""{ Point{x: 1, y: 2} }""#);
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let mut kinds = Vec::new();
    loop {
        let token = lexer.next_token(&mut session);
        let done = token.kind == TokenKind::Eof;
        kinds.push(token.kind);
        if done {
            break;
        }
    }
    assert_eq!(
        kinds,
        vec![
            TokenKind::LString,
            TokenKind::Ident,
            TokenKind::LBrace,
            TokenKind::Ident,
            TokenKind::Colon,
            TokenKind::IntLiteral,
            TokenKind::Comma,
            TokenKind::Ident,
            TokenKind::Colon,
            TokenKind::IntLiteral,
            TokenKind::RBrace,
            TokenKind::RString,
            TokenKind::Eof,
        ]
    );
    assert_eq!(session.diagnostics.error_count(), 0);
}

#[test]
fn empty_interpolation_is_reported() {
    let (kinds, errors) = kinds_of(r#""{}""#);
    assert_eq!(kinds, vec![TokenKind::LString, TokenKind::RString, TokenKind::Eof]);
    assert!(errors > 0);
}

#[test]
fn line_and_block_comments_are_skipped() {
    let (kinds, errors) = kinds_of("var x // trailing comment\n/* block */ var y");
    assert_eq!(errors, 0);
    assert_eq!(
        kinds,
        vec![
            TokenKind::Var,
            TokenKind::Ident,
            TokenKind::Var,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn nested_block_comments_track_depth() {
    let (kinds, errors) = kinds_of("/* outer /* inner */ still outer */ var x");
    assert_eq!(errors, 0);
    assert_eq!(kinds, vec![TokenKind::Var, TokenKind::Ident, TokenKind::Eof]);
}

#[test]
fn unterminated_block_comment_is_reported() {
    let (kinds, errors) = kinds_of("/* never closes");
    assert_eq!(kinds, vec![TokenKind::Eof]);
    assert!(errors > 0);
}

#[test]
fn unterminated_string_is_an_error_token() {
    let (kinds, errors) = kinds_of("\"never closes");
    assert_eq!(kinds, vec![TokenKind::Error, TokenKind::Eof]);
    assert!(errors > 0);
}

#[test]
fn include_stack_detects_recursive_include() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let root = arena.alloc_str("var x = 1");
    let mut lexer = Lexer::new(filename("main.cxy"), root, &mut session);

    let inc = arena.alloc_str("var y = 2");
    assert!(lexer.push_include(filename("inc.cxy"), inc, &mut session));
    assert_eq!(lexer.include_depth(), 2);

    let cyclic = arena.alloc_str("var z = 3");
    assert!(!lexer.push_include(filename("main.cxy"), cyclic, &mut session));
    assert_eq!(lexer.include_depth(), 2);
}

#[test]
fn operator_name_lexing_after_backtick() {
    let arena = Arena::new();
    let mut session = Session::new(&arena);
    let content = arena.alloc_str("`()` `[]` `[]=` `+`");
    let mut lexer = Lexer::new(filename("t.cxy"), content, &mut session);

    let open1 = lexer.next_token(&mut session);
    assert_eq!(open1.kind, TokenKind::Backtick);
    let call_op = lexer.lex_operator_name(&mut session);
    assert_eq!(call_op.kind, TokenKind::CallOp);
    let close1 = lexer.next_token(&mut session);
    assert_eq!(close1.kind, TokenKind::Backtick);

    let open2 = lexer.next_token(&mut session);
    assert_eq!(open2.kind, TokenKind::Backtick);
    let index_op = lexer.lex_operator_name(&mut session);
    assert_eq!(index_op.kind, TokenKind::IndexOp);
    let close2 = lexer.next_token(&mut session);
    assert_eq!(close2.kind, TokenKind::Backtick);

    let open3 = lexer.next_token(&mut session);
    assert_eq!(open3.kind, TokenKind::Backtick);
    let index_assign_op = lexer.lex_operator_name(&mut session);
    assert_eq!(index_assign_op.kind, TokenKind::IndexAssignOp);
    let close3 = lexer.next_token(&mut session);
    assert_eq!(close3.kind, TokenKind::Backtick);

    let open4 = lexer.next_token(&mut session);
    assert_eq!(open4.kind, TokenKind::Backtick);
    let plus_op = lexer.lex_operator_name(&mut session);
    assert_eq!(plus_op.kind, TokenKind::Plus);
    let close4 = lexer.next_token(&mut session);
    assert_eq!(close4.kind, TokenKind::Backtick);
}

#[test]
fn whitespace_only_and_empty_input_yield_only_eof() {
    assert_eq!(kinds_of("").0, vec![TokenKind::Eof]);
    assert_eq!(kinds_of("   \t  \n  ").0, vec![TokenKind::Eof]);
}

/// Snapshot the full token-kind sequence for a small declaration. Inline
/// rather than an external `.snap` fixture, since the baseline has to be
/// hand-written rather than generated by `cargo insta review`.
#[test]
fn snapshot_of_function_declaration_tokens() {
    let (kinds, errors) = kinds_of("func add(a i32, b i32) i32 => a + b");
    assert_eq!(errors, 0);
    insta::assert_snapshot!(format!("{kinds:?}"), @r#"[Func, Ident, LParen, Ident, I32, Comma, Ident, I32, RParen, I32, FatArrow, Ident, Plus, Ident, Eof]"#);
}
