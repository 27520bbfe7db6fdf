//! Escape-sequence decoding shared by character and string literals.
//!
//! `\n \r \t \\ \' \" \0` map to canonical ASCII; `\xNN` is the low 8
//! bits of two hex digits; `\uNNNN` is exactly four hex digits; `\u{H+}` is
//! variable-length (braces required, empty body is an error); `\UNNNNNNNN`
//! is exactly eight hex digits. Any other `\c` is `InvalidEscape`. `\{`
//! and `\}` are additionally accepted, but only inside string literals --
//! a character literal has no interpolation syntax to escape braces for.

use crate::cursor::Cursor;

pub enum EscapeResult {
    Scalar(char),
    /// A `\xNN`/`\uNNNN`/`\u{H+}`/`\UNNNNNNNN` escape decoded to a surrogate
    /// half or a code point past U+10FFFF. The caller substitutes the
    /// replacement character and reports `InvalidUtf8`.
    InvalidCodePoint,
    /// The escape was malformed; the caller should report `InvalidEscape`
    /// (or a more specific kind) and treat the token as an `Error`.
    Invalid(&'static str),
}

/// Decode one escape sequence. Assumes the leading `\` has already been
/// consumed and `cursor` is positioned at the character after it.
/// `in_string` gates `\{`/`\}`, which are only valid inside string literals.
pub fn decode_escape(cursor: &mut Cursor<'_>, in_string: bool) -> EscapeResult {
    let Some(c) = cursor.advance() else {
        return EscapeResult::Invalid("unterminated escape sequence");
    };
    match c {
        'n' => EscapeResult::Scalar('\n'),
        'r' => EscapeResult::Scalar('\r'),
        't' => EscapeResult::Scalar('\t'),
        '\\' => EscapeResult::Scalar('\\'),
        '\'' => EscapeResult::Scalar('\''),
        '"' => EscapeResult::Scalar('"'),
        '0' => EscapeResult::Scalar('\0'),
        '{' if in_string => EscapeResult::Scalar('{'),
        '}' if in_string => EscapeResult::Scalar('}'),
        'x' => decode_fixed_hex_escape(cursor, 2),
        'U' => decode_fixed_hex_escape(cursor, 8),
        'u' => {
            if cursor.peek() == Some('{') {
                decode_braced_hex_escape(cursor)
            } else {
                decode_fixed_hex_escape(cursor, 4)
            }
        }
        _ => EscapeResult::Invalid("unrecognized escape sequence"),
    }
}

fn decode_fixed_hex_escape(cursor: &mut Cursor<'_>, digits: usize) -> EscapeResult {
    let mut value: u32 = 0;
    for _ in 0..digits {
        match cursor.peek().and_then(|c| c.to_digit(16)) {
            Some(d) => {
                cursor.advance();
                value = value * 16 + d;
            }
            None => return EscapeResult::Invalid("incomplete hex escape"),
        }
    }
    scalar_from_code_point(value)
}

fn decode_braced_hex_escape(cursor: &mut Cursor<'_>) -> EscapeResult {
    cursor.advance(); // consume '{'
    let mut value: u32 = 0;
    let mut digit_count = 0;
    while let Some(d) = cursor.peek().and_then(|c| c.to_digit(16)) {
        cursor.advance();
        value = value.saturating_mul(16).saturating_add(d);
        digit_count += 1;
    }
    if digit_count == 0 {
        return EscapeResult::Invalid("empty unicode escape");
    }
    if cursor.peek() != Some('}') {
        return EscapeResult::Invalid("unterminated unicode escape, expected '}'");
    }
    cursor.advance(); // consume '}'
    scalar_from_code_point(value)
}

fn scalar_from_code_point(value: u32) -> EscapeResult {
    match char::from_u32(value) {
        Some(c) => EscapeResult::Scalar(c),
        // Surrogates and out-of-range code points decode to the replacement
        // character; the caller reports InvalidUtf8 alongside it.
        None => EscapeResult::InvalidCodePoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(src: &str) -> char {
        let mut cursor = Cursor::new(src);
        match decode_escape(&mut cursor, true) {
            EscapeResult::Scalar(c) => c,
            EscapeResult::InvalidCodePoint => panic!("expected scalar, got an invalid code point"),
            EscapeResult::Invalid(msg) => panic!("expected scalar, got invalid: {msg}"),
        }
    }

    #[test]
    fn simple_escapes() {
        assert_eq!(decode("n"), '\n');
        assert_eq!(decode("t"), '\t');
        assert_eq!(decode("0"), '\0');
    }

    #[test]
    fn fixed_hex_escapes() {
        assert_eq!(decode("x41"), 'A');
        assert_eq!(decode("u0041"), 'A');
        assert_eq!(decode("U00000041"), 'A');
    }

    #[test]
    fn braced_unicode_escape() {
        assert_eq!(decode("u{1F600}"), '\u{1F600}');
        assert_eq!(decode("u{41}"), 'A');
    }

    #[test]
    fn empty_braced_escape_is_invalid() {
        let mut cursor = Cursor::new("u{}");
        assert!(matches!(decode_escape(&mut cursor, true), EscapeResult::Invalid(_)));
    }

    #[test]
    fn surrogate_code_point_is_reported_invalid() {
        let mut cursor = Cursor::new("u{D800}");
        assert!(matches!(decode_escape(&mut cursor, true), EscapeResult::InvalidCodePoint));
    }

    #[test]
    fn unknown_escape_is_invalid() {
        let mut cursor = Cursor::new("q");
        assert!(matches!(decode_escape(&mut cursor, true), EscapeResult::Invalid(_)));
    }

    #[test]
    fn braces_are_valid_only_in_strings() {
        let mut cursor = Cursor::new("{");
        assert!(matches!(decode_escape(&mut cursor, true), EscapeResult::Scalar('{')));

        let mut cursor = Cursor::new("{");
        assert!(matches!(decode_escape(&mut cursor, false), EscapeResult::Invalid(_)));

        let mut cursor = Cursor::new("}");
        assert!(matches!(decode_escape(&mut cursor, false), EscapeResult::Invalid(_)));
    }
}
