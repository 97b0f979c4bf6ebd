//! Identifier and literal quoting
//!
//! Pure helpers that make a name or a value safe to splice into SQL text.
//! The [`QueryBuilder`](crate::query_builder::QueryBuilder) routes all of its
//! quoted output through the `*_into` variants so both paths share one escaping
//! rule.

use std::fmt::Write;

/// Default MySQL identifier delimiter
pub const IDENTIFIER_QUOTE: char = '`';

/// Default MySQL string literal delimiter
pub const STRING_QUOTE: char = '\'';

/// Check whether `name` can be emitted without quoting.
///
/// Only plain ASCII words are accepted, so keywords and anything unusual
/// still end up quoted by the callers that care.
pub fn is_safe_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !(first == '_' || first.is_ascii_alphabetic()) {
        return false;
    }

    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Append `name` to `out` with every `quote` character doubled.
pub fn escape_identifier_into(out: &mut String, name: &str, quote: char) {
    for c in name.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
}

/// Quote an identifier with backticks.
///
/// # Example
///
/// ```
/// use xcrud_sql::quoting::quote_identifier;
///
/// assert_eq!(quote_identifier("users"), "`users`");
/// assert_eq!(quote_identifier("we`ird"), "`we``ird`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    quote_identifier_with(name, IDENTIFIER_QUOTE)
}

/// Quote an identifier with a caller-chosen delimiter.
pub fn quote_identifier_with(name: &str, quote: char) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    escape_identifier_into(&mut out, name, quote);
    out.push(quote);
    out
}

/// Quote an identifier only when it is not a plain word.
pub fn quote_identifier_if_needed(name: &str) -> String {
    if is_safe_identifier_name(name) {
        name.to_string()
    } else {
        quote_identifier(name)
    }
}

/// Append `value` to `out` escaped for a string literal delimited by `quote`.
///
/// With `backslash_escapes` the MySQL escape set is used (`\0`, `\n`, `\r`,
/// `\\`, `\'`, `\"`, `\Z`). Without it (`NO_BACKSLASH_ESCAPES`) backslashes
/// are literal and only the delimiter is doubled.
pub fn escape_string_into(out: &mut String, value: &str, quote: char, backslash_escapes: bool) {
    if !backslash_escapes {
        escape_identifier_into(out, value, quote);
        return;
    }

    for c in value.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

/// Quote a string literal using MySQL's default escaping.
///
/// # Example
///
/// ```
/// use xcrud_sql::quoting::quote_string;
///
/// assert_eq!(quote_string("it's"), "'it\\'s'");
/// ```
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(STRING_QUOTE);
    escape_string_into(&mut out, value, STRING_QUOTE, true);
    out.push(STRING_QUOTE);
    out
}

/// Render raw bytes as a hexadecimal literal, `X'0A1B'`.
pub fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out.push('\'');
    out
}

/// Check whether `name` may follow a `.` in a JSON path without quoting.
///
/// Only the ASCII subset of ECMAScript identifiers qualifies; any other name
/// is written as a quoted member.
pub fn is_json_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    let Some(first) = bytes.next() else {
        return false;
    };

    if !(first.is_ascii_alphabetic() || first == b'_' || first == b'$') {
        return false;
    }

    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
}

/// Append a JSON path member step for `name` to `out`.
///
/// Plain names become `.name`; everything else is written as a double-quoted
/// JSON string, `."first name"`.
pub fn push_json_member(out: &mut String, name: &str) {
    out.push('.');
    if is_json_identifier(name) {
        out.push_str(name);
        return;
    }

    out.push('"');
    for c in name.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_safe_identifier_name() {
        assert!(is_safe_identifier_name("users"));
        assert!(is_safe_identifier_name("_tmp1"));
        assert!(!is_safe_identifier_name(""));
        assert!(!is_safe_identifier_name("1abc"));
        assert!(!is_safe_identifier_name("first name"));
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("a"), "`a`");
        assert_eq!(quote_identifier("a`b"), "`a``b`");
        assert_eq!(quote_identifier("``"), "``````");
        assert_eq!(quote_identifier_with("a\"b", '"'), "\"a\"\"b\"");
    }

    #[test]
    fn test_quote_identifier_if_needed() {
        assert_eq!(quote_identifier_if_needed("abc"), "abc");
        assert_eq!(quote_identifier_if_needed("a-b"), "`a-b`");
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quote_string("x"), "'x'");
        assert_eq!(quote_string("a'b"), "'a\\'b'");
        assert_eq!(quote_string("a\\b"), "'a\\\\b'");
        assert_eq!(quote_string("line\nbreak"), "'line\\nbreak'");
        assert_eq!(quote_string("\0\x1a"), "'\\0\\Z'");
    }

    #[test]
    fn test_escape_without_backslashes() {
        let mut out = String::new();
        escape_string_into(&mut out, "a'b\\c", '\'', false);
        assert_eq!(out, "a''b\\c");
    }

    #[test]
    fn test_hex_literal() {
        assert_eq!(hex_literal(&[0x00, 0xff, 0x1a]), "X'00FF1A'");
        assert_eq!(hex_literal(&[]), "X''");
    }

    #[test]
    fn test_json_member() {
        let mut out = String::new();
        push_json_member(&mut out, "name");
        push_json_member(&mut out, "first name");
        push_json_member(&mut out, "q\"uote");
        assert_eq!(out, ".name.\"first name\".\"q\\\"uote\"");
    }

    #[test]
    fn test_json_identifier_is_ascii_only() {
        assert!(is_json_identifier("_a$1"));
        assert!(is_json_identifier("$"));
        assert!(!is_json_identifier("1a"));
        assert!(!is_json_identifier("\u{24B6}"));
        assert!(!is_json_identifier("\u{0345}x"));
        assert!(!is_json_identifier("caf\u{e9}"));
    }
}
