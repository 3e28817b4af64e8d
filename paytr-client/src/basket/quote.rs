//! ASCII-only string quoting for basket entries.

use std::fmt::Write as _;

/// Quotes `s` as a double-quoted, ASCII-only string literal.
///
/// Printable ASCII passes through unchanged; `"` and `\` are backslash-escaped;
/// everything else becomes a `\u` escape. Supplementary-plane characters are
/// written as a UTF-16 surrogate pair so the result is always a valid JSON
/// string.
///
/// # Examples
///
/// ```
/// use paytr_client::basket::quote_to_ascii;
///
/// assert_eq!(quote_to_ascii("Örnek"), r#""\u00d6rnek""#);
/// assert_eq!(quote_to_ascii(r#"5" disk"#), r#""5\" disk""#);
/// ```
#[must_use]
pub fn quote_to_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        push_escaped(&mut out, ch);
    }
    out.push('"');
    out
}

#[allow(clippy::expect_used, reason = "writing to a String cannot fail")]
fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        ' '..='~' => out.push(ch),
        '\u{08}' => out.push_str("\\b"),
        '\u{0c}' => out.push_str("\\f"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        _ => {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(out, "\\u{unit:04x}").expect("writing to a String cannot fail");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ascii_is_unchanged() {
        assert_eq!(quote_to_ascii("Kalem"), "\"Kalem\"");
        assert_eq!(quote_to_ascii("18.00"), "\"18.00\"");
        assert_eq!(quote_to_ascii(""), "\"\"");
    }

    #[test]
    fn test_turkish_characters() {
        assert_eq!(quote_to_ascii("Örnek ürün 1"), r#""\u00d6rnek \u00fcr\u00fcn 1""#);
        assert_eq!(quote_to_ascii("şığ"), r#""\u015f\u0131\u011f""#);
    }

    #[test]
    fn test_quote_and_backslash() {
        assert_eq!(quote_to_ascii(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(quote_to_ascii("a\nb\tc"), r#""a\nb\tc""#);
        assert_eq!(quote_to_ascii("\u{07}\u{7f}"), r#""\u0007\u007f""#);
    }

    #[test]
    fn test_supplementary_plane_uses_surrogate_pair() {
        assert_eq!(quote_to_ascii("😀"), r#""\ud83d\ude00""#);
    }

    #[test]
    fn test_output_is_valid_json_string() {
        let input = "a\"b\\c\n\u{07}\u{7f}😀ş";
        let quoted = quote_to_ascii(input);
        assert!(quoted.is_ascii());
        let decoded: String = serde_json::from_str(&quoted).unwrap();
        assert_eq!(decoded, input);
    }
}
