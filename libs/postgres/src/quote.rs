//! PostgreSQL quoting helpers

/// Quote an identifier (table, column, alias).
///
/// Embedded double quotes are doubled. Anything from the first NUL on is
/// dropped, since PostgreSQL cannot store it in an identifier.
pub fn quote_identifier(name: &str) -> String {
    let end = name.find('\0').unwrap_or(name.len());
    format!("\"{}\"", name[..end].replace('"', "\"\""))
}

/// Quote a string literal.
///
/// Single quotes are doubled. Values containing a backslash use the `E'...'`
/// escape string syntax with the backslashes doubled, so the result means
/// the same thing whatever `standard_conforming_strings` is set to.
pub fn quote_literal(value: &str) -> String {
    let quoted = value.replace('\'', "''");
    if quoted.contains('\\') {
        format!("E'{}'", quoted.replace('\\', "\\\\"))
    } else {
        format!("'{quoted}'")
    }
}

/// Escape LIKE meta-characters so user input is matched literally.
pub fn escape_like_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("data"), "\"data\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_identifier("cut\0here"), "\"cut\"");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("code"), "'code'");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(quote_literal(r"a\b"), r"E'a\\b'");
        assert_eq!(quote_literal(""), "''");
    }

    #[test]
    fn test_escape_like_pattern() {
        assert_eq!(escape_like_pattern("50%_off"), r"50\%\_off");
        assert_eq!(escape_like_pattern(r"c:\dir"), r"c:\\dir");
        assert_eq!(escape_like_pattern("plain"), "plain");
    }
}
