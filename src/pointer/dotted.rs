//! Dotted notation: `.name.[0].["quoted name"]`.

use super::Cursor;
use crate::error::PointerError;
use crate::path::{Path, Segment};

const NAME: &str = "dotted";

/// Words that are always quoted even though they look like identifiers.
/// Kept sorted for binary search.
const ALWAYS_QUOTE: &[&str] = &[
    "abstract",
    "arguments",
    "as",
    "async",
    "await",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "double",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "from",
    "function",
    "get",
    "goto",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "int",
    "interface",
    "let",
    "long",
    "native",
    "new",
    "null",
    "of",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "set",
    "short",
    "static",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "volatile",
    "while",
    "with",
    "yield",
];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '$' || first == '_')
        && chars.all(|ch| ch.is_alphanumeric() || ch == '$' || ch == '_')
}

fn is_bare(name: &str) -> bool {
    is_identifier(name) && ALWAYS_QUOTE.binary_search(&name).is_err()
}

pub(super) fn encode(path: &[Segment]) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let mut out = String::new();
    for segment in path {
        match segment {
            Segment::Index(index) => {
                out.push_str(".[");
                out.push_str(&index.to_string());
                out.push(']');
            }
            other => {
                let name = other.as_text();
                if is_bare(&name) {
                    out.push('.');
                    out.push_str(&name);
                } else {
                    out.push_str(".[\"");
                    for ch in name.chars() {
                        if ch == '"' || ch == '\\' {
                            out.push('\\');
                        }
                        out.push(ch);
                    }
                    out.push_str("\"]");
                }
            }
        }
    }
    out
}

pub(super) fn decode(src: &str) -> Result<Path, PointerError> {
    if src == "." {
        return Ok(Vec::new());
    }
    let mut cursor = Cursor::new(src, NAME);
    if cursor.is_done() {
        return Err(cursor.error("expected '.'"));
    }
    let mut path = Vec::new();
    while !cursor.is_done() {
        cursor.expect('.')?;
        match cursor.peek() {
            Some('[') => {
                let open = cursor.pos();
                cursor.bump();
                if cursor.peek() == Some('"') {
                    let name = quoted(&mut cursor)?;
                    if cursor.peek() != Some(']') {
                        return Err(cursor.error_at(open, "unterminated open-brace"));
                    }
                    cursor.bump();
                    path.push(Segment::Key(name));
                } else {
                    let start = cursor.pos();
                    let digits = cursor.take_while(|ch| ch != ']');
                    if cursor.is_done() {
                        return Err(cursor.error_at(open, "unterminated open-brace"));
                    }
                    let index = cursor.decimal(digits, start)?;
                    cursor.bump();
                    path.push(Segment::Index(index));
                }
            }
            Some('.') | None => return Err(cursor.error("empty path segment")),
            Some(_) => {
                let name = cursor.take_while(|ch| ch != '.' && ch != '[');
                path.push(Segment::Key(name.to_string()));
            }
        }
    }
    Ok(path)
}

/// Reads a double-quoted name starting at the opening quote.
fn quoted(cursor: &mut Cursor<'_>) -> Result<String, PointerError> {
    let start = cursor.pos();
    cursor.bump();
    let mut name = String::new();
    loop {
        match cursor.bump() {
            Some('"') => return Ok(name),
            Some('\\') => match cursor.bump() {
                Some(ch) => name.push(ch),
                None => break,
            },
            Some(ch) => name.push(ch),
            None => break,
        }
    }
    Err(cursor.error_at(start, "unterminated double-quote"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_quote_is_sorted() {
        assert!(ALWAYS_QUOTE.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_bare_and_quoted_names() {
        assert_eq!(encode(&[Segment::from("name")]), ".name");
        assert_eq!(encode(&[Segment::from("private")]), r#".["private"]"#);
        assert_eq!(encode(&[Segment::from("4giggles")]), r#".["4giggles"]"#);
        assert_eq!(encode(&[Segment::from("")]), r#".[""]"#);
    }

    #[test]
    fn test_escaped_quote() {
        let path = vec![Segment::from("prop\"quote")];
        assert_eq!(encode(&path), r#".["prop\"quote"]"#);
        assert_eq!(decode(r#".["prop\"quote"]"#).unwrap(), path);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = decode(r#".["abc"#).unwrap_err();
        assert!(err.to_string().contains("unterminated double-quote"));
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn test_unterminated_brace() {
        let err = decode(".[12").unwrap_err();
        assert!(err.to_string().contains("unterminated open-brace"));
        assert_eq!(err.position(), Some(1));
    }

    #[test]
    fn test_non_decimal_index() {
        let err = decode(".[1x]").unwrap_err();
        assert!(err.to_string().contains("expected decimal digits"));
    }

    #[test]
    fn test_empty_segment() {
        assert!(decode(".a..b").is_err());
        assert!(decode(".a.").is_err());
    }
}
