//! JSON-array notation: `["name",0]`. Strings are percent-encoded inside the quotes.

use super::{percent_decode, percent_encode, Cursor};
use crate::error::PointerError;
use crate::path::{Path, Segment};

const NAME: &str = "json";

pub(super) fn encode(path: &[Segment]) -> String {
    let parts: Vec<String> = path
        .iter()
        .map(|segment| match segment {
            Segment::Index(index) => index.to_string(),
            other => format!("\"{}\"", percent_encode(&other.as_text())),
        })
        .collect();
    format!("[{}]", parts.join(","))
}

pub(super) fn decode(src: &str) -> Result<Path, PointerError> {
    let mut cursor = Cursor::new(src, NAME);
    cursor.expect('[')?;
    let mut path = Vec::new();
    if cursor.peek() == Some(']') {
        cursor.bump();
    } else {
        loop {
            let start = cursor.pos();
            if cursor.peek() == Some('"') {
                cursor.bump();
                let raw = cursor.take_while(|ch| ch != '"');
                if cursor.is_done() {
                    return Err(cursor.error_at(start, "unterminated double-quote"));
                }
                cursor.bump();
                path.push(Segment::Key(percent_decode(raw, NAME, start + 1)?));
            } else {
                let digits = cursor.take_while(|ch| ch != ',' && ch != ']');
                path.push(Segment::Index(cursor.decimal(digits, start)?));
            }
            match cursor.bump() {
                Some(',') => continue,
                Some(']') => break,
                Some(_) => return Err(cursor.error_at(cursor.pos() - 1, "expected ',' or ']'")),
                None => return Err(cursor.error("unterminated open-brace")),
            }
        }
    }
    if !cursor.is_done() {
        return Err(cursor.error("unexpected trailing characters"));
    }
    Ok(path)
}
