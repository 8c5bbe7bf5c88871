//! URI-fragment notation: `#/segment/segment`.
//!
//! String segments escape `~` as `~0` and `/` as `~1`, then percent-encode.
//! A segment that is a canonical decimal number decodes as an index.

use super::{percent_decode, percent_encode, Cursor};
use crate::error::PointerError;
use crate::path::{Path, Segment};

const NAME: &str = "pointer";

pub(super) fn encode(path: &[Segment]) -> String {
    let mut out = String::from("#");
    for segment in path {
        out.push('/');
        match segment {
            Segment::Index(index) => out.push_str(&index.to_string()),
            other => {
                let escaped = other.as_text().replace('~', "~0").replace('/', "~1");
                out.push_str(&percent_encode(&escaped));
            }
        }
    }
    out
}

pub(super) fn decode(src: &str) -> Result<Path, PointerError> {
    let mut cursor = Cursor::new(src, NAME);
    cursor.expect('#')?;
    let mut path = Vec::new();
    while !cursor.is_done() {
        cursor.expect('/')?;
        let start = cursor.pos();
        let raw = cursor.take_while(|ch| ch != '/');
        let decoded = percent_decode(raw, NAME, start)?;
        let text = unescape(&decoded).ok_or_else(|| cursor.error_at(start, "invalid '~' escape"))?;
        path.push(Segment::Key(text).normalized());
    }
    Ok(path)
}

fn unescape(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.next()? {
                '0' => out.push('~'),
                '1' => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(ch);
        }
    }
    Some(out)
}
