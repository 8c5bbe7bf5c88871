//! Text and JSON encodings of change records.
//!
//! [`TextFormat`] writes one record per line, each value payload prefixed by
//! its UTF-8 byte length so payloads may contain any character:
//!
//! ```text
//! A <path> <len> <json>
//! E <path> [<len> <json-subject><sep>]<len> <json-comparand>
//! M <path> <origin> [<len> <json-subject><sep>]<len> <json-comparand>
//! R <path>[ <len> <json-subject>]
//! ```
//!
//! Bracketed parts are written only in audit mode. [`CompactFormat`] writes
//! the same information as JSON objects.
//!
//! Payloads use a lossless JSON mapping: values plain JSON can express are
//! written as-is, everything else as a tagged object `{"$type": kind, ...}`.
//!
//! # Examples
//!
//! ```
//! use ddiff_rs::serialize::TextFormat;
//! use ddiff_rs::{ChangeRecord, Value};
//!
//! let record = ChangeRecord::edited_at("#/name", Value::from("a"), Value::from("b")).unwrap();
//! let format = TextFormat::new().audit(true);
//! let line = format.encode_record(&record).unwrap();
//! assert_eq!(line, r#"E #/name 3 "a" => 3 "b""#);
//! assert_eq!(format.decode_record(&line).unwrap(), record);
//! ```

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat};
use serde_json::{json, Map, Number};

use crate::change::{ChangeKind, ChangeRecord};
use crate::error::{PointerError, SerializeError};
use crate::path::{Path, Segment};
use crate::pointer::{encode_pointer, PathScheme};
use crate::tree::{format_number, PropertyKey, Symbol, Value};

const TYPE_TAG: &str = "$type";
const DEFAULT_SEPARATOR: &str = " => ";

/// Encodes a value as lossless JSON.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value, SerializeError> {
    JsonWriter::default().write(value, &mut Vec::new())
}

/// Decodes a value written by [`value_to_json`]. Plain JSON decodes as-is.
pub fn value_from_json(json: &serde_json::Value) -> Result<Value, SerializeError> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::array(
            items
                .iter()
                .map(value_from_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_json::Value::Object(map) => match map.get(TYPE_TAG) {
            Some(serde_json::Value::String(tag)) => tagged_from_json(tag, map)?,
            Some(_) => return Err(SerializeError::malformed(0, "type tag must be a string")),
            None => object_from_json(map)?,
        },
    })
}

/// Members are decoded one by one; the map itself is never read as a tag.
fn object_from_json(map: &Map<String, serde_json::Value>) -> Result<Value, SerializeError> {
    Ok(Value::object(
        map.iter()
            .map(|(k, v)| Ok((k.clone(), value_from_json(v)?)))
            .collect::<Result<Vec<_>, SerializeError>>()?,
    ))
}

#[derive(Default)]
struct JsonWriter {
    visiting: HashSet<usize>,
}

impl JsonWriter {
    fn write(&mut self, value: &Value, path: &mut Path) -> Result<serde_json::Value, SerializeError> {
        let Some(id) = value.identity() else {
            return Ok(scalar_to_json(value));
        };
        if !self.visiting.insert(id) {
            return Err(SerializeError::Cycle {
                pointer: encode_pointer(path),
            });
        }
        let result = self.write_container(value, path);
        self.visiting.remove(&id);
        result
    }

    fn write_container(&mut self, value: &Value, path: &mut Path) -> Result<serde_json::Value, SerializeError> {
        let props = self.props(value, path)?;
        let (tag, inner) = match value {
            Value::Object(_) => {
                if !props.contains_key(TYPE_TAG) {
                    return Ok(serde_json::Value::Object(props));
                }
                return Ok(json!({ "$type": "object", "value": props }));
            }
            Value::Array(cell) => {
                let items = cell.borrow().items.clone();
                let items = self.write_items(&items, path)?;
                if props.is_empty() {
                    return Ok(items);
                }
                ("array", Some(items))
            }
            Value::Date(cell) => {
                let millis = cell.borrow().primary;
                let iso = (millis.is_finite() && millis.fract() == 0.0)
                    .then(|| DateTime::from_timestamp_millis(millis as i64))
                    .flatten()
                    .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true));
                let inner = match iso {
                    Some(iso) => serde_json::Value::String(iso),
                    None => number_to_json(millis),
                };
                ("date", Some(inner))
            }
            Value::RegExp(cell) => ("regexp", Some(json!(cell.borrow().primary))),
            Value::Function(cell) => ("function", Some(json!(cell.borrow().primary))),
            Value::Map(cell) => {
                let entries = cell.borrow().primary.clone();
                let mut out = Vec::with_capacity(entries.len());
                for (key, entry) in &entries {
                    out.push(json!([self.write(key, path)?, self.write(entry, path)?]));
                }
                ("map", Some(serde_json::Value::Array(out)))
            }
            Value::Set(cell) => {
                let items = cell.borrow().primary.clone();
                ("set", Some(self.write_items(&items, path)?))
            }
            Value::Math(_) => ("math", None),
            _ => return Ok(scalar_to_json(value)),
        };
        let mut out = Map::new();
        out.insert(TYPE_TAG.to_string(), json!(tag));
        if let Some(inner) = inner {
            out.insert("value".to_string(), inner);
        }
        if !props.is_empty() {
            out.insert("props".to_string(), serde_json::Value::Object(props));
        }
        Ok(serde_json::Value::Object(out))
    }

    fn write_items(&mut self, items: &[Value], path: &mut Path) -> Result<serde_json::Value, SerializeError> {
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            path.push(Segment::Index(i));
            let written = self.write(item, path);
            path.pop();
            out.push(written?);
        }
        Ok(serde_json::Value::Array(out))
    }

    /// Enumerable string-keyed properties, without a sequence's `length`.
    fn props(&mut self, value: &Value, path: &mut Path) -> Result<Map<String, serde_json::Value>, SerializeError> {
        let is_sequence = matches!(value, Value::Array(_));
        let members: Vec<(String, Value)> = value
            .with_props(|bag| {
                bag.iter()
                    .filter(|prop| prop.enumerable)
                    .filter_map(|prop| match &prop.key {
                        PropertyKey::Name(name) => Some((name.clone(), prop.value.clone())),
                        PropertyKey::Symbol(_) => None,
                    })
                    .filter(|(name, _)| !is_sequence || name != "length")
                    .collect()
            })
            .unwrap_or_default();
        let mut out = Map::new();
        for (name, member) in members {
            path.push(Segment::Key(name.clone()));
            let written = self.write(&member, path);
            path.pop();
            out.insert(name, written?);
        }
        Ok(out)
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return json!(n as i64);
    }
    match Number::from_f64(n) {
        Some(number) => serde_json::Value::Number(number),
        None => json!({ "$type": "number", "value": format_number(n) }),
    }
}

fn scalar_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Undefined => json!({ "$type": "undefined" }),
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => json!(b),
        Value::Number(n) => number_to_json(*n),
        Value::BigInt(n) => json!({ "$type": "bigint", "value": n.to_string() }),
        Value::String(s) => json!(s),
        Value::Symbol(symbol) => json!({ "$type": "symbol", "value": symbol.description() }),
        _ => serde_json::Value::Null,
    }
}

fn tagged_from_json(tag: &str, map: &Map<String, serde_json::Value>) -> Result<Value, SerializeError> {
    let inner = map.get("value");
    let text = || inner.and_then(serde_json::Value::as_str).map(str::to_string);
    let missing = || SerializeError::malformed(0, format!("tagged {} value is missing its payload", tag));
    let value = match tag {
        "undefined" => return Ok(Value::Undefined),
        "number" => {
            let n = match text().as_deref() {
                Some("NaN") => f64::NAN,
                Some("Infinity") => f64::INFINITY,
                Some("-Infinity") => f64::NEG_INFINITY,
                _ => inner.and_then(serde_json::Value::as_f64).ok_or_else(missing)?,
            };
            return Ok(Value::Number(n));
        }
        "bigint" => {
            let digits = text().ok_or_else(missing)?;
            let n = digits
                .parse::<i128>()
                .map_err(|_| SerializeError::malformed(0, format!("invalid bigint '{}'", digits)))?;
            return Ok(Value::BigInt(n));
        }
        "symbol" => {
            let symbol = match text() {
                Some(description) => Symbol::new(description),
                None => Symbol::anonymous(),
            };
            return Ok(Value::Symbol(symbol));
        }
        "object" => match inner {
            Some(serde_json::Value::Object(members)) => object_from_json(members)?,
            _ => return Err(missing()),
        },
        "array" => value_from_json(inner.ok_or_else(missing)?)?,
        "date" => {
            let millis = match inner {
                Some(serde_json::Value::String(iso)) => DateTime::parse_from_rfc3339(iso)
                    .map_err(|e| SerializeError::malformed(0, format!("invalid date '{}': {}", iso, e)))?
                    .timestamp_millis() as f64,
                Some(other) => other.as_f64().unwrap_or(f64::NAN),
                None => f64::NAN,
            };
            Value::date(millis)
        }
        "regexp" => Value::regexp(text().ok_or_else(missing)?),
        "function" => Value::function(text().ok_or_else(missing)?),
        "map" => {
            let entries = inner.and_then(serde_json::Value::as_array).ok_or_else(missing)?;
            let mut out = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry.as_array().map(Vec::as_slice) {
                    Some([key, value]) => out.push((value_from_json(key)?, value_from_json(value)?)),
                    _ => return Err(SerializeError::malformed(0, "map entries must be pairs")),
                }
            }
            Value::map(out)
        }
        "set" => {
            let items = inner.and_then(serde_json::Value::as_array).ok_or_else(missing)?;
            Value::set(items.iter().map(value_from_json).collect::<Result<Vec<_>, _>>()?)
        }
        "math" => Value::math(),
        other => {
            return Err(SerializeError::malformed(0, format!("unknown type tag '{}'", other)));
        }
    };
    if let Some(serde_json::Value::Object(props)) = map.get("props") {
        for (name, member) in props {
            let member = value_from_json(member)?;
            value.with_props_mut(|bag| bag.insert(name.as_str(), member));
        }
    }
    Ok(value)
}

/// Line-oriented, length-prefixed text format.
#[derive(Debug, Clone)]
pub struct TextFormat {
    scheme: PathScheme,
    audit: bool,
    separator: String,
}

impl Default for TextFormat {
    fn default() -> Self {
        Self {
            scheme: PathScheme::default(),
            audit: false,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl TextFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: PathScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Also write the values being replaced, making records reversible.
    pub fn audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn encode_record(&self, record: &ChangeRecord) -> Result<String, SerializeError> {
        let path = self.scheme.encode(record.path());
        let mut out = format!("{} {}", record.kind(), path);
        match record {
            ChangeRecord::Added { comparand, .. } => {
                out.push(' ');
                push_payload(&mut out, comparand)?;
            }
            ChangeRecord::Edited {
                subject, comparand, ..
            } => {
                out.push(' ');
                self.push_edit(&mut out, subject, comparand)?;
            }
            ChangeRecord::Moved {
                subject,
                comparand,
                origin,
                ..
            } => {
                out.push_str(&format!(" {} ", origin));
                self.push_edit(&mut out, subject, comparand)?;
            }
            ChangeRecord::Removed { subject, .. } => {
                if self.audit {
                    out.push(' ');
                    push_payload(&mut out, subject)?;
                }
            }
        }
        Ok(out)
    }

    /// Encodes records one per line.
    pub fn encode(&self, records: &[ChangeRecord]) -> Result<String, SerializeError> {
        let lines = records
            .iter()
            .map(|record| self.encode_record(record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    fn push_edit(&self, out: &mut String, subject: &Value, comparand: &Value) -> Result<(), SerializeError> {
        if self.audit {
            push_payload(out, subject)?;
            out.push_str(&self.separator);
        }
        push_payload(out, comparand)
    }

    pub fn decode_record(&self, line: &str) -> Result<ChangeRecord, SerializeError> {
        self.decode_line(line, 0)
    }

    /// Decodes newline-separated records; blank lines are skipped.
    pub fn decode(&self, text: &str) -> Result<Vec<ChangeRecord>, SerializeError> {
        let mut records = Vec::new();
        let mut offset = 0;
        for line in text.split('\n') {
            let trimmed = line.strip_suffix('\r').unwrap_or(line);
            if !trimmed.trim().is_empty() {
                records.push(self.decode_line(trimmed, offset)?);
            }
            offset += line.len() + 1;
        }
        Ok(records)
    }

    fn decode_line(&self, line: &str, base: usize) -> Result<ChangeRecord, SerializeError> {
        let mut reader = LineReader { src: line, pos: 0, base };
        let letter = reader
            .bump()
            .ok_or_else(|| SerializeError::malformed(base, "empty change record"))?;
        let kind = letter
            .to_string()
            .parse::<ChangeKind>()
            .map_err(|_| SerializeError::UnrecognizedChangeKind {
                kind: letter.to_string(),
                position: base,
            })?;
        reader.expect(' ')?;
        let path_at = reader.pos;
        let token = reader.path_token();
        let path = self.scheme.decode(token).map_err(|err| match err {
            PointerError::Malformed {
                scheme,
                position,
                message,
            } => SerializeError::Pointer(PointerError::Malformed {
                scheme,
                position: base + path_at + position,
                message,
            }),
            other => SerializeError::Pointer(other),
        })?;

        let record = match kind {
            ChangeKind::Added => {
                reader.expect(' ')?;
                ChangeRecord::added(path, reader.payload()?)
            }
            ChangeKind::Removed => {
                let subject = if reader.is_done() {
                    Value::Undefined
                } else {
                    reader.expect(' ')?;
                    reader.payload()?
                };
                ChangeRecord::removed(path, subject)
            }
            ChangeKind::Edited => {
                reader.expect(' ')?;
                let (subject, comparand) = self.read_edit(&mut reader)?;
                ChangeRecord::edited(path, subject, comparand)
            }
            ChangeKind::Moved => {
                reader.expect(' ')?;
                let origin = reader.decimal()?;
                reader.expect(' ')?;
                let (subject, comparand) = self.read_edit(&mut reader)?;
                ChangeRecord::moved(path, subject, comparand, origin)
            }
        };
        if !reader.is_done() {
            return Err(reader.error("unexpected trailing input"));
        }
        Ok(record)
    }

    fn read_edit(&self, reader: &mut LineReader<'_>) -> Result<(Value, Value), SerializeError> {
        let first = reader.payload()?;
        if reader.rest().starts_with(self.separator.as_str()) {
            reader.pos += self.separator.len();
            let second = reader.payload()?;
            Ok((first, second))
        } else {
            Ok((Value::Undefined, first))
        }
    }
}

fn push_payload(out: &mut String, value: &Value) -> Result<(), SerializeError> {
    let data = serde_json::to_string(&value_to_json(value)?)?;
    out.push_str(&data.len().to_string());
    out.push(' ');
    out.push_str(&data);
    Ok(())
}

struct LineReader<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> LineReader<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn is_done(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.rest().chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> SerializeError {
        SerializeError::malformed(self.base + self.pos, message)
    }

    fn expect(&mut self, expected: char) -> Result<(), SerializeError> {
        match self.rest().chars().next() {
            Some(ch) if ch == expected => {
                self.pos += ch.len_utf8();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}' but found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}' but reached end of input", expected))),
        }
    }

    /// Path text up to the next space outside double quotes.
    fn path_token(&mut self) -> &'a str {
        let rest = self.rest();
        let mut quoted = false;
        let mut escaped = false;
        let mut end = rest.len();
        for (i, ch) in rest.char_indices() {
            match ch {
                _ if escaped => escaped = false,
                '\\' if quoted => escaped = true,
                '"' => quoted = !quoted,
                ' ' if !quoted => {
                    end = i;
                    break;
                }
                _ => {}
            }
        }
        self.pos += end;
        &rest[..end]
    }

    fn decimal(&mut self) -> Result<usize, SerializeError> {
        let digits = self.rest().bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(self.error("expected decimal digits"));
        }
        let text = &self.rest()[..digits];
        let n = text
            .parse::<usize>()
            .map_err(|_| self.error(format!("number '{}' is out of range", text)))?;
        self.pos += digits;
        Ok(n)
    }

    /// A `<len> <json>` payload.
    fn payload(&mut self) -> Result<Value, SerializeError> {
        let len = self.decimal()?;
        self.expect(' ')?;
        let rest = self.rest();
        let data = rest
            .get(..len)
            .ok_or_else(|| self.error(format!("payload of {} bytes exceeds the record", len)))?;
        let json: serde_json::Value = serde_json::from_str(data)?;
        self.pos += len;
        value_from_json(&json)
    }
}

/// JSON object encoding of change records.
#[derive(Debug, Clone, Default)]
pub struct CompactFormat {
    scheme: PathScheme,
    audit: bool,
}

impl CompactFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: PathScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    pub fn encode_record(&self, record: &ChangeRecord) -> Result<serde_json::Value, SerializeError> {
        let mut out = Map::new();
        out.insert("kind".to_string(), json!(record.kind().as_ref()));
        out.insert("pointer".to_string(), json!(record.pointer_in(self.scheme)));
        match record {
            ChangeRecord::Added { comparand, .. } => {
                out.insert("comparand".to_string(), value_to_json(comparand)?);
            }
            ChangeRecord::Edited {
                subject, comparand, ..
            } => {
                if self.audit {
                    out.insert("subject".to_string(), value_to_json(subject)?);
                }
                out.insert("comparand".to_string(), value_to_json(comparand)?);
            }
            ChangeRecord::Moved {
                subject,
                comparand,
                origin,
                ..
            } => {
                if self.audit {
                    out.insert("subject".to_string(), value_to_json(subject)?);
                }
                out.insert("origin".to_string(), json!(origin));
                out.insert("comparand".to_string(), value_to_json(comparand)?);
            }
            ChangeRecord::Removed { subject, .. } => {
                if self.audit {
                    out.insert("subject".to_string(), value_to_json(subject)?);
                }
            }
        }
        Ok(serde_json::Value::Object(out))
    }

    /// One record encodes as an object, any other count as an array.
    pub fn encode(&self, records: &[ChangeRecord]) -> Result<serde_json::Value, SerializeError> {
        if let [single] = records {
            return self.encode_record(single);
        }
        let encoded = records
            .iter()
            .map(|record| self.encode_record(record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(serde_json::Value::Array(encoded))
    }

    pub fn to_string_pretty(&self, records: &[ChangeRecord]) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(&self.encode(records)?)?)
    }

    pub fn decode(&self, json: &serde_json::Value) -> Result<Vec<ChangeRecord>, SerializeError> {
        match json {
            serde_json::Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.decode_record(item, i))
                .collect(),
            other => Ok(vec![self.decode_record(other, 0)?]),
        }
    }

    pub fn decode_str(&self, text: &str) -> Result<Vec<ChangeRecord>, SerializeError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        self.decode(&json)
    }

    fn decode_record(&self, json: &serde_json::Value, position: usize) -> Result<ChangeRecord, SerializeError> {
        let map = json
            .as_object()
            .ok_or_else(|| SerializeError::malformed(position, "change record must be an object"))?;
        let kind_text = map
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| SerializeError::malformed(position, "missing 'kind'"))?;
        let kind = kind_text.parse::<ChangeKind>().map_err(|_| SerializeError::UnrecognizedChangeKind {
            kind: kind_text.to_string(),
            position,
        })?;
        let pointer = map
            .get("pointer")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| SerializeError::malformed(position, "missing 'pointer'"))?;
        let path = self.scheme.decode(pointer)?;
        let field = |name: &str| -> Result<Value, SerializeError> {
            map.get(name).map(value_from_json).unwrap_or(Ok(Value::Undefined))
        };

        Ok(match kind {
            ChangeKind::Added => ChangeRecord::added(path, field("comparand")?),
            ChangeKind::Edited => ChangeRecord::edited(path, field("subject")?, field("comparand")?),
            ChangeKind::Removed => ChangeRecord::removed(path, field("subject")?),
            ChangeKind::Moved => {
                let origin = map
                    .get("origin")
                    .and_then(serde_json::Value::as_u64)
                    .ok_or_else(|| SerializeError::malformed(position, "missing 'origin'"))?;
                ChangeRecord::moved(path, field("subject")?, field("comparand")?, origin as usize)
            }
        })
    }
}
