use ddiff_rs::{parse_file, parse_json, parse_toml, parse_yaml, ParseError, Segment, Value};
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

fn keys(value: &Value) -> Vec<String> {
    value
        .with_props(|bag| bag.keys().map(|k| k.to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn test_parse_json_primitives() {
    assert_eq!(parse_json("null").unwrap(), Value::Null);
    assert_eq!(parse_json("true").unwrap(), Value::Boolean(true));
    assert_eq!(parse_json("42").unwrap(), Value::Number(42.0));
    assert_eq!(parse_json("3.15").unwrap(), Value::Number(3.15));
    assert_eq!(parse_json(r#""hello""#).unwrap(), Value::from("hello"));
}

#[test]
fn test_parse_json_structures() {
    let value = parse_json(r#"{"name": "Alice", "tags": [1, 2, 3], "meta": {"ok": true}}"#).unwrap();
    assert_eq!(value.type_name(), "object");
    assert_eq!(keys(&value), vec!["name", "tags", "meta"]);
    assert_eq!(value.get(&Segment::from("tags")).len(), Some(3));
    assert_eq!(value, Value::from(json!({"meta": {"ok": true}, "name": "Alice", "tags": [1, 2, 3]})));
}

#[test]
fn test_parse_json_invalid() {
    assert!(parse_json("{invalid}").is_err());
    assert!(parse_json("[1, 2,").is_err());
}

#[test]
fn test_parse_yaml_matches_json() {
    let yaml = "name: Alice\ntags:\n  - 1\n  - 2\nmeta:\n  ok: true\n  none: ~\n";
    let json = r#"{"name": "Alice", "tags": [1, 2], "meta": {"ok": true, "none": null}}"#;
    assert_eq!(parse_yaml(yaml).unwrap(), parse_json(json).unwrap());
}

#[test]
fn test_parse_yaml_invalid() {
    assert!(parse_yaml("key: value: invalid").is_err());
    assert!(parse_yaml("[1, 2,").is_err());
}

#[test]
fn test_yaml_non_string_keys() {
    let value = parse_yaml("1: first\n2: second\ntrue: yes").unwrap();
    assert_eq!(keys(&value), vec!["1", "2", "true"]);
    assert_eq!(value.get(&Segment::from("true")), Value::from("yes"));
}

#[test]
fn test_yaml_tags_are_evaluated_away() {
    let value = parse_yaml("server: !custom\n  port: 8080\n").unwrap();
    assert_eq!(value, Value::from(json!({"server": {"port": 8080}})));
}

#[test]
fn test_parse_toml() {
    let value = parse_toml("[server]\nhost = \"localhost\"\nport = 8080\nweights = [0.5, 1.5]\n").unwrap();
    let server = value.get(&Segment::from("server"));
    assert_eq!(server.get(&Segment::from("host")), Value::from("localhost"));
    assert_eq!(server.get(&Segment::from("port")), Value::from(8080));
    assert_eq!(server.get(&Segment::from("weights")), Value::from(json!([0.5, 1.5])));
}

#[test]
fn test_toml_datetimes() {
    let value = parse_toml("at = 1970-01-02T00:00:00Z\nday = 1979-05-27\n").unwrap();
    assert_eq!(value.get(&Segment::from("at")), Value::date(86_400_000.0));
    assert_eq!(value.get(&Segment::from("day")), Value::from("1979-05-27"));
}

#[test]
fn test_parse_toml_invalid() {
    assert!(parse_toml("key = ").is_err());
}

#[test]
fn test_parse_file_by_extension() {
    let file = temp_file(".json", r#"{"key": "value"}"#);
    assert_eq!(parse_file(file.path()).unwrap(), Value::from(json!({"key": "value"})));

    let file = temp_file(".yml", "key: value\n");
    assert_eq!(parse_file(file.path()).unwrap(), Value::from(json!({"key": "value"})));

    let file = temp_file(".TOML", "key = \"value\"\n");
    assert_eq!(parse_file(file.path()).unwrap(), Value::from(json!({"key": "value"})));
}

#[test]
fn test_parse_file_not_found() {
    let result = parse_file(Path::new("/nonexistent/file.json"));
    assert!(matches!(result, Err(ParseError::FileNotFound { .. })));
}

#[test]
fn test_parse_file_reports_syntax_errors_by_format() {
    let file = temp_file(".json", "{broken");
    assert!(matches!(parse_file(file.path()), Err(ParseError::JsonError { .. })));

    let file = temp_file(".yaml", "a: [1,");
    assert!(matches!(parse_file(file.path()), Err(ParseError::YamlError { .. })));

    let file = temp_file(".toml", "a = ");
    assert!(matches!(parse_file(file.path()), Err(ParseError::TomlError { .. })));
}

#[test]
fn test_parse_file_unknown_extension() {
    let file = temp_file(".txt", r#"{"key": "value"}"#);
    assert_eq!(parse_file(file.path()).unwrap(), Value::from(json!({"key": "value"})));

    let file = temp_file(".conf", "key: value\n");
    assert_eq!(parse_file(file.path()).unwrap(), Value::from(json!({"key": "value"})));

    let file = temp_file(".txt", "key: value: invalid\n{[");
    assert!(matches!(parse_file(file.path()), Err(ParseError::UnknownFormat { .. })));
}
