use ddiff_rs::tree::{canonical_index, format_number};
use ddiff_rs::{PropertyKey, Segment, SemanticKind, Symbol, Value};
use serde_json::json;

#[test]
fn test_type_name() {
    assert_eq!(Value::Null.type_name(), "null");
    assert_eq!(Value::Undefined.type_name(), "undefined");
    assert_eq!(Value::Boolean(true).type_name(), "boolean");
    assert_eq!(Value::from(42).type_name(), "number");
    assert_eq!(Value::from("test").type_name(), "string");
    assert_eq!(Value::empty_object().type_name(), "object");
    assert_eq!(Value::array(vec![]).type_name(), "array");
    assert_eq!(Value::date(0.0).type_name(), "date");
    assert_eq!(Value::regexp("/x/").type_name(), "regexp");
    assert_eq!(Value::math().type_name(), "math");
}

#[test]
fn test_kind_classification() {
    assert_eq!(Value::map(vec![]).kind(), SemanticKind::Map);
    assert_eq!(Value::set(vec![]).kind(), SemanticKind::Set);
    assert_eq!(Value::function("function f() {}").kind(), SemanticKind::Function);
    assert_eq!(Value::symbol("tag").kind(), SemanticKind::Symbol);
    assert!(SemanticKind::Date.is_assignable());
    assert!(!SemanticKind::String.is_assignable());
    assert_eq!("bigint".parse::<SemanticKind>().unwrap(), SemanticKind::BigInt);
}

#[test]
fn test_semantic_equals_primitives() {
    assert!(Value::Null.semantic_equals(&Value::Null));
    assert!(Value::Boolean(true).semantic_equals(&Value::Boolean(true)));
    assert!(!Value::Boolean(true).semantic_equals(&Value::Boolean(false)));
    assert!(!Value::Null.semantic_equals(&Value::Undefined));
    assert!(!Value::Boolean(true).semantic_equals(&Value::from(1)));
    assert!(Value::Number(f64::NAN).semantic_equals(&Value::Number(f64::NAN)));
}

#[test]
fn test_semantic_equals_ignores_key_order() {
    let a = Value::from(json!({"a": 1, "b": 2}));
    let b = Value::from(json!({"b": 2, "a": 1}));
    assert_eq!(a, b);
    assert_ne!(a, Value::from(json!({"a": 1})));
}

#[test]
fn test_semantic_equals_cycles() {
    let a = Value::empty_object();
    a.with_props_mut(|bag| bag.insert("me", a.clone()));
    let b = Value::empty_object();
    b.with_props_mut(|bag| bag.insert("me", b.clone()));
    assert_eq!(a, b);

    a.with_props_mut(|bag| bag.insert("me", Value::Null));
    b.with_props_mut(|bag| bag.insert("me", Value::Null));
}

#[test]
fn test_identity() {
    let a = Value::empty_object();
    let alias = a.clone();
    assert!(a.same_identity(&alias));
    assert!(!a.same_identity(&Value::empty_object()));
    assert_eq!(Value::from(1).identity(), None);
}

#[test]
fn test_deep_clone_is_independent() {
    let original = Value::from(json!({"list": [1, {"x": 1}]}));
    let copy = original.deep_clone();
    assert_eq!(original, copy);
    assert!(!original.same_identity(&copy));

    copy.get(&Segment::from("list"))
        .with_props_mut(|bag| bag.insert("extra", Value::from(true)));
    assert_ne!(original, copy);
}

#[test]
fn test_deep_clone_preserves_cycles_and_sharing() {
    let shared = Value::empty_object();
    let root = Value::object(vec![("a", shared.clone()), ("b", shared.clone())]);
    root.with_props_mut(|bag| bag.insert("self", root.clone()));

    let copy = root.deep_clone();
    let a = copy.get(&Segment::from("a"));
    let b = copy.get(&Segment::from("b"));
    assert!(a.same_identity(&b));
    assert!(!a.same_identity(&shared));
    assert!(copy.get(&Segment::from("self")).same_identity(&copy));

    root.with_props_mut(|bag| bag.insert("self", Value::Null));
    copy.with_props_mut(|bag| bag.insert("self", Value::Null));
}

#[test]
fn test_get_members() {
    let value = Value::from(json!({"items": ["a", "b"]}));
    let items = value.get(&Segment::from("items"));
    assert_eq!(items.get(&Segment::Index(1)), Value::from("b"));
    assert_eq!(items.get(&Segment::from("1")), Value::from("b"));
    assert_eq!(items.get(&Segment::from("length")), Value::from(2));
    assert!(items.get(&Segment::Index(5)).is_undefined());
    assert!(Value::from(3).get(&Segment::from("x")).is_undefined());
}

#[test]
fn test_property_bag_enumerability_and_symbols() {
    let value = Value::empty_object();
    let symbol = Symbol::new("secret");
    value.with_props_mut(|bag| {
        bag.define("hidden", Value::from(1), false);
        bag.insert(symbol.clone(), Value::from(2));
    });
    value
        .with_props(|bag| {
            assert_eq!(bag.len(), 2);
            assert!(!bag.property(&PropertyKey::from("hidden")).unwrap().enumerable);
            assert_eq!(bag.get(&PropertyKey::from(symbol.clone())), Some(&Value::from(2)));
        })
        .unwrap();
    assert_eq!(value.get(&Segment::from(symbol)), Value::from(2));
}

#[test]
fn test_preview() {
    assert_eq!(Value::from("hello").preview(80), "\"hello\"");
    assert_eq!(Value::from(json!({"a": 1, "b": 2})).preview(80), "{ 2 keys }");
    assert_eq!(Value::from(json!([1])).preview(80), "[ 1 item ]");
    assert_eq!(Value::array(vec![]).preview(80), "[]");
    assert_eq!(Value::date(0.0).preview(80), "1970-01-01T00:00:00.000Z");
    assert_eq!(Value::from("abcdefghij").preview(8), "\"abcd...");
}

#[test]
fn test_format_number() {
    assert_eq!(format_number(1.0), "1");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(1.5), "1.5");
    assert_eq!(format_number(f64::NAN), "NaN");
    assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn test_canonical_index() {
    assert_eq!(canonical_index("0"), Some(0));
    assert_eq!(canonical_index("42"), Some(42));
    assert_eq!(canonical_index("042"), None);
    assert_eq!(canonical_index("-1"), None);
    assert_eq!(canonical_index("x"), None);
}

#[test]
fn test_from_json() {
    let value = Value::from(json!({"n": null, "b": false, "s": "x", "list": [1.5]}));
    assert_eq!(value.get(&Segment::from("n")), Value::Null);
    assert_eq!(value.get(&Segment::from("b")), Value::Boolean(false));
    assert_eq!(value.get(&Segment::from("list")).len(), Some(1));
}
