//! Object graph representation compared and patched by the engine.
//!
//! Scalars are stored inline. Every container is a shared, mutable cell
//! (`Rc<RefCell<..>>`) so a graph may hold shared substructure and reference
//! cycles, and patches can mutate a resolved parent in place. Built-in-like
//! values (sequences, dates, regexps, functions, maps, sets) pair their
//! primary content with a property bag of ad hoc own properties.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::kind::{classify, SemanticKind};
use crate::path::Segment;

/// Shared, interior-mutable container cell.
pub type Shared<T> = Rc<RefCell<T>>;

fn share<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

fn address<T>(cell: &Rc<T>) -> usize {
    Rc::as_ptr(cell) as *const () as usize
}

/// A unique property key. Two symbols are equal only if they are the same
/// allocation, regardless of description.
#[derive(Clone)]
pub struct Symbol(Rc<Option<String>>);

impl Symbol {
    pub fn new(description: impl Into<String>) -> Self {
        Symbol(Rc::new(Some(description.into())))
    }

    pub fn anonymous() -> Self {
        Symbol(Rc::new(None))
    }

    pub fn description(&self) -> Option<&str> {
        self.0.as_deref()
    }

    fn id(&self) -> usize {
        address(&self.0)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or_default())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Key of an own property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Name(String),
    Symbol(Symbol),
}

impl PropertyKey {
    pub fn is_symbol(&self) -> bool {
        matches!(self, PropertyKey::Symbol(_))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            PropertyKey::Name(name) => Some(name),
            PropertyKey::Symbol(_) => None,
        }
    }

    /// Path segment addressing this property.
    pub fn to_segment(&self) -> Segment {
        match self {
            PropertyKey::Name(name) => Segment::Key(name.clone()),
            PropertyKey::Symbol(symbol) => Segment::Symbol(symbol.clone()),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Name(name) => f.write_str(name),
            PropertyKey::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::Name(name)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        PropertyKey::Symbol(symbol)
    }
}

#[derive(Clone)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Value,
    pub enumerable: bool,
}

/// Own properties in insertion order.
#[derive(Clone, Default)]
pub struct PropertyBag {
    entries: Vec<Property>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.entries.iter().map(|p| &p.key)
    }

    pub fn property(&self, key: &PropertyKey) -> Option<&Property> {
        self.entries.iter().find(|p| &p.key == key)
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&Value> {
        self.property(key).map(|p| &p.value)
    }

    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|p| p.key.as_name() == Some(name))
            .map(|p| &p.value)
    }

    /// Sets an enumerable property, keeping the position and enumerability
    /// of an existing one. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<PropertyKey>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|p| p.key == key) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.entries.push(Property {
                    key,
                    value,
                    enumerable: true,
                });
                None
            }
        }
    }

    /// Defines a property with explicit enumerability.
    pub fn define(&mut self, key: impl Into<PropertyKey>, value: Value, enumerable: bool) {
        let key = key.into();
        match self.entries.iter_mut().find(|p| p.key == key) {
            Some(existing) => {
                existing.value = value;
                existing.enumerable = enumerable;
            }
            None => self.entries.push(Property {
                key,
                value,
                enumerable,
            }),
        }
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<Value> {
        let position = self.entries.iter().position(|p| &p.key == key)?;
        Some(self.entries.remove(position).value)
    }

    fn clone_with(&self, memo: &mut HashMap<usize, Value>) -> PropertyBag {
        PropertyBag {
            entries: self
                .entries
                .iter()
                .map(|p| Property {
                    key: p.key.clone(),
                    value: p.value.clone_with(memo),
                    enumerable: p.enumerable,
                })
                .collect(),
        }
    }
}

impl<K: Into<PropertyKey>> FromIterator<(K, Value)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (key, value) in iter {
            bag.insert(key, value);
        }
        bag
    }
}

/// Ordered elements plus any named properties attached to the sequence.
#[derive(Clone, Default)]
pub struct Sequence {
    pub items: Vec<Value>,
    pub props: PropertyBag,
}

/// A built-in-like value: primary content plus a property bag.
#[derive(Clone, Default)]
pub struct Builtin<T> {
    pub primary: T,
    pub props: PropertyBag,
}

impl<T> Builtin<T> {
    fn new(primary: T) -> Self {
        Builtin {
            primary,
            props: PropertyBag::new(),
        }
    }
}

/// A value in an object graph.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(Symbol),
    Object(Shared<PropertyBag>),
    Array(Shared<Sequence>),
    /// Milliseconds since the Unix epoch; NaN for an invalid date.
    Date(Shared<Builtin<f64>>),
    /// Literal form, e.g. `/ab+c/gi`.
    RegExp(Shared<Builtin<String>>),
    /// Source text.
    Function(Shared<Builtin<String>>),
    Map(Shared<Builtin<Vec<(Value, Value)>>>),
    Set(Shared<Builtin<Vec<Value>>>),
    /// The math namespace singleton.
    Math(Shared<PropertyBag>),
}

impl Value {
    pub fn object<K, I>(props: I) -> Value
    where
        K: Into<PropertyKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(share(props.into_iter().collect()))
    }

    pub fn empty_object() -> Value {
        Value::Object(share(PropertyBag::new()))
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Array(share(Sequence {
            items: items.into_iter().collect(),
            props: PropertyBag::new(),
        }))
    }

    pub fn date(millis: f64) -> Value {
        Value::Date(share(Builtin::new(millis)))
    }

    pub fn date_from(instant: DateTime<Utc>) -> Value {
        Value::date(instant.timestamp_millis() as f64)
    }

    pub fn regexp(literal: impl Into<String>) -> Value {
        Value::RegExp(share(Builtin::new(literal.into())))
    }

    pub fn function(source: impl Into<String>) -> Value {
        Value::Function(share(Builtin::new(source.into())))
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Value {
        Value::Map(share(Builtin::new(entries.into_iter().collect())))
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Set(share(Builtin::new(items.into_iter().collect())))
    }

    pub fn math() -> Value {
        Value::Math(share(PropertyBag::new()))
    }

    pub fn symbol(description: impl Into<String>) -> Value {
        Value::Symbol(Symbol::new(description))
    }

    pub fn kind(&self) -> SemanticKind {
        classify(self)
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().into()
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Undefined or null.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Address of the container cell, or `None` for scalars.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(cell) | Value::Math(cell) => Some(address(cell)),
            Value::Array(cell) => Some(address(cell)),
            Value::Date(cell) => Some(address(cell)),
            Value::RegExp(cell) | Value::Function(cell) => Some(address(cell)),
            Value::Map(cell) => Some(address(cell)),
            Value::Set(cell) => Some(address(cell)),
            _ => None,
        }
    }

    /// True when both values are the same container cell.
    pub fn same_identity(&self, other: &Value) -> bool {
        matches!((self.identity(), other.identity()), (Some(a), Some(b)) if a == b)
    }

    /// Runs `f` against the property bag of an assignable value.
    pub fn with_props<R>(&self, f: impl FnOnce(&PropertyBag) -> R) -> Option<R> {
        match self {
            Value::Object(cell) | Value::Math(cell) => Some(f(&cell.borrow())),
            Value::Array(cell) => Some(f(&cell.borrow().props)),
            Value::Date(cell) => Some(f(&cell.borrow().props)),
            Value::RegExp(cell) | Value::Function(cell) => Some(f(&cell.borrow().props)),
            Value::Map(cell) => Some(f(&cell.borrow().props)),
            Value::Set(cell) => Some(f(&cell.borrow().props)),
            _ => None,
        }
    }

    pub fn with_props_mut<R>(&self, f: impl FnOnce(&mut PropertyBag) -> R) -> Option<R> {
        match self {
            Value::Object(cell) | Value::Math(cell) => Some(f(&mut cell.borrow_mut())),
            Value::Array(cell) => Some(f(&mut cell.borrow_mut().props)),
            Value::Date(cell) => Some(f(&mut cell.borrow_mut().props)),
            Value::RegExp(cell) | Value::Function(cell) => Some(f(&mut cell.borrow_mut().props)),
            Value::Map(cell) => Some(f(&mut cell.borrow_mut().props)),
            Value::Set(cell) => Some(f(&mut cell.borrow_mut().props)),
            _ => None,
        }
    }

    /// Number of elements of a sequence.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Array(cell) => Some(cell.borrow().items.len()),
            _ => None,
        }
    }

    /// Reads the member addressed by `segment`, or `Undefined` if absent.
    ///
    /// Index segments read sequence elements; on keyed values they read the
    /// property named by the decimal index. Sequences also expose `length`.
    pub fn get(&self, segment: &Segment) -> Value {
        if let Value::Array(cell) = self {
            let seq = cell.borrow();
            let index = match segment {
                Segment::Index(index) => Some(*index),
                Segment::Key(name) if name == "length" => {
                    return Value::Number(seq.items.len() as f64)
                }
                Segment::Key(name) => canonical_index(name),
                Segment::Symbol(_) => None,
            };
            if let Some(index) = index {
                return seq.items.get(index).cloned().unwrap_or(Value::Undefined);
            }
        }
        let key = segment.to_property_key();
        self.with_props(|bag| bag.get(&key).cloned())
            .flatten()
            .unwrap_or(Value::Undefined)
    }

    /// Structural equality: property order is ignored, NaN equals NaN, and
    /// cycles are compared coinductively.
    pub fn semantic_equals(&self, other: &Value) -> bool {
        self.equals_with(other, &mut HashSet::new())
    }

    fn equals_with(&self, other: &Value, seen: &mut HashSet<(usize, usize)>) -> bool {
        if let (Some(a), Some(b)) = (self.identity(), other.identity()) {
            if a == b || !seen.insert((a, b)) {
                return true;
            }
        }
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => same_number(*a, *b),
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Object(a), Value::Object(b)) | (Value::Math(a), Value::Math(b)) => {
                bags_equal(&a.borrow(), &b.borrow(), seen)
            }
            (Value::Array(a), Value::Array(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.items.len() == b.items.len()
                    && a.items
                        .iter()
                        .zip(b.items.iter())
                        .all(|(x, y)| x.equals_with(y, seen))
                    && bags_equal(&a.props, &b.props, seen)
            }
            (Value::Date(a), Value::Date(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                same_number(a.primary, b.primary) && bags_equal(&a.props, &b.props, seen)
            }
            (Value::RegExp(a), Value::RegExp(b)) | (Value::Function(a), Value::Function(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.primary == b.primary && bags_equal(&a.props, &b.props, seen)
            }
            (Value::Map(a), Value::Map(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.primary.len() == b.primary.len()
                    && a.primary.iter().zip(b.primary.iter()).all(|(x, y)| {
                        x.0.equals_with(&y.0, seen) && x.1.equals_with(&y.1, seen)
                    })
                    && bags_equal(&a.props, &b.props, seen)
            }
            (Value::Set(a), Value::Set(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.primary.len() == b.primary.len()
                    && a.primary
                        .iter()
                        .zip(b.primary.iter())
                        .all(|(x, y)| x.equals_with(y, seen))
                    && bags_equal(&a.props, &b.props, seen)
            }
            _ => false,
        }
    }

    /// Copies the whole graph reachable from this value into fresh cells,
    /// preserving shared substructure and cycles.
    pub fn deep_clone(&self) -> Value {
        self.clone_with(&mut HashMap::new())
    }

    fn clone_with(&self, memo: &mut HashMap<usize, Value>) -> Value {
        let Some(id) = self.identity() else {
            return self.clone();
        };
        if let Some(done) = memo.get(&id) {
            return done.clone();
        }
        match self {
            Value::Object(cell) | Value::Math(cell) => {
                let copy = share(PropertyBag::new());
                let handle = match self {
                    Value::Math(_) => Value::Math(copy.clone()),
                    _ => Value::Object(copy.clone()),
                };
                memo.insert(id, handle.clone());
                let bag = cell.borrow().clone_with(memo);
                *copy.borrow_mut() = bag;
                handle
            }
            Value::Array(cell) => {
                let copy = share(Sequence::default());
                memo.insert(id, Value::Array(copy.clone()));
                let source = cell.borrow();
                let items = source.items.iter().map(|v| v.clone_with(memo)).collect();
                let props = source.props.clone_with(memo);
                *copy.borrow_mut() = Sequence { items, props };
                Value::Array(copy)
            }
            Value::Date(cell) => {
                let copy = share(Builtin::new(cell.borrow().primary));
                memo.insert(id, Value::Date(copy.clone()));
                let props = cell.borrow().props.clone_with(memo);
                copy.borrow_mut().props = props;
                Value::Date(copy)
            }
            Value::RegExp(cell) | Value::Function(cell) => {
                let copy = share(Builtin::new(cell.borrow().primary.clone()));
                let handle = match self {
                    Value::RegExp(_) => Value::RegExp(copy.clone()),
                    _ => Value::Function(copy.clone()),
                };
                memo.insert(id, handle.clone());
                let props = cell.borrow().props.clone_with(memo);
                copy.borrow_mut().props = props;
                handle
            }
            Value::Map(cell) => {
                let copy = share(Builtin::new(Vec::new()));
                memo.insert(id, Value::Map(copy.clone()));
                let source = cell.borrow();
                let entries = source
                    .primary
                    .iter()
                    .map(|(k, v)| (k.clone_with(memo), v.clone_with(memo)))
                    .collect();
                let props = source.props.clone_with(memo);
                *copy.borrow_mut() = Builtin {
                    primary: entries,
                    props,
                };
                Value::Map(copy)
            }
            Value::Set(cell) => {
                let copy = share(Builtin::new(Vec::new()));
                memo.insert(id, Value::Set(copy.clone()));
                let source = cell.borrow();
                let items = source.primary.iter().map(|v| v.clone_with(memo)).collect();
                let props = source.props.clone_with(memo);
                *copy.borrow_mut() = Builtin {
                    primary: items,
                    props,
                };
                Value::Set(copy)
            }
            _ => self.clone(),
        }
    }

    /// Returns a short preview of the value, truncated to `max_len` characters.
    pub fn preview(&self, max_len: usize) -> String {
        let preview = match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::BigInt(n) => format!("{}n", n),
            Value::String(s) => format!("\"{}\"", s),
            Value::Symbol(symbol) => symbol.to_string(),
            Value::Object(cell) => counted(cell.borrow().len(), "{}", "{ ", " }", "key", "keys"),
            Value::Array(cell) => {
                counted(cell.borrow().items.len(), "[]", "[ ", " ]", "item", "items")
            }
            Value::Date(cell) => format_date(cell.borrow().primary),
            Value::RegExp(cell) => cell.borrow().primary.clone(),
            Value::Function(cell) => {
                let source = cell.borrow();
                source.primary.lines().next().unwrap_or_default().to_string()
            }
            Value::Map(cell) => format!("Map({})", cell.borrow().primary.len()),
            Value::Set(cell) => format!("Set({})", cell.borrow().primary.len()),
            Value::Math(_) => "Math".to_string(),
        };

        if preview.chars().count() > max_len {
            let kept: String = preview.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        } else {
            preview
        }
    }

    fn write_debug(&self, f: &mut fmt::Formatter<'_>, stack: &mut Vec<usize>) -> fmt::Result {
        if let Some(id) = self.identity() {
            if stack.contains(&id) {
                return f.write_str("[Circular]");
            }
            stack.push(id);
        }
        let result = match self {
            Value::Undefined
            | Value::Null
            | Value::Boolean(_)
            | Value::Number(_)
            | Value::BigInt(_)
            | Value::Symbol(_)
            | Value::RegExp(_)
            | Value::Math(_) => f.write_str(&self.preview(usize::MAX)),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Object(cell) => write_bag(f, &cell.borrow(), stack),
            Value::Array(cell) => {
                let seq = cell.borrow();
                f.write_str("[")?;
                for (i, item) in seq.items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.write_debug(f, stack)?;
                }
                f.write_str("]")?;
                if !seq.props.is_empty() {
                    write_bag(f, &seq.props, stack)?;
                }
                Ok(())
            }
            Value::Date(cell) => write!(f, "Date({})", format_date(cell.borrow().primary)),
            Value::Function(cell) => write!(f, "Function({:?})", cell.borrow().primary),
            Value::Map(cell) => {
                f.write_str("Map{")?;
                for (i, (k, v)) in cell.borrow().primary.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    k.write_debug(f, stack)?;
                    f.write_str(" => ")?;
                    v.write_debug(f, stack)?;
                }
                f.write_str("}")
            }
            Value::Set(cell) => {
                f.write_str("Set[")?;
                for (i, v) in cell.borrow().primary.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    v.write_debug(f, stack)?;
                }
                f.write_str("]")
            }
        };
        if self.identity().is_some() {
            stack.pop();
        }
        result
    }
}

fn write_bag(f: &mut fmt::Formatter<'_>, bag: &PropertyBag, stack: &mut Vec<usize>) -> fmt::Result {
    f.write_str("{")?;
    for (i, prop) in bag.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: ", prop.key)?;
        prop.value.write_debug(f, stack)?;
    }
    f.write_str("}")
}

fn bags_equal(a: &PropertyBag, b: &PropertyBag, seen: &mut HashSet<(usize, usize)>) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|p| b.get(&p.key).is_some_and(|v| p.value.equals_with(v, seen)))
}

fn same_number(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn counted(count: usize, empty: &str, open: &str, close: &str, one: &str, many: &str) -> String {
    match count {
        0 => empty.to_string(),
        1 => format!("{}{} {}{}", open, count, one, close),
        _ => format!("{}{} {}{}", open, count, many, close),
    }
}

/// The decimal index named by `name`, if it is in canonical form.
pub fn canonical_index(name: &str) -> Option<usize> {
    let index: usize = name.parse().ok()?;
    (index.to_string() == name).then_some(index)
}

/// Renders a number the way a script host prints it: integral values without
/// a fraction, `NaN`, and signed `Infinity`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n + 0.0)
    } else {
        n.to_string()
    }
}

fn format_date(millis: f64) -> String {
    if !millis.is_finite() {
        return "Invalid Date".to_string();
    }
    match DateTime::<Utc>::from_timestamp_millis(millis as i64) {
        Some(instant) => instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => "Invalid Date".to_string(),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.semantic_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_debug(f, &mut Vec::new())
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::array(items.into_iter().map(Value::from)),
            serde_json::Value::Object(map) => {
                Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}
