//! Semantic classification of values.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::tree::Value;

/// The closed set of comparison behaviours a value can have.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    AsRefStr,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SemanticKind {
    Object,
    Array,
    String,
    Number,
    BigInt,
    Boolean,
    Null,
    Undefined,
    Date,
    Function,
    RegExp,
    Symbol,
    Map,
    Set,
    Math,
}

impl SemanticKind {
    /// Kinds that carry a property bag and are walked member by member.
    pub fn is_assignable(self) -> bool {
        matches!(
            self,
            SemanticKind::Object
                | SemanticKind::Array
                | SemanticKind::Date
                | SemanticKind::Function
                | SemanticKind::RegExp
                | SemanticKind::Map
                | SemanticKind::Set
                | SemanticKind::Math
        )
    }
}

pub fn classify(value: &Value) -> SemanticKind {
    match value {
        Value::Undefined => SemanticKind::Undefined,
        Value::Null => SemanticKind::Null,
        Value::Boolean(_) => SemanticKind::Boolean,
        Value::Number(_) => SemanticKind::Number,
        Value::BigInt(_) => SemanticKind::BigInt,
        Value::String(_) => SemanticKind::String,
        Value::Symbol(_) => SemanticKind::Symbol,
        Value::Object(_) => SemanticKind::Object,
        Value::Array(_) => SemanticKind::Array,
        Value::Date(_) => SemanticKind::Date,
        Value::RegExp(_) => SemanticKind::RegExp,
        Value::Function(_) => SemanticKind::Function,
        Value::Map(_) => SemanticKind::Map,
        Value::Set(_) => SemanticKind::Set,
        Value::Math(_) => SemanticKind::Math,
    }
}
