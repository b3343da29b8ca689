use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

pub type VariableId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Response,
    Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Single,
    Multiple,
    Ordered,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseType {
    Identifier,
    Boolean,
    Integer,
    Float,
    String,
    Point,
    Pair,
    DirectedPair,
    Duration,
    File,
    Uri,
    IntOrIdentifier,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaseType::Identifier => "identifier",
            BaseType::Boolean => "boolean",
            BaseType::Integer => "integer",
            BaseType::Float => "float",
            BaseType::String => "string",
            BaseType::Point => "point",
            BaseType::Pair => "pair",
            BaseType::DirectedPair => "directedPair",
            BaseType::Duration => "duration",
            BaseType::File => "file",
            BaseType::Uri => "uri",
            BaseType::IntOrIdentifier => "intOrIdentifier",
        };
        f.write_str(name)
    }
}

/// One base-typed value. Durations are carried in milliseconds, files as
/// their stored locator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Scalar {
    Identifier(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Point { x: i64, y: i64 },
    Pair(String, String),
    DirectedPair(String, String),
    Duration(u64),
    File(String),
    Uri(String),
}

impl Scalar {
    pub fn matches(&self, base_type: BaseType) -> bool {
        matches!(
            (self, base_type),
            (Scalar::Identifier(_), BaseType::Identifier)
                | (Scalar::Boolean(_), BaseType::Boolean)
                | (Scalar::Integer(_), BaseType::Integer)
                | (Scalar::Float(_), BaseType::Float)
                | (Scalar::String(_), BaseType::String)
                | (Scalar::Point { .. }, BaseType::Point)
                | (Scalar::Pair(_, _), BaseType::Pair)
                | (Scalar::DirectedPair(_, _), BaseType::DirectedPair)
                | (Scalar::Duration(_), BaseType::Duration)
                | (Scalar::File(_), BaseType::File)
                | (Scalar::Uri(_), BaseType::Uri)
                | (Scalar::Integer(_), BaseType::IntOrIdentifier)
                | (Scalar::Identifier(_), BaseType::IntOrIdentifier)
        )
    }

    /// Pairs are unordered, directed pairs and everything else compare
    /// structurally.
    pub fn equivalent(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Pair(a1, b1), Scalar::Pair(a2, b2)) => {
                (a1 == a2 && b1 == b2) || (a1 == b2 && b1 == a2)
            }
            _ => self == other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cardinality", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Single(Scalar),
    Multiple(Vec<Scalar>),
    Ordered(Vec<Scalar>),
    Record(BTreeMap<String, Scalar>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Multiple(values) | Value::Ordered(values) => values.is_empty(),
            Value::Record(fields) => fields.is_empty(),
            Value::Single(_) => false,
        }
    }

    pub fn cardinality(&self) -> Option<Cardinality> {
        match self {
            Value::Null => None,
            Value::Single(_) => Some(Cardinality::Single),
            Value::Multiple(_) => Some(Cardinality::Multiple),
            Value::Ordered(_) => Some(Cardinality::Ordered),
            Value::Record(_) => Some(Cardinality::Record),
        }
    }

    /// Shape must follow the cardinality and every scalar the base type.
    /// Records carry heterogeneous fields and are only checked for shape.
    pub fn conforms_to(&self, cardinality: Cardinality, base_type: Option<BaseType>) -> bool {
        let all_match = |values: &[Scalar]| match base_type {
            Some(base_type) => values.iter().all(|value| value.matches(base_type)),
            None => false,
        };

        match (self, cardinality) {
            (Value::Null, _) => true,
            (Value::Single(value), Cardinality::Single) => {
                base_type.is_some_and(|base_type| value.matches(base_type))
            }
            (Value::Multiple(values), Cardinality::Multiple) => all_match(values),
            (Value::Ordered(values), Cardinality::Ordered) => all_match(values),
            (Value::Record(_), Cardinality::Record) => true,
            _ => false,
        }
    }

    /// Multiple containers compare as multisets, ordered ones positionally.
    pub fn equivalent(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Single(a), Value::Single(b)) => a.equivalent(b),
            (Value::Ordered(a), Value::Ordered(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equivalent(y))
            }
            (Value::Multiple(a), Value::Multiple(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                let mut remaining: Vec<&Scalar> = b.iter().collect();
                for value in a {
                    match remaining.iter().position(|other| value.equivalent(other)) {
                        Some(index) => {
                            remaining.swap_remove(index);
                        }
                        None => return false,
                    }
                }
                true
            }
            _ => (self.is_null() && other.is_null()) || self == other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub identifier: VariableId,
    pub kind: VariableKind,
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<BaseType>,
    pub value: Value,
}

impl Variable {
    pub fn response(
        identifier: impl Into<String>,
        cardinality: Cardinality,
        base_type: Option<BaseType>,
        value: Value,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            kind: VariableKind::Response,
            cardinality,
            base_type,
            value,
        }
    }

    pub fn outcome(
        identifier: impl Into<String>,
        cardinality: Cardinality,
        base_type: Option<BaseType>,
        value: Value,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            kind: VariableKind::Outcome,
            cardinality,
            base_type,
            value,
        }
    }
}
