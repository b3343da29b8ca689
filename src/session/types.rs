use std::fmt;

use serde::{Deserialize, Serialize};

use crate::variables::{BaseType, Cardinality, Value, VariableId};

pub type SessionId = String;
pub type Occurrence = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    #[default]
    Linear,
    NonLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Initial,
    Interacting,
    Suspended,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Initial => "initial",
            SessionState::Interacting => "interacting",
            SessionState::Suspended => "suspended",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDeclaration {
    pub identifier: VariableId,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub base_type: Option<BaseType>,
    #[serde(default)]
    pub correct_response: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDeclaration {
    pub identifier: VariableId,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub base_type: Option<BaseType>,
    #[serde(default = "null_value")]
    pub default_value: Value,
}

fn null_value() -> Value {
    Value::Null
}

/// Placement of an item definition within a test route. The href carries
/// both the item-definition and test-definition locators, see
/// [`crate::session::locator::decompose`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRef {
    pub identifier: String,
    pub href: String,
    #[serde(default)]
    pub response_declarations: Vec<ResponseDeclaration>,
    #[serde(default)]
    pub outcome_declarations: Vec<OutcomeDeclaration>,
}

impl ItemRef {
    pub fn new(identifier: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            href: href.into(),
            response_declarations: Vec::new(),
            outcome_declarations: Vec::new(),
        }
    }

    pub fn with_response(mut self, declaration: ResponseDeclaration) -> Self {
        self.response_declarations.push(declaration);
        self
    }

    pub fn with_outcome(mut self, declaration: OutcomeDeclaration) -> Self {
        self.outcome_declarations.push(declaration);
        self
    }

    pub fn response_declaration(&self, identifier: &str) -> Option<&ResponseDeclaration> {
        self.response_declarations
            .iter()
            .find(|declaration| declaration.identifier == identifier)
    }
}

/// One (item reference, occurrence) pair of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemOccurrence {
    pub item_ref: String,
    pub occurrence: Occurrence,
}

impl ItemOccurrence {
    pub fn new(item_ref: impl Into<String>, occurrence: Occurrence) -> Self {
        Self {
            item_ref: item_ref.into(),
            occurrence,
        }
    }
}

impl fmt::Display for ItemOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.item_ref, self.occurrence)
    }
}

/// `{session}.{item_ref}.{occurrence}`, the key a result sink files one
/// item attempt under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransmissionId(String);

impl TransmissionId {
    pub fn new(session_id: &str, item: &ItemOccurrence) -> Self {
        Self(format!(
            "{}.{}.{}",
            session_id, item.item_ref, item.occurrence
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
