use serde::{Deserialize, Serialize};

use crate::variables::types::Variable;

/// Variables of one item session, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableSet {
    variables: Vec<Variable>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces an existing variable with the same identifier in place.
    pub fn insert(&mut self, variable: Variable) {
        match self
            .variables
            .iter_mut()
            .find(|existing| existing.identifier == variable.identifier)
        {
            Some(existing) => *existing = variable,
            None => self.variables.push(variable),
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|variable| variable.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.variables
            .iter()
            .map(|variable| variable.identifier.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl FromIterator<Variable> for VariableSet {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        let mut set = VariableSet::new();
        for variable in iter {
            set.insert(variable);
        }
        set
    }
}

impl IntoIterator for VariableSet {
    type Item = Variable;
    type IntoIter = std::vec::IntoIter<Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.into_iter()
    }
}
