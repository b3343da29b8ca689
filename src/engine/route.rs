use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::types::{ItemOccurrence, ItemRef, Occurrence};

#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    pub item_ref: ItemRef,
    pub occurrence: Occurrence,
}

impl RouteStep {
    pub fn item_occurrence(&self) -> ItemOccurrence {
        ItemOccurrence::new(self.item_ref.identifier.clone(), self.occurrence)
    }
}

/// Compiled sequence of item placements a candidate walks through. An item
/// reference that appears more than once gets one occurrence per appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    steps: Vec<RouteStep>,
}

impl Route {
    pub fn new(item_refs: impl IntoIterator<Item = ItemRef>) -> Self {
        let mut seen: BTreeMap<String, Occurrence> = BTreeMap::new();
        let steps = item_refs
            .into_iter()
            .map(|item_ref| {
                let counter = seen.entry(item_ref.identifier.clone()).or_insert(0);
                let occurrence = *counter;
                *counter += 1;
                RouteStep {
                    item_ref,
                    occurrence,
                }
            })
            .collect();
        Self { steps }
    }

    pub fn step(&self, position: usize) -> Option<&RouteStep> {
        self.steps.get(position)
    }

    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Serialized form of a route, as found in replay scripts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteDefinition {
    #[serde(default)]
    pub items: Vec<ItemRef>,
}

impl From<RouteDefinition> for Route {
    fn from(definition: RouteDefinition) -> Self {
        Route::new(definition.items)
    }
}
