use serde::{Deserialize, Serialize};

use crate::{
    session::{
        error::{EngineError, SinkError},
        types::{ItemRef, NavigationMode, Occurrence, SessionState, TransmissionId},
    },
    variables::{Variable, VariableSet},
};

/// View of one item session kept by the engine.
pub trait ItemSessionView {
    fn item_ref(&self) -> &ItemRef;
    fn occurrence(&self) -> Occurrence;
    fn variables(&self) -> &VariableSet;

    fn variable_identifiers(&self) -> Vec<String> {
        self.variables().identifiers().map(str::to_string).collect()
    }

    fn variable(&self, identifier: &str) -> Option<&Variable> {
        self.variables().get(identifier)
    }
}

/// Base test-session logic: response processing, outcome computation and
/// route navigation. `end_attempt` advances the route in linear mode.
pub trait AssessmentEnginePort: Send {
    fn session_id(&self) -> &str;
    fn navigation_mode(&self) -> NavigationMode;
    fn state(&self) -> SessionState;
    fn current_item_ref(&self) -> Option<&ItemRef>;
    fn current_occurrence(&self) -> Option<Occurrence>;

    fn end_attempt(&mut self, responses: VariableSet) -> Result<(), EngineError>;
    fn item_session(
        &self,
        item_ref: &str,
        occurrence: Occurrence,
    ) -> Result<&dyn ItemSessionView, EngineError>;

    fn begin(&mut self) -> Result<(), EngineError>;
    fn move_next(&mut self) -> Result<(), EngineError>;
    fn move_back(&mut self) -> Result<(), EngineError>;
    fn jump_to(&mut self, position: usize) -> Result<(), EngineError>;
    fn suspend(&mut self) -> Result<(), EngineError>;
    fn resume(&mut self) -> Result<(), EngineError>;
    fn end_test_session(&mut self) -> Result<(), EngineError>;
}

/// One variable of one attempt, as handed to a result sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub transmission_id: TransmissionId,
    pub item_definition: String,
    pub test_definition: String,
    pub variable: Variable,
}

pub trait ResultSinkPort: Send + Sync {
    fn record(&self, record: &ResultRecord) -> Result<(), SinkError>;
}
