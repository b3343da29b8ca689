use std::sync::Arc;

use crate::{
    session::{
        attempt::{AttemptReport, ItemAttemptController},
        error::{EngineError, SessionError, TransmissionFailure},
        ports::{AssessmentEnginePort, ResultSinkPort},
        transmitter::ResultTransmitter,
        types::{ItemOccurrence, NavigationMode, SessionState},
    },
    variables::VariableSet,
};

/// One candidate's traversal of one test. Wraps the assessment engine and
/// records every completed attempt to the injected result sink.
pub struct TestSession {
    engine: Box<dyn AssessmentEnginePort>,
    attempts: ItemAttemptController,
}

impl TestSession {
    pub fn new(engine: Box<dyn AssessmentEnginePort>, sink: Arc<dyn ResultSinkPort>) -> Self {
        Self::with_controller(
            engine,
            ItemAttemptController::new(ResultTransmitter::new(sink)),
        )
    }

    pub fn with_controller(
        engine: Box<dyn AssessmentEnginePort>,
        attempts: ItemAttemptController,
    ) -> Self {
        Self { engine, attempts }
    }

    pub fn engine(&self) -> &dyn AssessmentEnginePort {
        self.engine.as_ref()
    }

    pub fn session_id(&self) -> &str {
        self.engine.session_id()
    }

    pub fn navigation_mode(&self) -> NavigationMode {
        self.engine.navigation_mode()
    }

    pub fn state(&self) -> SessionState {
        self.engine.state()
    }

    pub fn current_item(&self) -> Option<ItemOccurrence> {
        let item_ref = self.engine.current_item_ref()?;
        let occurrence = self.engine.current_occurrence()?;
        Some(ItemOccurrence::new(item_ref.identifier.clone(), occurrence))
    }

    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    /// Ends the attempt on the current item. In linear mode the session moves
    /// on to the next route step, or closes after the last one.
    pub fn end_attempt(&mut self, responses: VariableSet) -> Result<AttemptReport, SessionError> {
        self.attempts.end_attempt(self.engine.as_mut(), responses)
    }

    /// Resends what a failed transmission left undelivered. Variables in
    /// `failure.delivered` are not sent again.
    pub fn retransmit(
        &self,
        item: &ItemOccurrence,
        failure: &TransmissionFailure,
    ) -> Result<AttemptReport, SessionError> {
        self.attempts.retransmit(self.engine.as_ref(), item, failure)
    }

    pub fn begin(&mut self) -> Result<(), SessionError> {
        let result = self.engine.begin();
        self.navigated("begin", result)
    }

    pub fn move_next(&mut self) -> Result<(), SessionError> {
        let result = self.engine.move_next();
        self.navigated("move_next", result)
    }

    pub fn move_back(&mut self) -> Result<(), SessionError> {
        let result = self.engine.move_back();
        self.navigated("move_back", result)
    }

    pub fn jump_to(&mut self, position: usize) -> Result<(), SessionError> {
        let result = self.engine.jump_to(position);
        self.navigated("jump_to", result)
    }

    pub fn suspend(&mut self) -> Result<(), SessionError> {
        let result = self.engine.suspend();
        self.navigated("suspend", result)
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        let result = self.engine.resume();
        self.navigated("resume", result)
    }

    pub fn terminate(&mut self) -> Result<(), SessionError> {
        let result = self.engine.end_test_session();
        self.navigated("terminate", result)
    }

    fn navigated(
        &self,
        operation: &'static str,
        result: Result<(), EngineError>,
    ) -> Result<(), SessionError> {
        match result {
            Ok(()) => {
                tracing::debug!(
                    target: "session",
                    session_id = %self.session_id(),
                    operation = operation,
                    state = %self.state(),
                    current = ?self.current_item(),
                    "session_navigated"
                );
                Ok(())
            }
            Err(source) => {
                tracing::warn!(
                    target: "session",
                    session_id = %self.session_id(),
                    operation = operation,
                    error_kind = ?source.kind,
                    error = %source,
                    "session_navigation_rejected"
                );
                Err(SessionError::Navigation { source })
            }
        }
    }
}
