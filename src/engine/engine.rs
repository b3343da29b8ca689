use std::collections::BTreeMap;

use crate::{
    engine::{item_session::ItemSession, route::Route},
    session::{
        error::{
            EngineError, invalid_response, navigation_violation, state_violation,
            unknown_item_session,
        },
        ports::{AssessmentEnginePort, ItemSessionView},
        types::{ItemOccurrence, ItemRef, NavigationMode, Occurrence, SessionState},
    },
    variables::VariableSet,
};

/// In-process assessment engine over a compiled route.
///
/// Linear sessions auto-advance after each attempt and only move forward.
/// Non-linear sessions stay on the answered item and accept `move_back` and
/// `jump_to`. Item sessions are created the first time their step becomes
/// current and survive navigation.
#[derive(Debug, Clone)]
pub struct RouteEngine {
    session_id: String,
    navigation_mode: NavigationMode,
    state: SessionState,
    route: Route,
    position: usize,
    item_sessions: BTreeMap<ItemOccurrence, ItemSession>,
}

impl RouteEngine {
    pub fn new(
        session_id: impl Into<String>,
        navigation_mode: NavigationMode,
        route: Route,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            navigation_mode,
            state: SessionState::Initial,
            route,
            position: 0,
            item_sessions: BTreeMap::new(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Route position of the current item, if any.
    pub fn position(&self) -> Option<usize> {
        match self.state {
            SessionState::Interacting | SessionState::Suspended => Some(self.position),
            SessionState::Initial | SessionState::Closed => None,
        }
    }

    fn require_interacting(&self, operation: &str) -> Result<(), EngineError> {
        if self.state == SessionState::Interacting {
            return Ok(());
        }
        Err(state_violation(format!(
            "cannot {} while session '{}' is {}",
            operation, self.session_id, self.state
        )))
    }

    fn require_non_linear(&self, operation: &str) -> Result<(), EngineError> {
        if self.navigation_mode == NavigationMode::NonLinear {
            return Ok(());
        }
        Err(navigation_violation(format!(
            "{} is not allowed in linear navigation mode",
            operation
        )))
    }

    fn enter(&mut self, position: usize) {
        let Some(step) = self.route.step(position) else {
            self.close();
            return;
        };
        let key = step.item_occurrence();
        self.item_sessions
            .entry(key)
            .or_insert_with(|| ItemSession::new(step));
        self.position = position;
        self.state = SessionState::Interacting;
    }

    fn close(&mut self) {
        self.state = SessionState::Closed;
        tracing::info!(
            target: "engine",
            session_id = %self.session_id,
            item_sessions = self.item_sessions.len(),
            "test_session_closed"
        );
    }
}

impl AssessmentEnginePort for RouteEngine {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn navigation_mode(&self) -> NavigationMode {
        self.navigation_mode
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn current_item_ref(&self) -> Option<&ItemRef> {
        let position = self.position()?;
        self.route.step(position).map(|step| &step.item_ref)
    }

    fn current_occurrence(&self) -> Option<Occurrence> {
        let position = self.position()?;
        self.route.step(position).map(|step| step.occurrence)
    }

    fn end_attempt(&mut self, responses: VariableSet) -> Result<(), EngineError> {
        self.require_interacting("end an attempt")?;
        let key = self
            .route
            .step(self.position)
            .map(|step| step.item_occurrence())
            .ok_or_else(|| state_violation("current route position is out of range"))?;
        let session = self.item_sessions.get_mut(&key).ok_or_else(|| {
            unknown_item_session(format!("no item session for current item '{}'", key))
        })?;

        if self.navigation_mode == NavigationMode::Linear && session.num_attempts() > 0 {
            return Err(invalid_response(format!(
                "item '{}' was already answered in linear navigation mode",
                key
            )));
        }

        session.end_attempt(responses)?;
        tracing::debug!(
            target: "engine",
            session_id = %self.session_id,
            item = %key,
            num_attempts = session.num_attempts(),
            "item_attempt_ended"
        );

        if self.navigation_mode == NavigationMode::Linear {
            self.enter(self.position + 1);
        }
        Ok(())
    }

    fn item_session(
        &self,
        item_ref: &str,
        occurrence: Occurrence,
    ) -> Result<&dyn ItemSessionView, EngineError> {
        self.item_sessions
            .get(&ItemOccurrence::new(item_ref, occurrence))
            .map(|session| session as &dyn ItemSessionView)
            .ok_or_else(|| {
                unknown_item_session(format!(
                    "no item session for '{}.{}' in session '{}'",
                    item_ref, occurrence, self.session_id
                ))
            })
    }

    fn begin(&mut self) -> Result<(), EngineError> {
        if self.state != SessionState::Initial {
            return Err(state_violation(format!(
                "session '{}' already began and is {}",
                self.session_id, self.state
            )));
        }
        self.enter(0);
        Ok(())
    }

    fn move_next(&mut self) -> Result<(), EngineError> {
        self.require_interacting("move to the next item")?;
        self.enter(self.position + 1);
        Ok(())
    }

    fn move_back(&mut self) -> Result<(), EngineError> {
        self.require_non_linear("move_back")?;
        self.require_interacting("move to the previous item")?;
        if self.position == 0 {
            return Err(navigation_violation("already at the first item of the route"));
        }
        self.enter(self.position - 1);
        Ok(())
    }

    fn jump_to(&mut self, position: usize) -> Result<(), EngineError> {
        self.require_non_linear("jump_to")?;
        self.require_interacting("jump to another item")?;
        if position >= self.route.len() {
            return Err(navigation_violation(format!(
                "route position {} is out of range (route has {} items)",
                position,
                self.route.len()
            )));
        }
        self.enter(position);
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), EngineError> {
        self.require_interacting("suspend")?;
        self.state = SessionState::Suspended;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        if self.state != SessionState::Suspended {
            return Err(state_violation(format!(
                "cannot resume session '{}' while it is {}",
                self.session_id, self.state
            )));
        }
        self.state = SessionState::Interacting;
        Ok(())
    }

    fn end_test_session(&mut self) -> Result<(), EngineError> {
        if self.state == SessionState::Closed {
            return Err(state_violation(format!(
                "session '{}' is already closed",
                self.session_id
            )));
        }
        self.close();
        Ok(())
    }
}
