use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    session::{
        locator::ResultLocators,
        types::{ItemOccurrence, TransmissionId},
    },
    variables::{Variable, VariableId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorKind {
    InvalidResponse,
    StateViolation,
    NavigationViolation,
    UnknownItemSession,
    Internal,
}

/// Failure reported by the assessment engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

pub fn invalid_response(message: impl Into<String>) -> EngineError {
    EngineError::new(EngineErrorKind::InvalidResponse, message)
}

pub fn state_violation(message: impl Into<String>) -> EngineError {
    EngineError::new(EngineErrorKind::StateViolation, message)
}

pub fn navigation_violation(message: impl Into<String>) -> EngineError {
    EngineError::new(EngineErrorKind::NavigationViolation, message)
}

pub fn unknown_item_session(message: impl Into<String>) -> EngineError {
    EngineError::new(EngineErrorKind::UnknownItemSession, message)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkErrorKind {
    Unreachable,
    Rejected,
    Serialization,
    Io,
    Internal,
}

/// Failure reported by a result sink. Passed through the transmitter as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    pub kind: SinkErrorKind,
    pub message: String,
}

impl SinkError {
    pub fn new(kind: SinkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SinkError {}

pub fn sink_unreachable(message: impl Into<String>) -> SinkError {
    SinkError::new(SinkErrorKind::Unreachable, message)
}

pub fn sink_rejected(message: impl Into<String>) -> SinkError {
    SinkError::new(SinkErrorKind::Rejected, message)
}

pub fn sink_serialization(message: impl Into<String>) -> SinkError {
    SinkError::new(SinkErrorKind::Serialization, message)
}

pub fn sink_io(message: impl Into<String>) -> SinkError {
    SinkError::new(SinkErrorKind::Io, message)
}

/// The href of an item reference did not split into the expected segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorError {
    pub href: String,
    pub segments: usize,
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed item href '{}': expected at least 3 non-empty '-' separated segments, found {}",
            self.href, self.segments
        )
    }
}

impl std::error::Error for LocatorError {}

/// What went wrong while handing a completed attempt to the result sink, and
/// how far it got. `delivered` were recorded, `failed` was the variable being
/// sent (absent when the variable set could not be read at all), `pending`
/// were never attempted.
///
/// `unsent` holds the values of `failed` and `pending` as they were when the
/// attempt ended, so a retry sends that attempt's results even if the item
/// has been answered again since.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionFailure {
    pub transmission_id: TransmissionId,
    pub locators: ResultLocators,
    pub delivered: Vec<VariableId>,
    pub failed: Option<VariableId>,
    pub pending: Vec<VariableId>,
    pub unsent: Vec<Variable>,
    pub cause: TransmissionCause,
}

impl TransmissionFailure {
    /// Variables a retry still has to send, failed one first.
    pub fn undelivered(&self) -> Vec<VariableId> {
        self.failed
            .iter()
            .chain(self.pending.iter())
            .cloned()
            .collect()
    }

    /// The item session could not be read, so no values were captured.
    pub fn is_unread(&self) -> bool {
        self.failed.is_none() && self.unsent.is_empty()
    }
}

impl fmt::Display for TransmissionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} delivered, {} undelivered)",
            self.cause,
            self.delivered.len(),
            self.failed.iter().count() + self.pending.len()
        )
    }
}

impl std::error::Error for TransmissionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            TransmissionCause::Sink(err) => Some(err),
            TransmissionCause::Engine(err) => Some(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmissionCause {
    /// Completed item session or one of its variables could not be read.
    Engine(EngineError),
    Sink(SinkError),
}

impl fmt::Display for TransmissionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmissionCause::Engine(err) => write!(f, "variable lookup failed: {err}"),
            TransmissionCause::Sink(err) => write!(f, "result sink failed: {err}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionErrorKind {
    AttemptCompletion,
    ResultTransmission,
    MalformedLocator,
    Navigation,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("an error occurred while ending the attempt on item '{}'", display_item(.item))]
    AttemptCompletion {
        item: Option<ItemOccurrence>,
        #[source]
        source: EngineError,
    },
    #[error("an error occurred while transmitting results to the result sink for item '{item}'")]
    ResultTransmission {
        item: ItemOccurrence,
        #[source]
        failure: TransmissionFailure,
    },
    #[error("cannot derive result locators for item '{item}'")]
    MalformedLocator {
        item: ItemOccurrence,
        #[source]
        source: LocatorError,
    },
    #[error("navigation rejected")]
    Navigation {
        #[source]
        source: EngineError,
    },
}

fn display_item(item: &Option<ItemOccurrence>) -> String {
    item.as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<none>".to_string())
}

impl SessionError {
    pub fn kind(&self) -> SessionErrorKind {
        match self {
            SessionError::AttemptCompletion { .. } => SessionErrorKind::AttemptCompletion,
            SessionError::ResultTransmission { .. } => SessionErrorKind::ResultTransmission,
            SessionError::MalformedLocator { .. } => SessionErrorKind::MalformedLocator,
            SessionError::Navigation { .. } => SessionErrorKind::Navigation,
        }
    }

    /// True when the engine recorded the candidate's responses even though
    /// the call failed.
    pub fn is_answer_committed(&self) -> bool {
        matches!(self, SessionError::ResultTransmission { .. })
    }

    pub fn item(&self) -> Option<&ItemOccurrence> {
        match self {
            SessionError::AttemptCompletion { item, .. } => item.as_ref(),
            SessionError::ResultTransmission { item, .. }
            | SessionError::MalformedLocator { item, .. } => Some(item),
            SessionError::Navigation { .. } => None,
        }
    }

    pub fn transmission_failure(&self) -> Option<&TransmissionFailure> {
        match self {
            SessionError::ResultTransmission { failure, .. } => Some(failure),
            _ => None,
        }
    }
}
