pub mod attempt;
pub mod error;
pub mod facade;
pub mod locator;
pub mod ports;
pub mod transmitter;
pub mod types;

pub use attempt::{AttemptReport, ItemAttemptController};
pub use error::{
    EngineError, EngineErrorKind, LocatorError, SessionError, SessionErrorKind, SinkError,
    SinkErrorKind, TransmissionCause, TransmissionFailure,
};
pub use facade::TestSession;
pub use locator::{ResultLocators, decompose};
pub use ports::{AssessmentEnginePort, ItemSessionView, ResultRecord, ResultSinkPort};
pub use transmitter::ResultTransmitter;
pub use types::{
    ItemOccurrence, ItemRef, NavigationMode, Occurrence, OutcomeDeclaration, ResponseDeclaration,
    SessionId, SessionState, TransmissionId,
};
