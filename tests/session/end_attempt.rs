use std::{
    error::Error,
    sync::{Arc, atomic::Ordering},
};

use qti_session::{
    session::{
        EngineErrorKind, ItemOccurrence, ItemRef, NavigationMode, SessionErrorKind, SessionState,
        TestSession, TransmissionCause, TransmissionId, error::invalid_response,
    },
    sink::MemoryResultSink,
    variables::{Scalar, Value, VariableSet},
};

use super::support::{
    FixedEngine, choice_item, identifier_response, responses, route_session, three_variables,
};

#[test]
fn given_valid_response_when_end_attempt_then_every_variable_is_tagged_and_transmitted() {
    let sink = Arc::new(MemoryResultSink::new());
    let mut session = route_session(
        NavigationMode::Linear,
        vec![
            choice_item("Q1", "itemDefA-v1-testDefX", "B"),
            choice_item("Q2", "itemDefB-v1-testDefX", "C"),
        ],
        sink.clone(),
    );

    let report = session
        .end_attempt(responses([identifier_response("RESPONSE", "B")]))
        .expect("attempt should be recorded");

    assert_eq!(report.item, ItemOccurrence::new("Q1", 0));
    assert_eq!(report.transmission_id.as_str(), "S1.Q1.0");
    assert_eq!(
        report.delivered,
        vec!["numAttempts", "completionStatus", "RESPONSE", "SCORE"]
    );

    let records = sink.records();
    assert_eq!(records.len(), 4);
    for record in &records {
        assert_eq!(record.transmission_id.as_str(), "S1.Q1.0");
        assert_eq!(record.item_definition, "itemDefA");
        assert_eq!(record.test_definition, "testDefX");
    }
    let score = records
        .iter()
        .find(|record| record.variable.identifier == "SCORE")
        .expect("score should be transmitted");
    assert_eq!(score.variable.value, Value::Single(Scalar::Float(1.0)));

    assert_eq!(session.current_item(), Some(ItemOccurrence::new("Q2", 0)));
}

#[test]
fn given_engine_validation_error_when_end_attempt_then_nothing_is_transmitted() {
    let sink = Arc::new(MemoryResultSink::new());
    let engine = FixedEngine::new(ItemRef::new("Q1", "itemDefA-v1-testDefX"), three_variables())
        .failing_with(invalid_response("RESPONSE has the wrong cardinality"));
    let calls = engine.calls();
    let mut session = TestSession::new(Box::new(engine), sink.clone());

    let err = session
        .end_attempt(VariableSet::new())
        .expect_err("engine failure must surface");

    assert_eq!(err.kind(), SessionErrorKind::AttemptCompletion);
    assert!(!err.is_answer_committed());
    assert_eq!(err.item(), Some(&ItemOccurrence::new("Q1", 0)));
    assert!(err.to_string().contains("Q1.0"));
    let cause = err.source().expect("cause should be kept");
    assert_eq!(cause.to_string(), "RESPONSE has the wrong cardinality");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(sink.calls(), 0);
}

#[test]
fn given_sink_failing_on_second_call_when_end_attempt_then_partial_delivery_is_reported() {
    let sink = Arc::new(MemoryResultSink::new().fail_on_call(2));
    let engine = FixedEngine::new(ItemRef::new("Q1", "itemDefA-v1-testDefX"), three_variables());
    let mut session = TestSession::new(Box::new(engine), sink.clone());

    let err = session
        .end_attempt(VariableSet::new())
        .expect_err("sink failure must surface");

    assert_eq!(err.kind(), SessionErrorKind::ResultTransmission);
    assert!(err.is_answer_committed());
    assert_eq!(err.item(), Some(&ItemOccurrence::new("Q1", 0)));

    let failure = err
        .transmission_failure()
        .expect("transmission failure should be attached");
    assert_eq!(
        failure.transmission_id,
        TransmissionId::new("S1", &ItemOccurrence::new("Q1", 0))
    );
    assert_eq!(failure.delivered, vec!["RESPONSE"]);
    assert_eq!(failure.failed.as_deref(), Some("SCORE"));
    assert_eq!(failure.pending, vec!["FEEDBACK"]);
    assert!(matches!(failure.cause, TransmissionCause::Sink(_)));

    assert_eq!(sink.calls(), 2);
    assert_eq!(sink.records().len(), 1);
}

#[test]
fn given_malformed_href_when_end_attempt_then_engine_is_not_called() {
    let sink = Arc::new(MemoryResultSink::new());
    let engine = FixedEngine::new(ItemRef::new("Q1", "itemDefA-v1"), three_variables());
    let calls = engine.calls();
    let mut session = TestSession::new(Box::new(engine), sink.clone());

    let err = session
        .end_attempt(VariableSet::new())
        .expect_err("malformed href must fail");

    assert_eq!(err.kind(), SessionErrorKind::MalformedLocator);
    assert!(!err.is_answer_committed());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(sink.calls(), 0);
}

#[test]
fn given_last_item_in_linear_mode_when_end_attempt_then_session_is_closed() {
    let sink = Arc::new(MemoryResultSink::new());
    let mut session = route_session(
        NavigationMode::Linear,
        vec![choice_item("Q1", "itemDefA-v1-testDefX", "B")],
        sink.clone(),
    );

    session
        .end_attempt(responses([identifier_response("RESPONSE", "A")]))
        .expect("attempt should be recorded");

    assert_eq!(session.state(), SessionState::Closed);
    assert!(session.is_closed());
    assert_eq!(session.current_item(), None);
    assert_eq!(sink.records().len(), 4);
}

#[test]
fn given_closed_session_when_end_attempt_then_rejected_without_item_context() {
    let sink = Arc::new(MemoryResultSink::new());
    let mut session = route_session(
        NavigationMode::Linear,
        vec![choice_item("Q1", "itemDefA-v1-testDefX", "B")],
        sink.clone(),
    );
    session
        .end_attempt(responses([identifier_response("RESPONSE", "B")]))
        .expect("attempt should be recorded");

    let err = session
        .end_attempt(responses([identifier_response("RESPONSE", "B")]))
        .expect_err("closed session must reject attempts");

    assert_eq!(err.kind(), SessionErrorKind::AttemptCompletion);
    assert_eq!(err.item(), None);
    assert_eq!(sink.records().len(), 4);
}

#[test]
fn given_undeclared_response_when_end_attempt_then_route_does_not_advance() {
    let sink = Arc::new(MemoryResultSink::new());
    let mut session = route_session(
        NavigationMode::Linear,
        vec![
            choice_item("Q1", "itemDefA-v1-testDefX", "B"),
            choice_item("Q2", "itemDefB-v1-testDefX", "C"),
        ],
        sink.clone(),
    );

    let err = session
        .end_attempt(responses([identifier_response("UNKNOWN", "B")]))
        .expect_err("undeclared response must be rejected");

    match err {
        qti_session::session::SessionError::AttemptCompletion { item, source } => {
            assert_eq!(item, Some(ItemOccurrence::new("Q1", 0)));
            assert_eq!(source.kind, EngineErrorKind::InvalidResponse);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.current_item(), Some(ItemOccurrence::new("Q1", 0)));
    assert_eq!(sink.calls(), 0);
}

#[test]
fn given_non_linear_session_when_answering_twice_then_same_transmission_id_is_reused() {
    let sink = Arc::new(MemoryResultSink::new());
    let mut session = route_session(
        NavigationMode::NonLinear,
        vec![choice_item("Q1", "itemDefA-v1-testDefX", "B")],
        sink.clone(),
    );

    let first = session
        .end_attempt(responses([identifier_response("RESPONSE", "A")]))
        .expect("first attempt should be recorded");
    let second = session
        .end_attempt(responses([identifier_response("RESPONSE", "B")]))
        .expect("second attempt should be recorded");

    assert_eq!(first.transmission_id, second.transmission_id);
    assert_eq!(session.state(), SessionState::Interacting);

    let attempts: Vec<Value> = sink
        .records_for(&first.transmission_id)
        .into_iter()
        .filter(|record| record.variable.identifier == "numAttempts")
        .map(|record| record.variable.value)
        .collect();
    assert_eq!(
        attempts,
        vec![
            Value::Single(Scalar::Integer(1)),
            Value::Single(Scalar::Integer(2))
        ]
    );
}

#[test]
fn given_repeated_item_ref_when_answered_then_occurrences_get_distinct_ids() {
    let sink = Arc::new(MemoryResultSink::new());
    let mut session = route_session(
        NavigationMode::Linear,
        vec![
            choice_item("Q1", "itemDefA-v1-testDefX", "B"),
            choice_item("Q1", "itemDefA-v1-testDefX", "B"),
        ],
        sink.clone(),
    );

    let first = session
        .end_attempt(responses([identifier_response("RESPONSE", "B")]))
        .expect("first occurrence should be recorded");
    let second = session
        .end_attempt(responses([identifier_response("RESPONSE", "B")]))
        .expect("second occurrence should be recorded");

    assert_eq!(first.transmission_id.as_str(), "S1.Q1.0");
    assert_eq!(second.transmission_id.as_str(), "S1.Q1.1");
    assert!(session.is_closed());
}
