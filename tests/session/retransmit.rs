use std::sync::Arc;

use qti_session::{
    session::{
        ItemOccurrence, ItemRef, NavigationMode, ResultLocators, SessionError, SessionErrorKind,
        TestSession, TransmissionCause, TransmissionFailure, TransmissionId,
        error::unknown_item_session,
    },
    sink::MemoryResultSink,
    variables::{Scalar, Value, VariableSet},
};

use super::support::{
    FixedEngine, choice_item, identifier_response, responses, route_session, three_variables,
};

fn failed_attempt(sink: Arc<MemoryResultSink>) -> (TestSession, SessionError) {
    let engine = FixedEngine::new(ItemRef::new("Q1", "itemDefA-v1-testDefX"), three_variables());
    let mut session = TestSession::new(Box::new(engine), sink);
    let err = session
        .end_attempt(VariableSet::new())
        .expect_err("sink failure must surface");
    (session, err)
}

#[test]
fn given_partial_transmission_when_retransmit_then_only_undelivered_variables_are_sent() {
    let sink = Arc::new(MemoryResultSink::new().fail_on_call(2));
    let (session, err) = failed_attempt(sink.clone());
    let SessionError::ResultTransmission { item, failure } = err else {
        panic!("expected a result transmission error");
    };

    let report = session
        .retransmit(&item, &failure)
        .expect("retransmit should succeed");

    assert_eq!(report.transmission_id, failure.transmission_id);
    assert_eq!(report.delivered, vec!["RESPONSE", "SCORE", "FEEDBACK"]);

    let recorded: Vec<String> = sink
        .records()
        .into_iter()
        .map(|record| record.variable.identifier)
        .collect();
    assert_eq!(recorded, vec!["RESPONSE", "SCORE", "FEEDBACK"]);
}

#[test]
fn given_retransmit_failing_again_when_retransmit_then_delivered_list_accumulates() {
    let sink = Arc::new(MemoryResultSink::new().fail_on_call(2).fail_on_call(4));
    let (session, err) = failed_attempt(sink.clone());
    let SessionError::ResultTransmission { item, failure } = err else {
        panic!("expected a result transmission error");
    };

    let err = session
        .retransmit(&item, &failure)
        .expect_err("second sink failure must surface");

    assert_eq!(err.kind(), SessionErrorKind::ResultTransmission);
    let failure = err
        .transmission_failure()
        .expect("transmission failure should be attached");
    assert_eq!(failure.delivered, vec!["RESPONSE", "SCORE"]);
    assert_eq!(failure.failed.as_deref(), Some("FEEDBACK"));
    assert!(failure.pending.is_empty());
    assert_eq!(sink.records().len(), 2);
}

#[test]
fn given_item_answered_again_when_retransmit_then_original_attempt_values_are_sent() {
    let sink = Arc::new(MemoryResultSink::new().fail_on_call(2));
    let mut session = route_session(
        NavigationMode::NonLinear,
        vec![choice_item("Q1", "itemDefA-v1-testDefX", "B")],
        sink.clone(),
    );

    let err = session
        .end_attempt(responses([identifier_response("RESPONSE", "A")]))
        .expect_err("first attempt transmission must fail");
    let SessionError::ResultTransmission { item, failure } = err else {
        panic!("expected a result transmission error");
    };
    assert_eq!(failure.failed.as_deref(), Some("completionStatus"));

    session
        .end_attempt(responses([identifier_response("RESPONSE", "B")]))
        .expect("second attempt should be recorded");

    let report = session
        .retransmit(&item, &failure)
        .expect("retransmit should succeed");
    assert_eq!(
        report.delivered,
        vec!["numAttempts", "completionStatus", "RESPONSE", "SCORE"]
    );

    let records = sink.records_for(&failure.transmission_id);
    let values_of = |identifier: &str| -> Vec<Value> {
        records
            .iter()
            .filter(|record| record.variable.identifier == identifier)
            .map(|record| record.variable.value.clone())
            .collect()
    };
    assert_eq!(
        values_of("RESPONSE"),
        vec![
            Value::Single(Scalar::Identifier("B".to_string())),
            Value::Single(Scalar::Identifier("A".to_string())),
        ]
    );
    assert_eq!(
        values_of("SCORE"),
        vec![
            Value::Single(Scalar::Float(1.0)),
            Value::Single(Scalar::Float(0.0)),
        ]
    );
    assert_eq!(values_of("numAttempts").len(), 2);
    assert_eq!(records.len(), 8);
}

#[test]
fn given_unreadable_item_session_when_retransmit_then_variables_are_read_again() {
    let sink = Arc::new(MemoryResultSink::new());
    let engine = FixedEngine::new(ItemRef::new("Q1", "itemDefA-v1-testDefX"), three_variables());
    let session = TestSession::new(Box::new(engine), sink.clone());
    let item = ItemOccurrence::new("Q1", 0);
    let failure = TransmissionFailure {
        transmission_id: TransmissionId::new("S1", &item),
        locators: ResultLocators {
            item_definition: "itemDefA".to_string(),
            test_definition: "testDefX".to_string(),
        },
        delivered: Vec::new(),
        failed: None,
        pending: Vec::new(),
        unsent: Vec::new(),
        cause: TransmissionCause::Engine(unknown_item_session("item session not ready")),
    };

    let report = session
        .retransmit(&item, &failure)
        .expect("retransmit should succeed");

    assert_eq!(report.delivered, vec!["RESPONSE", "SCORE", "FEEDBACK"]);
    assert_eq!(sink.records().len(), 3);
    assert!(
        sink.records()
            .iter()
            .all(|record| record.item_definition == "itemDefA")
    );
}
