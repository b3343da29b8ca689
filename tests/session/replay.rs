use std::sync::Arc;

use qti_session::{
    replay::{ReplayScript, ReplayStep, run_steps},
    session::{NavigationMode, SessionErrorKind, SessionState},
    sink::MemoryResultSink,
};

use super::support::{choice_item, identifier_response, route_session};

const SCRIPT: &str = r#"{
    route: {
        items: [
            {
                identifier: "Q1",
                href: "itemDefA-v1-testDefX",
                response_declarations: [
                    {
                        identifier: "RESPONSE",
                        cardinality: "single",
                        base_type: "identifier",
                        correct_response: { cardinality: "single", value: { type: "identifier", value: "B" } },
                    },
                ],
                outcome_declarations: [
                    { identifier: "SCORE", cardinality: "single", base_type: "float" },
                ],
            },
            { identifier: "Q2", href: "itemDefB-v1-testDefX" },
        ],
    },
    steps: [
        { op: "move_back" },
        {
            op: "end_attempt",
            responses: [
                {
                    identifier: "RESPONSE",
                    kind: "response",
                    cardinality: "single",
                    base_type: "identifier",
                    value: { cardinality: "single", value: { type: "identifier", value: "B" } },
                },
            ],
        },
        { op: "end_attempt" },
    ],
}"#;

#[test]
fn given_linear_script_when_replayed_then_rejections_are_collected_and_results_recorded() {
    let script: ReplayScript = json5::from_str(SCRIPT).expect("script should parse");
    let sink = Arc::new(MemoryResultSink::new());
    let mut session = route_session(NavigationMode::Linear, script.route.items, sink.clone());

    let summary = run_steps(&mut session, script.steps);

    assert_eq!(summary.recorded_attempts, 2);
    assert_eq!(summary.rejected_steps, vec![(0, SessionErrorKind::Navigation)]);
    // Q1: numAttempts, completionStatus, RESPONSE, SCORE; Q2: built-ins only.
    assert_eq!(summary.delivered_variables, 6);
    assert_eq!(sink.records().len(), 6);
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn given_retransmit_failing_again_when_replayed_then_failure_is_kept_until_delivered() {
    let sink = Arc::new(MemoryResultSink::new().fail_on_call(2).fail_on_call(3));
    let mut session = route_session(
        NavigationMode::Linear,
        vec![choice_item("Q1", "itemDefA-v1-testDefX", "B")],
        sink.clone(),
    );

    let summary = run_steps(
        &mut session,
        vec![
            ReplayStep::EndAttempt {
                responses: vec![identifier_response("RESPONSE", "B")],
            },
            ReplayStep::Retransmit,
            ReplayStep::Retransmit,
            ReplayStep::Retransmit,
        ],
    );

    assert_eq!(
        summary.rejected_steps,
        vec![
            (0, SessionErrorKind::ResultTransmission),
            (1, SessionErrorKind::ResultTransmission),
        ]
    );
    assert_eq!(summary.recorded_attempts, 1);
    assert_eq!(summary.delivered_variables, 4);
    assert_eq!(sink.records().len(), 4);
    assert_eq!(sink.calls(), 6);
}
