use std::sync::Arc;

use qti_session::{
    session::{ItemOccurrence, NavigationMode, SessionErrorKind, SessionState},
    sink::MemoryResultSink,
};

use super::support::{choice_item, identifier_response, responses, route_session};

fn three_item_session(mode: NavigationMode) -> qti_session::session::TestSession {
    route_session(
        mode,
        vec![
            choice_item("Q1", "itemDefA-v1-testDefX", "A"),
            choice_item("Q2", "itemDefB-v1-testDefX", "B"),
            choice_item("Q3", "itemDefC-v1-testDefX", "C"),
        ],
        Arc::new(MemoryResultSink::new()),
    )
}

#[test]
fn given_non_linear_session_when_jumping_then_current_item_follows() {
    let mut session = three_item_session(NavigationMode::NonLinear);

    session.jump_to(2).expect("jump should succeed");
    assert_eq!(session.current_item(), Some(ItemOccurrence::new("Q3", 0)));

    session.move_back().expect("move_back should succeed");
    assert_eq!(session.current_item(), Some(ItemOccurrence::new("Q2", 0)));
}

#[test]
fn given_linear_session_when_moving_back_then_navigation_error() {
    let mut session = three_item_session(NavigationMode::Linear);
    session.move_next().expect("move_next should succeed");

    let err = session.move_back().expect_err("linear mode forbids move_back");
    assert_eq!(err.kind(), SessionErrorKind::Navigation);
    assert_eq!(session.current_item(), Some(ItemOccurrence::new("Q2", 0)));
}

#[test]
fn given_last_item_when_move_next_then_session_closes() {
    let mut session = three_item_session(NavigationMode::NonLinear);
    session.jump_to(2).expect("jump should succeed");
    session.move_next().expect("move_next should succeed");

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(session.current_item(), None);
}

#[test]
fn given_suspended_session_when_end_attempt_then_rejected_with_item_context() {
    let mut session = three_item_session(NavigationMode::Linear);
    session.suspend().expect("suspend should succeed");
    assert_eq!(session.state(), SessionState::Suspended);

    let err = session
        .end_attempt(responses([identifier_response("RESPONSE", "A")]))
        .expect_err("suspended session must reject attempts");
    assert_eq!(err.kind(), SessionErrorKind::AttemptCompletion);
    assert_eq!(err.item(), Some(&ItemOccurrence::new("Q1", 0)));

    session.resume().expect("resume should succeed");
    session
        .end_attempt(responses([identifier_response("RESPONSE", "A")]))
        .expect("resumed session should accept the attempt");
    assert_eq!(session.current_item(), Some(ItemOccurrence::new("Q2", 0)));
}

#[test]
fn given_terminated_session_when_navigating_then_rejected() {
    let mut session = three_item_session(NavigationMode::NonLinear);
    session.terminate().expect("terminate should succeed");

    assert!(session.is_closed());
    let err = session.move_next().expect_err("closed session cannot move");
    assert_eq!(err.kind(), SessionErrorKind::Navigation);
    let err = session.terminate().expect_err("closed session cannot close again");
    assert_eq!(err.kind(), SessionErrorKind::Navigation);
}

#[test]
fn given_begun_session_when_begin_again_then_rejected() {
    let mut session = three_item_session(NavigationMode::Linear);
    let err = session.begin().expect_err("second begin must fail");
    assert_eq!(err.kind(), SessionErrorKind::Navigation);
    assert_eq!(session.navigation_mode(), NavigationMode::Linear);
    assert_eq!(session.session_id(), "S1");
}
