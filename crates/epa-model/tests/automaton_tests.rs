use epa_model::{Automaton, ModelError, State, Transition};

fn s(name: &str) -> State {
    State::named(name)
}

fn actions(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_valid_automaton() {
    let automaton = Automaton::new(
        s("S0"),
        [s("S0"), s("S1")],
        actions(&["open"]),
        [Transition::normal(s("S0"), "open", s("S1"))],
    )
    .unwrap();

    assert_eq!(automaton.initial_state(), &s("S0"));
    assert_eq!(automaton.states().len(), 2);
    assert!(automaton.contains_action("open"));
    assert!(automaton.contains_transition(&Transition::normal(s("S0"), "open", s("S1"))));
    assert!(!automaton.contains_transition(&Transition::exceptional(
        s("S0"),
        "open",
        s("S1"),
        "IOError"
    )));
}

#[test]
fn test_invalid_state_is_rejected_as_member() {
    let result = Automaton::new(
        s("S0"),
        [s("S0"), State::Invalid],
        actions(&[]),
        Vec::<Transition>::new(),
    );
    assert_eq!(result.unwrap_err(), ModelError::InvalidStateMember);
}

#[test]
fn test_initial_state_must_be_declared() {
    let result = Automaton::new(s("Ghost"), [s("S0")], actions(&[]), Vec::<Transition>::new());
    assert!(matches!(
        result.unwrap_err(),
        ModelError::UnknownInitialState { .. }
    ));
}

#[test]
fn test_transition_endpoints_must_be_declared() {
    let result = Automaton::new(
        s("S0"),
        [s("S0")],
        actions(&["open"]),
        [Transition::normal(s("S0"), "open", s("S1"))],
    );
    match result.unwrap_err() {
        ModelError::DanglingState { state, .. } => assert_eq!(state, "S1"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_transition_into_invalid_state_is_rejected() {
    let result = Automaton::new(
        s("S0"),
        [s("S0")],
        actions(&["crash"]),
        [Transition::normal(s("S0"), "crash", State::Invalid)],
    );
    assert!(matches!(result.unwrap_err(), ModelError::DanglingState { .. }));
}

#[test]
fn test_transition_action_must_be_declared() {
    let result = Automaton::new(
        s("S0"),
        [s("S0"), s("S1")],
        actions(&["open"]),
        [Transition::normal(s("S0"), "close", s("S1"))],
    );
    assert!(matches!(result.unwrap_err(), ModelError::UnknownAction { .. }));
}
