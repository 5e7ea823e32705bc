use epa_compiler::miner::{is_action_enabled, label_instance};
use epa_compiler::{
    automaton_from_spec, check_pairing, mine, to_dot, to_spec, ConfigError, MineError,
    MiningBounds,
};
use epa_ir::parse::{parse_spec, print_spec};
use epa_model::{State, Trace, Transition};
use epa_vif::ClassRegistry;

struct Stack {
    items: Vec<i32>,
}

fn stack_class() -> ClassRegistry<Stack> {
    let mut r = ClassRegistry::new("Stack");
    r.register_constructor("Stack()", "Stack()");
    r.register_action("push", "push(int)");
    r.register_action("pop", "pop()");
    r.register_precondition("push", |s: &Stack| s.items.len() < 2)
        .unwrap();
    r.register_precondition("pop", |s: &Stack| !s.items.is_empty())
        .unwrap();
    r
}

fn t(origin: &str, action: &str, destination: &str) -> Transition {
    Transition::normal(State::named(origin), action, State::named(destination))
}

#[test]
fn test_pairing_counts_constructors() {
    assert_eq!(check_pairing(&stack_class()).unwrap(), 3);
    let bounds = MiningBounds::from_introspection(&stack_class()).unwrap();
    assert_eq!(bounds.states, 8);
    assert_eq!(bounds.transitions, 8 * 3 * 8);
}

#[test]
fn test_pairing_errors_both_directions() {
    let mut class = ClassRegistry::new("Stack");
    class.register_action("push", "push(int)");
    class.register_precondition("peek", |s: &Stack| !s.items.is_empty())
        .unwrap();
    let errors = check_pairing(&class).unwrap_err();
    assert_eq!(
        errors,
        vec![
            ConfigError::MissingPrecondition {
                class: "Stack".to_string(),
                action: "push".to_string(),
            },
            ConfigError::MissingActionForPrecondition {
                class: "Stack".to_string(),
                action: "peek".to_string(),
            },
        ]
    );
}

#[test]
fn test_empty_class_cannot_be_mined() {
    let class: ClassRegistry<Stack> = ClassRegistry::new("Empty");
    assert!(matches!(
        check_pairing(&class).unwrap_err().as_slice(),
        [ConfigError::NoActions { .. }]
    ));
}

#[test]
fn test_label_live_instance() {
    let class = stack_class();
    let state = label_instance(&class, &Stack { items: vec![1, 2] });
    assert_eq!(state.name(), "[pop=true, push=false]");
    assert!(is_action_enabled("pop", &state).unwrap());
    assert!(!is_action_enabled("push", &state).unwrap());
}

#[test]
fn test_mine_from_traces() {
    let traces = vec![
        Trace::from_transitions([t("S0", "push", "S1"), t("S1", "pop", "S0")]),
        Trace::from_transitions([
            t("S0", "push", "S1"),
            Transition::exceptional(State::named("S1"), "push", State::named("S1"), "Overflow"),
            Transition::normal(State::named("S1"), "pop", State::Invalid),
        ]),
        Trace::new(),
    ];
    let automaton = mine(&traces).unwrap();
    assert_eq!(automaton.initial_state(), &State::named("S0"));
    assert_eq!(automaton.states().len(), 2);
    assert_eq!(automaton.actions().len(), 2);
    // the degenerate pop is dropped
    assert_eq!(automaton.transitions().len(), 3);
    assert!(!automaton.states().contains(&State::Invalid));
}

#[test]
fn test_mine_rejects_disagreeing_initial_states() {
    let traces = [
        Trace::from_transitions([t("S0", "push", "S1")]),
        Trace::from_transitions([t("S1", "pop", "S0")]),
    ];
    assert!(matches!(
        mine(&traces),
        Err(MineError::InconsistentInitialState { .. })
    ));
    assert!(matches!(mine(&[Trace::new()]), Err(MineError::NoTraces)));
}

#[test]
fn test_mined_automaton_round_trips_through_spec() {
    let traces = [Trace::from_transitions([
        t("S0", "push", "S1"),
        Transition::exceptional(State::named("S1"), "push", State::named("S1"), "Overflow"),
    ])];
    let automaton = mine(&traces).unwrap();
    let spec = to_spec(&automaton, "Stack");
    let reparsed = parse_spec(&print_spec(&spec).unwrap()).unwrap();
    assert_eq!(reparsed, spec);
    assert_eq!(automaton_from_spec(&reparsed).unwrap(), automaton);
}

#[test]
fn test_dot_rendering() {
    let traces = [Trace::from_transitions([
        t("S0", "push", "S1"),
        Transition::exceptional(State::named("S1"), "push", State::named("S1"), "Overflow"),
    ])];
    let dot = to_dot(&mine(&traces).unwrap(), "Stack");
    assert!(dot.starts_with("digraph \"Stack\" {"));
    assert!(dot.contains("\"S0\" [shape=doublecircle];"));
    assert!(dot.contains("\"S1\" [shape=circle];"));
    assert!(dot.contains("\"S0\" -> \"S1\" [label=\"push\"];"));
    assert!(dot.contains("\"S1\" -> \"S1\" [label=\"push!Overflow\", style=dashed];"));
    assert!(dot.trim_end().ends_with('}'));
}
