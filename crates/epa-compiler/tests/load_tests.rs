use epa_compiler::{load_automaton, ConfigError, LoadError};
use epa_ir::parse::parse_spec;
use epa_model::{State, Transition};
use epa_vif::{ClassRegistry, Introspection};

struct ListIter {
    items: Vec<i32>,
    pos: usize,
}

fn iterator_class() -> ClassRegistry<ListIter> {
    let mut r = ClassRegistry::new("ListIterator");
    r.register_constructor("new", "ListIterator(List)");
    r.register_action("next", "next()");
    r.register_action("remove", "remove()");
    r.register_state("HasNext", |it: &ListIter| it.pos < it.items.len())
        .unwrap();
    r.register_state("AtEnd", |it: &ListIter| it.pos >= it.items.len())
        .unwrap();
    r
}

#[test]
fn test_load_list_iterator() {
    let spec = parse_spec(include_str!("../../epa-ir/tests/fixtures/list_iterator.json")).unwrap();
    let automaton = load_automaton(&spec, &iterator_class()).unwrap();
    assert_eq!(automaton.states().len(), 3);
    assert_eq!(automaton.actions().len(), 3);
    assert_eq!(automaton.transitions().len(), 6);
    assert_eq!(automaton.initial_state(), &State::named("S0"));

    let it = ListIter {
        items: vec![1, 2],
        pos: 2,
    };
    assert_eq!(iterator_class().state_predicate("AtEnd", &it), Some(true));
    assert!(automaton.contains_transition(&Transition::exceptional(
        State::named("AtEnd"),
        "next",
        State::named("AtEnd"),
        "NoSuchElementException",
    )));
}

#[test]
fn test_missing_state_predicate_is_config_error() {
    let spec = parse_spec(include_str!("../../epa-ir/tests/fixtures/list_iterator.json")).unwrap();
    let mut class = ClassRegistry::new("ListIterator");
    class.register_constructor("new", "ListIterator(List)");
    class.register_action("next", "next()");
    class.register_action("remove", "remove()");
    class
        .register_state("HasNext", |it: &ListIter| it.pos < it.items.len())
        .unwrap();

    let err = load_automaton(&spec, &class).unwrap_err();
    match err {
        LoadError::Config(errors) => assert_eq!(
            errors,
            vec![ConfigError::MissingStatePredicate {
                class: "ListIterator".to_string(),
                state: "AtEnd".to_string(),
            }]
        ),
        other => panic!("expected config error, got {other}"),
    }
}

#[test]
fn test_missing_action_is_config_error() {
    let spec = parse_spec(include_str!("../../epa-ir/tests/fixtures/list_iterator.json")).unwrap();
    let mut class = ClassRegistry::new("ListIterator");
    class.register_constructor("new", "ListIterator(List)");
    class.register_action("next", "next()");
    class
        .register_state("HasNext", |it: &ListIter| it.pos < it.items.len())
        .unwrap();
    class
        .register_state("AtEnd", |it: &ListIter| it.pos >= it.items.len())
        .unwrap();
    let err = load_automaton(&spec, &class).unwrap_err();
    assert!(err.to_string().contains("Action 'remove' has no callable operation"));
}

#[test]
fn test_structural_errors_reported_before_config() {
    let json = r#"{
        "name": "Broken",
        "states": [{ "name": "S0" }, { "name": "S1" }],
        "actions": ["open"],
        "transitions": [{ "origin": "S0", "action": "close", "destination": "S1" }]
    }"#;
    let spec = parse_spec(json).unwrap();
    let err = load_automaton(&spec, &iterator_class()).unwrap_err();
    match &err {
        LoadError::Validation(errors) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation error, got {other}"),
    }
    let message = err.to_string();
    assert!(message.starts_with("Validation errors: "));
    assert!(message.contains("; "));
}
