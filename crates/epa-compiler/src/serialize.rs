//! Mined-automaton output: the specification shape and a Graphviz rendering.

use std::fmt::Write;

use epa_ir::types::{AutomatonSpec, StateDecl, TransitionDecl, TransitionTag};
use epa_model::{Automaton, Transition, TransitionKind};

/// Convert an automaton into its specification form.
pub fn to_spec(automaton: &Automaton, name: &str) -> AutomatonSpec {
    let initial = automaton.initial_state();
    AutomatonSpec {
        name: name.to_string(),
        states: automaton
            .states()
            .iter()
            .map(|s| StateDecl {
                name: s.name().to_string(),
                initial: s == initial,
            })
            .collect(),
        actions: automaton.actions().iter().cloned().collect(),
        transitions: automaton.transitions().iter().map(to_decl).collect(),
    }
}

fn to_decl(t: &Transition) -> TransitionDecl {
    let (kind, failure) = match &t.kind {
        TransitionKind::Normal => (TransitionTag::Normal, None),
        TransitionKind::Exceptional { failure } => {
            (TransitionTag::Exceptional, Some(failure.clone()))
        }
    };
    TransitionDecl {
        origin: t.origin.name().to_string(),
        action: t.action.clone(),
        destination: t.destination.name().to_string(),
        kind,
        failure,
    }
}

/// Render an automaton as a Graphviz `digraph`.
///
/// The initial state is double-circled. Exceptional edges are dashed and
/// labelled `action!failure`.
pub fn to_dot(automaton: &Automaton, name: &str) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "digraph \"{}\" {{", escape(name));
    for state in automaton.states() {
        let shape = if state == automaton.initial_state() {
            "doublecircle"
        } else {
            "circle"
        };
        let _ = writeln!(out, "    \"{}\" [shape={shape}];", escape(state.name()));
    }
    for t in automaton.transitions() {
        let origin = escape(t.origin.name());
        let destination = escape(t.destination.name());
        let _ = match &t.kind {
            TransitionKind::Normal => writeln!(
                out,
                "    \"{origin}\" -> \"{destination}\" [label=\"{}\"];",
                escape(&t.action)
            ),
            TransitionKind::Exceptional { failure } => writeln!(
                out,
                "    \"{origin}\" -> \"{destination}\" [label=\"{}!{}\", style=dashed];",
                escape(&t.action),
                escape(failure)
            ),
        };
    }
    out.push_str("}\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
