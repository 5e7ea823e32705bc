//! Randomized checks over seeded event streams.

use std::collections::BTreeSet;
use std::sync::Arc;

use epa_compiler::MiningBounds;
use epa_coverage::{
    Criterion, CoverageEvaluator, Goal, GoalSpace, InterpretMode, RunContext, TraceInterpreter,
};
use epa_model::{Automaton, State, Transition};
use epa_vif::{EventStream, ExecutionResult, RawEvent, TestId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const STATES: [&str; 3] = ["S0", "S1", "S2"];
const ACTIONS: [&str; 3] = ["a", "b", "c"];
const FAILURES: [&str; 2] = ["IOError", "Timeout"];
/// Only ever emitted after a crash.
const AFTER_CRASH: &str = "after";

fn random_stream(rng: &mut ChaCha8Rng) -> EventStream {
    let mut events = Vec::new();
    let mut state = "S0";
    let mut crashed = false;
    for _ in 0..rng.gen_range(0..12) {
        if crashed {
            events.push(RawEvent::normal(state, AFTER_CRASH, "S0"));
            continue;
        }
        let action = ACTIONS[rng.gen_range(0..ACTIONS.len())];
        let roll: u8 = rng.gen_range(0..10);
        if roll == 0 {
            events.push(RawEvent::crash(state, action));
            crashed = true;
        } else if roll < 3 {
            let failure = FAILURES[rng.gen_range(0..FAILURES.len())];
            events.push(RawEvent::exceptional(state, action, state, failure));
        } else {
            let next = STATES[rng.gen_range(0..STATES.len())];
            events.push(RawEvent::normal(state, action, next));
            state = next;
        }
    }
    EventStream::new(events)
}

fn random_suite(rng: &mut ChaCha8Rng, first_test: u64) -> Vec<ExecutionResult> {
    (0..rng.gen_range(1..6))
        .map(|i| {
            let streams = (0..rng.gen_range(0..3)).map(|_| random_stream(rng)).collect();
            ExecutionResult::new(TestId(first_test + i), streams)
        })
        .collect()
}

fn declared() -> Arc<Automaton> {
    let s = State::named;
    Arc::new(
        Automaton::new(
            s("S0"),
            STATES.iter().map(|n| s(*n)),
            ACTIONS.iter().chain([&AFTER_CRASH]).map(|a| a.to_string()),
            [
                Transition::normal(s("S0"), "a", s("S1")),
                Transition::normal(s("S1"), "b", s("S2")),
                Transition::normal(s("S2"), "c", s("S0")),
                Transition::exceptional(s("S1"), "a", s("S1"), "IOError"),
            ],
        )
        .unwrap(),
    )
}

fn all_evaluators() -> Vec<CoverageEvaluator> {
    let automaton = declared();
    let bounds = MiningBounds::from_action_count(ACTIONS.len() + 1);
    Criterion::ALL
        .iter()
        .map(|&criterion| {
            let (space, interpreter) = if criterion.is_mining() {
                let actions = ACTIONS.iter().chain([&AFTER_CRASH]).map(|a| a.to_string());
                (
                    GoalSpace::Mined(bounds),
                    TraceInterpreter::mining(actions, InterpretMode::Strict),
                )
            } else {
                (
                    GoalSpace::Declared(Arc::clone(&automaton)),
                    TraceInterpreter::declared(&automaton, Vec::new(), InterpretMode::Strict),
                )
            };
            CoverageEvaluator::new(criterion, space, interpreter).unwrap()
        })
        .collect()
}

fn goal_actions(goal: &Goal) -> Vec<&str> {
    match goal {
        Goal::Transition(t) | Goal::Exception(t) => vec![t.action.as_str()],
        Goal::AdjacentPair(p) => vec![p.first.action.as_str(), p.second.action.as_str()],
    }
}

#[test]
fn test_nothing_after_crash_is_ever_registered() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let ctx = RunContext::new();
    let evaluators = all_evaluators();
    for round in 0..50 {
        let suite = random_suite(&mut rng, round * 10);
        for eval in &evaluators {
            eval.evaluate(&ctx, &suite).unwrap();
        }
    }
    for criterion in Criterion::ALL {
        for goal in ctx.registry(criterion).values() {
            assert!(
                !goal_actions(&goal).contains(&AFTER_CRASH),
                "{criterion} registered {goal}"
            );
            match &goal {
                Goal::Transition(t) | Goal::Exception(t) => assert!(!t.is_degenerate()),
                Goal::AdjacentPair(p) => {
                    assert!(!p.first.is_degenerate() && !p.second.is_degenerate())
                }
            }
        }
    }
}

#[test]
fn test_replay_is_deterministic() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let suites: Vec<_> = (0..20).map(|i| random_suite(&mut rng, i * 10)).collect();

    let replay = || {
        let ctx = RunContext::new();
        let evaluators = all_evaluators();
        let mut reports = Vec::new();
        for suite in &suites {
            for eval in &evaluators {
                reports.push(eval.evaluate(&ctx, suite).unwrap());
            }
        }
        let keys: Vec<BTreeSet<String>> = Criterion::ALL
            .iter()
            .map(|&c| ctx.registry(c).keys().into_iter().collect())
            .collect();
        (reports, keys)
    };

    let (reports1, keys1) = replay();
    let (reports2, keys2) = replay();
    assert_eq!(reports1, reports2);
    assert_eq!(keys1, keys2);
}

#[test]
fn test_registry_never_shrinks() {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    let ctx = RunContext::new();
    let evaluators = all_evaluators();
    let mut sizes = [0usize; 6];
    for round in 0..100 {
        let suite = random_suite(&mut rng, round * 10);
        for (i, eval) in evaluators.iter().enumerate() {
            eval.evaluate(&ctx, &suite).unwrap();
            let size = ctx.registry(eval.criterion()).len();
            assert!(size >= sizes[i]);
            sizes[i] = size;
        }
    }
}

#[test]
fn test_covered_never_exceeds_upper_bound() {
    for seed in 0..10 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ctx = RunContext::new();
        for eval in all_evaluators() {
            for round in 0..10 {
                let report = eval.evaluate(&ctx, &random_suite(&mut rng, round)).unwrap();
                assert!(report.covered as u128 <= report.upper_bound);
                assert!((0.0..=1.0).contains(&report.coverage_fraction));
                assert!((0.0..=1.0).contains(&report.fitness));
            }
        }
    }
}

#[test]
fn test_single_state_automaton_is_clamped() {
    let s = State::named;
    let automaton = Arc::new(
        Automaton::new(s("S0"), [s("S0")], ["a".to_string()], Vec::<Transition>::new()).unwrap(),
    );
    let interpreter = TraceInterpreter::declared(&automaton, Vec::new(), InterpretMode::Strict);
    let eval = CoverageEvaluator::new(
        Criterion::AdjacentEdges,
        GoalSpace::Declared(Arc::clone(&automaton)),
        interpreter,
    )
    .unwrap();
    // normal/normal, normal/exceptional, exceptional/normal, exceptional/exceptional
    let events = vec![
        RawEvent::normal("S0", "a", "S0"),
        RawEvent::normal("S0", "a", "S0"),
        RawEvent::exceptional("S0", "a", "S0", "E"),
        RawEvent::exceptional("S0", "a", "S0", "E"),
        RawEvent::normal("S0", "a", "S0"),
    ];
    let ctx = RunContext::new();
    let report = eval
        .evaluate(&ctx, &[ExecutionResult::new(TestId(1), vec![EventStream::new(events)])])
        .unwrap();
    assert_eq!(ctx.registry(Criterion::AdjacentEdges).len(), 4);
    assert_eq!(report.upper_bound, 2);
    assert_eq!(report.covered, 2);
    assert_eq!(report.coverage_fraction, 1.0);
}
