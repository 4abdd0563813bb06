//! Property-based tests for the transition model.
//!
//! Random machines are driven with random guard outcomes and compared against
//! a straightforward model of the evaluation order.

use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use warden_core::Dt;
use warden_fsm::{State, StateId, StateMachine};

#[derive(Debug, Default)]
struct Counters {
    enters: Vec<u32>,
    exits: Vec<u32>,
    updates: Vec<(usize, Dt)>,
}

type SharedCounters = Rc<RefCell<Counters>>;

#[derive(Debug)]
struct Counted {
    index: usize,
    name: String,
    counters: SharedCounters,
}

impl State for Counted {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_enter(&mut self) {
        self.counters.borrow_mut().enters[self.index] += 1;
    }

    fn on_update(&mut self, dt: Dt) {
        self.counters.borrow_mut().updates.push((self.index, dt));
    }

    fn on_exit(&mut self) {
        self.counters.borrow_mut().exits[self.index] += 1;
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    global: bool,
    from: usize,
    to: usize,
}

/// First global that holds, else first local leaving `current` that holds.
fn expected_target(current: usize, edges: &[Edge], values: &[bool]) -> Option<usize> {
    let global = edges
        .iter()
        .zip(values)
        .find(|(edge, fired)| edge.global && **fired)
        .map(|(edge, _)| edge.to);

    global.or_else(|| {
        edges
            .iter()
            .zip(values)
            .find(|(edge, fired)| !edge.global && edge.from == current && **fired)
            .map(|(edge, _)| edge.to)
    })
}

fn has_unreachable_source(states: usize, edges: &[Edge]) -> bool {
    let mut reachable = vec![false; states];
    reachable[0] = true;
    for edge in edges.iter().filter(|e| e.global) {
        reachable[edge.to] = true;
    }
    loop {
        let mut changed = false;
        for edge in edges.iter().filter(|e| !e.global) {
            if reachable[edge.from] && !reachable[edge.to] {
                reachable[edge.to] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    edges.iter().any(|e| !e.global && !reachable[e.from])
}

prop_compose! {
    fn arbitrary_machine()(states in 2usize..6)
        (
            states in Just(states),
            edges in prop::collection::vec((any::<bool>(), 0..states, 0..states), 1..8),
        ) -> (usize, Vec<Edge>) {
        let edges = edges
            .into_iter()
            .map(|(global, from, to)| Edge { global, from, to })
            .collect();
        (states, edges)
    }
}

prop_compose! {
    fn arbitrary_run()((states, edges) in arbitrary_machine())
        (
            ticks in prop::collection::vec(
                prop::collection::vec(any::<bool>(), edges.len()),
                1..24,
            ),
            states in Just(states),
            edges in Just(edges),
        ) -> (usize, Vec<Edge>, Vec<Vec<bool>>) {
        (states, edges, ticks)
    }
}

proptest! {
    #[test]
    fn machine_follows_evaluation_order((states, edges, ticks) in arbitrary_run()) {
        let counters = SharedCounters::new(RefCell::new(Counters {
            enters: vec![0; states],
            exits: vec![0; states],
            updates: Vec::new(),
        }));
        let values = Rc::new(RefCell::new(vec![false; edges.len()]));
        let calls = Rc::new(RefCell::new(vec![0u32; edges.len()]));

        let mut fsm = StateMachine::new();
        let ids: Vec<StateId> = (0..states)
            .map(|index| {
                fsm.add_state(Box::new(Counted {
                    index,
                    name: format!("S{index}"),
                    counters: counters.clone(),
                }))
            })
            .collect();
        fsm.set_initial(ids[0]).unwrap();

        for (i, edge) in edges.iter().enumerate() {
            let values = values.clone();
            let calls = calls.clone();
            let guard = move || {
                calls.borrow_mut()[i] += 1;
                values.borrow()[i]
            };
            if edge.global {
                fsm.add_global(ids[edge.to], guard).unwrap();
            } else {
                fsm.add_transition(ids[edge.from], ids[edge.to], guard).unwrap();
            }
        }

        if fsm.validate().is_err() {
            prop_assert!(has_unreachable_source(states, &edges));
            return Ok(());
        }
        prop_assert!(!has_unreachable_source(states, &edges));

        let mut current = 0usize;
        for (tick, tick_values) in ticks.iter().enumerate() {
            *values.borrow_mut() = tick_values.clone();
            calls.borrow_mut().iter_mut().for_each(|c| *c = 0);
            let enters_before = counters.borrow().enters.clone();
            let exits_before = counters.borrow().exits.clone();
            let dt = Dt::from_millis(tick as u64 + 1);

            fsm.update(dt).unwrap();

            let expected = expected_target(current, &edges, tick_values).unwrap_or(current);
            let active = fsm.current_state().unwrap().index();
            prop_assert_eq!(active, expected);

            // Reachability: initial state or a transition target.
            prop_assert!(active == 0 || edges.iter().any(|e| e.to == active));

            // Each guard at most once per update.
            prop_assert!(calls.borrow().iter().all(|c| *c <= 1));

            let counters_now = counters.borrow();
            if expected == current {
                prop_assert_eq!(&counters_now.enters, &enters_before);
                prop_assert_eq!(&counters_now.exits, &exits_before);
            }

            // Enter/exit balance.
            for index in 0..states {
                let open = counters_now.enters[index] - counters_now.exits[index];
                prop_assert_eq!(open, u32::from(index == active));
            }

            // The state active after the switch gets this frame's update.
            prop_assert_eq!(counters_now.updates.last().copied(), Some((active, dt)));

            current = active;
        }
    }

    #[test]
    fn globals_beat_locals(local_first in any::<bool>()) {
        let counters = SharedCounters::new(RefCell::new(Counters {
            enters: vec![0; 3],
            exits: vec![0; 3],
            updates: Vec::new(),
        }));
        let mut fsm = StateMachine::new();
        let ids: Vec<StateId> = (0..3)
            .map(|index| {
                fsm.add_state(Box::new(Counted {
                    index,
                    name: format!("S{index}"),
                    counters: counters.clone(),
                }))
            })
            .collect();
        fsm.set_initial(ids[0]).unwrap();

        if local_first {
            fsm.add_transition(ids[0], ids[1], || true).unwrap();
            fsm.add_global(ids[2], || true).unwrap();
        } else {
            fsm.add_global(ids[2], || true).unwrap();
            fsm.add_transition(ids[0], ids[1], || true).unwrap();
        }

        fsm.update(Dt::from_millis(16)).unwrap();
        prop_assert!(fsm.is_in(ids[2]));
    }
}
