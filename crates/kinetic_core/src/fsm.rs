//! Finite state machines
//!
//! Small flat state machines for effect lifecycles. Transitions are keyed by
//! `(state, event)`; an event with no transition from the current state is
//! ignored, and a state with no outgoing transitions is terminal.

use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
}

impl<S, E> Transition<S, E> {
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
        }
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: FxHashMap<(S, E), S>,
}

impl<S, E> StateMachine<S, E>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    /// Later transitions for the same `(from, event)` pair replace earlier ones
    pub fn new(initial_state: S, transitions: impl IntoIterator<Item = Transition<S, E>>) -> Self {
        Self {
            current_state: initial_state,
            transitions: transitions
                .into_iter()
                .map(|t| ((t.from_state, t.event), t.to_state))
                .collect(),
        }
    }

    pub fn current_state(&self) -> S {
        self.current_state
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Send an event, returning the (possibly unchanged) current state
    pub fn send(&mut self, event: E) -> S {
        let current = self.current_state;
        let Some(&to_state) = self.transitions.get(&(current, event)) else {
            return current;
        };

        self.current_state = to_state;
        tracing::trace!("Fsm: {:?} --{:?}--> {:?}", current, event, to_state);
        to_state
    }
}
