//! Instrumented widgets and helpers for exercising the runtime in tests.

/// Probe widgets that log every callback they receive.
pub mod probe;

use std::cell::RefCell;

/// Callback log shared by the probes on one thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct State {
    /// Recorded callbacks, oldest first.
    pub path: Vec<String>,
}

impl State {
    /// Clear recorded callbacks.
    pub fn reset(&mut self) {
        self.path.clear();
    }

    /// Record a callback.
    pub fn add_event(&mut self, entry: String) {
        self.path.push(entry);
    }
}

thread_local! {
    /// The per-thread callback log.
    pub(crate) static TSTATE: RefCell<State> = RefCell::new(State::default());
}

/// Clear the callback log.
pub fn reset_state() {
    TSTATE.with(|s| s.borrow_mut().reset());
}

/// A copy of the callback log.
pub fn get_state() -> State {
    TSTATE.with(|s| s.borrow().clone())
}

/// Append an entry to the callback log.
pub(crate) fn record(entry: String) {
    TSTATE.with(|s| s.borrow_mut().add_event(entry));
}
