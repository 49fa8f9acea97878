//! All-or-nothing step execution
//!
//! Every external call runs as one step. The step mutates a staged copy of
//! the state and buffers its events; only when the step body returns `Ok`
//! are the staged state and events written back. Any error drops the stage,
//! leaving the committed state and event log exactly as they were.

use oracle_core::{OracleEvent, Result};

/// Staged copy of a state value plus the events produced so far
#[derive(Debug)]
pub struct Staged<S> {
    state: S,
    events: Vec<OracleEvent>,
}

impl<S: Clone> Staged<S> {
    /// Stage a copy of `state`
    pub fn begin(state: &S) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
        }
    }

    /// Write the staged state back and hand out the buffered events
    pub fn commit(self, target: &mut S) -> Vec<OracleEvent> {
        *target = self.state;
        self.events
    }
}

impl<S> Staged<S> {
    /// Staged state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable staged state
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Buffer an event
    pub fn emit(&mut self, event: OracleEvent) {
        self.events.push(event);
    }

    /// Split into the staged state and the event buffer
    pub fn parts_mut(&mut self) -> (&mut S, &mut Vec<OracleEvent>) {
        (&mut self.state, &mut self.events)
    }
}

/// Run `step` against a staged copy of `target`.
///
/// On success the staged state replaces `target` and the buffered events are
/// appended to `log`. On failure neither is touched.
pub fn atomically<S, T, F>(target: &mut S, log: &mut Vec<OracleEvent>, step: F) -> Result<T>
where
    S: Clone,
    F: FnOnce(&mut Staged<S>) -> Result<T>,
{
    let mut staged = Staged::begin(target);
    let output = step(&mut staged)?;
    let events = staged.commit(target);
    for event in &events {
        tracing::debug!(?event, "event committed");
    }
    log.extend(events);
    Ok(output)
}
