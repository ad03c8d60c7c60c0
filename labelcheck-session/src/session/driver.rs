//! Session driver.
//!
//! Owns the state and runs the event loop: transition, execute effects,
//! feed result events back, until nothing is left to process.

use std::collections::HashMap;

use labelcheck_core::Color;
use tracing::debug;

use super::event::Event;
use super::interpreter::{execute_effects, InterpreterContext};
use super::state::{Notice, SessionState};
use super::transition::{transition, TransitionResult};

pub struct Session {
    state: SessionState,
    ctx: InterpreterContext,
}

impl Session {
    pub fn new(ctx: InterpreterContext) -> Self {
        Self {
            state: SessionState::new(),
            ctx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Colors for the displayed page's personas and speakers.
    pub fn role_colors(&mut self) -> HashMap<String, Color> {
        self.state.role_colors()
    }

    /// Drain the notices queued since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.state.notices)
    }

    /// Process an event and every result event it leads to.
    ///
    /// Result events are handled depth first, in the order the effects
    /// produced them, so a save settles before the navigation it triggers.
    pub async fn dispatch(&mut self, event: Event) -> &SessionState {
        let mut events_to_process = vec![event];

        while let Some(event) = events_to_process.pop() {
            debug!(
                "Processing event {} in workflow {:?}",
                event.log_summary(),
                self.state.workflow
            );

            // The state is only moved out for the synchronous transition, so
            // dropping this future mid-effect leaves the last settled state.
            let current_state = std::mem::take(&mut self.state);
            let TransitionResult { state, effects } = transition(current_state, event);
            self.state = state;

            if !effects.is_empty() {
                debug!("Executing {} effects", effects.len());
                let result_events = execute_effects(&self.ctx, effects).await;

                // Reverse so they pop in order.
                for result_event in result_events.into_iter().rev() {
                    events_to_process.push(result_event);
                }
            }
        }

        &self.state
    }
}
