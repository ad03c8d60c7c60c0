//! Pure state transition function.
//!
//! `transition(state, event)` returns the next state and the effects to run.
//! It performs no I/O. Handlers are split by concern, each with co-located
//! tests:
//! - `dataset`: file listing, loading and sample navigation
//! - `answers`: answering tasks and the advance affordance
//! - `saving`: explicit saves, auto-saves and their results
//! - `relabel`: the relabel workflow and resumption

mod answers;
mod dataset;
mod relabel;
mod saving;

use labelcheck_core::ValidationError;

use super::effect::Effect;
use super::event::Event;
use super::state::{Notice, SessionState};

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    pub fn no_change(state: SessionState) -> Self {
        Self {
            state,
            effects: vec![],
        }
    }
}

/// Reject a reviewer intent locally; nothing is sent to the store.
pub(crate) fn reject(mut state: SessionState, error: ValidationError) -> TransitionResult {
    let message = error.to_string();
    state.notify(Notice::warning(message.clone()));
    TransitionResult::new(state, vec![Effect::debug(format!("Rejected: {}", message))])
}

/// Ignore a result that no longer applies to the displayed state.
pub(crate) fn stale(state: SessionState, what: &str) -> TransitionResult {
    TransitionResult::new(
        state,
        vec![Effect::debug(format!("Ignoring stale {} event", what))],
    )
}

pub fn transition(state: SessionState, event: Event) -> TransitionResult {
    match event {
        Event::FilesRequested
        | Event::FilesListed { .. }
        | Event::FilesFailed { .. }
        | Event::LoadRequested { .. }
        | Event::RefreshRequested
        | Event::NavigateRequested { .. }
        | Event::PageLoaded { .. }
        | Event::PageFailed { .. } => dataset::handle(state, event),

        Event::AnswerSelected { .. } | Event::AdvanceRequested { .. } => {
            answers::handle(state, event)
        }

        Event::SaveRequested { .. }
        | Event::AnnotationSaved { .. }
        | Event::AnnotationFailed { .. } => saving::handle(state, event),

        Event::RelabelStatusRequested
        | Event::RelabelStatusChecked { .. }
        | Event::RelabelStatusFailed { .. }
        | Event::EnterRelabelRequested
        | Event::RelabelLoaded { .. }
        | Event::RelabelLoadFailed { .. }
        | Event::ExitRelabelRequested
        | Event::RelabelExited
        | Event::ResumeIndexRead { .. } => relabel::handle(state, event),
    }
}
