//! Answering tasks and moving between them.

use labelcheck_core::{AnnotateRequest, ReviewMode, SaveKind, ValidationError};

use super::{reject, TransitionResult};
use crate::session::effect::Effect;
use crate::session::event::{AfterSave, Event};
use crate::session::state::SessionState;

pub fn handle(mut state: SessionState, event: Event) -> TransitionResult {
    match event {
        Event::AnswerSelected { task, choice } => {
            let Some(sample) = &state.sample else {
                return reject(state, ValidationError::NoSampleLoaded);
            };
            if !state.sequencer.is_active(task) {
                return reject(state, ValidationError::TaskNotActive { task });
            }
            let Some(label) = sample.evaluation_labels.get(task) else {
                return reject(state, ValidationError::MissingLabel(task));
            };
            if !label.has_option(choice) {
                return reject(
                    state,
                    ValidationError::NoSuchOption {
                        task,
                        choice: choice.get(),
                    },
                );
            }

            state.user_answers.insert(task, choice);
            let affordance = state.sequencer.record_answer(task);
            TransitionResult::new(
                state,
                vec![Effect::debug(format!(
                    "Answered {} with option {} ({:?})",
                    task, choice, affordance
                ))],
            )
        }

        Event::AdvanceRequested { task } => {
            let Some(next) = state.sequencer.take_advance(task) else {
                return TransitionResult::new(
                    state,
                    vec![Effect::debug(format!("No advance available from {}", task))],
                );
            };

            if state.mode() == ReviewMode::Normal {
                state.sequencer.set_focus(next);
                return TransitionResult::no_change(state);
            }

            let request = state.sample.as_ref().map(|sample| {
                AnnotateRequest::build(
                    sample,
                    &state.save_tasks(),
                    &state.user_answers,
                    &state.original_answers,
                )
            });
            match request {
                Some(Ok(request)) => TransitionResult::new(
                    state,
                    vec![Effect::Annotate {
                        request,
                        kind: SaveKind::Auto,
                        then: AfterSave::Focus(next),
                    }],
                ),
                // Auto-save is best effort; advancing never waits on it.
                Some(Err(e)) => {
                    state.sequencer.set_focus(next);
                    TransitionResult::new(
                        state,
                        vec![Effect::debug(format!("Skipping auto-save: {}", e))],
                    )
                }
                None => {
                    state.sequencer.set_focus(next);
                    TransitionResult::no_change(state)
                }
            }
        }

        other => TransitionResult::new(
            state,
            vec![Effect::warn(format!(
                "answers handler received unrelated event {}",
                other.log_summary()
            ))],
        ),
    }
}
