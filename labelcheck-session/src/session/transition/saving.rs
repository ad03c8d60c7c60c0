//! Saving annotations.
//!
//! Explicit saves surface their outcome and, in relabel mode, count toward
//! the relabeled total. Auto-saves only ever log.

use labelcheck_core::{AnnotateRequest, SaveKind, ValidationError};

use super::{reject, stale, TransitionResult};
use crate::client::NavAction;
use crate::session::effect::Effect;
use crate::session::event::{AfterSave, Event};
use crate::session::state::{Notice, SessionState, Workflow};

pub fn handle(mut state: SessionState, event: Event) -> TransitionResult {
    match event {
        Event::SaveRequested { then } => {
            let Some(sample) = &state.sample else {
                return reject(state, ValidationError::NoSampleLoaded);
            };
            match AnnotateRequest::build(
                sample,
                &state.save_tasks(),
                &state.user_answers,
                &state.original_answers,
            ) {
                Ok(request) => TransitionResult::new(
                    state,
                    vec![Effect::Annotate {
                        request,
                        kind: SaveKind::Explicit,
                        then,
                    }],
                ),
                Err(e) => reject(state, e),
            }
        }

        Event::AnnotationSaved {
            sample_id,
            kind: SaveKind::Auto,
            then,
        } => {
            let message = format!("Auto-saved {}", sample_id);
            after_auto_save(state, &sample_id, then, Effect::debug(message))
        }

        Event::AnnotationFailed {
            sample_id,
            kind: SaveKind::Auto,
            then,
            reason,
        } => {
            let message = format!("Auto-save of {} failed: {}", sample_id, reason);
            after_auto_save(state, &sample_id, then, Effect::warn(message))
        }

        Event::AnnotationSaved {
            sample_id,
            kind: SaveKind::Explicit,
            then,
        } => {
            if let Workflow::Active { relabeled_count } = &mut state.workflow {
                *relabeled_count += 1;
            }
            state.notify(Notice::success(format!("Saved {}", sample_id)));

            let mut effects = vec![Effect::info(format!("Saved annotations for {}", sample_id))];
            if then == AfterSave::NextSample {
                if state.sample_id() == Some(sample_id.as_str()) {
                    effects.push(Effect::Navigate {
                        action: NavAction::Next,
                    });
                } else {
                    effects.push(Effect::debug(format!(
                        "Not advancing: {} is no longer displayed",
                        sample_id
                    )));
                }
            }
            TransitionResult::new(state, effects)
        }

        Event::AnnotationFailed {
            sample_id,
            kind: SaveKind::Explicit,
            reason,
            ..
        } => {
            state.notify(Notice::error(format!("Save failed: {}", reason)));
            TransitionResult::new(
                state,
                vec![Effect::warn(format!(
                    "Saving {} failed: {}",
                    sample_id, reason
                ))],
            )
        }

        other => TransitionResult::new(
            state,
            vec![Effect::warn(format!(
                "saving handler received unrelated event {}",
                other.log_summary()
            ))],
        ),
    }
}

/// Finish an advance whose auto-save has completed, whatever its outcome.
fn after_auto_save(
    mut state: SessionState,
    sample_id: &str,
    then: AfterSave,
    log: Effect,
) -> TransitionResult {
    if state.sample_id() != Some(sample_id) {
        return stale(state, "auto-save");
    }
    if let AfterSave::Focus(next) = then {
        state.sequencer.set_focus(next);
    }
    TransitionResult::new(state, vec![log])
}
