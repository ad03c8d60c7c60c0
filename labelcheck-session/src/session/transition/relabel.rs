//! Relabel workflow: conflict-only re-annotation.
//!
//! `Inactive -> Entering -> Active -> Inactive`. Entering while not
//! inactive and exiting while inactive are no-ops. Exit notifies the store
//! first and discards the displayed state once that round trip is over,
//! whatever the store answered.

use super::{stale, TransitionResult};
use crate::client::NavAction;
use crate::session::effect::Effect;
use crate::session::event::Event;
use crate::session::state::{Notice, SessionState, Workflow};

pub fn handle(mut state: SessionState, event: Event) -> TransitionResult {
    match event {
        Event::RelabelStatusRequested => {
            TransitionResult::new(state, vec![Effect::CheckRelabelStatus])
        }

        Event::RelabelStatusChecked { available } => {
            state.relabel_available = available;
            TransitionResult::no_change(state)
        }

        // Best effort: the flag only drives availability hints.
        Event::RelabelStatusFailed { reason } => {
            state.relabel_available = false;
            TransitionResult::new(
                state,
                vec![Effect::warn(format!("Relabel status check failed: {}", reason))],
            )
        }

        Event::EnterRelabelRequested => match state.workflow {
            Workflow::Inactive => {
                state.workflow = Workflow::Entering;
                TransitionResult::new(state, vec![Effect::LoadRelabel])
            }
            Workflow::Entering | Workflow::Active { .. } => TransitionResult::new(
                state,
                vec![Effect::debug("Relabel mode already active; ignoring enter")],
            ),
        },

        Event::RelabelLoaded {
            page,
            total_relabeled,
        } => {
            if state.workflow != Workflow::Entering {
                return stale(state, "relabel load");
            }
            let total = page.dataset_info.total_samples;
            state.workflow = Workflow::Active {
                relabeled_count: total_relabeled,
            };
            state.current_file = None;
            state.apply_page(page);
            state.notify(Notice::success(format!(
                "Entered relabel mode: {} samples, {} relabeled so far",
                total, total_relabeled
            )));
            TransitionResult::new(state, vec![Effect::ReadResumeIndex])
        }

        Event::RelabelLoadFailed { reason } => {
            if state.workflow != Workflow::Entering {
                return stale(state, "relabel load failure");
            }
            state.workflow = Workflow::Inactive;
            state.notify(Notice::error(format!(
                "Could not enter relabel mode: {}",
                reason
            )));
            TransitionResult::new(
                state,
                vec![Effect::warn(format!("Relabel load failed: {}", reason))],
            )
        }

        Event::ResumeIndexRead { index } => {
            if !state.workflow.is_active() {
                return stale(state, "resume index");
            }
            let Some(dataset) = &state.dataset else {
                return stale(state, "resume index");
            };
            let (total, current) = (dataset.total_samples, dataset.current_index);

            match index {
                Some(index) if index < total && index != current => {
                    state.notify(Notice::info(format!(
                        "Resuming at sample {} of {}",
                        index + 1,
                        total
                    )));
                    TransitionResult::new(
                        state,
                        vec![
                            Effect::info(format!("Resuming relabel at index {}", index)),
                            Effect::Navigate {
                                action: NavAction::Goto(index),
                            },
                        ],
                    )
                }
                Some(index) if index >= total => TransitionResult::new(
                    state,
                    vec![Effect::debug(format!(
                        "Stored relabel index {} is outside 0..{}; staying",
                        index, total
                    ))],
                ),
                _ => TransitionResult::no_change(state),
            }
        }

        Event::ExitRelabelRequested => match state.workflow {
            Workflow::Inactive => TransitionResult::new(
                state,
                vec![Effect::debug("Relabel mode not active; ignoring exit")],
            ),
            // Nothing displayed yet; the late load result will be dropped.
            Workflow::Entering => {
                state.workflow = Workflow::Inactive;
                TransitionResult::new(state, vec![Effect::ExitRelabel])
            }
            Workflow::Active { .. } => TransitionResult::new(state, vec![Effect::ExitRelabel]),
        },

        Event::RelabelExited => {
            if !state.workflow.is_active() {
                return stale(state, "relabel exit");
            }
            state.workflow = Workflow::Inactive;
            state.clear_page();
            state.notify(Notice::info("Left relabel mode"));
            TransitionResult::no_change(state)
        }

        other => TransitionResult::new(
            state,
            vec![Effect::warn(format!(
                "relabel handler received unrelated event {}",
                other.log_summary()
            ))],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::event::PageOrigin;
    use crate::session::state::NoticeLevel;
    use crate::session::transition;
    use crate::test_support::{page, replay};
    use labelcheck_core::{Choice, ReviewMode, TaskKind};

    fn active(index: usize, total: usize) -> SessionState {
        replay(
            SessionState::new(),
            vec![
                Event::EnterRelabelRequested,
                Event::RelabelLoaded {
                    page: page("R1", index, total, &["ky_test", "atmosphere_recognition"]),
                    total_relabeled: 3,
                },
            ],
        )
    }

    #[test]
    fn test_enter_requests_load() {
        let result = transition(SessionState::new(), Event::EnterRelabelRequested);
        assert_eq!(result.state.workflow, Workflow::Entering);
        assert_eq!(result.effects, vec![Effect::LoadRelabel]);
    }

    #[test]
    fn test_enter_is_attempted_even_when_status_says_unavailable() {
        let state = replay(
            SessionState::new(),
            vec![Event::RelabelStatusChecked { available: false }],
        );
        let result = transition(state, Event::EnterRelabelRequested);
        assert_eq!(result.effects, vec![Effect::LoadRelabel]);
    }

    #[test]
    fn test_loaded_activates_with_conflict_order() {
        let state = active(0, 3);

        assert_eq!(state.workflow, Workflow::Active { relabeled_count: 3 });
        assert_eq!(state.mode(), ReviewMode::Relabel);
        assert_eq!(state.active_tasks(), &[TaskKind::Ky, TaskKind::Atmosphere]);
        assert_eq!(state.sequencer.focus(), Some(TaskKind::Ky));
        assert!(!state.loading_enabled());
    }

    #[test]
    fn test_loaded_then_reads_resume_index() {
        let result = transition(
            transition(SessionState::new(), Event::EnterRelabelRequested).state,
            Event::RelabelLoaded {
                page: page("R1", 0, 3, &["ky_test"]),
                total_relabeled: 0,
            },
        );
        assert_eq!(result.effects, vec![Effect::ReadResumeIndex]);
    }

    #[test]
    fn test_enter_while_active_is_noop() {
        let state = active(0, 3);
        let result = transition(state.clone(), Event::EnterRelabelRequested);
        assert_eq!(result.state, state);
        assert!(result
            .effects
            .iter()
            .all(|e| matches!(e, Effect::Log { .. })));
    }

    #[test]
    fn test_load_failure_returns_to_inactive() {
        let result = transition(
            transition(SessionState::new(), Event::EnterRelabelRequested).state,
            Event::RelabelLoadFailed {
                reason: "no relabel file".to_string(),
            },
        );
        assert_eq!(result.state.workflow, Workflow::Inactive);
        assert!(result.state.loading_enabled());
        assert_eq!(result.state.notices[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_resume_goto_when_in_range_and_different() {
        let result = transition(active(0, 5), Event::ResumeIndexRead { index: Some(3) });
        assert!(result.effects.contains(&Effect::Navigate {
            action: NavAction::Goto(3)
        }));
    }

    #[test]
    fn test_resume_index_out_of_range_is_ignored() {
        let result = transition(active(0, 3), Event::ResumeIndexRead { index: Some(5) });
        assert!(!result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::Navigate { .. })));
        assert_eq!(result.state.dataset.as_ref().unwrap().current_index, 0);
    }

    #[test]
    fn test_resume_at_current_index_stays() {
        let result = transition(active(2, 5), Event::ResumeIndexRead { index: Some(2) });
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_resume_without_stored_index_stays() {
        let result = transition(active(0, 5), Event::ResumeIndexRead { index: None });
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_relabel_navigation_persists_index() {
        let result = transition(
            active(0, 5),
            Event::PageLoaded {
                origin: PageOrigin::Navigation(NavAction::Next),
                page: page("R2", 1, 5, &["ky_test"]),
            },
        );
        assert!(result
            .effects
            .contains(&Effect::WriteResumeIndex { index: 1 }));
        assert_eq!(result.state.active_tasks(), &[TaskKind::Ky]);
    }

    #[test]
    fn test_exit_notifies_store_before_discarding() {
        let state = replay(
            active(0, 3),
            vec![Event::AnswerSelected {
                task: TaskKind::Ky,
                choice: Choice::new(1).unwrap(),
            }],
        );
        let requested = transition(state, Event::ExitRelabelRequested);
        assert_eq!(requested.effects, vec![Effect::ExitRelabel]);
        assert!(requested.state.sample.is_some());

        let exited = transition(requested.state, Event::RelabelExited);
        assert_eq!(exited.state.workflow, Workflow::Inactive);
        assert!(exited.state.sample.is_none());
        assert!(exited.state.dataset.is_none());
        assert!(exited.state.user_answers.is_empty());
        assert_eq!(exited.state.relabeled_count(), None);
        assert!(exited.state.loading_enabled());
    }

    #[test]
    fn test_exit_while_inactive_is_noop() {
        let result = transition(SessionState::new(), Event::ExitRelabelRequested);
        assert_eq!(result.state, SessionState::new());
        assert!(!result.effects.contains(&Effect::ExitRelabel));
    }

    #[test]
    fn test_load_landing_after_exit_is_ignored() {
        let state = replay(
            SessionState::new(),
            vec![Event::EnterRelabelRequested, Event::ExitRelabelRequested],
        );
        assert_eq!(state.workflow, Workflow::Inactive);

        let result = transition(
            state,
            Event::RelabelLoaded {
                page: page("R1", 0, 3, &["ky_test"]),
                total_relabeled: 0,
            },
        );
        assert_eq!(result.state.workflow, Workflow::Inactive);
        assert!(result.state.sample.is_none());
    }

    #[test]
    fn test_status_failure_is_logged_only() {
        let state = replay(
            SessionState::new(),
            vec![Event::RelabelStatusChecked { available: true }],
        );
        let result = transition(
            state,
            Event::RelabelStatusFailed {
                reason: "timeout".to_string(),
            },
        );
        assert!(!result.state.relabel_available);
        assert!(result.state.notices.is_empty());
    }
}
