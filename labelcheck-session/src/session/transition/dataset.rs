//! Dataset files and sample navigation.
//!
//! Every navigation is a store round trip. A page replaces the displayed
//! state wholesale; a failure leaves it untouched.

use labelcheck_core::ValidationError;

use super::{reject, stale, TransitionResult};
use crate::session::effect::Effect;
use crate::session::event::{Event, PageOrigin};
use crate::session::state::{Notice, SessionState};

pub fn handle(mut state: SessionState, event: Event) -> TransitionResult {
    match event {
        Event::FilesRequested => TransitionResult::new(state, vec![Effect::FetchFiles]),

        Event::FilesListed { files } => {
            state.files = files;
            TransitionResult::no_change(state)
        }

        Event::FilesFailed { reason } => {
            state.notify(Notice::error(format!(
                "Could not list dataset files: {}",
                reason
            )));
            TransitionResult::new(
                state,
                vec![Effect::warn(format!("File listing failed: {}", reason))],
            )
        }

        Event::LoadRequested { file } => {
            let file = file.trim();
            if file.is_empty() {
                return reject(state, ValidationError::NoFileSelected);
            }
            if !state.loading_enabled() {
                return reject(state, ValidationError::LoadingDisabledInRelabel);
            }
            let file = file.to_string();
            TransitionResult::new(state, vec![Effect::LoadFile { file }])
        }

        Event::RefreshRequested => TransitionResult::new(state, vec![Effect::FetchCurrent]),

        Event::NavigateRequested { action } => {
            TransitionResult::new(state, vec![Effect::Navigate { action }])
        }

        Event::PageLoaded { origin, page } => {
            let mut effects = Vec::new();
            match &origin {
                PageOrigin::File(file) => {
                    // Relabel mode started while the load was in flight.
                    if !state.loading_enabled() {
                        return stale(state, "file load");
                    }
                    state.current_file = Some(file.clone());
                    state.notify(Notice::success(format!(
                        "Loaded {} ({} samples)",
                        file, page.dataset_info.total_samples
                    )));
                }
                PageOrigin::Navigation(_) if state.workflow.is_active() => {
                    effects.push(Effect::WriteResumeIndex {
                        index: page.dataset_info.current_index,
                    });
                }
                PageOrigin::Navigation(_) | PageOrigin::Refresh => {}
            }
            effects.push(Effect::debug(format!(
                "Showing {} ({})",
                page.sample.benchmark_id,
                page.dataset_info.progress()
            )));
            state.apply_page(page);
            TransitionResult::new(state, effects)
        }

        Event::PageFailed { origin, reason } => {
            let notice = match &origin {
                PageOrigin::File(file) => {
                    Notice::error(format!("Could not load {}: {}", file, reason))
                }
                PageOrigin::Navigation(_) => Notice::warning(format!("Navigation failed: {}", reason)),
                PageOrigin::Refresh => Notice::error(format!("Could not refresh: {}", reason)),
            };
            state.notify(notice);
            TransitionResult::new(
                state,
                vec![Effect::warn(format!("{:?} failed: {}", origin, reason))],
            )
        }

        other => TransitionResult::new(
            state,
            vec![Effect::warn(format!(
                "dataset handler received unrelated event {}",
                other.log_summary()
            ))],
        ),
    }
}
