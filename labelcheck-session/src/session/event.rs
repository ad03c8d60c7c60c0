//! Events that drive the session.
//!
//! Two kinds: reviewer intents coming from the front end, and results
//! reported by the interpreter after an effect has run.

use labelcheck_core::{Choice, SaveKind, TaskKind};

use crate::client::{NavAction, SamplePage};

/// Where a page came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOrigin {
    File(String),
    Navigation(NavAction),
    /// Re-fetch of the store's current position.
    Refresh,
}

/// What to do once a save has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSave {
    Stay,
    /// Move task focus (auto-save between relabel tasks).
    Focus(TaskKind),
    /// Navigate to the next sample (save-and-next).
    NextSample,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // =========================================================================
    // Reviewer intents
    // =========================================================================
    FilesRequested,
    LoadRequested { file: String },
    RefreshRequested,
    NavigateRequested { action: NavAction },
    AnswerSelected { task: TaskKind, choice: Choice },
    /// Reviewer invoked the advance affordance of `task`.
    AdvanceRequested { task: TaskKind },
    SaveRequested { then: AfterSave },
    RelabelStatusRequested,
    EnterRelabelRequested,
    ExitRelabelRequested,

    // =========================================================================
    // Effect results
    // =========================================================================
    FilesListed { files: Vec<String> },
    FilesFailed { reason: String },

    PageLoaded { origin: PageOrigin, page: SamplePage },
    PageFailed { origin: PageOrigin, reason: String },

    AnnotationSaved {
        sample_id: String,
        kind: SaveKind,
        then: AfterSave,
    },
    AnnotationFailed {
        sample_id: String,
        kind: SaveKind,
        then: AfterSave,
        reason: String,
    },

    RelabelStatusChecked { available: bool },
    RelabelStatusFailed { reason: String },
    RelabelLoaded { page: SamplePage, total_relabeled: u64 },
    RelabelLoadFailed { reason: String },
    /// Store was told relabel mode ended; emitted whatever the store said.
    RelabelExited,

    /// Stored resumption index, if one was found and parsed.
    ResumeIndexRead { index: Option<usize> },
}

impl Event {
    /// Short description for logs, without sample payloads.
    pub fn log_summary(&self) -> String {
        match self {
            Event::FilesRequested => "FilesRequested".to_string(),
            Event::LoadRequested { file } => format!("LoadRequested({})", file),
            Event::RefreshRequested => "RefreshRequested".to_string(),
            Event::NavigateRequested { action } => format!("NavigateRequested({:?})", action),
            Event::AnswerSelected { task, choice } => {
                format!("AnswerSelected({}={})", task, choice)
            }
            Event::AdvanceRequested { task } => format!("AdvanceRequested({})", task),
            Event::SaveRequested { then } => format!("SaveRequested({:?})", then),
            Event::RelabelStatusRequested => "RelabelStatusRequested".to_string(),
            Event::EnterRelabelRequested => "EnterRelabelRequested".to_string(),
            Event::ExitRelabelRequested => "ExitRelabelRequested".to_string(),
            Event::FilesListed { files } => format!("FilesListed({})", files.len()),
            Event::FilesFailed { .. } => "FilesFailed".to_string(),
            Event::PageLoaded { origin, page } => format!(
                "PageLoaded({:?}, {} at {})",
                origin, page.sample.benchmark_id, page.dataset_info.current_index
            ),
            Event::PageFailed { origin, .. } => format!("PageFailed({:?})", origin),
            Event::AnnotationSaved {
                sample_id, kind, ..
            } => format!("AnnotationSaved({}, {:?})", sample_id, kind),
            Event::AnnotationFailed {
                sample_id, kind, ..
            } => format!("AnnotationFailed({}, {:?})", sample_id, kind),
            Event::RelabelStatusChecked { available } => {
                format!("RelabelStatusChecked({})", available)
            }
            Event::RelabelStatusFailed { .. } => "RelabelStatusFailed".to_string(),
            Event::RelabelLoaded { page, .. } => {
                format!("RelabelLoaded({})", page.sample.benchmark_id)
            }
            Event::RelabelLoadFailed { .. } => "RelabelLoadFailed".to_string(),
            Event::RelabelExited => "RelabelExited".to_string(),
            Event::ResumeIndexRead { index } => format!("ResumeIndexRead({:?})", index),
        }
    }
}
