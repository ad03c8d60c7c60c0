//! Session state.
//!
//! One value owns everything the reviewer sees: the relabel workflow,
//! the displayed page, answers, task gating, role colors and queued
//! notices. Only the transition function changes it.

use std::collections::HashMap;

use labelcheck_core::{
    reconcile, AnswerDiff, Answers, Color, DatasetInfo, OriginalAnswers, ReviewMode, RoleColors,
    Sample, TaskKind, TaskSequencer, UserAnswers,
};

use crate::client::SamplePage;

/// Relabel workflow position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Workflow {
    #[default]
    Inactive,
    /// Relabel load requested, response not yet applied.
    Entering,
    Active {
        /// Samples relabeled so far, as reported by the store plus explicit
        /// saves made in this session.
        relabeled_count: u64,
    },
}

impl Workflow {
    pub fn is_inactive(&self) -> bool {
        matches!(self, Workflow::Inactive)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Workflow::Active { .. })
    }

    pub fn mode(&self) -> ReviewMode {
        match self {
            Workflow::Active { .. } => ReviewMode::Relabel,
            Workflow::Inactive | Workflow::Entering => ReviewMode::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient message for the reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub workflow: Workflow,
    /// Dataset files offered by the store.
    pub files: Vec<String>,
    /// Last known answer of the relabel status check.
    pub relabel_available: bool,
    /// File the current normal-mode dataset came from.
    pub current_file: Option<String>,
    pub dataset: Option<DatasetInfo>,
    pub sample: Option<Sample>,
    pub user_answers: UserAnswers,
    pub original_answers: OriginalAnswers,
    pub sequencer: TaskSequencer,
    pub colors: RoleColors,
    pub notices: Vec<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ReviewMode {
        self.workflow.mode()
    }

    /// File loading is only possible outside relabel mode.
    pub fn loading_enabled(&self) -> bool {
        self.workflow.is_inactive()
    }

    pub fn relabeled_count(&self) -> Option<u64> {
        match self.workflow {
            Workflow::Active { relabeled_count } => Some(relabeled_count),
            _ => None,
        }
    }

    pub fn sample_id(&self) -> Option<&str> {
        self.sample.as_ref().map(|s| s.benchmark_id.as_str())
    }

    pub fn active_tasks(&self) -> &[TaskKind] {
        self.sequencer.active()
    }

    /// Tasks a save covers: all three in normal mode, the active list otherwise.
    pub fn save_tasks(&self) -> Vec<TaskKind> {
        match self.mode() {
            ReviewMode::Normal => TaskKind::CANONICAL.to_vec(),
            ReviewMode::Relabel => self.sequencer.active().to_vec(),
        }
    }

    /// Live comparison of the reviewer's answers with the original labels.
    pub fn diff(&self) -> Vec<AnswerDiff> {
        reconcile(&self.user_answers, &self.original_answers)
    }

    /// Resolve the color of every persona and speaker on the displayed page,
    /// keyed by the name as written.
    ///
    /// Names outside the sample's assignment go through the session-wide
    /// fallback cache.
    pub fn role_colors(&mut self) -> HashMap<String, Color> {
        let Some(sample) = &self.sample else {
            return HashMap::new();
        };
        let names = sample
            .scenario_setup
            .personas
            .iter()
            .map(|p| &p.name)
            .chain(sample.dialogue_transcript.iter().map(|t| &t.speaker));

        let mut resolved = HashMap::new();
        for name in names {
            if !resolved.contains_key(name) {
                resolved.insert(name.clone(), self.colors.color_for(name));
            }
        }
        resolved
    }

    /// Replace the displayed page and rebuild everything derived from it.
    pub(crate) fn apply_page(&mut self, page: SamplePage) {
        let SamplePage {
            dataset_info,
            sample,
        } = page;
        let mode = self.mode();

        self.colors.rebuild(Some(&sample));
        self.sequencer.rebuild(mode, Some(&sample));
        self.original_answers = Answers::original(&sample, self.sequencer.active());
        self.user_answers.clear();
        self.dataset = Some(dataset_info);
        self.sample = Some(sample);
    }

    /// Drop the displayed page.
    pub(crate) fn clear_page(&mut self) {
        self.colors.rebuild(None);
        self.sequencer.rebuild(self.mode(), None);
        self.original_answers.clear();
        self.user_answers.clear();
        self.dataset = None;
        self.sample = None;
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
