//! Save payloads and the local validation that guards them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reconcile::{OriginalAnswers, UserAnswers};
use crate::sample::{Sample, Task};
use crate::task::{Choice, TaskKind};

/// Problems caught before anything is sent to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("file loading is disabled while relabel mode is active")]
    LoadingDisabledInRelabel,
    #[error("no sample is loaded")]
    NoSampleLoaded,
    #[error("answer at least one task before saving")]
    NothingAnswered,
    #[error("nothing to save for this sample")]
    EmptyPayload,
    #[error("sample has no {0} label")]
    MissingLabel(TaskKind),
    #[error("{task} is not an active task for this sample")]
    TaskNotActive { task: TaskKind },
    #[error("option {choice} does not exist for {task}")]
    NoSuchOption { task: TaskKind, choice: usize },
    #[error("sample numbers start at 1")]
    InvalidPosition,
}

/// Whether a save was requested by the reviewer or made while advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveKind {
    /// Best-effort save between relabel tasks.
    Auto,
    /// Reviewer pressed save.
    Explicit,
}

/// Body of `POST /api/annotate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotateRequest {
    pub sample_id: String,
    /// Store task identifier -> full task record with the chosen index.
    pub annotations: BTreeMap<String, Task>,
}

/// Build the annotation map for `tasks` of `sample`.
///
/// Each task is the original record with `correct_answer_index` taken from
/// the reviewer's answer, or from the original label when the reviewer left
/// the task untouched. Conflict metadata is never sent back.
pub fn build_annotations(
    sample: &Sample,
    tasks: &[TaskKind],
    user: &UserAnswers,
    original: &OriginalAnswers,
) -> Result<BTreeMap<String, Task>, ValidationError> {
    if user.is_empty() {
        return Err(ValidationError::NothingAnswered);
    }

    let mut annotations = BTreeMap::new();
    for kind in tasks {
        let task = sample
            .evaluation_labels
            .get(*kind)
            .ok_or(ValidationError::MissingLabel(*kind))?;
        let choice: Choice = user
            .get(*kind)
            .or_else(|| original.get(*kind))
            .unwrap_or_else(|| task.original_choice());
        annotations.insert(kind.task_id().to_string(), task.relabelled(choice));
    }

    if annotations.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }
    Ok(annotations)
}

impl AnnotateRequest {
    pub fn build(
        sample: &Sample,
        tasks: &[TaskKind],
        user: &UserAnswers,
        original: &OriginalAnswers,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            sample_id: sample.benchmark_id.clone(),
            annotations: build_annotations(sample, tasks, user, original)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::Answers;
    use crate::sample::fixtures::sample;

    fn choice(n: usize) -> Choice {
        Choice::new(n).unwrap()
    }

    #[test]
    fn test_empty_answers_rejected() {
        let s = sample("S1", &[]);
        let original = Answers::original(&s, &TaskKind::CANONICAL);
        assert_eq!(
            build_annotations(&s, &TaskKind::CANONICAL, &Answers::new(), &original),
            Err(ValidationError::NothingAnswered)
        );
    }

    #[test]
    fn test_full_save_falls_back_to_original() {
        let s = sample("S1", &[]);
        let original = Answers::original(&s, &TaskKind::CANONICAL);
        let mut user = Answers::new();
        user.insert(TaskKind::Ky, choice(3));

        let annotations =
            build_annotations(&s, &TaskKind::CANONICAL, &user, &original).unwrap();
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations["atmosphere_recognition"].correct_answer_index, 1);
        assert_eq!(annotations["ky_test"].correct_answer_index, 2);
        assert_eq!(annotations["subtext_deciphering"].correct_answer_index, 2);
        assert!(annotations["ky_test"].conflict_info.is_none());
        assert_eq!(annotations["ky_test"].question, "Who misread the room?");
    }

    #[test]
    fn test_relabel_save_covers_only_active_tasks() {
        let s = sample("S1", &["ky_test"]);
        let active = s.conflict_tasks();
        let original = Answers::original(&s, &active);
        let mut user = Answers::new();
        user.insert(TaskKind::Ky, choice(2));

        let request = AnnotateRequest::build(&s, &active, &user, &original).unwrap();
        assert_eq!(request.sample_id, "S1");
        assert_eq!(request.annotations.len(), 1);
        assert_eq!(request.annotations["ky_test"].correct_answer_index, 1);
    }

    #[test]
    fn test_empty_task_list_is_empty_payload() {
        let s = sample("S1", &[]);
        let mut user = Answers::new();
        user.insert(TaskKind::Ky, choice(2));
        assert_eq!(
            build_annotations(&s, &[], &user, &Answers::new()),
            Err(ValidationError::EmptyPayload)
        );
    }

    #[test]
    fn test_missing_label_rejected() {
        let mut s = sample("S1", &[]);
        s.evaluation_labels.atmosphere_recognition = None;
        let mut user = Answers::new();
        user.insert(TaskKind::Ky, choice(2));
        assert_eq!(
            build_annotations(&s, &TaskKind::CANONICAL, &user, &Answers::new()),
            Err(ValidationError::MissingLabel(TaskKind::Atmosphere))
        );
    }

    #[test]
    fn test_request_wire_shape() {
        let s = sample("S1", &["ky_test"]);
        let mut user = Answers::new();
        user.insert(TaskKind::Ky, choice(1));
        let request =
            AnnotateRequest::build(&s, &[TaskKind::Ky], &user, &Answers::new()).unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sample_id"], "S1");
        assert_eq!(json["annotations"]["ky_test"]["correct_answer_index"], 0);
        assert_eq!(json["annotations"]["ky_test"]["mcq_options"][2], "Chika");
    }
}
