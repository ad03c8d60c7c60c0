//! Reviewer answers and their comparison with the original labels.

use std::collections::BTreeMap;

use crate::sample::Sample;
use crate::task::{Choice, TaskKind};

/// One-based choices keyed by task.
///
/// Used both for what the reviewer picked (`UserAnswers`) and for the
/// original labels of the displayed sample (`OriginalAnswers`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers(BTreeMap<TaskKind, Choice>);

pub type UserAnswers = Answers;
pub type OriginalAnswers = Answers;

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Original answers for `tasks`, skipping tasks the sample has no label for.
    pub fn original(sample: &Sample, tasks: &[TaskKind]) -> Self {
        Self(
            tasks
                .iter()
                .filter_map(|kind| {
                    sample
                        .evaluation_labels
                        .get(*kind)
                        .map(|task| (*kind, task.original_choice()))
                })
                .collect(),
        )
    }

    pub fn get(&self, kind: TaskKind) -> Option<Choice> {
        self.0.get(&kind).copied()
    }

    pub fn insert(&mut self, kind: TaskKind, choice: Choice) -> Option<Choice> {
        self.0.insert(kind, choice)
    }

    pub fn contains(&self, kind: TaskKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Entries in canonical task order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskKind, Choice)> + '_ {
        self.0.iter().map(|(kind, choice)| (*kind, *choice))
    }
}

impl FromIterator<(TaskKind, Choice)> for Answers {
    fn from_iter<I: IntoIterator<Item = (TaskKind, Choice)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of the comparison view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerDiff {
    pub task: TaskKind,
    pub label: &'static str,
    /// Original one-based option; `None` if the sample has no label for the task.
    pub original: Option<Choice>,
    pub user: Choice,
    pub matches: bool,
}

/// Compare every answered task with its original label.
///
/// Only tasks the reviewer explicitly answered appear; nothing is filled in.
pub fn reconcile(user: &UserAnswers, original: &OriginalAnswers) -> Vec<AnswerDiff> {
    user.iter()
        .map(|(task, choice)| {
            let original = original.get(task);
            AnswerDiff {
                task,
                label: task.label(),
                original,
                user: choice,
                matches: original == Some(choice),
            }
        })
        .collect()
}
