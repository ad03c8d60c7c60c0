//! Task ordering and gating for the displayed sample.
//!
//! In normal review every sample shows all three tasks in canonical order.
//! In relabel review only the sample's conflict tasks are shown, in the
//! order the store listed them. Answering a task reveals either an advance
//! affordance pointing at the next active task or, for the last task, a
//! completion indicator. Each task's gate depends only on its own position.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reconcile::UserAnswers;
use crate::sample::Sample;
use crate::task::TaskKind;

/// Which sample source the session is reviewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReviewMode {
    /// Ordinary dataset file, all tasks.
    #[default]
    Normal,
    /// Conflict-only re-annotation.
    Relabel,
}

/// Where focus goes after a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next(TaskKind),
    Complete,
}

/// Pure gating rule: what follows `current` in `active`.
///
/// Returns `None` when `current` is not an active task.
pub fn advance(active: &[TaskKind], current: TaskKind) -> Option<Step> {
    let position = active.iter().position(|t| *t == current)?;
    Some(match active.get(position + 1) {
        Some(next) => Step::Next(*next),
        None => Step::Complete,
    })
}

/// Active tasks for `sample` under `mode`.
pub fn active_tasks(mode: ReviewMode, sample: &Sample) -> Vec<TaskKind> {
    match mode {
        ReviewMode::Normal => TaskKind::CANONICAL.to_vec(),
        ReviewMode::Relabel => sample.conflict_tasks(),
    }
}

/// Affordance revealed next to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affordance {
    #[default]
    Hidden,
    /// "Next task" button leading to `next`.
    Advance { next: TaskKind },
    /// All active tasks have been walked through.
    Complete,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSequencer {
    active: Vec<TaskKind>,
    focus: Option<TaskKind>,
    revealed: BTreeMap<TaskKind, Affordance>,
}

impl TaskSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild for a newly displayed sample. Focus returns to the first
    /// active task and every affordance is hidden again.
    pub fn rebuild(&mut self, mode: ReviewMode, sample: Option<&Sample>) {
        self.active = sample.map(|s| active_tasks(mode, s)).unwrap_or_default();
        self.focus = self.active.first().copied();
        self.revealed.clear();
    }

    pub fn active(&self) -> &[TaskKind] {
        &self.active
    }

    pub fn is_active(&self, kind: TaskKind) -> bool {
        self.active.contains(&kind)
    }

    pub fn focus(&self) -> Option<TaskKind> {
        self.focus
    }

    /// Move focus to `kind` if it is active.
    pub fn set_focus(&mut self, kind: TaskKind) -> bool {
        if self.is_active(kind) {
            self.focus = Some(kind);
            true
        } else {
            false
        }
    }

    /// Record that `kind` was answered and reveal its affordance.
    pub fn record_answer(&mut self, kind: TaskKind) -> Affordance {
        let affordance = match advance(&self.active, kind) {
            Some(Step::Next(next)) => Affordance::Advance { next },
            Some(Step::Complete) => Affordance::Complete,
            None => return Affordance::Hidden,
        };
        self.revealed.insert(kind, affordance);
        affordance
    }

    pub fn affordance(&self, kind: TaskKind) -> Affordance {
        self.revealed.get(&kind).copied().unwrap_or_default()
    }

    /// Consume the advance affordance of `kind`, returning its target.
    pub fn take_advance(&mut self, kind: TaskKind) -> Option<TaskKind> {
        match self.affordance(kind) {
            Affordance::Advance { next } => {
                self.revealed.insert(kind, Affordance::Hidden);
                Some(next)
            }
            _ => None,
        }
    }

    /// A task is completed once the reviewer has answered it.
    pub fn is_completed(&self, kind: TaskKind, answers: &UserAnswers) -> bool {
        self.is_active(kind) && answers.contains(kind)
    }

    /// Whether the completion indicator is showing.
    pub fn completion_revealed(&self) -> bool {
        self.revealed.values().any(|a| *a == Affordance::Complete)
    }
}
