//! Wire records served by the sample store.
//!
//! Samples are immutable view data. Fields the client does not interpret are
//! kept in `extra` maps so a save can send back the full original task record.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::task::{Choice, TaskKind};

/// Unknown fields carried through untouched.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Treat `null` the same as a missing string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Position and size of the dataset being reviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub total_samples: usize,
    pub current_index: usize,
    /// Model that produced the labels, if the store reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl DatasetInfo {
    /// `current/total` with a one-based current position.
    pub fn progress(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.total_samples)
    }
}

/// One dialogue scenario with its three judgment tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub benchmark_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_theme: Option<String>,
    pub scenario_setup: ScenarioSetup,
    #[serde(default)]
    pub dialogue_transcript: Vec<DialogueTurn>,
    pub evaluation_trigger: EvaluationTrigger,
    pub evaluation_labels: EvaluationLabels,
    /// Store identifiers of the tasks that need re-annotation, in the order
    /// the store wants them presented. Only present in relabel datasets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflict_task_types: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Sample {
    /// Conflict tasks the client recognises, in store order, without repeats.
    ///
    /// Unknown identifiers and identifiers whose task is missing from
    /// `evaluation_labels` are skipped.
    pub fn conflict_tasks(&self) -> Vec<TaskKind> {
        let mut tasks = Vec::new();
        for id in &self.conflict_task_types {
            let Some(kind) = TaskKind::from_task_id(id) else {
                continue;
            };
            if self.evaluation_labels.get(kind).is_some() && !tasks.contains(&kind) {
                tasks.push(kind);
            }
        }
        tasks
    }

    /// Whether `turn` is the critical turn of this sample.
    pub fn is_critical_turn(&self, turn: &DialogueTurn) -> bool {
        turn.turn == self.evaluation_trigger.trigger_turn_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSetup {
    #[serde(default)]
    pub scenario_description: String,
    #[serde(default)]
    pub personas: Vec<Persona>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A participant in the scenario. Names are not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub public_goal: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub private_motive: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    /// Turn number as recorded by the generator; not necessarily contiguous.
    pub turn: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub speaker: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub line: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationTrigger {
    pub trigger_turn_id: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// The three labelled tasks of a sample, keyed by store identifier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere_recognition: Option<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ky_test: Option<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext_deciphering: Option<Task>,
}

impl EvaluationLabels {
    pub fn get(&self, kind: TaskKind) -> Option<&Task> {
        match kind {
            TaskKind::Atmosphere => self.atmosphere_recognition.as_ref(),
            TaskKind::Ky => self.ky_test.as_ref(),
            TaskKind::Intent => self.subtext_deciphering.as_ref(),
        }
    }
}

/// One multiple-choice judgment question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub mcq_options: Vec<String>,
    /// Zero-based index into `mcq_options`.
    pub correct_answer_index: usize,
    /// Labeling-model disagreement details, relabel datasets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_info: Option<ConflictInfo>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Task {
    /// The original label as a one-based option number.
    pub fn original_choice(&self) -> Choice {
        Choice::from_zero_based(self.correct_answer_index)
    }

    /// Whether `choice` names one of this task's options.
    pub fn has_option(&self, choice: Choice) -> bool {
        choice.get() <= self.mcq_options.len()
    }

    /// Copy of this record relabelled with `choice`, without store
    /// provenance metadata.
    pub fn relabelled(&self, choice: Choice) -> Task {
        Task {
            correct_answer_index: choice.zero_based(),
            conflict_info: None,
            ..self.clone()
        }
    }
}

/// Why the labeling models disagreed on a task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConflictInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Reviewer-model name -> zero-based option it voted for.
    #[serde(default)]
    pub model_votes: BTreeMap<String, usize>,
    /// Zero-based option (as a decimal string key) -> number of votes.
    #[serde(default)]
    pub vote_details: BTreeMap<String, u32>,
}

impl ConflictInfo {
    /// One line per model vote, e.g. `gpt-4o: option B`.
    pub fn vote_lines(&self) -> Vec<String> {
        self.model_votes
            .iter()
            .map(|(model, vote)| {
                format!("{}: option {}", model, crate::task::option_letter(*vote))
            })
            .collect()
    }

    /// Vote tally, e.g. `A: 2 votes, C: 1 vote`.
    pub fn tally(&self) -> String {
        let mut counts: Vec<(Option<usize>, &String, u32)> = self
            .vote_details
            .iter()
            .map(|(option, count)| (option.trim().parse().ok(), option, *count))
            .collect();
        counts.sort_by_key(|(index, _, _)| index.unwrap_or(usize::MAX));

        counts
            .into_iter()
            .map(|(index, raw, count)| {
                let noun = if count == 1 { "vote" } else { "votes" };
                match index {
                    Some(i) => format!("{}: {} {}", crate::task::option_letter(i), count, noun),
                    None => format!("{}: {} {}", raw, count, noun),
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
