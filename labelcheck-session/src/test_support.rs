//! Store payloads shared by the session tests.

use serde_json::{json, Value};

use crate::client::{SamplePage, StoreError};
use crate::session::{Event, SessionState, TransitionResult};

/// Sample with original labels 1/0/2 (zero-based) and the given conflict list.
pub fn sample_json(id: &str, conflicts: &[&str]) -> Value {
    json!({
        "benchmark_id": id,
        "meta_theme": "workplace",
        "scenario_setup": {
            "scenario_description": "A team lunch after a missed deadline.",
            "personas": [
                {"name": "Aiko", "public_goal": "keep the peace", "private_motive": "hide the mistake"},
                {"name": "Ben", "public_goal": "celebrate", "private_motive": "ask for a raise"}
            ]
        },
        "dialogue_transcript": [
            {"turn": 1, "speaker": "Aiko", "line": "Shall we order?"},
            {"turn": 3, "speaker": "Ben", "line": "Drinks are on me."},
            {"turn": 4, "speaker": "Chika", "line": "Oh, are we celebrating?"}
        ],
        "evaluation_trigger": {"trigger_turn_id": 3},
        "evaluation_labels": {
            "atmosphere_recognition": {
                "question": "What is the mood?",
                "mcq_options": ["tense", "relaxed", "awkward"],
                "correct_answer_index": 1
            },
            "ky_test": {
                "question": "Who misread the room?",
                "mcq_options": ["Aiko", "Ben", "Chika"],
                "correct_answer_index": 0,
                "conflict_info": {
                    "reason": "models split",
                    "model_votes": {"model-a": 0, "model-b": 1},
                    "vote_details": {"0": 1, "1": 1}
                }
            },
            "subtext_deciphering": {
                "question": "What does Ben want?",
                "mcq_options": ["praise", "food", "money", "quiet"],
                "correct_answer_index": 2
            }
        },
        "conflict_task_types": conflicts
    })
}

/// Successful page envelope as the store sends it.
pub fn page_json(id: &str, index: usize, total: usize, conflicts: &[&str]) -> Value {
    json!({
        "success": true,
        "dataset_info": {"total_samples": total, "current_index": index, "model": "model-a"},
        "sample": sample_json(id, conflicts)
    })
}

pub fn page(id: &str, index: usize, total: usize, conflicts: &[&str]) -> SamplePage {
    serde_json::from_value(page_json(id, index, total, conflicts)).expect("page fixture")
}

/// Apply `events` in order through the pure transition, discarding effects.
pub fn replay(state: SessionState, events: Vec<Event>) -> SessionState {
    events.into_iter().fold(state, |state, event| {
        let TransitionResult { state, .. } = crate::session::transition(state, event);
        state
    })
}

pub fn rejected(message: &str) -> StoreError {
    StoreError::Rejected(message.to_string())
}
