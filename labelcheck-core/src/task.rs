//! The three judgment tasks and the one-based option numbers reviewers pick.
//!
//! Tasks have two spellings: the identifier used at rest by the sample store
//! (`atmosphere_recognition`, `ky_test`, `subtext_deciphering`) and the short
//! key used by the review surface (`atmosphere`, `ky`, `intent`). Both map
//! onto `TaskKind`, so no string key ever travels between the two worlds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// One of the three judgment tasks attached to every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Atmosphere recognition.
    Atmosphere,
    /// Social-awareness ("reading the air") test.
    Ky,
    /// Subtext / hidden intent inference.
    Intent,
}

/// Mapping table between task kinds, store identifiers and surface keys.
const TASK_TABLE: [(TaskKind, &str, &str, &str); 3] = [
    (
        TaskKind::Atmosphere,
        "atmosphere_recognition",
        "atmosphere",
        "Atmosphere recognition",
    ),
    (TaskKind::Ky, "ky_test", "ky", "KY test"),
    (
        TaskKind::Intent,
        "subtext_deciphering",
        "intent",
        "Subtext inference",
    ),
];

impl TaskKind {
    /// All tasks in canonical order.
    pub const CANONICAL: [TaskKind; 3] = [TaskKind::Atmosphere, TaskKind::Ky, TaskKind::Intent];

    fn row(self) -> &'static (TaskKind, &'static str, &'static str, &'static str) {
        match self {
            TaskKind::Atmosphere => &TASK_TABLE[0],
            TaskKind::Ky => &TASK_TABLE[1],
            TaskKind::Intent => &TASK_TABLE[2],
        }
    }

    /// Identifier used by the sample store (`evaluation_labels` keys).
    pub fn task_id(self) -> &'static str {
        self.row().1
    }

    /// Short key used by the review surface.
    pub fn ui_key(self) -> &'static str {
        self.row().2
    }

    /// Human readable task name.
    pub fn label(self) -> &'static str {
        self.row().3
    }

    /// Parse a store identifier. Unknown identifiers yield `None`.
    pub fn from_task_id(id: &str) -> Option<Self> {
        TASK_TABLE
            .iter()
            .find(|(_, task_id, _, _)| *task_id == id)
            .map(|(kind, _, _, _)| *kind)
    }

    /// Parse a surface key. Unknown keys yield `None`.
    pub fn from_ui_key(key: &str) -> Option<Self> {
        TASK_TABLE
            .iter()
            .find(|(_, _, ui_key, _)| *ui_key == key)
            .map(|(kind, _, _, _)| *kind)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ui_key())
    }
}

/// A one-based option number, as shown to and picked by the reviewer.
///
/// The store keeps `correct_answer_index` zero-based; conversion only ever
/// happens through `from_zero_based` and `zero_based`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Choice(NonZeroUsize);

impl Choice {
    /// Build from a one-based option number. Zero is not a valid option.
    pub fn new(one_based: usize) -> Option<Self> {
        NonZeroUsize::new(one_based).map(Self)
    }

    /// Build from the store's zero-based answer index.
    pub fn from_zero_based(index: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(index))
    }

    /// One-based option number.
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Zero-based index for the store.
    pub fn zero_based(self) -> usize {
        self.0.get() - 1
    }

    /// Option letter (`A` for option 1) used when presenting votes.
    pub fn letter(self) -> char {
        option_letter(self.zero_based())
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Letter for a zero-based option index: 0 -> 'A', 1 -> 'B', ...
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .filter(u8::is_ascii_uppercase)
        .map(char::from)
        .unwrap_or('?')
}
