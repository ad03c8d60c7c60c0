//! Speaker colors.
//!
//! Colors come from a fixed palette. Within one sample, personas and then
//! speakers are colored in order of first appearance so no two distinct
//! names collide until the palette runs out. Names outside the current
//! sample fall back to a stable hash of the name.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::sample::Sample;

/// A display color as a `#RRGGBB` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub &'static str);

impl Color {
    pub fn hex(&self) -> &'static str {
        self.0
    }

    /// Red, green and blue components, for terminals with truecolor support.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            self.0
                .get(range)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .unwrap_or(0)
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// High-contrast palette, in assignment order.
pub const PALETTE: [Color; 10] = [
    Color("#DC2626"),
    Color("#2563EB"),
    Color("#059669"),
    Color("#9333EA"),
    Color("#EA580C"),
    Color("#0891B2"),
    Color("#CA8A04"),
    Color("#BE185D"),
    Color("#4338CA"),
    Color("#15803D"),
];

/// Normalized lookup key for a speaker or persona name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Rolling hash over UTF-16 code units: `hash = code + (hash << 5) - hash`.
///
/// Only the shift operand is truncated to 32 bits; the running hash itself
/// is not wrapped.
fn name_hash(key: &str) -> i64 {
    key.encode_utf16().fold(0i64, |hash, code| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(code) + shifted - hash
    })
}

/// Palette color for a normalized key, independent of any sample.
pub fn hashed_color(key: &str) -> Color {
    let index = (name_hash(key).unsigned_abs() % PALETTE.len() as u64) as usize;
    PALETTE[index]
}

/// Role color assignment for the displayed sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleColors {
    /// Assignments for the current sample, rebuilt on every sample change.
    sample_map: HashMap<String, Color>,
    /// Names in the order they were assigned, for presentation.
    order: Vec<String>,
    /// Hash-based assignments, kept for the whole session.
    fallback: HashMap<String, Color>,
}

impl RoleColors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the per-sample assignments. `None` clears them.
    pub fn rebuild(&mut self, sample: Option<&Sample>) {
        self.sample_map.clear();
        self.order.clear();

        let Some(sample) = sample else {
            return;
        };

        let personas = sample
            .scenario_setup
            .personas
            .iter()
            .map(|p| p.name.as_str());
        let speakers = sample
            .dialogue_transcript
            .iter()
            .map(|t| t.speaker.as_str());

        let mut seen = HashSet::new();
        for name in personas.chain(speakers) {
            let key = normalize_name(name);
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            let color = PALETTE[self.order.len() % PALETTE.len()];
            self.sample_map.insert(key.clone(), color);
            self.order.push(key);
        }
    }

    /// Color for `name`; the current sample's assignment wins over the hash.
    pub fn color_for(&mut self, name: &str) -> Color {
        let key = normalize_name(name);
        if let Some(color) = self.sample_map.get(&key) {
            return *color;
        }
        *self
            .fallback
            .entry(key)
            .or_insert_with_key(|key| hashed_color(key))
    }

    /// Color assigned to `name` in the current sample, if any.
    pub fn sample_color(&self, name: &str) -> Option<Color> {
        self.sample_map.get(&normalize_name(name)).copied()
    }

    /// Normalized names of the current sample in assignment order.
    pub fn assigned_names(&self) -> &[String] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::fixtures::sample;
    use crate::sample::{DialogueTurn, Persona};
    use proptest::prelude::*;

    fn persona(name: &str) -> Persona {
        Persona {
            name: name.to_string(),
            public_goal: String::new(),
            private_motive: String::new(),
            extra: Default::default(),
        }
    }

    fn turn(n: i64, speaker: &str) -> DialogueTurn {
        DialogueTurn {
            turn: n,
            speaker: speaker.to_string(),
            line: String::new(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_personas_then_speakers_in_first_seen_order() {
        let s = sample("S1", &[]);
        let mut colors = RoleColors::new();
        colors.rebuild(Some(&s));

        assert_eq!(colors.assigned_names(), ["aiko", "ben", "chika"]);
        assert_eq!(colors.color_for("Aiko"), PALETTE[0]);
        assert_eq!(colors.color_for("  BEN "), PALETTE[1]);
        assert_eq!(colors.color_for("chika"), PALETTE[2]);
    }

    #[test]
    fn test_duplicates_and_empty_names_are_skipped() {
        let mut s = sample("S1", &[]);
        s.scenario_setup.personas = vec![persona("Aiko"), persona(""), persona("aiko "), persona("Dan")];
        s.dialogue_transcript = vec![turn(1, "  "), turn(2, "Dan"), turn(5, "Eve")];

        let mut colors = RoleColors::new();
        colors.rebuild(Some(&s));

        assert_eq!(colors.assigned_names(), ["aiko", "dan", "eve"]);
        assert_eq!(colors.sample_color("Eve"), Some(PALETTE[2]));
    }

    #[test]
    fn test_no_collisions_within_palette_size() {
        let mut s = sample("S1", &[]);
        s.scenario_setup.personas = (0..10).map(|i| persona(&format!("p{}", i))).collect();
        s.dialogue_transcript.clear();

        let mut colors = RoleColors::new();
        colors.rebuild(Some(&s));

        let distinct: HashSet<Color> = (0..10)
            .map(|i| colors.color_for(&format!("p{}", i)))
            .collect();
        assert_eq!(distinct.len(), 10);
    }

    #[test]
    fn test_wraps_cyclically_past_palette_size() {
        let mut s = sample("S1", &[]);
        s.scenario_setup.personas = (0..12).map(|i| persona(&format!("p{}", i))).collect();
        s.dialogue_transcript.clear();

        let mut colors = RoleColors::new();
        colors.rebuild(Some(&s));

        assert_eq!(colors.color_for("p10"), PALETTE[0]);
        assert_eq!(colors.color_for("p11"), PALETTE[1]);
    }

    #[test]
    fn test_rebuild_discards_previous_sample() {
        let first = sample("S1", &[]);
        let mut second = sample("S2", &[]);
        second.scenario_setup.personas = vec![persona("Chika")];
        second.dialogue_transcript.clear();

        let mut colors = RoleColors::new();
        colors.rebuild(Some(&first));
        assert_eq!(colors.sample_color("Chika"), Some(PALETTE[2]));

        colors.rebuild(Some(&second));
        assert_eq!(colors.sample_color("Chika"), Some(PALETTE[0]));
        assert_eq!(colors.sample_color("Aiko"), None);
    }

    #[test]
    fn test_same_payload_gives_same_map() {
        let s = sample("S1", &[]);
        let mut a = RoleColors::new();
        let mut b = RoleColors::new();
        a.rebuild(Some(&s));
        b.rebuild(Some(&s));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fallback_without_sample_is_stable() {
        let mut colors = RoleColors::new();
        let first = colors.color_for("Narrator");
        let second = colors.color_for(" narrator");
        assert_eq!(first, second);
        assert_eq!(first, hashed_color("narrator"));
    }

    #[test]
    fn test_hash_matches_rolling_formula() {
        // "ab": h = 97; h = 98 + 97 * 31 = 3105
        assert_eq!(name_hash("ab"), 3105);
        assert_eq!(hashed_color("ab"), PALETTE[5]);
        assert_eq!(hashed_color(""), PALETTE[0]);
    }

    #[test]
    fn test_hash_does_not_wrap_running_value() {
        // The running value leaves the i32 range for longer names.
        assert_eq!(name_hash("xiaoming"), -4_029_628_492);
        assert_eq!(hashed_color("xiaoming"), Color("#059669"));
        assert_eq!(name_hash("zhang wei"), 2_831_447_335);
        assert_eq!(hashed_color("zhang wei"), Color("#0891B2"));
        assert_eq!(name_hash("alexandra"), 2_987_546_344);
        assert_eq!(hashed_color("alexandra"), Color("#EA580C"));
        assert_eq!(hashed_color("narrator"), Color("#9333EA"));
    }

    #[test]
    fn test_color_components() {
        assert_eq!(PALETTE[0].rgb(), (0xDC, 0x26, 0x26));
    }

    proptest! {
        /// Property: the n-th distinct name gets palette slot n mod 10.
        #[test]
        fn sample_colors_follow_first_appearance(names in proptest::collection::vec("[a-z]{1,6}", 0..25)) {
            let mut s = sample("S1", &[]);
            s.scenario_setup.personas = names.iter().map(|n| persona(n)).collect();
            s.dialogue_transcript.clear();

            let mut colors = RoleColors::new();
            colors.rebuild(Some(&s));

            let mut distinct: Vec<&String> = Vec::new();
            for name in &names {
                if !distinct.contains(&name) {
                    distinct.push(name);
                }
            }
            for (i, name) in distinct.iter().enumerate() {
                prop_assert_eq!(colors.sample_color(name), Some(PALETTE[i % PALETTE.len()]));
            }
        }

        /// Property: the fallback color ignores case and surrounding whitespace.
        #[test]
        fn fallback_is_stable_under_normalization(name in "[A-Za-z ]{0,12}") {
            let mut colors = RoleColors::new();
            let plain = colors.color_for(&name);
            prop_assert_eq!(colors.color_for(&format!("  {} ", name.to_uppercase())), plain);
            prop_assert_eq!(plain, hashed_color(&normalize_name(&name)));
        }
    }
}
