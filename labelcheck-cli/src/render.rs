//! Terminal rendering of the review session.

use std::collections::HashMap;
use std::fmt::Write;

use colored::{ColoredString, Colorize};
use labelcheck_core::{Affordance, Color, ReviewMode, Sample, TaskKind};
use labelcheck_session::session::{Notice, NoticeLevel, SessionState};

/// Speaker and persona colors resolved by the session for the displayed page.
pub type RoleColorMap = HashMap<String, Color>;

fn paint(name: &str, colors: &RoleColorMap) -> ColoredString {
    match colors.get(name) {
        Some(color) => {
            let (r, g, b) = color.rgb();
            name.truecolor(r, g, b).bold()
        }
        None => name.bold(),
    }
}

pub fn notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("{} {}", "✓".green(), notice.message),
        NoticeLevel::Info => format!("{} {}", "i".blue(), notice.message),
        NoticeLevel::Warning => format!("{} {}", "!".yellow(), notice.message.yellow()),
        NoticeLevel::Error => format!("{} {}", "✗".red(), notice.message.red()),
    }
}

/// One-line position summary.
pub fn status_line(state: &SessionState) -> String {
    let mut line = match state.mode() {
        ReviewMode::Relabel => "[relabel]".magenta().bold().to_string(),
        ReviewMode::Normal => "[review]".cyan().bold().to_string(),
    };
    if let Some(file) = &state.current_file {
        let _ = write!(line, " {}", file);
    }
    match &state.dataset {
        Some(dataset) => {
            let _ = write!(line, " sample {}", dataset.progress());
            if let Some(model) = &dataset.model {
                let _ = write!(line, " ({})", model.dimmed());
            }
        }
        None => line.push_str(" no sample loaded"),
    }
    if let Some(count) = state.relabeled_count() {
        let _ = write!(line, " | relabeled: {}", count);
    }
    line
}

/// Full view of the displayed sample and its active tasks.
pub fn page(state: &SessionState, colors: &RoleColorMap) -> String {
    let mut out = status_line(state);
    out.push('\n');

    let Some(sample) = &state.sample else {
        return out;
    };

    let _ = writeln!(out, "\n{} {}", "Sample".bold(), sample.benchmark_id);
    if let Some(theme) = &sample.meta_theme {
        let _ = writeln!(out, "Theme: {}", theme);
    }
    if !sample.scenario_setup.scenario_description.is_empty() {
        let _ = writeln!(out, "\n{}", sample.scenario_setup.scenario_description);
    }

    if !sample.scenario_setup.personas.is_empty() {
        let _ = writeln!(out, "\n{}", "Personas".bold());
        for persona in &sample.scenario_setup.personas {
            let _ = writeln!(
                out,
                "  {}: {} / {}",
                paint(&persona.name, colors),
                persona.public_goal,
                persona.private_motive.dimmed()
            );
        }
    }

    let _ = writeln!(out, "\n{}", "Dialogue".bold());
    for turn in &sample.dialogue_transcript {
        let marker = if sample.is_critical_turn(turn) {
            "▶".yellow().bold().to_string()
        } else {
            " ".to_string()
        };
        let _ = writeln!(
            out,
            "{} {:>3} {}: {}",
            marker,
            turn.turn,
            paint(&turn.speaker, colors),
            turn.line
        );
    }

    let tasks = state.active_tasks();
    if tasks.is_empty() {
        let _ = writeln!(out, "\nNo tasks to review for this sample.");
    }
    for &kind in tasks {
        out.push('\n');
        out.push_str(&task(state, sample, kind));
    }
    out
}

fn task(state: &SessionState, sample: &Sample, kind: TaskKind) -> String {
    let mut out = String::new();
    let focused = state.sequencer.focus() == Some(kind);
    let heading = format!("{} ({})", kind.label(), kind.ui_key());
    let _ = writeln!(
        out,
        "{}{}",
        if focused { "» " } else { "  " },
        if focused {
            heading.bold().underline()
        } else {
            heading.bold()
        }
    );

    let Some(label) = sample.evaluation_labels.get(kind) else {
        let _ = writeln!(out, "    (no label for this task)");
        return out;
    };
    let _ = writeln!(out, "    {}", label.question);

    let picked = state.user_answers.get(kind);
    for (i, option) in label.mcq_options.iter().enumerate() {
        let original = i == label.correct_answer_index;
        let chosen = picked.map(|c| c.zero_based()) == Some(i);
        let _ = writeln!(
            out,
            "    {} {}. {}{}",
            if chosen { "●".green().to_string() } else { "○".to_string() },
            i + 1,
            option,
            if original {
                " (original)".dimmed().to_string()
            } else {
                String::new()
            }
        );
    }

    if let Some(conflict) = &label.conflict_info {
        if let Some(reason) = &conflict.reason {
            let _ = writeln!(out, "    conflict: {}", reason.yellow());
        }
        for vote in conflict.vote_lines() {
            let _ = writeln!(out, "      {}", vote);
        }
        let tally = conflict.tally();
        if !tally.is_empty() {
            let _ = writeln!(out, "      tally: {}", tally);
        }
    }

    match state.sequencer.affordance(kind) {
        Affordance::Hidden => {}
        Affordance::Advance { next } => {
            let _ = writeln!(out, "    → `advance {}` to continue with {}", kind, next);
        }
        Affordance::Complete => {
            let _ = writeln!(out, "    {}", "all tasks answered".green());
        }
    }
    out
}

/// Comparison of the reviewer's answers with the original labels.
pub fn diff(state: &SessionState) -> String {
    let rows = state.diff();
    if rows.is_empty() {
        return "No answers yet.".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let original = row
            .original
            .map(|c| c.letter().to_string())
            .unwrap_or_else(|| "-".to_string());
        let verdict = if row.matches {
            "same".green()
        } else {
            "changed".yellow()
        };
        let _ = writeln!(
            out,
            "{:<24} original {}  yours {}  {}",
            row.label,
            original,
            row.user.letter(),
            verdict
        );
    }
    out
}

pub fn files(state: &SessionState) -> String {
    if state.files.is_empty() {
        return "No dataset files.".to_string();
    }
    state
        .files
        .iter()
        .map(|f| {
            if state.current_file.as_deref() == Some(f.as_str()) {
                format!("* {}", f)
            } else {
                format!("  {}", f)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelcheck_core::{Choice, PALETTE};
    use labelcheck_session::session::{transition, Event, PageOrigin};
    use labelcheck_session::SamplePage;

    fn loaded() -> SessionState {
        let page: SamplePage = serde_json::from_value(serde_json::json!({
            "dataset_info": {"total_samples": 4, "current_index": 1},
            "sample": {
                "benchmark_id": "S2",
                "scenario_setup": {"scenario_description": "A quiet office.", "personas": [
                    {"name": "Aiko", "public_goal": "finish early", "private_motive": "avoid Ben"}
                ]},
                "dialogue_transcript": [
                    {"turn": 1, "speaker": "Aiko", "line": "Morning."},
                    {"turn": 2, "speaker": "Ben", "line": "Lunch later?"}
                ],
                "evaluation_trigger": {"trigger_turn_id": 2},
                "evaluation_labels": {
                    "ky_test": {
                        "question": "Who missed the cue?",
                        "mcq_options": ["Aiko", "Ben"],
                        "correct_answer_index": 1,
                        "conflict_info": {"reason": "split vote", "model_votes": {"m1": 0}, "vote_details": {"0": 1}}
                    }
                },
                "conflict_task_types": ["ky_test"]
            }
        }))
        .unwrap();
        transition(
            SessionState::new(),
            Event::PageLoaded {
                origin: PageOrigin::File("office.json".to_string()),
                page,
            },
        )
        .state
    }

    #[test]
    fn test_page_shows_position_and_critical_turn() {
        let out = page(&loaded(), &RoleColorMap::new());
        assert!(out.contains("office.json"));
        assert!(out.contains("sample 2/4"));
        assert!(out.contains("▶"));
        assert!(out.contains("Lunch later?"));
    }

    #[test]
    fn test_page_marks_original_and_conflict_votes() {
        let out = page(&loaded(), &RoleColorMap::new());
        assert!(out.contains("2. Ben"));
        assert!(out.contains("(original)"));
        assert!(out.contains("m1: option A"));
        assert!(out.contains("A: 1 vote"));
        // Missing labels are shown, not skipped.
        assert!(out.contains("no label for this task"));
    }

    #[test]
    fn test_speakers_are_painted_with_session_colors() {
        colored::control::set_override(true);
        let mut state = loaded();
        let colors = state.role_colors();
        let out = page(&state, &colors);
        colored::control::unset_override();

        let (r, g, b) = PALETTE[1].rgb();
        let painted = "Ben".truecolor(r, g, b).bold().to_string();
        assert_eq!(colors["Ben"], PALETTE[1]);
        assert!(out.contains(&painted));
    }

    #[test]
    fn test_empty_state_renders_status_only() {
        let out = page(&SessionState::new(), &RoleColorMap::new());
        assert!(out.contains("no sample loaded"));
        assert!(!out.contains("Dialogue"));
    }

    #[test]
    fn test_diff_lists_answered_tasks() {
        let state = transition(
            loaded(),
            Event::AnswerSelected {
                task: TaskKind::Ky,
                choice: Choice::new(1).unwrap(),
            },
        )
        .state;
        let out = diff(&state);
        assert!(out.contains("KY test"));
        assert!(out.contains("original B"));
        assert!(out.contains("yours A"));
        assert!(out.contains("changed"));
        assert_eq!(diff(&loaded()), "No answers yet.");
    }
}
