//! Interactive review commands.

use anyhow::{anyhow, bail, Context, Result};
use labelcheck_core::{Choice, TaskKind, ValidationError};
use labelcheck_session::session::AfterSave;
use labelcheck_session::{Event, NavAction};

/// One line typed at the review prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Next,
    Prev,
    /// Zero-based target; the reviewer types one-based numbers.
    Goto(usize),
    Answer(TaskKind, Choice),
    Advance(TaskKind),
    Save,
    SaveNext,
    Relabel,
    ExitRelabel,
    Load(String),
    Refresh,
    Files,
    Show,
    Diff,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  next | prev               move one sample
  goto N                    jump to sample N (1-based)
  answer TASK N             pick option N for TASK (atmosphere, ky, intent)
  advance TASK              move on from TASK (auto-saves in relabel mode)
  save | save-next          save answers, optionally moving to the next sample
  load FILE | files         open a dataset file, list dataset files
  relabel | exit-relabel    enter or leave relabel mode
  refresh | show | diff     re-fetch, redraw, compare with original labels
  quit";

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_lowercase().as_str(), args.as_slice()) {
            ("next" | "n", []) => ReplCommand::Next,
            ("prev" | "p", []) => ReplCommand::Prev,
            ("goto" | "g", [n]) => ReplCommand::Goto(parse_position(n)?),
            ("answer" | "a", [task, n]) => ReplCommand::Answer(parse_task(task)?, parse_choice(n)?),
            ("advance", [task]) => ReplCommand::Advance(parse_task(task)?),
            ("save" | "s", []) => ReplCommand::Save,
            ("save-next" | "sn", []) => ReplCommand::SaveNext,
            ("relabel", []) => ReplCommand::Relabel,
            ("exit-relabel", []) => ReplCommand::ExitRelabel,
            // File names may contain spaces.
            ("load", [_, ..]) => ReplCommand::Load(args.join(" ")),
            ("refresh", []) => ReplCommand::Refresh,
            ("files", []) => ReplCommand::Files,
            ("show", []) => ReplCommand::Show,
            ("diff", []) => ReplCommand::Diff,
            ("help" | "?", []) => ReplCommand::Help,
            ("quit" | "q" | "exit", []) => ReplCommand::Quit,
            (verb, _) => bail!("unknown command or wrong arguments: {} (try `help`)", verb),
        };
        Ok(command)
    }

    /// Session event for this command, if it drives the session.
    pub fn event(&self) -> Option<Event> {
        let event = match self {
            ReplCommand::Next => Event::NavigateRequested {
                action: NavAction::Next,
            },
            ReplCommand::Prev => Event::NavigateRequested {
                action: NavAction::Prev,
            },
            ReplCommand::Goto(index) => Event::NavigateRequested {
                action: NavAction::Goto(*index),
            },
            ReplCommand::Answer(task, choice) => Event::AnswerSelected {
                task: *task,
                choice: *choice,
            },
            ReplCommand::Advance(task) => Event::AdvanceRequested { task: *task },
            ReplCommand::Save => Event::SaveRequested {
                then: AfterSave::Stay,
            },
            ReplCommand::SaveNext => Event::SaveRequested {
                then: AfterSave::NextSample,
            },
            ReplCommand::Relabel => Event::EnterRelabelRequested,
            ReplCommand::ExitRelabel => Event::ExitRelabelRequested,
            ReplCommand::Load(file) => Event::LoadRequested { file: file.clone() },
            ReplCommand::Refresh => Event::RefreshRequested,
            ReplCommand::Files => Event::FilesRequested,
            ReplCommand::Show | ReplCommand::Diff | ReplCommand::Help | ReplCommand::Quit => {
                return None
            }
        };
        Some(event)
    }
}

fn parse_task(raw: &str) -> Result<TaskKind> {
    let key = raw.to_lowercase();
    TaskKind::from_ui_key(&key)
        .or_else(|| TaskKind::from_task_id(&key))
        .ok_or_else(|| anyhow!("unknown task {:?}; expected atmosphere, ky or intent", raw))
}

fn parse_choice(raw: &str) -> Result<Choice> {
    let n: usize = raw
        .parse()
        .with_context(|| format!("option must be a number, got {:?}", raw))?;
    Choice::new(n).ok_or_else(|| anyhow!("option numbers start at 1"))
}

/// One-based sample number to the store's zero-based index.
fn parse_position(raw: &str) -> Result<usize> {
    let n: usize = raw
        .parse()
        .with_context(|| format!("sample number must be a number, got {:?}", raw))?;
    n.checked_sub(1)
        .ok_or_else(|| ValidationError::InvalidPosition.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goto_is_one_based() {
        assert_eq!(ReplCommand::parse("goto 3").unwrap(), ReplCommand::Goto(2));
        assert_eq!(
            ReplCommand::parse("goto 3").unwrap().event(),
            Some(Event::NavigateRequested {
                action: NavAction::Goto(2)
            })
        );
    }

    #[test]
    fn test_goto_zero_is_rejected() {
        let err = ReplCommand::parse("goto 0").unwrap_err();
        assert_eq!(err.to_string(), "sample numbers start at 1");
    }

    #[test]
    fn test_answer_accepts_both_task_spellings() {
        let expected = ReplCommand::Answer(TaskKind::Intent, Choice::new(2).unwrap());
        assert_eq!(ReplCommand::parse("answer intent 2").unwrap(), expected);
        assert_eq!(
            ReplCommand::parse("a subtext_deciphering 2").unwrap(),
            expected
        );
    }

    #[test]
    fn test_answer_rejects_bad_input() {
        assert!(ReplCommand::parse("answer mood 1").is_err());
        assert!(ReplCommand::parse("answer ky 0").is_err());
        assert!(ReplCommand::parse("answer ky two").is_err());
        assert!(ReplCommand::parse("answer ky").is_err());
    }

    #[test]
    fn test_load_keeps_spaces_in_file_name() {
        assert_eq!(
            ReplCommand::parse("load my data.json").unwrap(),
            ReplCommand::Load("my data.json".to_string())
        );
        assert!(ReplCommand::parse("load").is_err());
    }

    #[test]
    fn test_save_next_maps_to_next_sample() {
        assert_eq!(
            ReplCommand::parse("save-next").unwrap().event(),
            Some(Event::SaveRequested {
                then: AfterSave::NextSample
            })
        );
    }

    #[test]
    fn test_display_commands_have_no_event() {
        for line in ["show", "diff", "help", "quit"] {
            assert_eq!(ReplCommand::parse(line).unwrap().event(), None);
        }
    }
}
