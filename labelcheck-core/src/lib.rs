pub mod annotation;
pub mod palette;
pub mod recording;
pub mod reconcile;
pub mod sample;
pub mod sequencer;
pub mod task;

pub use annotation::{build_annotations, AnnotateRequest, SaveKind, ValidationError};
pub use palette::{Color, RoleColors, PALETTE};
pub use recording::{
    CorrelationId, Direction, EventType, RecordedEvent, Sanitizer, ServiceType,
    CORRELATION_ID_HEADER,
};
pub use reconcile::{reconcile, AnswerDiff, Answers, OriginalAnswers, UserAnswers};
pub use sample::{
    ConflictInfo, DatasetInfo, DialogueTurn, EvaluationLabels, EvaluationTrigger, Persona,
    Sample, ScenarioSetup, Task,
};
pub use sequencer::{advance, active_tasks, Affordance, ReviewMode, Step, TaskSequencer};
pub use task::{Choice, TaskKind};

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Release identifier stamped by packagers, or the crate version.
pub fn get_library_version() -> String {
    match option_env!("LABELCHECK_RELEASE") {
        Some(release) if !release.is_empty() => release.to_string(),
        _ => built_info::PKG_VERSION.to_string(),
    }
}

/// Build profile (`debug` or `release`).
pub fn build_profile() -> &'static str {
    built_info::PROFILE
}

/// `User-Agent` sent to the sample store.
pub fn user_agent() -> String {
    format!("labelcheck/{}", get_library_version())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_the_client() {
        let agent = user_agent();
        assert!(agent.starts_with("labelcheck/"));
        assert!(agent.len() > "labelcheck/".len());
    }
}
