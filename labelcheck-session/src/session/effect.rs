//! Effects (side effects as data).
//!
//! The transition function only describes what should happen; the
//! interpreter performs it against the store and the resumption repository.

use labelcheck_core::{AnnotateRequest, SaveKind};

use super::event::AfterSave;
use crate::client::NavAction;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    // =========================================================================
    // Store effects
    // =========================================================================
    FetchFiles,
    LoadFile { file: String },
    FetchCurrent,
    Navigate { action: NavAction },
    Annotate {
        request: AnnotateRequest,
        kind: SaveKind,
        then: AfterSave,
    },
    CheckRelabelStatus,
    LoadRelabel,
    ExitRelabel,

    // =========================================================================
    // Resumption effects
    // =========================================================================
    ReadResumeIndex,
    WriteResumeIndex { index: usize },

    // =========================================================================
    // Logging
    // =========================================================================
    Log { level: LogLevel, message: String },
}

impl Effect {
    pub fn debug(message: impl Into<String>) -> Self {
        Effect::Log {
            level: LogLevel::Debug,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Effect::Log {
            level: LogLevel::Info,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Effect::Log {
            level: LogLevel::Warn,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}
