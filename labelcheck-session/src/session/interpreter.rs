//! Effect interpreter that executes effects against the store.
//!
//! The interpreter is the boundary between the pure transition function
//! and I/O. Store failures never escape as errors: each one becomes a
//! result event carrying the reason, so the transition function decides
//! what the reviewer sees.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::effect::{Effect, LogLevel};
use super::event::{Event, PageOrigin};
use crate::client::{RemoteStore, SamplePage, StoreError};
use crate::repository::{ResumeRepository, RELABEL_INDEX_KEY};

/// Context needed by the interpreter to execute effects.
#[derive(Clone)]
pub struct InterpreterContext {
    pub store: Arc<dyn RemoteStore>,
    pub resume: Arc<dyn ResumeRepository>,
}

impl InterpreterContext {
    pub fn new(store: Arc<dyn RemoteStore>, resume: Arc<dyn ResumeRepository>) -> Self {
        Self { store, resume }
    }
}

/// Result of executing an effect.
#[derive(Debug)]
pub enum EffectResult {
    /// Effect completed, produced result events.
    Ok(Vec<Event>),
    /// Effect failed in a way no event describes.
    Err(String),
}

impl EffectResult {
    pub fn single(event: Event) -> Self {
        Self::Ok(vec![event])
    }

    pub fn none() -> Self {
        Self::Ok(vec![])
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self::Err(msg.into())
    }
}

/// Execute a list of effects and collect result events.
///
/// Effects run sequentially. A failing effect is logged and the rest still
/// run.
pub async fn execute_effects(ctx: &InterpreterContext, effects: Vec<Effect>) -> Vec<Event> {
    let mut result_events = Vec::new();

    for effect in effects {
        match execute_effect(ctx, effect).await {
            EffectResult::Ok(events) => result_events.extend(events),
            EffectResult::Err(err) => {
                error!("Effect execution failed: {}", err);
            }
        }
    }

    result_events
}

async fn execute_effect(ctx: &InterpreterContext, effect: Effect) -> EffectResult {
    match effect {
        Effect::FetchFiles => match ctx.store.list_files().await {
            Ok(files) => EffectResult::single(Event::FilesListed { files }),
            Err(e) => EffectResult::single(Event::FilesFailed {
                reason: e.to_string(),
            }),
        },

        Effect::LoadFile { file } => {
            info!("Loading dataset file {}", file);
            let result = ctx.store.load(&file).await;
            page_result(PageOrigin::File(file), result)
        }

        Effect::FetchCurrent => {
            let result = ctx.store.current().await;
            page_result(PageOrigin::Refresh, result)
        }

        Effect::Navigate { action } => {
            debug!("Navigating {}", action.name());
            let result = ctx.store.navigate(action).await;
            page_result(PageOrigin::Navigation(action), result)
        }

        Effect::Annotate {
            request,
            kind,
            then,
        } => {
            let sample_id = request.sample_id.clone();
            match ctx.store.annotate(&request).await {
                Ok(()) => EffectResult::single(Event::AnnotationSaved {
                    sample_id,
                    kind,
                    then,
                }),
                Err(e) => EffectResult::single(Event::AnnotationFailed {
                    sample_id,
                    kind,
                    then,
                    reason: e.to_string(),
                }),
            }
        }

        Effect::CheckRelabelStatus => match ctx.store.relabel_status().await {
            Ok(available) => EffectResult::single(Event::RelabelStatusChecked { available }),
            Err(e) => EffectResult::single(Event::RelabelStatusFailed {
                reason: e.to_string(),
            }),
        },

        Effect::LoadRelabel => match ctx.store.relabel_load().await {
            Ok(relabel) => EffectResult::single(Event::RelabelLoaded {
                page: relabel.page,
                total_relabeled: relabel.total_relabeled,
            }),
            Err(e) => EffectResult::single(Event::RelabelLoadFailed {
                reason: e.to_string(),
            }),
        },

        Effect::ExitRelabel => {
            if let Err(e) = ctx.store.relabel_exit().await {
                warn!("Store did not acknowledge relabel exit: {}", e);
            }
            EffectResult::single(Event::RelabelExited)
        }

        Effect::ReadResumeIndex => {
            let index = match ctx.resume.get(RELABEL_INDEX_KEY).await {
                Ok(Some(raw)) => match raw.trim().parse::<usize>() {
                    Ok(index) => Some(index),
                    Err(_) => {
                        warn!("Ignoring unparseable relabel index {:?}", raw);
                        None
                    }
                },
                Ok(None) => None,
                Err(e) => {
                    warn!("Could not read relabel index: {}", e);
                    None
                }
            };
            EffectResult::single(Event::ResumeIndexRead { index })
        }

        Effect::WriteResumeIndex { index } => {
            match ctx
                .resume
                .set(RELABEL_INDEX_KEY, &index.to_string())
                .await
            {
                Ok(()) => EffectResult::none(),
                Err(e) => EffectResult::err(format!("persisting relabel index {}: {}", index, e)),
            }
        }

        Effect::Log { level, message } => {
            match level {
                LogLevel::Debug => debug!("{}", message),
                LogLevel::Info => info!("{}", message),
                LogLevel::Warn => warn!("{}", message),
                LogLevel::Error => error!("{}", message),
            }
            EffectResult::none()
        }
    }
}

fn page_result(
    origin: PageOrigin,
    result: Result<SamplePage, StoreError>,
) -> EffectResult {
    match result {
        Ok(page) => EffectResult::single(Event::PageLoaded { origin, page }),
        Err(e) => EffectResult::single(Event::PageFailed {
            origin,
            reason: e.to_string(),
        }),
    }
}
