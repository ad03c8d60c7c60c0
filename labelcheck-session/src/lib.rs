//! Client-side review session for a remote annotation sample store.
//!
//! The store owns datasets, positions and saved annotations. This crate
//! keeps what the reviewer sees in sync with it: a pure transition function
//! over [`session::SessionState`], an interpreter that talks to the store
//! over HTTP, and a small key-value repository for relabel resumption.

pub mod client;
pub mod config;
pub mod recording;
pub mod repository;
pub mod session;

#[cfg(test)]
mod test_support;

pub use client::{create_store_client, HttpStore, NavAction, RemoteStore, SamplePage, StoreError};
pub use config::Config;
pub use recording::RecordingLogger;
pub use repository::{InMemoryRepository, ResumeRepository, SqliteRepository};
pub use session::{Event, InterpreterContext, Session, SessionState};
