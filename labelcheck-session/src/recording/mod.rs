//! Optional JSONL recording of sample-store traffic.

pub mod logger;
pub mod middleware;

pub use labelcheck_core::recording::*;
pub use logger::RecordingLogger;
pub use middleware::RecordingMiddleware;
