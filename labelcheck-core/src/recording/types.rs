use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of a recording log.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecordedEvent {
    pub timestamp: String, // RFC 3339
    pub correlation_id: String,
    pub event_type: EventType,
    pub direction: Direction,
    pub operation: String, // e.g. "POST /api/navigate"
    pub data: serde_json::Value,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum EventType {
    StoreApiCall,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Direction {
    Request,
    Response,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum ServiceType {
    SampleStore,
}

impl ServiceType {
    pub fn event_type(self) -> EventType {
        match self {
            ServiceType::SampleStore => EventType::StoreApiCall,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CorrelationId(pub String);

pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";
