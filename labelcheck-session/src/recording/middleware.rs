use super::{
    CorrelationId, Direction, RecordedEvent, RecordingLogger, Sanitizer, ServiceType,
    CORRELATION_ID_HEADER,
};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result as MiddlewareResult};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// Bodies above this size are recorded by size only.
const MAX_RECORDED_BODY: usize = 10_000;

pub struct RecordingMiddleware {
    logger: RecordingLogger,
    service_type: ServiceType,
}

impl RecordingMiddleware {
    pub fn new(logger: RecordingLogger, service_type: ServiceType) -> Self {
        Self {
            logger,
            service_type,
        }
    }
}

#[async_trait::async_trait]
impl Middleware for RecordingMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> MiddlewareResult<Response> {
        let correlation_id = match req.headers().get(CORRELATION_ID_HEADER) {
            Some(existing) => existing
                .to_str()
                .map(str::to_string)
                .unwrap_or_else(|_| Uuid::new_v4().to_string()),
            None => extensions
                .get::<CorrelationId>()
                .map(|id| id.0.clone())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        };

        if !req.headers().contains_key(CORRELATION_ID_HEADER) {
            if let Ok(value) = correlation_id.parse() {
                req.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }
        }

        let request_data = extract_request_data(&req);
        self.record(
            Direction::Request,
            format!("{} {}", request_data.method, extract_path(&request_data.url)),
            serde_json::to_value(&request_data).unwrap_or(serde_json::Value::Null),
            &correlation_id,
        );

        let started = Instant::now();
        let response = next.run(req, extensions).await;
        let elapsed = elapsed_metadata(started);

        match &response {
            Ok(resp) => {
                let response_data = extract_response_data(resp);
                self.record_with(
                    Direction::Response,
                    format!("response_{}", response_data.status_code),
                    serde_json::to_value(&response_data).unwrap_or(serde_json::Value::Null),
                    &correlation_id,
                    elapsed,
                );
            }
            Err(err) => {
                self.record_with(
                    Direction::Response,
                    "error".to_string(),
                    serde_json::json!({
                        "error": err.to_string(),
                        "error_type": format!("{:?}", err)
                    }),
                    &correlation_id,
                    elapsed,
                );
            }
        }

        response
    }
}

impl RecordingMiddleware {
    fn record(
        &self,
        direction: Direction,
        operation: String,
        data: serde_json::Value,
        correlation_id: &str,
    ) {
        self.record_with(direction, operation, data, correlation_id, HashMap::new());
    }

    fn record_with(
        &self,
        direction: Direction,
        operation: String,
        data: serde_json::Value,
        correlation_id: &str,
        metadata: HashMap<String, String>,
    ) {
        self.logger.record(RecordedEvent {
            timestamp: chrono::Utc::now().to_rfc3339(),
            correlation_id: correlation_id.to_string(),
            event_type: self.service_type.event_type(),
            direction,
            operation,
            data,
            metadata,
        });
    }
}

/// Metadata key holding the round-trip time of a store call.
pub const ELAPSED_MS_KEY: &str = "elapsed_ms";

fn elapsed_metadata(started: Instant) -> HashMap<String, String> {
    HashMap::from([(
        ELAPSED_MS_KEY.to_string(),
        started.elapsed().as_millis().to_string(),
    )])
}

fn header_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (name, value) in headers {
        if let Ok(value_str) = value.to_str() {
            map.insert(name.to_string(), value_str.to_string());
        }
    }
    Sanitizer::sanitize_headers(&map)
}

fn extract_request_data(request: &Request) -> RequestData {
    let body = match request.body() {
        None => serde_json::Value::Null,
        Some(body) => match body.as_bytes() {
            Some(bytes) if bytes.len() > MAX_RECORDED_BODY => {
                serde_json::Value::String(format!("[LARGE_BODY_{}b]", bytes.len()))
            }
            Some(bytes) => match serde_json::from_slice::<serde_json::Value>(bytes) {
                Ok(json) => Sanitizer::sanitize_json(&json),
                Err(_) => serde_json::Value::String(format!("[NON_JSON_BODY_{}b]", bytes.len())),
            },
            None => serde_json::Value::String("[STREAM_BODY]".to_string()),
        },
    };

    RequestData {
        method: request.method().to_string(),
        url: request.url().to_string(),
        headers: header_map(request.headers()),
        body,
    }
}

fn extract_response_data(response: &Response) -> ResponseData {
    ResponseData {
        status_code: response.status().as_u16(),
        headers: header_map(response.headers()),
        body_size: response.content_length().unwrap_or(0),
    }
}

#[derive(Debug, serde::Serialize)]
struct RequestData {
    method: String,
    url: String,
    headers: HashMap<String, String>,
    body: serde_json::Value,
}

#[derive(Debug, serde::Serialize)]
struct ResponseData {
    status_code: u16,
    headers: HashMap<String, String>,
    body_size: u64,
}

fn extract_path(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}
