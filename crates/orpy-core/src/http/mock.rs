//! In-memory transport for unit tests

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::http::transport::{HttpRequest, ResponseEnvelope, Transport};
use crate::{Error, Result};

/// Replays queued responses and records every request
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<ResponseEnvelope>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, envelope: ResponseEnvelope) -> Self {
        self.responses.lock().unwrap().push_back(envelope);
        self
    }

    pub fn json(self, status: u16, body: Value) -> Self {
        let headers = BTreeMap::from([("content-type".to_string(), "application/json".to_string())]);
        self.with_response(ResponseEnvelope::new(status, headers, body.to_string()))
    }

    pub fn text(self, status: u16, body: &str) -> Self {
        let headers = BTreeMap::from([("content-type".to_string(), "text/plain".to_string())]);
        self.with_response(ResponseEnvelope::new(status, headers, body))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<ResponseEnvelope> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Transport {
                message: format!("no response queued for {} {}", request.method, request.url),
                source: None,
            })
    }
}
