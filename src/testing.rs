//! Test fixtures. Only compiled with the `test-support` feature.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::ReporterError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Transport that records every request and answers from a queue.
///
/// When the queue is empty it answers `200` with an empty JSON object.
/// Clones share the same recording, so a test can keep one handle while the
/// reporter owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    requests: Vec<HttpRequest>,
    replies: VecDeque<Result<HttpResponse, String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status_code: i32, body: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .replies
            .push_back(Ok(HttpResponse::new(status_code, body)));
    }

    /// Queue a transport-level failure (connection refused and the like).
    pub fn push_error(&self, message: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .replies
            .push_back(Err(message.into()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    /// Request bodies parsed as JSON, in send order.
    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.requests()
            .iter()
            .map(|r| serde_json::from_str(&r.body).unwrap())
            .collect()
    }

    /// `payload` object of the most recent request.
    pub fn last_payload(&self) -> Option<serde_json::Value> {
        self.bodies().pop().map(|body| body["payload"].clone())
    }
}

impl Transport for RecordingTransport {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, ReporterError> {
        let mut state = self.inner.lock().unwrap();
        state.requests.push(request.clone());

        match state.replies.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ReporterError::Http(message)),
            None => Ok(HttpResponse::new(200, "{}")),
        }
    }
}
