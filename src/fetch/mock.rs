//! Scripted in-memory transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{FetchError, Query, RawResponse, Transport};

/// A request the mock has seen.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub host: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

/// Responses are queued per URL path and handed out in order. A path with
/// nothing queued fails at the transport level.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<RawResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, path: &str, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(RawResponse {
                status,
                body: body.to_string(),
            });
    }

    pub fn push_json(&self, path: &str, status: u16, body: Value) {
        self.push(path, status, &body.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &Url, query: &Query) -> Result<RawResponse, FetchError> {
        let path = url.path().to_string();
        self.calls.lock().unwrap().push(RecordedCall {
            host: url.host_str().unwrap_or_default().to_string(),
            path: path.clone(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });

        self.responses
            .lock()
            .unwrap()
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| FetchError::Transport(format!("no scripted response for {}", path)))
    }
}
