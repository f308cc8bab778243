//! In-memory transport for tests: path -> canned JSON or canned failure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ensure_redfish_path, RedfishTransport};
use crate::error::{RedfishError, Result};

enum Canned {
    Body(Value),
    Status(u16),
    Malformed,
    Hang,
}

#[derive(Default)]
pub(crate) struct MockTransport {
    responses: HashMap<String, Canned>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), Canned::Body(body));
        self
    }

    pub(crate) fn with_status(mut self, path: &str, code: u16) -> Self {
        self.responses.insert(path.to_string(), Canned::Status(code));
        self
    }

    pub(crate) fn with_malformed(mut self, path: &str) -> Self {
        self.responses.insert(path.to_string(), Canned::Malformed);
        self
    }

    pub(crate) fn with_hang(mut self, path: &str) -> Self {
        self.responses.insert(path.to_string(), Canned::Hang);
        self
    }

    /// Make every call take `delay`, so concurrent callers overlap.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub(crate) fn call_count(&self, path: &str) -> usize {
        self.calls().iter().filter(|p| p.as_str() == path).count()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn respond(&self, path: &str, key: &str) -> Result<Value> {
        ensure_redfish_path(path)?;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(key.to_string());
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(key).or_else(|| self.responses.get(path)) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Status(code)) => Err(RedfishError::HttpStatus {
                path: path.to_string(),
                code: *code,
                status: "Mock Status".to_string(),
            }),
            Some(Canned::Malformed) => super::decode_body(path, b"{not json"),
            Some(Canned::Hang) => std::future::pending().await,
            None => Err(RedfishError::HttpStatus {
                path: path.to_string(),
                code: 404,
                status: "Not Found".to_string(),
            }),
        }
    }
}

#[async_trait]
impl RedfishTransport for MockTransport {
    fn host(&self) -> &str {
        "10.0.0.1"
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.respond(path, path).await
    }

    /// POSTs are recorded and matched as `POST <path> <body>`, falling back to the bare path.
    async fn post_action(&self, path: &str, body: &Value) -> Result<Value> {
        let key = format!("POST {path} {body}");
        self.respond(path, &key).await
    }
}
