//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use heroes::error::{AppError, Result};
use heroes::notify::MessageLog;
use heroes::services::HeroService;
use heroes::transport::{ApiRequest, MemoryTransport, Transport};
use serde_json::Value;

/// Wraps a [`MemoryTransport`] with per-term response delays and an optional
/// hard failure.
///
/// The request reaches the backend immediately; only the response is delayed.
pub struct ScriptedTransport {
    backend: MemoryTransport,
    delays: HashMap<String, Duration>,
    failure: Option<String>,
}

impl ScriptedTransport {
    pub fn new(backend: MemoryTransport) -> Self {
        Self {
            backend,
            delays: HashMap::new(),
            failure: None,
        }
    }

    pub fn seeded() -> Self {
        Self::new(MemoryTransport::seeded())
    }

    /// Delay responses to `?name=<term>` by `delay`.
    pub fn delay_term(mut self, term: &str, delay: Duration) -> Self {
        self.delays.insert(term.to_string(), delay);
        self
    }

    /// Fail every request with a transport error.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn backend(&self) -> &MemoryTransport {
        &self.backend
    }

    /// `?name=` values the backend has received, oldest first.
    pub fn searched_terms(&self) -> Vec<String> {
        self.backend
            .requests()
            .iter()
            .filter_map(|r| r.query_value("name").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Option<Value>> {
        if let Some(message) = &self.failure {
            return Err(AppError::transport(message));
        }

        let response = self.backend.send(request).await;
        let delay = request
            .query_value("name")
            .and_then(|term| self.delays.get(term))
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }
}

/// Build a service over `transport` with a fresh message log.
pub fn service(transport: Arc<dyn Transport>) -> (Arc<HeroService>, Arc<MessageLog>) {
    let log = Arc::new(MessageLog::new());
    let service = Arc::new(HeroService::new(transport, log.clone()));
    (service, log)
}
