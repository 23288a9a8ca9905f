// src/services/recovery.rs

//! Uniform failure recovery for backend calls.
//!
//! Every service call goes through [`Recovery::wrap`], which turns a failed
//! call into a caller-supplied fallback value. The caller always gets a value;
//! the failure detail goes to the diagnostic log and a one-line summary goes to
//! the notification sink.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::notify::NotificationSink;

/// Error recovery policy bound to a notification sink.
#[derive(Clone)]
pub struct Recovery {
    sink: Arc<dyn NotificationSink>,
    source: &'static str,
}

impl Recovery {
    /// `source` prefixes every message, e.g. `HeroService`.
    pub fn new(sink: Arc<dyn NotificationSink>, source: &'static str) -> Self {
        Self { sink, source }
    }

    /// Record a message on the sink under this policy's source.
    pub fn notify(&self, message: &str) {
        self.sink.record(&format!("{}: {}", self.source, message));
    }

    /// Run `call`, resolving to its value or to `fallback` on failure.
    ///
    /// On success `describe` renders the sink message for the value. On
    /// failure the sink receives `"<operation> failed: <error>"`.
    pub async fn wrap<T, Fut, D>(&self, operation: &str, fallback: T, call: Fut, describe: D) -> T
    where
        Fut: Future<Output = Result<T>>,
        D: FnOnce(&T) -> String,
    {
        match call.await {
            Ok(value) => {
                self.notify(&describe(&value));
                value
            }
            Err(error) => {
                log::error!("{}: {} failed: {:?}", self.source, operation, error);
                self.notify(&format!("{operation} failed: {error}"));
                fallback
            }
        }
    }
}
