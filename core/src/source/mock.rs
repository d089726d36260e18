//! Scripted inventory source for testing.
//!
//! Replays queued results in order, optionally after a delay, and counts
//! calls. Makes it easy to write deterministic tests for the polling loop
//! under paused tokio time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::InventorySource;
use crate::errors::FetchError;
use crate::types::InventorySnapshot;

pub const MOCK_URL: &str = "mock://inventory";

/// One queued response.
struct ScriptedFetch {
    delay: Duration,
    result: Result<InventorySnapshot, FetchError>,
}

/// A test double that serves queued results.
///
/// Once the script is exhausted every call fails with a network error, which
/// is what an unreachable inventory service looks like to the poller.
pub struct ScriptedSource {
    script: Mutex<VecDeque<ScriptedFetch>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        ScriptedSource {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push_ok(&self, snapshot: InventorySnapshot) {
        self.push_delayed(Duration::ZERO, Ok(snapshot));
    }

    pub fn push_err(&self, error: FetchError) {
        self.push_delayed(Duration::ZERO, Err(error));
    }

    /// Queue a result that resolves only after `delay` has elapsed.
    pub fn push_delayed(&self, delay: Duration, result: Result<InventorySnapshot, FetchError>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(ScriptedFetch { delay, result });
    }

    /// Number of fetches issued so far, including ones still sleeping.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of queued results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// The error served once the script runs dry.
    pub fn unreachable() -> FetchError {
        FetchError::Network {
            url: MOCK_URL.to_string(),
            message: "connection refused".to_string(),
        }
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventorySource for ScriptedSource {
    async fn fetch(&self) -> Result<InventorySnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(ScriptedFetch { delay, result }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Err(Self::unreachable()),
        }
    }

    fn describe(&self) -> String {
        MOCK_URL.to_string()
    }
}
