//! Transport abstraction for sending chat-completion requests.
//!
//! [`ChatTransport`] is implemented by the HTTP client in
//! [`crate::openai`] and by [`MockTransport`] for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::chat::{ChatRequest, ChatResponse};
use crate::error::{LlmError, Result};

/// Sends one chat-completion request and returns the parsed response.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` and wait for the response.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// A transport returning a canned response body.
///
/// Records the number of calls and the last request it received.
#[derive(Debug)]
pub struct MockTransport {
    body: String,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockTransport {
    /// Create a mock that answers every request with the JSON `body`.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of requests received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }

        serde_json::from_str(&self.body).map_err(|e| {
            LlmError::response_format("valid chat completion response", e.to_string()).into()
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
