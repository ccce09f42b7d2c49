/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds, wrapping `译<text>` in delimiters
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::failing_first(n)` - Fails n times, then works
 * - `MockProvider::scripted(..)` - Replays a fixed list of raw responses
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Prefix the working mock puts in front of every translated text
pub const MOCK_TRANSLATION_PREFIX: &str = "译";

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a delimited translation
    Working,
    /// Fails the first N requests, then behaves like `Working`
    FailingFirst { failures: usize },
    /// Always fails with an error
    Failing,
    /// Pops raw responses from the script; an exhausted script fails
    Scripted,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Texts received, in order
    received: Arc<Mutex<Vec<String>>>,
    /// Raw responses for `Scripted`
    script: Arc<Mutex<VecDeque<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails `failures` times before succeeding
    pub fn failing_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailingFirst { failures })
    }

    /// Create a mock that replays raw responses in order
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new(MockBehavior::Scripted);
        provider.script.lock().extend(responses.into_iter().map(Into::into));
        provider
    }

    /// The raw response the working mock produces for a text
    pub fn delimited_translation(text: &str) -> String {
        format!("<translation>{}{}</translation>", MOCK_TRANSLATION_PREFIX, text)
    }

    /// Number of `complete` calls made so far, failed ones included
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Source texts received so far
    pub fn received_texts(&self) -> Vec<String> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.received.lock().push(request.text.clone());

        match self.behavior {
            MockBehavior::Working => Ok(Self::delimited_translation(&request.text)),
            MockBehavior::FailingFirst { failures } if count < failures => {
                Err(ProviderError::ConnectionError(format!("Simulated failure {}", count + 1)))
            }
            MockBehavior::FailingFirst { .. } => Ok(Self::delimited_translation(&request.text)),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::Scripted => self.script.lock().pop_front()
                .ok_or_else(|| ProviderError::RequestFailed("Mock script exhausted".to_string())),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }
}
