/*!
 * Provider implementations for text-generation services.
 *
 * This module contains client implementations for the services the
 * translation client can talk to:
 * - Ollama: Local LLM server
 * - Mock: Scripted in-process provider used by tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single logical generation request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Instruction telling the model what to do with the text
    pub instruction: String,
    /// Source text, sent without any decoration
    pub text: String,
    /// Optional sampling temperature
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a new request
    pub fn new(model: impl Into<String>, instruction: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instruction: instruction.into(),
            text: text.into(),
            temperature: None,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Instruction and text combined into one prompt field
    pub fn combined_prompt(&self) -> String {
        format!("{}\n\n{}", self.instruction, self.text)
    }
}

/// Common trait for all generation providers
///
/// A provider performs exactly one logical call per `complete` invocation and
/// hands back the raw generated text. Retrying, caching and cleaning the
/// response belong to the caller.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw generated text or an error
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod mock;
pub mod ollama;
