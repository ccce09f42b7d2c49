/*!
 * Core translation client implementation.
 *
 * This module contains the `TranslationClient`, which turns source text into
 * translated text through a `Provider`. It owns the response cleaner, the
 * per-run cache and the retry policy.
 */

use log::{debug, warn};
use std::time::{Duration, Instant};

use crate::app_config::{Config, ResponseConfig};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::{CompletionRequest, Provider};
use super::cache::TranslationCache;
use super::chunking::split_text;
use super::cleaning::ResponseCleaner;

/// Settings the client needs, resolved from the application configuration
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Model identifier sent with every request
    pub model: String,
    /// Fully rendered instruction text
    pub instruction: String,
    /// Optional sampling temperature
    pub temperature: Option<f32>,
    /// Texts longer than this many characters are chunked
    pub max_chars: usize,
    /// Retries after the first failed attempt
    pub retry_count: u32,
    /// Fixed pause between attempts
    pub retry_delay: Duration,
    /// Delimiters and markers for response cleaning
    pub response: ResponseConfig,
}

impl ClientSettings {
    /// Resolve client settings from a validated configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            model: config.translation.model.clone(),
            instruction: config.render_instruction()?,
            temperature: config.translation.temperature,
            max_chars: config.translation.max_chars_per_request,
            retry_count: config.translation.retry_count,
            retry_delay: Duration::from_millis(config.translation.retry_delay_ms),
            response: config.response.clone(),
        })
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            model: config.translation.model.clone(),
            instruction: config.render_instruction().unwrap_or_default(),
            temperature: config.translation.temperature,
            max_chars: config.translation.max_chars_per_request,
            retry_count: config.translation.retry_count,
            retry_delay: Duration::from_millis(config.translation.retry_delay_ms),
            response: config.response,
        }
    }
}

/// Counters describing the work done by a client
#[derive(Debug, Clone)]
pub struct TranslationStats {
    /// Calls to `translate_text`
    pub texts: usize,
    /// Texts answered from the cache
    pub cache_hits: usize,
    /// Chunks sent to the provider
    pub chunks: usize,
    /// Provider calls, failed attempts included
    pub requests: usize,
    /// Failed attempts that were retried
    pub retries: usize,
    /// Characters of source text sent to the provider
    pub source_chars: usize,
    /// Time spent waiting on the provider
    pub provider_time: Duration,
    /// Creation time of the client
    pub start_time: Instant,
}

impl Default for TranslationStats {
    fn default() -> Self {
        Self {
            texts: 0,
            cache_hits: 0,
            chunks: 0,
            requests: 0,
            retries: 0,
            source_chars: 0,
            provider_time: Duration::ZERO,
            start_time: Instant::now(),
        }
    }
}

impl TranslationStats {
    /// Generate a summary of the translation work
    pub fn summary(&self) -> String {
        format!(
            "Translation Summary:\n\
             Texts: {} ({} from cache)\n\
             Chunks sent: {}\n\
             Requests: {} ({} retried)\n\
             Source characters: {}\n\
             Provider time: {:.1}s\n\
             Elapsed: {:.1}s",
            self.texts,
            self.cache_hits,
            self.chunks,
            self.requests,
            self.retries,
            self.source_chars,
            self.provider_time.as_secs_f64(),
            self.start_time.elapsed().as_secs_f64(),
        )
    }
}

/// Translates text through a provider, with caching, chunking and retry
#[derive(Debug)]
pub struct TranslationClient<P: Provider> {
    provider: P,
    settings: ClientSettings,
    cleaner: ResponseCleaner,
    cache: TranslationCache,
    stats: TranslationStats,
}

impl<P: Provider> TranslationClient<P> {
    /// Create a client for a provider
    pub fn new(provider: P, settings: ClientSettings) -> Result<Self, TranslationError> {
        if settings.max_chars == 0 {
            return Err(TranslationError::InvalidSettings("max_chars must be greater than zero".to_string()));
        }

        let cleaner = ResponseCleaner::from_config(&settings.response)
            .map_err(|e| TranslationError::InvalidSettings(format!("Invalid response delimiters: {}", e)))?;

        Ok(Self {
            provider,
            settings,
            cleaner,
            cache: TranslationCache::new(),
            stats: TranslationStats::default(),
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn stats(&self) -> &TranslationStats {
        &self.stats
    }

    /// Probe the provider before starting a run
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.provider.test_connection().await
    }

    /// Translate a piece of text
    ///
    /// Whitespace-only text is returned unchanged without a provider call.
    /// Text longer than `max_chars` is split at sentence boundaries and the
    /// translated chunks are concatenated in order with no separator.
    pub async fn translate_text(&mut self, text: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        self.stats.texts += 1;
        if let Some(cached) = self.cache.get(text) {
            self.stats.cache_hits += 1;
            debug!("Cache hit for {} chars", text.chars().count());
            return Ok(cached);
        }

        let translated = if text.chars().count() <= self.settings.max_chars {
            self.translate_once(text).await?
        } else {
            let chunks = split_text(text, self.settings.max_chars);
            debug!("Split {} chars into {} chunks", text.chars().count(), chunks.len());

            let mut parts = Vec::with_capacity(chunks.len());
            for chunk in &chunks {
                parts.push(self.translate_once(chunk).await?);
            }
            parts.concat()
        };

        self.cache.store(text, translated.clone());
        Ok(translated)
    }

    /// Send one chunk to the provider and clean the response
    ///
    /// Makes up to `retry_count + 1` attempts with a fixed pause between
    /// them. The final error is returned once every attempt has failed.
    pub async fn translate_once(&mut self, text: &str) -> Result<String, TranslationError> {
        let request = CompletionRequest::new(
            self.settings.model.clone(),
            self.settings.instruction.clone(),
            text,
        )
        .temperature(self.settings.temperature);

        let attempts = self.settings.retry_count + 1;
        self.stats.chunks += 1;
        self.stats.source_chars += text.chars().count();

        let mut attempt = 0;
        loop {
            attempt += 1;
            self.stats.requests += 1;

            let started = Instant::now();
            let result = self.provider.complete(&request).await;
            self.stats.provider_time += started.elapsed();

            match result {
                Ok(raw) => return Ok(self.cleaner.extract(&raw, text)),
                Err(e) if attempt < attempts => {
                    warn!("Translation attempt {}/{} failed: {}", attempt, attempts, e);
                    self.stats.retries += 1;
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(e) => {
                    return Err(TranslationError::RetriesExhausted {
                        attempts,
                        last_error: e,
                    });
                }
            }
        }
    }
}
