/*!
 * Tests for the translation client over noisy and failing providers
 */

use epubwai::app_config::Config;
use epubwai::errors::TranslationError;
use epubwai::providers::mock::MockProvider;
use epubwai::translation::{ClientSettings, TranslationClient};
use crate::common;

#[tokio::test]
async fn test_translateText_withReasoningAndEcho_shouldKeepOnlyTranslation() {
    let raw = "<think>\nThe user wants Chinese.\n</think>\nOriginal: Good morning.\nThinking: keep it short\n早上好。";
    let mut client = TranslationClient::new(MockProvider::scripted([raw]), common::fast_settings()).unwrap();

    let translated = client.translate_text("Good morning.").await.unwrap();

    assert_eq!(translated, "早上好。");
}

#[tokio::test]
async fn test_translateText_withDelimitersInsideReasoning_shouldPreferPayload() {
    let raw = "Analysis: simple sentence.\n<TRANSLATION>\n  你好，世界。 \n</TRANSLATION>\nDone.";
    let mut client = TranslationClient::new(MockProvider::scripted([raw]), common::fast_settings()).unwrap();

    assert_eq!(client.translate_text("Hello, world.").await.unwrap(), "你好，世界。");
}

#[tokio::test]
async fn test_translateText_withEmptyResponse_shouldFallBackToSource() {
    let mut client = TranslationClient::new(MockProvider::scripted([""]), common::fast_settings()).unwrap();

    assert_eq!(client.translate_text("Chapter One").await.unwrap(), "Chapter One");
}

#[tokio::test]
async fn test_translateText_withCustomDelimiters_shouldUseConfiguredPair() {
    let mut config = Config::default();
    config.response.start_tag = "[[".to_string();
    config.response.end_tag = "]]".to_string();
    let settings = ClientSettings {
        retry_delay: std::time::Duration::from_millis(1),
        ..ClientSettings::from_config(&config).unwrap()
    };
    assert!(settings.instruction.contains("[["));

    let provider = MockProvider::scripted(["noise [[ 再见 ]] noise"]);
    let mut client = TranslationClient::new(provider, settings).unwrap();

    assert_eq!(client.translate_text("Goodbye").await.unwrap(), "再见");
}

#[tokio::test]
async fn test_translateText_withNearDuplicateText_shouldNotShareCacheEntry() {
    let mut client = TranslationClient::new(MockProvider::working(), common::fast_settings()).unwrap();

    let plain = client.translate_text("Hello").await.unwrap();
    let padded = client.translate_text("Hello ").await.unwrap();

    assert_eq!(plain, "译Hello");
    assert_eq!(padded, "译Hello");
    assert_eq!(client.provider().request_count(), 2);
    assert_eq!(client.cache().len(), 2);
}

#[tokio::test]
async fn test_translateText_whenSecondChunkFails_shouldNotCachePartialResult() {
    let settings = ClientSettings {
        max_chars: 6,
        retry_count: 0,
        ..common::fast_settings()
    };
    let provider = MockProvider::scripted(["<translation>甲。</translation>"]);
    let mut client = TranslationClient::new(provider, settings).unwrap();

    let result = client.translate_text("Aaaa. Bbbb.").await;

    assert!(matches!(result, Err(TranslationError::RetriesExhausted { attempts: 1, .. })));
    assert_eq!(client.provider().received_texts(), vec!["Aaaa.", "Bbbb."]);
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_stats_afterMixedWork_shouldCountRequestsAndHits() {
    let settings = ClientSettings { retry_count: 1, ..common::fast_settings() };
    let mut client = TranslationClient::new(MockProvider::failing_first(1), settings).unwrap();

    client.translate_text("One.").await.unwrap();
    client.translate_text("One.").await.unwrap();
    client.translate_text("   ").await.unwrap();

    let stats = client.stats();
    assert_eq!(stats.texts, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.chunks, 1);
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.retries, 1);
    assert!(stats.summary().contains("Requests: 2 (1 retried)"));
}

#[tokio::test]
async fn test_testConnection_withFailingProvider_shouldReturnError() {
    let client = TranslationClient::new(MockProvider::failing(), common::fast_settings()).unwrap();
    assert!(client.test_connection().await.is_err());
}
