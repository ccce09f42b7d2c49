/*!
 * Integration tests for application lifecycle
 */

use std::fs;
use epubwai::app_config::Config;
use epubwai::app_controller::Controller;
use epubwai::pipeline::SectionOutput;
use epubwai::providers::mock::MockProvider;
use crate::common::{self, CannedResponse, EpubBuilder, LocalResponder};

fn test_config(endpoint: &str) -> Config {
    let mut config = Config::default();
    config.translation.endpoint = endpoint.to_string();
    config.translation.retry_delay_ms = 1;
    config.translation.retry_count = 1;
    config.translation.timeout_secs = 5;
    config
}

#[test]
fn test_controller_withCustomConfig_shouldInitialize() {
    let mut config = Config::default();
    config.source_language = "es".to_string();
    config.target_language = "de".to_string();

    let controller = Controller::with_config(config).unwrap();

    assert_eq!(controller.config().target_language, "de");
}

#[tokio::test]
async fn test_runWithProvider_withMockProvider_shouldTranslateBook() {
    let temp_dir = common::create_temp_dir().unwrap();
    let book = EpubBuilder::new()
        .section("ch1.xhtml", "<h1>One</h1><p>First.</p>")
        .section("ch2.xhtml", "<p>Second.</p>")
        .write(temp_dir.path(), "novel.epub")
        .unwrap();
    let output_dir = Controller::default_output_dir(&book);
    let controller = Controller::with_config(test_config("http://localhost:11434")).unwrap();

    let summary = controller
        .run_with_provider(MockProvider::working(), book.clone(), output_dir.clone(), false)
        .await
        .unwrap();

    assert_eq!(output_dir, temp_dir.path().join("novel_translated"));
    assert_eq!(summary.sections_written, 2);
    let first = SectionOutput::for_section(&output_dir, 1, 2);
    assert_eq!(fs::read_to_string(&first.text).unwrap(), "译One\n译First.");
}

#[tokio::test]
async fn test_run_againstLocalOllama_shouldCleanResponsesIntoOutput() {
    common::init_logging();
    let responder = LocalResponder::start(|path| match path {
        "/api/version" => Some(CannedResponse::ok(r#"{"version":"0.6.2"}"#)),
        "/api/generate" => Some(CannedResponse::ok(
            r#"{"response":"<think>Short greeting.</think>\n<translation>你好，世界。</translation>","done":true}"#,
        )),
        _ => None,
    }).await.unwrap();

    let temp_dir = common::create_temp_dir().unwrap();
    let book = EpubBuilder::new()
        .section("ch1.xhtml", "<p>Hello, world.</p>")
        .write(temp_dir.path(), "book.epub")
        .unwrap();
    let output_dir = temp_dir.path().join("out");
    let controller = Controller::with_config(test_config(&responder.base_url)).unwrap();

    let summary = controller.run(book, output_dir.clone(), false).await.unwrap();

    assert_eq!(summary.sections_written, 1);
    let output = SectionOutput::for_section(&output_dir, 1, 1);
    assert_eq!(fs::read_to_string(&output.text).unwrap(), "你好，世界。");
    assert_eq!(responder.paths(), vec!["/api/version", "/api/generate"]);
}

#[tokio::test]
async fn test_run_whenServiceKeepsFailing_shouldFailAfterProbeWarning() {
    common::init_logging();
    let responder = LocalResponder::start(|path| match path {
        "/api/generate" => Some(CannedResponse::status(500, r#"{"error":"out of memory"}"#)),
        _ => None,
    }).await.unwrap();

    let temp_dir = common::create_temp_dir().unwrap();
    let book = EpubBuilder::new()
        .section("ch1.xhtml", "<p>Hello.</p>")
        .write(temp_dir.path(), "book.epub")
        .unwrap();
    let output_dir = temp_dir.path().join("out");
    let controller = Controller::with_config(test_config(&responder.base_url)).unwrap();

    let error = controller.run(book, output_dir.clone(), false).await.unwrap_err();

    assert!(format!("{:#}", error).contains("out of memory"));
    assert!(!SectionOutput::for_section(&output_dir, 1, 1).docx.exists());
    // Probe, then two generate attempts
    assert_eq!(responder.paths(), vec!["/api/version", "/api/generate", "/api/generate"]);
}

#[test]
fn test_runWithProvider_withNonEpubInput_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = temp_dir.path().join("notes.txt");
    fs::write(&input, "plain text").unwrap();
    let controller = Controller::with_config(Config::default()).unwrap();

    let result = tokio_test::block_on(async {
        controller
            .run_with_provider(MockProvider::working(), input, temp_dir.path().join("out"), false)
            .await
    });

    assert!(result.is_err());
    assert!(!temp_dir.path().join("out").exists());
}
