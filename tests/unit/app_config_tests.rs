/*!
 * Tests for configuration loading and validation
 */

use std::fs;
use epubwai::app_config::{Config, LogLevel};
use epubwai::translation::ClientSettings;
use crate::common;

#[test]
fn test_loadOrDefault_withMissingFile_shouldUseDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();

    let config = Config::load_or_default(temp_dir.path().join("conf.json")).unwrap();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "zh-Hans");
    assert_eq!(config.translation.endpoint, "http://localhost:11434");
}

#[test]
fn test_loadOrDefault_withPartialFile_shouldMergeWithDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");
    fs::write(&path, r#"{
        "target_language": "ja",
        "translation": { "max_chars_per_request": 800, "retry_count": 4, "temperature": 0.3 },
        "output": { "write_plain_text": false },
        "log_level": "debug"
    }"#).unwrap();

    let config = Config::load_or_default(&path).unwrap();

    assert_eq!(config.target_language, "ja");
    assert_eq!(config.translation.max_chars_per_request, 800);
    assert_eq!(config.translation.retry_count, 4);
    assert_eq!(config.translation.temperature, Some(0.3));
    assert_eq!(config.translation.model, "qwen3:8b");
    assert!(!config.output.write_plain_text);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrDefault_withInvalidJson_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");
    fs::write(&path, "{ not json").unwrap();

    let error = Config::load_or_default(&path).unwrap_err();

    assert!(format!("{:#}", error).contains("Failed to parse config file"));
}

#[test]
fn test_validate_withUnknownLanguageOrEmptyModel_shouldFail() {
    let mut config = Config::default();
    config.source_language = "xx-invalid".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.model = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.response.end_tag.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_clientSettings_fromConfig_shouldRenderInstructionWithLanguageNames() {
    let mut config = Config::default();
    config.source_language = "fr".to_string();
    config.target_language = "de".to_string();
    config.translation.retry_delay_ms = 250;

    let settings = ClientSettings::from_config(&config).unwrap();

    assert!(settings.instruction.contains("French"));
    assert!(settings.instruction.contains("German"));
    assert_eq!(settings.retry_delay.as_millis(), 250);
    assert_eq!(settings.max_chars, 1500);
}
