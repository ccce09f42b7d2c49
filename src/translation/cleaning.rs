/*!
 * Extraction of the translation from raw model output.
 *
 * Models are asked to wrap their answer in a delimiter pair, but local models
 * often prepend reasoning or echo the source. Extraction therefore runs in a
 * fixed order:
 *
 * 1. Content between the delimiter pair wins whenever it is non-blank.
 * 2. Otherwise `<think>` blocks are removed, then blank lines and lines that
 *    start with a reasoning or echo marker are dropped.
 * 3. If nothing survives, the source text is returned unchanged.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::ResponseConfig;

/// Reasoning blocks emitted by thinking models
static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<think>.*?</think>").unwrap()
});

/// Cleans raw responses according to a delimiter pair and a marker list
#[derive(Debug, Clone)]
pub struct ResponseCleaner {
    /// Matches the delimited payload, case-insensitive and across lines
    delimited: Regex,
    /// Lowercased line prefixes that mark non-translation lines
    markers: Vec<String>,
}

impl ResponseCleaner {
    /// Build a cleaner for the given delimiter pair and marker list
    pub fn new<S: AsRef<str>>(start_tag: &str, end_tag: &str, markers: &[S]) -> Result<Self, regex::Error> {
        let pattern = format!(
            "(?is){}(.*?){}",
            regex::escape(start_tag),
            regex::escape(end_tag)
        );

        Ok(Self {
            delimited: Regex::new(&pattern)?,
            markers: markers.iter()
                .map(|marker| marker.as_ref().trim().to_lowercase())
                .filter(|marker| !marker.is_empty())
                .collect(),
        })
    }

    /// Build a cleaner from the response section of the configuration
    pub fn from_config(config: &ResponseConfig) -> Result<Self, regex::Error> {
        Self::new(&config.start_tag, &config.end_tag, &config.reasoning_markers)
    }

    /// Extract the translation from `raw`, falling back to `source`
    ///
    /// Never returns an empty string for a non-empty `source`.
    pub fn extract(&self, raw: &str, source: &str) -> String {
        let raw = raw.trim();

        if let Some(captures) = self.delimited.captures(raw) {
            let payload = captures.get(1).map_or("", |m| m.as_str()).trim();
            if !payload.is_empty() {
                return payload.to_string();
            }
        }

        let without_thinking = THINK_BLOCK.replace_all(raw, "");
        let cleaned = without_thinking
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !self.is_marker_line(line))
            .collect::<Vec<_>>()
            .join("\n");

        if cleaned.is_empty() {
            debug!("Response cleaned to nothing, keeping source text");
            source.to_string()
        } else {
            cleaned
        }
    }

    fn is_marker_line(&self, line: &str) -> bool {
        let lowered = line.to_lowercase();
        self.markers.iter().any(|marker| lowered.starts_with(marker.as_str()))
    }
}
