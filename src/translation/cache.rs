/*!
 * Exact-match translation memo.
 *
 * Keys are the source text exactly as it reached the client, so repeated
 * headings or captions are translated once per run.
 */

use std::collections::HashMap;

/// In-memory cache from source text to cleaned translation
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<String, String>,
    hits: usize,
    misses: usize,
}

impl TranslationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a translation, recording a hit or a miss
    pub fn get(&mut self, source: &str) -> Option<String> {
        match self.entries.get(source) {
            Some(translated) => {
                self.hits += 1;
                Some(translated.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a translation, replacing any previous value
    pub fn store(&mut self, source: impl Into<String>, translated: impl Into<String>) {
        self.entries.insert(source.into(), translated.into());
    }

    /// Hits and misses recorded so far
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries and reset the counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
