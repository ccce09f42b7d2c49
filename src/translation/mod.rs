/*!
 * Text translation through a generation service.
 *
 * This module contains the translation client and the pieces it is built
 * from. It is split into several submodules:
 *
 * - `core`: The translation client (caching, chunking, retry)
 * - `chunking`: Sentence-boundary chunk splitting
 * - `cleaning`: Extraction of the translation from noisy model output
 * - `cache`: Exact-match translation memo for one run
 */

// Re-export main types for easier usage
pub use self::cache::TranslationCache;
pub use self::chunking::{split_sentences, split_text};
pub use self::cleaning::ResponseCleaner;
pub use self::core::{ClientSettings, TranslationClient, TranslationStats};

// Submodules
pub mod cache;
pub mod chunking;
pub mod cleaning;
pub mod core;
