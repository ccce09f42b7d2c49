/*!
 * # EPUBwAI - EPUB translator with AI
 *
 * A Rust library for translating EPUB books section by section with a local
 * LLM, writing one DOCX document and one plain-text mirror per section.
 *
 * ## Features
 *
 * - Read EPUB containers: package document, spine order and images
 * - Walk XHTML content into ordered text and image segments
 * - Translate text through Ollama with:
 *   - Sentence-boundary chunking of long passages
 *   - Delimited-response extraction with a reasoning-text fallback
 *   - Bounded retry and an exact-match translation cache
 * - Keep headings, list items, tables and inline pictures in the output
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `epub`: EPUB container reading:
 *   - `epub::archive`: Container, package and spine parsing
 *   - `epub::xhtml`: Lenient XHTML content tree
 *   - `epub::images`: Path normalization and the extracted image map
 * - `document`: Content tree, inline segments and structural blocks
 * - `translation`: AI-powered translation:
 *   - `translation::core`: Translation client with retry
 *   - `translation::chunking`: Sentence-aware text splitting
 *   - `translation::cleaning`: Response cleaning
 *   - `translation::cache`: Exact-match translation cache
 * - `docx`: Minimal DOCX model and writer
 * - `renderer`: Block rendering into output paragraphs
 * - `pipeline`: Per-section orchestration and output files
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod epub;
pub mod document;
pub mod translation;
pub mod docx;
pub mod renderer;
pub mod pipeline;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use epub::{EpubArchive, ImageMap, XhtmlDocument};
pub use docx::DocxDocument;
pub use pipeline::{RunSummary, SectionOutput, SectionPipeline};
pub use translation::{ClientSettings, TranslationClient};
pub use language_utils::get_language_name;
pub use errors::{AppError, DocxError, EpubError, ProviderError, TranslationError};
