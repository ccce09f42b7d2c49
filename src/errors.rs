/*!
 * Error types for the epubwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a generation service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Whether the service reported that the requested endpoint does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status_code: 404, .. })
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Every attempt of a single translation call failed
    #[error("Translation failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error reported by the final attempt
        last_error: ProviderError,
    },

    /// The client was built from unusable settings
    #[error("Invalid translation settings: {0}")]
    InvalidSettings(String),
}

/// Errors that can occur while reading the source EPUB
#[derive(Error, Debug)]
pub enum EpubError {
    /// The archive itself could not be opened or read
    #[error("Archive error: {0}")]
    Archive(String),

    /// A required entry is missing from the archive
    #[error("Missing archive entry: {0}")]
    MissingEntry(String),

    /// An XML document inside the archive is malformed
    #[error("Malformed XML in {path}: {message}")]
    Xml {
        /// Archive path of the offending document
        path: String,
        /// Parser message
        message: String,
    },

    /// The package document does not describe a usable book
    #[error("Invalid package document: {0}")]
    InvalidPackage(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while writing a DOCX document
#[derive(Error, Debug)]
pub enum DocxError {
    /// Failure while assembling the zip package
    #[error("Archive error: {0}")]
    Archive(String),

    /// An image referenced by the document could not be read
    #[error("Failed to read image {path}: {message}")]
    Image {
        /// Local path of the image
        path: String,
        /// Underlying error message
        message: String,
    },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error reading the source book
    #[error("EPUB error: {0}")]
    Epub(#[from] EpubError),

    /// Error writing an output document
    #[error("DOCX error: {0}")]
    Docx(#[from] DocxError),
}
