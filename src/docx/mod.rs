/*!
 * Minimal DOCX document model and writer.
 *
 * The model holds exactly what the translated sections need: styled
 * paragraphs made of text, line-break and picture runs.
 * - `writer`: WordprocessingML package serialization
 * - `image`: picture format detection and sizing
 */

use std::path::{Path, PathBuf};

use crate::errors::DocxError;

pub mod image;
pub mod writer;

/// Paragraph styles available in the generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphStyle {
    #[default]
    Normal,
    /// Heading level, clamped to 1..=6 when written
    Heading(u8),
    ListBullet,
}

impl ParagraphStyle {
    /// Style identifier in `styles.xml`; `None` for the default style
    pub fn style_id(&self) -> Option<String> {
        match self {
            Self::Normal => None,
            Self::Heading(level) => Some(format!("Heading{}", (*level).clamp(1, 6))),
            Self::ListBullet => Some("ListBullet".to_string()),
        }
    }
}

/// One run of a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    /// Literal text; `\t` and `\n` are written as tab and break elements
    Text(String),
    /// Explicit line break
    Break,
    /// Inline picture read from a local file when the document is saved
    Image(PathBuf),
}

/// A styled paragraph
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle) -> Self {
        Self {
            style,
            runs: Vec::new(),
        }
    }

    pub fn add_text(&mut self, text: impl Into<String>) {
        self.runs.push(Run::Text(text.into()));
    }

    pub fn add_break(&mut self) {
        self.runs.push(Run::Break);
    }

    pub fn add_image(&mut self, path: impl Into<PathBuf>) {
        self.runs.push(Run::Image(path.into()));
    }

    /// Text of the paragraph with breaks rendered as `\n`
    pub fn text(&self) -> String {
        self.runs.iter()
            .map(|run| match run {
                Run::Text(text) => text.as_str(),
                Run::Break => "\n",
                Run::Image(_) => "",
            })
            .collect()
    }
}

/// An output document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocxDocument {
    paragraphs: Vec<Paragraph>,
}

impl DocxDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty paragraph and return it for filling
    pub fn add_paragraph(&mut self, style: ParagraphStyle) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::new(style));
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Non-empty trimmed paragraph texts joined by newlines
    pub fn to_plain_text(&self) -> String {
        self.paragraphs.iter()
            .map(|paragraph| paragraph.text())
            .filter_map(|text| {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of text runs across all paragraphs
    pub fn text_run_count(&self) -> usize {
        self.runs().filter(|run| matches!(run, Run::Text(_))).count()
    }

    /// Number of picture runs across all paragraphs
    pub fn image_count(&self) -> usize {
        self.runs().filter(|run| matches!(run, Run::Image(_))).count()
    }

    fn runs(&self) -> impl Iterator<Item = &Run> {
        self.paragraphs.iter().flat_map(|paragraph| paragraph.runs.iter())
    }

    /// Write the document as a `.docx` package
    ///
    /// The package is assembled in a temporary file next to `path` and moved
    /// into place once complete.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocxError> {
        writer::save(self, path.as_ref())
    }
}
