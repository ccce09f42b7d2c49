/*!
 * Block rendering.
 *
 * Turns one structural block into output paragraphs, sending its text
 * through the translation client and its pictures through the image map.
 * Output order always follows source order.
 */

use log::debug;

use crate::docx::{DocxDocument, Paragraph, ParagraphStyle};
use crate::document::{Block, BlockContent, BlockKind, Segment};
use crate::epub::ImageMap;
use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::translation::TranslationClient;

/// Separator between translated table cells
pub const CELL_SEPARATOR: &str = "\t";

/// Renders the blocks of one section into an output document
pub struct BlockRenderer<'a, P: Provider> {
    client: &'a mut TranslationClient<P>,
    images: &'a ImageMap,
    /// Archive path of the section, used to resolve relative image references
    section_path: &'a str,
}

impl<'a, P: Provider> BlockRenderer<'a, P> {
    pub fn new(client: &'a mut TranslationClient<P>, images: &'a ImageMap, section_path: &'a str) -> Self {
        Self {
            client,
            images,
            section_path,
        }
    }

    /// Paragraph style for a block role
    pub fn style_for(kind: BlockKind) -> ParagraphStyle {
        match kind {
            BlockKind::Heading(level) => ParagraphStyle::Heading(level),
            BlockKind::ListItem => ParagraphStyle::ListBullet,
            _ => ParagraphStyle::Normal,
        }
    }

    /// Append the output for one block
    pub async fn render(&mut self, block: &Block, document: &mut DocxDocument) -> Result<(), TranslationError> {
        match &block.content {
            BlockContent::Table(rows) => self.render_table(rows, document).await,
            BlockContent::Inline(segments) => {
                let paragraph = document.add_paragraph(Self::style_for(block.kind));
                self.render_segments(segments, paragraph).await
            }
        }
    }

    /// One paragraph per row, non-blank cells translated and tab-joined
    async fn render_table(&mut self, rows: &[Vec<String>], document: &mut DocxDocument) -> Result<(), TranslationError> {
        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for cell in row.iter().filter(|cell| !cell.is_empty()) {
                cells.push(self.client.translate_text(cell).await?);
            }

            if !cells.is_empty() {
                document.add_paragraph(ParagraphStyle::Normal).add_text(cells.join(CELL_SEPARATOR));
            }
        }
        Ok(())
    }

    async fn render_segments(&mut self, segments: &[Segment], paragraph: &mut Paragraph) -> Result<(), TranslationError> {
        for segment in segments {
            match segment {
                Segment::Text(text) => self.add_translated_text(paragraph, text).await?,
                Segment::Image { src } => match self.images.resolve(src, self.section_path) {
                    Some(path) => paragraph.add_image(path),
                    None => debug!("Skipping unresolved image {:?} in {}", src, self.section_path),
                },
            }
        }
        Ok(())
    }

    /// Append translated text, turning embedded newlines into break runs
    ///
    /// Empty text adds nothing and whitespace-only text is kept verbatim.
    pub async fn add_translated_text(&mut self, paragraph: &mut Paragraph, text: &str) -> Result<(), TranslationError> {
        if text.is_empty() {
            return Ok(());
        }
        if text.trim().is_empty() {
            paragraph.add_text(text);
            return Ok(());
        }

        let translated = self.client.translate_text(text).await?;
        let mut lines = translated.split('\n').peekable();
        while let Some(line) = lines.next() {
            paragraph.add_text(line);
            if lines.peek().is_some() {
                paragraph.add_break();
            }
        }
        Ok(())
    }
}
