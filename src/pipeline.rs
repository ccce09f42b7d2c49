/*!
 * Section pipeline.
 *
 * Processes the sections of a book strictly in order. Each section becomes
 * one `.docx` document and, unless disabled, one plain-text mirror. Files for
 * a section are written only after the whole section translated without a
 * fatal error.
 */

use log::{debug, info, warn};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::docx::DocxDocument;
use crate::document::collect_blocks;
use crate::epub::{EpubArchive, ImageMap, XhtmlDocument};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::providers::Provider;
use crate::renderer::BlockRenderer;
use crate::translation::TranslationClient;

/// Output files of one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutput {
    pub docx: PathBuf,
    pub text: PathBuf,
}

impl SectionOutput {
    /// Output paths for section `index` (1-based) of `total`
    pub fn for_section(output_dir: &Path, index: usize, total: usize) -> Self {
        let stem = section_file_stem(index, total);
        Self {
            docx: output_dir.join(format!("{}.docx", stem)),
            text: output_dir.join(format!("{}.txt", stem)),
        }
    }
}

/// `section_<index>_of_<total>` with both numbers zero-padded to two digits
pub fn section_file_stem(index: usize, total: usize) -> String {
    format!("section_{:02}_of_{:02}", index, total)
}

/// What a run produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Sections found in the book
    pub sections_total: usize,
    /// Sections translated and written
    pub sections_written: usize,
    /// Sections skipped because their output already existed
    pub sections_skipped: usize,
    /// Documents written, in section order
    pub outputs: Vec<SectionOutput>,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Generate a summary of the run
    pub fn summary(&self) -> String {
        format!(
            "Run Summary:\n\
             Sections: {} ({} written, {} skipped)\n\
             Elapsed: {:.1}s",
            self.sections_total,
            self.sections_written,
            self.sections_skipped,
            self.elapsed.as_secs_f64(),
        )
    }
}

/// Translates book sections into output documents
#[derive(Debug)]
pub struct SectionPipeline<P: Provider> {
    client: TranslationClient<P>,
    output_dir: PathBuf,
    write_plain_text: bool,
    resume: bool,
}

impl<P: Provider> SectionPipeline<P> {
    pub fn new(client: TranslationClient<P>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
            write_plain_text: true,
            resume: false,
        }
    }

    /// Whether to write the plain-text mirror next to each document
    pub fn with_plain_text(mut self, enabled: bool) -> Self {
        self.write_plain_text = enabled;
        self
    }

    /// Whether to skip sections whose output files already exist
    pub fn with_resume(mut self, enabled: bool) -> Self {
        self.resume = enabled;
        self
    }

    pub fn client(&self) -> &TranslationClient<P> {
        &self.client
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Translate one parsed section into an output document
    ///
    /// A section without a `body` yields an empty document.
    pub async fn translate_section(
        &mut self,
        section: &XhtmlDocument,
        section_path: &str,
        images: &ImageMap,
    ) -> Result<DocxDocument, AppError> {
        let mut document = DocxDocument::new();

        let Some(body) = section.body() else {
            warn!("{} has no body, writing an empty document", section_path);
            return Ok(document);
        };

        let blocks = collect_blocks(body);
        debug!("{}: {} blocks", section_path, blocks.len());

        let mut renderer = BlockRenderer::new(&mut self.client, images, section_path);
        for block in &blocks {
            renderer.render(block, &mut document).await?;
        }

        Ok(document)
    }

    /// Persist a document and its plain-text mirror
    ///
    /// With the mirror disabled, a mirror left by an earlier run is removed
    /// so it never sits next to a newer document.
    pub fn write_section(&self, document: &DocxDocument, output: &SectionOutput) -> Result<(), AppError> {
        document.save(&output.docx)?;
        let mirror = if self.write_plain_text {
            FileManager::write_to_file(&output.text, &document.to_plain_text())
        } else {
            FileManager::remove_if_exists(&output.text)
        };
        mirror.map_err(|e| AppError::File(format!("{:#}", e)))
    }

    fn is_complete(&self, output: &SectionOutput) -> bool {
        FileManager::file_exists(&output.docx)
            && (!self.write_plain_text || FileManager::file_exists(&output.text))
    }

    /// Translate every section of a book
    ///
    /// `on_progress` is called with the number of finished sections and the
    /// total after each section, skipped ones included.
    pub async fn run<R, F>(
        &mut self,
        archive: &mut EpubArchive<R>,
        images: &ImageMap,
        mut on_progress: F,
    ) -> Result<RunSummary, AppError>
    where
        R: Read + Seek,
        F: FnMut(usize, usize),
    {
        let start = Instant::now();
        FileManager::ensure_dir(&self.output_dir)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;

        let sections: Vec<_> = archive.sections().into_iter().cloned().collect();
        let total = sections.len();
        let mut summary = RunSummary {
            sections_total: total,
            ..RunSummary::default()
        };

        if total == 0 {
            warn!("No content documents found in {}", archive.package_path());
        }

        for (position, item) in sections.iter().enumerate() {
            let index = position + 1;
            let output = SectionOutput::for_section(&self.output_dir, index, total);

            if self.resume && self.is_complete(&output) {
                info!("Skipping {} ({}), output exists", section_file_stem(index, total), item.path);
                summary.sections_skipped += 1;
                on_progress(index, total);
                continue;
            }

            let section = archive.read_section(item)?;
            let document = self.translate_section(&section, &item.path, images).await?;
            self.write_section(&document, &output)?;

            debug!("{} -> {:?}", item.path, output.docx);
            summary.sections_written += 1;
            summary.outputs.push(output);
            on_progress(index, total);
        }

        summary.elapsed = start.elapsed();
        Ok(summary)
    }
}
