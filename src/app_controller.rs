use anyhow::{Result, Context, anyhow};
use log::{warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::epub::{EpubArchive, ImageMap};
use crate::file_utils::{FileManager, FileType};
use crate::pipeline::{RunSummary, SectionPipeline};
use crate::providers::Provider;
use crate::providers::ollama::Ollama;
use crate::translation::{ClientSettings, TranslationClient};

// @module: Application controller for book translation

/// Main application controller for EPUB translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()
            .context("Configuration validation failed")?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the main workflow against the configured Ollama service
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, resume: bool) -> Result<RunSummary> {
        let provider = Ollama::new(
            self.config.translation.endpoint.clone(),
            Duration::from_secs(self.config.translation.timeout_secs),
        )?;

        self.run_with_provider(provider, input_file, output_dir, resume).await
    }

    /// Run the main workflow with an explicit provider
    pub async fn run_with_provider<P: Provider>(
        &self,
        provider: P,
        input_file: PathBuf,
        output_dir: PathBuf,
        resume: bool,
    ) -> Result<RunSummary> {
        // Check if the input file is a book we can read
        match FileManager::detect_file_type(&input_file)? {
            FileType::Epub => {}
            FileType::Archive => warn!("{:?} is a zip archive without an EPUB mimetype, trying anyway", input_file),
            FileType::Unknown => return Err(anyhow!("Input file is not an EPUB book: {:?}", input_file)),
        }

        let settings = ClientSettings::from_config(&self.config)?;
        let client = TranslationClient::new(provider, settings)?;

        // A failed probe is not fatal, the first request decides
        match client.test_connection().await {
            Ok(()) => debug!("Translation service is reachable"),
            Err(e) => warn!("Translation service check failed: {}", e),
        }

        info!(
            "Translating {:?} from {} to {} with {}",
            input_file,
            self.config.source_language,
            self.config.target_language,
            self.config.translation.model
        );

        let mut archive = EpubArchive::open(&input_file)
            .with_context(|| format!("Failed to open book: {:?}", input_file))?;
        let images = ImageMap::from_archive(&mut archive)
            .context("Failed to extract book images")?;
        debug!("Extracted {} images to {:?}", images.len(), images.dir());

        let mut pipeline = SectionPipeline::new(client, &output_dir)
            .with_plain_text(self.config.output.write_plain_text)
            .with_resume(resume);

        let total = archive.sections().len();
        let progress_bar = ProgressBar::new(total as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sections ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        let bar = progress_bar.clone();
        let result = pipeline.run(&mut archive, &images, move |completed, _total| {
            bar.set_position(completed as u64);
        }).await;

        progress_bar.finish_and_clear();
        let summary = result?;

        info!("{}", pipeline.client().stats().summary());
        info!(
            "Finished {} of {} sections ({} skipped) in {}. Output: {:?}",
            summary.sections_written + summary.sections_skipped,
            summary.sections_total,
            summary.sections_skipped,
            Self::format_duration(summary.elapsed),
            pipeline.output_dir()
        );

        Ok(summary)
    }

    /// Output directory for a book when none was given
    pub fn default_output_dir(input_file: &Path) -> PathBuf {
        FileManager::default_output_dir(input_file)
    }

    /// Format a duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
