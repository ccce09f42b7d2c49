// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Result, anyhow};
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use epubwai::app_config::{self, Config};
use epubwai::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an EPUB book (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for epubwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// EPUB book to translate
    #[arg(short, long, value_name = "EPUB")]
    input: PathBuf,

    /// Directory for the per-section output files
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the Ollama service
    #[arg(short, long)]
    url: Option<String>,

    /// Maximum characters per translation request
    #[arg(long)]
    max_chars: Option<usize>,

    /// Retries after a failed translation request
    #[arg(long)]
    retry: Option<u32>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'zh-Hans', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Skip sections whose output files already exist
    #[arg(short, long)]
    resume: bool,
}

/// EPUBwAI - EPUB translator with AI
///
/// Translates an EPUB book section by section with a local Ollama model and
/// writes one DOCX document and one plain-text mirror per section.
#[derive(Parser, Debug)]
#[command(name = "epubwai")]
#[command(author = "EPUBwAI Team")]
#[command(version)]
#[command(about = "AI-powered EPUB translation tool")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "EPUBwAI translates EPUB books into DOCX documents using a local LLM.

EXAMPLES:
    epubwai -i book.epub                          # Translate using default config
    epubwai -i book.epub -o out/                  # Write sections into out/
    epubwai -i book.epub -m qwen3:14b             # Use a specific model
    epubwai -i book.epub -s en -t ja              # Translate from English to Japanese
    epubwai -i book.epub --max-chars 800 --retry 4
    epubwai -i book.epub -r                       # Continue an interrupted run
    epubwai completions bash > epubwai.bash       # Generate bash completions

CONFIGURATION:
    Configuration is read from conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, built-in
    defaults are used (Ollama on http://localhost:11434, model qwen3:8b).

OUTPUT:
    section_01_of_12.docx, section_01_of_12.txt, ... one pair per book section,
    written to <book>_translated/ next to the input unless --output-dir is set.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// EPUB book to translate
    #[arg(short, long, value_name = "EPUB")]
    input: Option<PathBuf>,

    /// Directory for the per-section output files
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the Ollama service
    #[arg(short, long)]
    url: Option<String>,

    /// Maximum characters per translation request
    #[arg(long)]
    max_chars: Option<usize>,

    /// Retries after a failed translation request
    #[arg(long)]
    retry: Option<u32>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'zh-Hans', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Skip sections whose output files already exist
    #[arg(short, long)]
    resume: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself lets everything through; the max level filters
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level), now, Self::get_emoji_for_level(level), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "epubwai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args
            let input = cli.input.ok_or_else(|| {
                anyhow!("--input is required when no subcommand is specified")
            })?;

            let translate_args = TranslateArgs {
                input,
                output_dir: cli.output_dir,
                model: cli.model,
                url: cli.url,
                max_chars: cli.max_chars,
                retry: cli.retry,
                source_language: cli.source_language,
                target_language: cli.target_language,
                config: cli.config,
                log_level: cli.log_level,
                resume: cli.resume,
            };
            run_translate(translate_args).await
        }
    }
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }

    if let Some(url) = &options.url {
        config.translation.endpoint = url.clone();
    }

    if let Some(max_chars) = options.max_chars {
        config.translation.max_chars_per_request = max_chars;
    }

    if let Some(retry) = options.retry {
        config.translation.retry_count = retry;
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let mut config = Config::load_or_default(&options.config)?;
    apply_overrides(&mut config, &options);

    // Just update the max level without reinitializing the logger
    log::set_max_level(config.log_level.to_level_filter());

    // Create controller, which validates the configuration
    let controller = Controller::with_config(config)?;

    if !options.input.is_file() {
        return Err(anyhow!("Input file does not exist: {:?}", options.input));
    }

    let output_dir = options.output_dir.clone()
        .unwrap_or_else(|| Controller::default_output_dir(&options.input));

    let summary = controller.run(options.input.clone(), output_dir, options.resume).await?;
    info!("{}", summary.summary());

    Ok(())
}
