use anyhow::{Result, Context};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

/// Local file header signature that opens every zip archive
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output directory next to the input book
    // @params: input_file
    pub fn default_output_dir<P: AsRef<Path>>(input_file: P) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default();

        let mut dir_name = stem.to_string_lossy().to_string();
        dir_name.push_str("_translated");

        input_file.parent().unwrap_or(Path::new(".")).join(dir_name)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Delete a file if it exists
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if Self::file_exists(path) {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove file: {:?}", path))?;
        }
        Ok(())
    }

    /// Detect whether a file is an EPUB book
    ///
    /// The extension decides first; files without a known extension are
    /// sniffed for the zip signature and the EPUB mimetype entry.
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        if let Some(ext) = path.extension() {
            if ext.to_string_lossy().eq_ignore_ascii_case("epub") {
                return Ok(FileType::Epub);
            }
        }

        // The mimetype entry is stored first and uncompressed
        let mut header = [0u8; 128];
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open file: {:?}", path))?;
        let read = file.read(&mut header)
            .with_context(|| format!("Failed to read file: {:?}", path))?;
        let header = &header[..read];

        if header.starts_with(ZIP_SIGNATURE) {
            let mimetype = b"application/epub+zip";
            if header.windows(mimetype.len()).any(|window| window == mimetype) {
                return Ok(FileType::Epub);
            }
            return Ok(FileType::Archive);
        }

        Ok(FileType::Unknown)
    }
}

/// Enum representing the input file kinds the tool tells apart
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// EPUB book
    Epub,
    /// Zip archive without the EPUB mimetype marker
    Archive,
    /// Unknown file type
    Unknown,
}
