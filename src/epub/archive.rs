/*!
 * EPUB container reading.
 *
 * Locates the package document through `META-INF/container.xml`, reads its
 * manifest and spine, and gives access to the archive entries they name.
 */

use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::epub::images::{join_archive_path, normalize_epub_path};
use crate::epub::xhtml::{XhtmlDocument, attribute};
use crate::errors::EpubError;

/// Location of the container document inside every EPUB
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Media types of content documents
const CONTENT_MEDIA_TYPES: &[&str] = &["application/xhtml+xml", "text/html"];

/// One resource declared in the package manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    /// Manifest identifier
    pub id: String,
    /// Normalized archive path
    pub path: String,
    /// Declared media type
    pub media_type: String,
    /// Space-separated `properties` values
    pub properties: Vec<String>,
}

impl ManifestItem {
    /// Whether the item is an XHTML/HTML content document
    pub fn is_content_document(&self) -> bool {
        CONTENT_MEDIA_TYPES.contains(&self.media_type.as_str())
    }

    /// Whether the item is an image
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// Whether the item is the EPUB 3 navigation document
    pub fn is_navigation(&self) -> bool {
        self.properties.iter().any(|property| property == "nav")
    }
}

/// An opened EPUB archive with its parsed package document
#[derive(Debug)]
pub struct EpubArchive<R: Read + Seek> {
    zip: ZipArchive<R>,
    package_path: String,
    manifest: Vec<ManifestItem>,
    spine: Vec<String>,
}

impl EpubArchive<BufReader<File>> {
    /// Open an EPUB file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EpubError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> EpubArchive<R> {
    /// Read an EPUB from any seekable source
    pub fn from_reader(reader: R) -> Result<Self, EpubError> {
        let zip = ZipArchive::new(reader)
            .map_err(|e| EpubError::Archive(format!("Failed to open EPUB: {}", e)))?;

        let mut archive = Self {
            zip,
            package_path: String::new(),
            manifest: Vec::new(),
            spine: Vec::new(),
        };

        let container = archive.read_bytes(CONTAINER_PATH)?;
        let package_path = parse_container(&container)?;

        let package = archive.read_bytes(&package_path)?;
        let (manifest, spine) = parse_package(&package_path, &package)?;
        archive.package_path = package_path;
        archive.manifest = manifest;
        archive.spine = spine;

        debug!(
            "Package {} declares {} items, spine of {}",
            archive.package_path,
            archive.manifest.len(),
            archive.spine.len()
        );

        Ok(archive)
    }

    /// Archive path of the package document
    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    /// Content documents in reading order
    ///
    /// Spine documents come first. Content documents the spine does not
    /// reference follow in manifest order, except the navigation document.
    pub fn sections(&self) -> Vec<&ManifestItem> {
        let mut seen = HashSet::new();
        let mut sections = Vec::new();

        for idref in &self.spine {
            match self.manifest.iter().find(|item| &item.id == idref) {
                Some(item) if item.is_content_document() => {
                    if seen.insert(item.id.as_str()) {
                        sections.push(item);
                    }
                }
                Some(item) => debug!("Skipping non-document spine item {} ({})", item.id, item.media_type),
                None => warn!("Spine references unknown manifest item {}", idref),
            }
        }

        for item in &self.manifest {
            if item.is_content_document() && !item.is_navigation() && seen.insert(item.id.as_str()) {
                sections.push(item);
            }
        }

        sections
    }

    /// Image items in manifest order
    pub fn images(&self) -> Vec<&ManifestItem> {
        self.manifest.iter().filter(|item| item.is_image()).collect()
    }

    /// Raw bytes of an archive entry
    pub fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>, EpubError> {
        let mut entry = match self.zip.by_name(path) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(EpubError::MissingEntry(path.to_string())),
            Err(e) => return Err(EpubError::Archive(format!("Failed to read {}: {}", path, e))),
        };

        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Parse a content document
    pub fn read_section(&mut self, item: &ManifestItem) -> Result<XhtmlDocument, EpubError> {
        let bytes = self.read_bytes(&item.path)?;
        XhtmlDocument::parse(&item.path, &bytes)
    }
}

fn package_reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);
    reader
}

/// Path of the first rootfile named by the container document
fn parse_container(content: &[u8]) -> Result<String, EpubError> {
    let mut reader = package_reader(content);
    let mut buf = Vec::with_capacity(128);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"rootfile" => {
                if let Some(path) = attribute(&reader, &e, b"full-path") {
                    return Ok(normalize_epub_path(&path));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(EpubError::Xml {
                    path: CONTAINER_PATH.to_string(),
                    message: e.to_string(),
                });
            }
        }
        buf.clear();
    }

    Err(EpubError::InvalidPackage(format!("{} names no rootfile", CONTAINER_PATH)))
}

/// Manifest items and spine idrefs of a package document
fn parse_package(package_path: &str, content: &[u8]) -> Result<(Vec<ManifestItem>, Vec<String>), EpubError> {
    let mut reader = package_reader(content);
    let mut buf = Vec::with_capacity(256);
    let mut manifest = Vec::new();
    let mut spine = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"item" => {
                    let id = attribute(&reader, &e, b"id");
                    let href = attribute(&reader, &e, b"href");
                    match (id, href) {
                        (Some(id), Some(href)) => manifest.push(ManifestItem {
                            id,
                            path: join_archive_path(package_path, &href),
                            media_type: attribute(&reader, &e, b"media-type").unwrap_or_default(),
                            properties: attribute(&reader, &e, b"properties")
                                .map(|value| value.split_whitespace().map(str::to_string).collect())
                                .unwrap_or_default(),
                        }),
                        _ => warn!("Ignoring manifest item without id or href in {}", package_path),
                    }
                }
                b"itemref" => {
                    if let Some(idref) = attribute(&reader, &e, b"idref") {
                        spine.push(idref);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(EpubError::Xml {
                    path: package_path.to_string(),
                    message: e.to_string(),
                });
            }
        }
        buf.clear();
    }

    if manifest.is_empty() {
        return Err(EpubError::InvalidPackage(format!("{} declares no manifest items", package_path)));
    }

    Ok((manifest, spine))
}
