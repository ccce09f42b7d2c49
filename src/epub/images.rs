/*!
 * Image extraction and archive path resolution.
 *
 * Every image of the book is written once into a temporary directory owned
 * by the `ImageMap`. The directory is removed when the map is dropped, so
 * decoded images never outlive the run.
 */

use log::{debug, warn};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::docx::image::ImageFormat;
use crate::epub::archive::EpubArchive;
use crate::errors::EpubError;

/// Normalize an archive path
///
/// Collapses `.`, `..` and repeated slashes, then strips any leading `.` and
/// `/` characters. The result is relative to the archive root.
pub fn normalize_epub_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    parts.join("/").trim_start_matches(['.', '/']).to_string()
}

/// Directory part of an archive path, empty for top-level entries
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |index| &path[..index])
}

/// Resolve `href` relative to the document at `doc_path`
///
/// `href` is a URI reference, so `%20` and friends are decoded first.
pub fn join_archive_path(doc_path: &str, href: &str) -> String {
    let href = percent_decode_str(href).decode_utf8_lossy();
    let base = parent_dir(doc_path);
    if href.starts_with('/') || base.is_empty() {
        normalize_epub_path(&href)
    } else {
        normalize_epub_path(&format!("{}/{}", base, href))
    }
}

/// Archive path an image reference points to
///
/// Empty references and `data:` URIs resolve to nothing.
pub fn resolve_image_src(src: &str, doc_path: &str) -> Option<String> {
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    Some(join_archive_path(doc_path, src))
}

/// Mapping from normalized archive path to an extracted local file
#[derive(Debug)]
pub struct ImageMap {
    dir: TempDir,
    entries: HashMap<String, PathBuf>,
}

impl ImageMap {
    /// Create an empty map backed by a fresh temporary directory
    pub fn new() -> Result<Self, EpubError> {
        let dir = tempfile::Builder::new()
            .prefix("epubwai-images-")
            .tempdir()?;

        Ok(Self {
            dir,
            entries: HashMap::new(),
        })
    }

    /// Extract every image the package declares
    ///
    /// Images the DOCX writer cannot embed are left out, so references to
    /// them are skipped like any unresolved image.
    pub fn from_archive<R: Read + Seek>(archive: &mut EpubArchive<R>) -> Result<Self, EpubError> {
        let mut map = Self::new()?;

        let paths: Vec<String> = archive.images().iter().map(|item| item.path.clone()).collect();
        for path in paths {
            match archive.read_bytes(&path) {
                Ok(bytes) if ImageFormat::detect(&bytes, Path::new(&path)).is_none() => {
                    warn!("Skipping image {}, its format cannot be embedded in DOCX", path);
                }
                Ok(bytes) => {
                    map.store(&path, &bytes)?;
                }
                // A manifest entry without archive data is skipped like any unresolved image
                Err(EpubError::MissingEntry(missing)) => {
                    warn!("Image {} is declared but missing from the archive", missing);
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Extracted {} images to {:?}", map.len(), map.dir());
        Ok(map)
    }

    /// Write image bytes for an archive path and record the mapping
    pub fn store(&mut self, archive_path: &str, bytes: &[u8]) -> Result<PathBuf, EpubError> {
        let name = normalize_epub_path(archive_path);
        let local = self.dir.path().join(name.replace('/', "__"));
        fs::write(&local, bytes)?;
        self.entries.insert(name, local.clone());
        Ok(local)
    }

    /// Local file for a normalized archive path
    pub fn get(&self, archive_path: &str) -> Option<&Path> {
        self.entries.get(archive_path).map(PathBuf::as_path)
    }

    /// Local file for an image reference found in the document at `doc_path`
    pub fn resolve(&self, src: &str, doc_path: &str) -> Option<&Path> {
        resolve_image_src(src, doc_path).and_then(|path| self.get(&path))
    }

    /// Directory holding the extracted files
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
