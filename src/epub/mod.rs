/*!
 * EPUB input.
 *
 * - `archive`: container, manifest and spine reading
 * - `xhtml`: content document parsing into the node tree
 * - `images`: image extraction and archive path resolution
 */

pub mod archive;
pub mod images;
pub mod xhtml;

pub use archive::{EpubArchive, ManifestItem};
pub use images::{ImageMap, normalize_epub_path, resolve_image_src};
pub use xhtml::XhtmlDocument;
