/*!
 * Inline picture support for the DOCX writer.
 *
 * Reads pixel dimensions from PNG, JPEG and GIF headers and converts them to
 * the EMU extents WordprocessingML expects. Pictures wider than the text
 * column are scaled down with their aspect ratio kept.
 */

use std::path::Path;

/// EMU (English Metric Units) per inch
pub const EMU_PER_INCH: u64 = 914_400;

/// Pixel density assumed for images without usable metadata
pub const DEFAULT_DPI: u64 = 96;

/// Width of the text column on a Letter page with 1" margins
pub const MAX_WIDTH_EMU: u64 = 6 * EMU_PER_INCH;

/// Box used when the dimensions cannot be read
pub const DEFAULT_EXTENT_EMU: (u64, u64) = (3 * EMU_PER_INCH, 9 * EMU_PER_INCH / 4);

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const PNG_IHDR: &[u8] = b"IHDR";

/// Raster formats Word displays without a fallback picture
///
/// SVG and WebP need a PNG fallback part, so they are not embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Detect the format from the file signature, then from the extension
    pub fn detect(bytes: &[u8], path: &Path) -> Option<Self> {
        if bytes.starts_with(PNG_SIGNATURE) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }
        if bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }
        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return None;
        }

        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// File extension used inside `word/media`
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }
}

/// Pixel width and height read from the image header
pub fn pixel_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.starts_with(PNG_SIGNATURE) {
        // IHDR is always the first chunk
        if bytes.get(12..16)? != PNG_IHDR {
            return None;
        }
        let width = u32::from_be_bytes(bytes.get(16..20)?.try_into().ok()?);
        let height = u32::from_be_bytes(bytes.get(20..24)?.try_into().ok()?);
        return Some((width, height));
    }

    if bytes.starts_with(b"GIF8") {
        let width = u16::from_le_bytes(bytes.get(6..8)?.try_into().ok()?);
        let height = u16::from_le_bytes(bytes.get(8..10)?.try_into().ok()?);
        return Some((u32::from(width), u32::from(height)));
    }

    if bytes.starts_with(&[0xFF, 0xD8]) {
        return jpeg_dimensions(bytes);
    }

    None
}

/// Scan JPEG segments for a start-of-frame marker
fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut offset = 2;

    while offset + 9 < bytes.len() {
        if bytes[offset] != 0xFF {
            return None;
        }
        let marker = bytes[offset + 1];
        // Fill bytes before a marker
        if marker == 0xFF {
            offset += 1;
            continue;
        }
        let segment_len = usize::from(u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]));

        // SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            let height = u16::from_be_bytes([bytes[offset + 5], bytes[offset + 6]]);
            let width = u16::from_be_bytes([bytes[offset + 7], bytes[offset + 8]]);
            return Some((u32::from(width), u32::from(height)));
        }

        offset += segment_len + 2;
    }

    None
}

/// Display extent in EMU for an image, fitted to the text column
pub fn extent_emu(bytes: &[u8]) -> (u64, u64) {
    let Some((width, height)) = pixel_dimensions(bytes).filter(|(w, h)| *w > 0 && *h > 0) else {
        return DEFAULT_EXTENT_EMU;
    };

    let width_emu = u64::from(width) * EMU_PER_INCH / DEFAULT_DPI;
    let height_emu = u64::from(height) * EMU_PER_INCH / DEFAULT_DPI;

    if width_emu <= MAX_WIDTH_EMU {
        (width_emu, height_emu)
    } else {
        (MAX_WIDTH_EMU, height_emu * MAX_WIDTH_EMU / width_emu)
    }
}

/// Inline drawing markup for one picture run
pub fn drawing_xml(relationship_id: &str, image_id: usize, extent: (u64, u64), name: &str) -> String {
    let (cx, cy) = extent;
    format!(
        concat!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
            r#"<wp:docPr id="{id}" name="{name}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
        ),
        cx = cx,
        cy = cy,
        id = image_id,
        name = quick_xml::escape::escape(name),
        rel = relationship_id,
    )
}
