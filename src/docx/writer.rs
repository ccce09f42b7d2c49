/*!
 * WordprocessingML package writer.
 *
 * Produces the smallest package Word and LibreOffice open without repair:
 * content types, package and document relationships, the document body,
 * heading and list styles, a bullet numbering definition and the media parts.
 */

use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use super::image::{ImageFormat, drawing_xml, extent_emu};
use super::{DocxDocument, Paragraph, Run};
use crate::errors::DocxError;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_WORDPROCESSING: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE_PREFIX: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A picture part of the package
struct MediaPart {
    relationship_id: String,
    file_name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
}

/// Pictures collected from the document, one part per distinct file
#[derive(Default)]
struct MediaParts {
    parts: Vec<MediaPart>,
    by_path: HashMap<PathBuf, usize>,
}

impl MediaParts {
    /// First relationship id available to pictures; rId1 and rId2 are taken
    const FIRST_ID: usize = 3;

    fn collect(document: &DocxDocument) -> Result<Self, DocxError> {
        let mut media = Self::default();

        for paragraph in document.paragraphs() {
            for run in &paragraph.runs {
                if let Run::Image(path) = run {
                    media.add(path)?;
                }
            }
        }

        Ok(media)
    }

    fn add(&mut self, path: &Path) -> Result<(), DocxError> {
        if self.by_path.contains_key(path) {
            return Ok(());
        }

        let bytes = fs::read(path).map_err(|e| DocxError::Image {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let format = ImageFormat::detect(&bytes, path).ok_or_else(|| DocxError::Image {
            path: path.display().to_string(),
            message: "unsupported image format".to_string(),
        })?;

        let index = self.parts.len();
        self.parts.push(MediaPart {
            relationship_id: format!("rId{}", index + Self::FIRST_ID),
            file_name: format!("image{}.{}", index + 1, format.extension()),
            format,
            bytes,
        });
        self.by_path.insert(path.to_path_buf(), index);
        Ok(())
    }

    fn get(&self, path: &Path) -> Option<&MediaPart> {
        self.by_path.get(path).map(|index| &self.parts[*index])
    }
}

/// Save a document to `path` through a temporary file in the same directory
pub fn save(document: &DocxDocument, path: &Path) -> Result<(), DocxError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = tempfile::NamedTempFile::new_in(dir)?;
    let file = write_package(document, temp.reopen()?)?;
    file.sync_all()?;
    temp.persist(path).map_err(|e| DocxError::Io(e.error))?;

    debug!("Wrote {:?}", path);
    Ok(())
}

/// Serialize a document into any seekable writer and return the writer
pub fn write_package<W: Write + Seek>(document: &DocxDocument, writer: W) -> Result<W, DocxError> {
    let media = MediaParts::collect(document)?;
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);

    let parts = [
        ("[Content_Types].xml", content_types_xml(&media)),
        ("_rels/.rels", package_rels_xml()),
        ("word/document.xml", document_xml(document, &media)),
        ("word/styles.xml", styles_xml()),
        ("word/numbering.xml", numbering_xml()),
        ("word/_rels/document.xml.rels", document_rels_xml(&media)),
    ];

    for (name, content) in &parts {
        add_part(&mut zip, name, content.as_bytes(), options)?;
    }
    for part in &media.parts {
        add_part(&mut zip, &format!("word/media/{}", part.file_name), &part.bytes, options)?;
    }

    zip.finish().map_err(|e| DocxError::Archive(e.to_string()))
}

fn add_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<(), DocxError> {
    zip.start_file(name, options)
        .map_err(|e| DocxError::Archive(format!("Failed to start {}: {}", name, e)))?;
    zip.write_all(bytes)?;
    Ok(())
}

fn content_types_xml(media: &MediaParts) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);

    let mut formats: Vec<ImageFormat> = Vec::new();
    for part in &media.parts {
        if !formats.contains(&part.format) {
            formats.push(part.format);
        }
    }
    for format in formats {
        xml.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.content_type()
        ));
    }

    xml.push_str(r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#);
    xml.push_str(r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#);
    xml.push_str("</Types>");
    xml
}

fn package_rels_xml() -> String {
    format!(
        r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/officeDocument" Target="word/document.xml"/></Relationships>"#,
        XML_DECLARATION, NS_PACKAGE_RELATIONSHIPS, REL_TYPE_PREFIX
    )
}

fn document_rels_xml(media: &MediaParts) -> String {
    let mut xml = format!(
        r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/styles" Target="styles.xml"/><Relationship Id="rId2" Type="{}/numbering" Target="numbering.xml"/>"#,
        XML_DECLARATION, NS_PACKAGE_RELATIONSHIPS, REL_TYPE_PREFIX, REL_TYPE_PREFIX
    );
    for part in &media.parts {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/image" Target="media/{}"/>"#,
            part.relationship_id, REL_TYPE_PREFIX, part.file_name
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn document_xml(document: &DocxDocument, media: &MediaParts) -> String {
    let mut xml = format!(
        concat!(
            r#"{}<w:document xmlns:w="{}" xmlns:r="{}""#,
            r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
            r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
            r#" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>"#,
        ),
        XML_DECLARATION, NS_WORDPROCESSING, NS_RELATIONSHIPS
    );

    let mut image_id = 0;
    for paragraph in document.paragraphs() {
        write_paragraph(&mut xml, paragraph, media, &mut image_id);
    }

    xml.push_str(concat!(
        r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
        r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>"#,
        r#"</w:sectPr></w:body></w:document>"#,
    ));
    xml
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph, media: &MediaParts, image_id: &mut usize) {
    xml.push_str("<w:p>");
    if let Some(style_id) = paragraph.style.style_id() {
        xml.push_str(&format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, style_id));
    }

    for run in &paragraph.runs {
        match run {
            Run::Text(text) => write_text_run(xml, text),
            Run::Break => xml.push_str("<w:r><w:br/></w:r>"),
            Run::Image(path) => {
                if let Some(part) = media.get(path) {
                    *image_id += 1;
                    xml.push_str(&drawing_xml(
                        &part.relationship_id,
                        *image_id,
                        extent_emu(&part.bytes),
                        &part.file_name,
                    ));
                }
            }
        }
    }

    xml.push_str("</w:p>");
}

/// One run with tabs and newlines turned into their own elements
fn write_text_run(xml: &mut String, text: &str) {
    let text = sanitize_xml_text(text);
    xml.push_str("<w:r>");

    let mut pending = String::new();
    for ch in text.chars() {
        let element = match ch {
            '\t' => "<w:tab/>",
            '\n' => "<w:br/>",
            '\r' => continue,
            _ => {
                pending.push(ch);
                continue;
            }
        };
        push_text_element(xml, &pending);
        pending.clear();
        xml.push_str(element);
    }
    push_text_element(xml, &pending);

    xml.push_str("</w:r>");
}

fn push_text_element(xml: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    xml.push_str(&quick_xml::escape::escape(text));
    xml.push_str("</w:t>");
}

/// Drop characters XML 1.0 does not allow
pub fn sanitize_xml_text(text: &str) -> String {
    text.chars()
        .filter(|ch| {
            matches!(ch, '\t' | '\n' | '\r')
                || (*ch >= '\u{20}' && !matches!(ch, '\u{FFFE}' | '\u{FFFF}'))
        })
        .collect()
}

fn styles_xml() -> String {
    let mut xml = format!(r#"{}<w:styles xmlns:w="{}">"#, XML_DECLARATION, NS_WORDPROCESSING);
    xml.push_str(concat!(
        r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
        r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="SimSun" w:cs="Calibri"/>"#,
        r#"<w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault>"#,
        r#"<w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#,
        r#"</w:docDefaults>"#,
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
    ));

    // Half-point sizes for Heading 1..6
    const HEADING_SIZES: [u32; 6] = [32, 26, 24, 22, 22, 22];
    for (index, size) in HEADING_SIZES.iter().enumerate() {
        let level = index + 1;
        xml.push_str(&format!(
            concat!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/>"#,
                r#"<w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
                r#"<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="{outline}"/></w:pPr>"#,
                r#"<w:rPr><w:b/><w:bCs/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#,
            ),
            level = level,
            outline = index,
            size = size,
        ));
    }

    xml.push_str(concat!(
        r#"<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/>"#,
        r#"<w:basedOn w:val="Normal"/><w:qFormat/>"#,
        r#"<w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr><w:ind w:left="720" w:hanging="360"/></w:pPr>"#,
        r#"</w:style></w:styles>"#,
    ));
    xml
}

fn numbering_xml() -> String {
    format!(
        concat!(
            r#"{}<w:numbering xmlns:w="{}">"#,
            r#"<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/>"#,
            r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="{}"/>"#,
            r#"<w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>"#,
            r#"<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#,
        ),
        XML_DECLARATION, NS_WORDPROCESSING, '\u{2022}'
    )
}
