/*!
 * Tests for the DOCX package produced on disk
 */

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;
use epubwai::docx::{DocxDocument, ParagraphStyle};
use crate::common;

fn read_parts(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(fs::read(path).unwrap())).unwrap();
    (0..archive.len())
        .map(|index| {
            let mut file = archive.by_index(index).unwrap();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).unwrap();
            (file.name().to_string(), bytes)
        })
        .collect()
}

/// Count elements and fail on any XML error, end-tag mismatches included
fn count_elements(xml: &[u8]) -> usize {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) => count += 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("Malformed XML at {}: {}", reader.buffer_position(), e),
        }
        buf.clear();
    }
    count
}

fn sample_document(image: &Path) -> DocxDocument {
    let mut doc = DocxDocument::new();
    doc.add_paragraph(ParagraphStyle::Heading(1)).add_text("第一章 <Start>");
    let paragraph = doc.add_paragraph(ParagraphStyle::Normal);
    paragraph.add_text("Line one");
    paragraph.add_break();
    paragraph.add_text("Line \"two\"");
    paragraph.add_image(image);
    doc.add_paragraph(ParagraphStyle::ListBullet).add_text("甲\t乙");
    doc
}

#[test]
fn test_save_shouldWriteWellFormedParts() {
    let temp_dir = common::create_temp_dir().unwrap();
    let image = temp_dir.path().join("cover.png");
    fs::write(&image, common::tiny_png()).unwrap();
    let output = temp_dir.path().join("section_01_of_01.docx");

    sample_document(&image).save(&output).unwrap();

    let parts = read_parts(&output);
    let names: Vec<_> = parts.iter().map(|(name, _)| name.as_str()).collect();
    for expected in [
        "[Content_Types].xml",
        "_rels/.rels",
        "word/document.xml",
        "word/styles.xml",
        "word/numbering.xml",
        "word/_rels/document.xml.rels",
        "word/media/image1.png",
    ] {
        assert!(names.contains(&expected), "Missing part {}", expected);
    }

    for (name, bytes) in &parts {
        if name.ends_with(".xml") || name.ends_with(".rels") {
            assert!(count_elements(bytes) > 0, "Empty part {}", name);
        }
    }

    let media = &parts.iter().find(|(name, _)| name == "word/media/image1.png").unwrap().1;
    assert_eq!(media, &common::tiny_png());
}

#[test]
fn test_save_shouldKeepParagraphOrderAndStyles() {
    let temp_dir = common::create_temp_dir().unwrap();
    let image = temp_dir.path().join("cover.png");
    fs::write(&image, common::tiny_png()).unwrap();
    let output = temp_dir.path().join("out.docx");

    sample_document(&image).save(&output).unwrap();

    let parts = read_parts(&output);
    let body = String::from_utf8(parts.iter().find(|(name, _)| name == "word/document.xml").unwrap().1.clone()).unwrap();

    let heading = body.find("第一章 &lt;Start&gt;").unwrap();
    let second_line = body.find("Line &quot;two&quot;").unwrap();
    let drawing = body.find("<w:drawing>").unwrap();
    let bullet = body.find(r#"<w:pStyle w:val="ListBullet"/>"#).unwrap();
    assert!(heading < second_line && second_line < drawing && drawing < bullet);
    assert!(body.contains(r#"<w:pStyle w:val="Heading1"/>"#));
}

#[test]
fn test_save_overExistingFile_shouldReplaceIt() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output = temp_dir.path().join("out.docx");
    fs::write(&output, "stale").unwrap();

    let mut doc = DocxDocument::new();
    doc.add_paragraph(ParagraphStyle::Normal).add_text("fresh");
    doc.save(&output).unwrap();

    let names: Vec<_> = read_parts(&output).into_iter().map(|(name, _)| name).collect();
    assert!(names.contains(&"word/document.xml".to_string()));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}
