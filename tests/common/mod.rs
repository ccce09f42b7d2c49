/*!
 * Common test utilities for the epubwai test suite
 */

use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use epubwai::translation::ClientSettings;

/// Route library logs to the test output; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Client settings with a retry delay short enough for tests
pub fn fast_settings() -> ClientSettings {
    ClientSettings {
        retry_delay: Duration::from_millis(1),
        ..ClientSettings::default()
    }
}

/// A 2x1 RGBA PNG
pub fn tiny_png() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&2u32.to_be_bytes());
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(b"IEND");
    bytes.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);
    bytes
}

/// Wrap body markup into a complete XHTML document
pub fn xhtml(body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            "\n<!DOCTYPE html>\n",
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Test</title></head>"#,
            "<body>{}</body></html>",
        ),
        body
    )
}

/// Builds small EPUB files with sections under `OEBPS/text/` and images under `OEBPS/images/`
#[derive(Default)]
pub struct EpubBuilder {
    sections: Vec<(String, String)>,
    images: Vec<(String, Vec<u8>)>,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section in spine order; `body` is the inner markup of `<body>`
    pub fn section(mut self, file_name: &str, body: &str) -> Self {
        self.sections.push((file_name.to_string(), xhtml(body)));
        self
    }

    /// Add a section whose file content is used as is
    pub fn raw_section(mut self, file_name: &str, content: &str) -> Self {
        self.sections.push((file_name.to_string(), content.to_string()));
        self
    }

    /// Add an image at `OEBPS/images/<file_name>`
    pub fn image(mut self, file_name: &str, bytes: Vec<u8>) -> Self {
        self.images.push((file_name.to_string(), bytes));
        self
    }

    fn package(&self) -> String {
        let mut manifest = String::new();
        let mut spine = String::new();

        for (index, (name, _)) in self.sections.iter().enumerate() {
            manifest.push_str(&format!(
                r#"<item id="s{}" href="text/{}" media-type="application/xhtml+xml"/>"#,
                index, name
            ));
            spine.push_str(&format!(r#"<itemref idref="s{}"/>"#, index));
        }
        for (index, (name, _)) in self.images.iter().enumerate() {
            manifest.push_str(&format!(
                r#"<item id="i{}" href="images/{}" media-type="image/png"/>"#,
                index, name
            ));
        }

        format!(
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="id">"#,
                r#"<metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Test</dc:title></metadata>"#,
                "<manifest>{}</manifest><spine>{}</spine></package>",
            ),
            manifest, spine
        )
    }

    /// Write the book to `dir/<name>` and return its path
    pub fn write(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        let path = dir.join(name);
        let mut zip = ZipWriter::new(File::create(&path)?);
        let options = SimpleFileOptions::default();

        zip.start_file("mimetype", options.compression_method(CompressionMethod::Stored))?;
        zip.write_all(b"application/epub+zip")?;

        zip.start_file("META-INF/container.xml", options)?;
        zip.write_all(concat!(
            r#"<?xml version="1.0"?>"#,
            r#"<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">"#,
            r#"<rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>"#,
            "</container>",
        ).as_bytes())?;

        zip.start_file("OEBPS/content.opf", options)?;
        zip.write_all(self.package().as_bytes())?;

        for (name, content) in &self.sections {
            zip.start_file(format!("OEBPS/text/{}", name), options)?;
            zip.write_all(content.as_bytes())?;
        }
        for (name, bytes) in &self.images {
            zip.start_file(format!("OEBPS/images/{}", name), options)?;
            zip.write_all(bytes)?;
        }

        zip.finish()?;
        Ok(path)
    }
}

/// One canned HTTP reply
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into() }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// A request seen by the local responder
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Minimal HTTP/1.1 responder on a random local port
///
/// `route` maps a request path to its reply; unknown paths get a 404.
pub struct LocalResponder {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<SeenRequest>>>,
}

impl LocalResponder {
    pub async fn start<F>(route: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<CannedResponse> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let route = Arc::new(route);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let seen = Arc::clone(&seen);
                let route = Arc::clone(&route);
                tokio::spawn(async move {
                    let Some(request) = read_request(&mut stream).await else {
                        return;
                    };
                    let reply = (*route)(&request.path)
                        .unwrap_or_else(|| CannedResponse::status(404, "404 page not found"));
                    seen.lock().push(request);

                    let head = format!(
                        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        reply.status,
                        reply.body.len()
                    );
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(reply.body.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Ok(Self { base_url, requests })
    }

    /// Paths requested so far, in arrival order
    pub fn paths(&self) -> Vec<String> {
        self.requests.lock().iter().map(|request| request.path.clone()).collect()
    }
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> Option<SeenRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut request_line = head.lines().next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let content_length = head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let body_end = buffer.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buffer[header_end..body_end]).to_string();
    Some(SeenRequest { method, path, body })
}
