//! Text extraction from uploaded resume documents (PDF and DOCX only).

use std::fmt;
use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const GENERIC_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Docx => write!(f, "DOCX"),
        }
    }
}

impl DocumentFormat {
    /// Resolves the format from the declared MIME type. Browsers and CLI clients
    /// sometimes send a generic type, in which case the file extension decides.
    pub fn resolve(mime: Option<&str>, file_name: Option<&str>) -> Result<Self, ExtractionError> {
        let mime = mime.map(|m| m.trim().to_ascii_lowercase()).unwrap_or_default();
        match mime.as_str() {
            PDF_MIME => return Ok(DocumentFormat::Pdf),
            DOCX_MIME => return Ok(DocumentFormat::Docx),
            "" | GENERIC_MIME => {}
            other => return Err(ExtractionError::UnsupportedFormat(other.to_string())),
        }

        let extension = file_name
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err(ExtractionError::UnsupportedFormat(
                file_name.unwrap_or("unnamed upload").to_string(),
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format '{0}'. Please upload a PDF or DOCX.")]
    UnsupportedFormat(String),

    #[error("Could not read {format} document: {reason}")]
    Corrupt {
        format: DocumentFormat,
        reason: String,
    },
}

/// Produces raw text from a document. Implementations are CPU-bound and are
/// run inside `spawn_blocking` by the pipeline.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, content: &[u8], format: DocumentFormat) -> Result<String, ExtractionError>;
}

/// Default extractor: `pdf-extract` for PDF, the zipped `word/document.xml`
/// for DOCX.
pub struct DocumentTextExtractor;

impl TextExtractor for DocumentTextExtractor {
    fn extract(&self, content: &[u8], format: DocumentFormat) -> Result<String, ExtractionError> {
        let corrupt = |reason: String| ExtractionError::Corrupt { format, reason };
        match format {
            DocumentFormat::Pdf => {
                pdf_extract::extract_text_from_mem(content).map_err(|e| corrupt(e.to_string()))
            }
            DocumentFormat::Docx => extract_docx_text(content).map_err(|e| corrupt(e.to_string())),
        }
    }
}

fn extract_docx_text(data: &[u8]) -> anyhow::Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut document = archive.by_name("word/document.xml")?;
    let mut xml = String::new();
    document.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut paragraphs = Vec::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => current.clear(),
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        paragraphs.push(paragraph.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run => {
                current.push_str(&e.xml_content()?);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

/// Builds a minimal DOCX container holding one paragraph per entry.
#[cfg(test)]
pub(crate) fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;

    let body: String = paragraphs
        .iter()
        .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
