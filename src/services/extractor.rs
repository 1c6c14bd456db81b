//! Text and hyperlink extraction for uploaded resumes.
//!
//! Supports the three accepted upload formats. PDF link annotations and DOCX
//! hyperlink relationships are returned separately from the text so the
//! resolver can give them priority.

use lopdf::{Document, Object, ObjectId};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to extract text from {format}: {reason}")]
    Corrupt {
        format: DocumentFormat,
        reason: String,
    },
}

impl ExtractionError {
    fn corrupt(format: DocumentFormat, reason: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Format for a file extension, case-insensitive
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Format for an uploaded file name, judged by its last extension
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        Self::from_extension(extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.extension().to_ascii_uppercase())
    }
}

/// Text and hyperlink targets pulled from a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub text: String,
    pub links: Vec<String>,
}

/// Extract text and links from raw document bytes
///
/// `max_text_bytes` bounds what a compressed format may expand to: a DOCX
/// part or the accumulated PDF text past that size is rejected as corrupt.
pub fn extract_document(
    format: DocumentFormat,
    bytes: &[u8],
    max_text_bytes: usize,
) -> Result<ExtractedDocument, ExtractionError> {
    let document = match format {
        DocumentFormat::Txt => ExtractedDocument {
            text: String::from_utf8_lossy(bytes).into_owned(),
            links: Vec::new(),
        },
        DocumentFormat::Docx => extract_docx(bytes, max_text_bytes)?,
        DocumentFormat::Pdf => extract_pdf(bytes, max_text_bytes)?,
    };

    tracing::debug!(
        "Extracted {} chars and {} links from {} document",
        document.text.len(),
        document.links.len(),
        format
    );

    Ok(document)
}

fn extract_docx(bytes: &[u8], limit: usize) -> Result<ExtractedDocument, ExtractionError> {
    let format = DocumentFormat::Docx;
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::corrupt(format, e))?;

    let body = read_entry(&mut archive, "word/document.xml", limit)?
        .ok_or_else(|| ExtractionError::corrupt(format, "missing word/document.xml"))?;
    let text = docx_text(&body).map_err(|e| ExtractionError::corrupt(format, e))?;

    // Hyperlinks are optional: a broken relationships part only costs the links.
    let links = match read_entry(&mut archive, "word/_rels/document.xml.rels", limit) {
        Ok(Some(rels)) => docx_hyperlinks(&rels).unwrap_or_else(|e| {
            tracing::debug!("Ignoring unreadable DOCX relationships: {}", e);
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::debug!("Ignoring unreadable DOCX relationships: {}", e);
            Vec::new()
        }
    };

    Ok(ExtractedDocument { text, links })
}

/// Read one archive member as UTF-8, never inflating more than `limit` bytes
fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    limit: usize,
) -> Result<Option<String>, ExtractionError> {
    let format = DocumentFormat::Docx;
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(ExtractionError::corrupt(format, e)),
    };

    let too_large = || ExtractionError::corrupt(format, format!("{} expands beyond {} bytes", name, limit));
    // The declared size can lie, so the read itself is bounded too
    if entry.size() > limit as u64 {
        return Err(too_large());
    }

    let mut contents = Vec::new();
    entry
        .by_ref()
        .take(limit as u64 + 1)
        .read_to_end(&mut contents)
        .map_err(|e| ExtractionError::corrupt(format, e))?;
    if contents.len() > limit {
        return Err(too_large());
    }

    String::from_utf8(contents)
        .map(Some)
        .map_err(|e| ExtractionError::corrupt(format, e))
}

/// Paragraph text of `word/document.xml`, one line per paragraph
fn docx_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// External hyperlink targets declared in `word/_rels/document.xml.rels`
fn docx_hyperlinks(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut links = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                if let Some(target) = hyperlink_target(&e)? {
                    links.push(target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(links)
}

fn hyperlink_target(element: &BytesStart<'_>) -> Result<Option<String>, quick_xml::Error> {
    let mut is_hyperlink = false;
    let mut target = None;

    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        match attribute.key.as_ref() {
            b"Type" => is_hyperlink = attribute.unescape_value()?.contains("hyperlink"),
            b"Target" => target = Some(attribute.unescape_value()?.into_owned()),
            _ => {}
        }
    }

    Ok(target.filter(|t| is_hyperlink && !t.is_empty()))
}

fn extract_pdf(bytes: &[u8], limit: usize) -> Result<ExtractedDocument, ExtractionError> {
    let format = DocumentFormat::Pdf;
    let document = Document::load_mem(bytes).map_err(|e| ExtractionError::corrupt(format, e))?;

    let mut text = String::new();
    let mut links = Vec::new();

    for (page_number, page_id) in document.get_pages() {
        match document.extract_text(&[page_number]) {
            Ok(page_text) => {
                if text.len() + page_text.len() > limit {
                    return Err(ExtractionError::corrupt(
                        format,
                        format!("text expands beyond {} bytes", limit),
                    ));
                }
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => tracing::debug!("No text on PDF page {}: {}", page_number, e),
        }
        links.extend(pdf_page_links(&document, page_id));
    }

    Ok(ExtractedDocument { text, links })
}

/// URI targets of the link annotations on one page
fn pdf_page_links(document: &Document, page_id: ObjectId) -> Vec<String> {
    let annotations = document
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Annots").ok())
        .and_then(|annots| dereference(document, annots))
        .and_then(|annots| annots.as_array().ok());

    let Some(annotations) = annotations else {
        return Vec::new();
    };

    annotations
        .iter()
        .filter_map(|annotation| {
            let annotation = dereference(document, annotation)?.as_dict().ok()?;
            let action = dereference(document, annotation.get(b"A").ok()?)?.as_dict().ok()?;
            match dereference(document, action.get(b"URI").ok()?)? {
                Object::String(uri, _) => Some(String::from_utf8_lossy(uri).into_owned()),
                _ => None,
            }
        })
        .collect()
}

fn dereference<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}
