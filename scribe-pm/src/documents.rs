//! Document text extraction and validation for article reviews
//!
//! Uploads arrive as base64 with their MIME type. PDF text comes from
//! pdf-extract, DOCX text from `word/document.xml` inside the zip container,
//! plain text is decoded as UTF-8 (lossy).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Serialize;
use std::io::{Cursor, Read};
use thiserror::Error;

/// Largest accepted upload (decoded)
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Below this many characters the document is flagged as short
pub const SHORT_DOCUMENT_CHARS: usize = 1000;

/// Above this many characters the document is flagged as long
pub const LONG_DOCUMENT_CHARS: usize = 50_000;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Formato de arquivo não suportado: {0}")]
    Unsupported(String),

    #[error("Arquivo muito grande ({size} bytes). O tamanho máximo é 10MB.")]
    TooLarge { size: usize },

    /// Upload body was not valid base64
    #[error("Conteúdo do arquivo inválido: {0}")]
    Encoding(String),

    #[error("Erro ao extrair texto do documento: {0}")]
    Extraction(String),
}

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// Word documents (also accepted under the legacy `application/msword` type)
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Map a MIME type (parameters ignored) to a supported format
    pub fn from_content_type(content_type: &str) -> Result<Self, DocumentError> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "application/pdf" => Ok(DocumentKind::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/msword" => Ok(DocumentKind::Docx),
            "text/plain" => Ok(DocumentKind::PlainText),
            _ => Err(DocumentError::Unsupported(content_type.to_string())),
        }
    }
}

/// Decode a base64 upload, enforcing the size limit
pub fn decode_upload(data_base64: &str) -> Result<Vec<u8>, DocumentError> {
    // Data URLs carry a "data:<mime>;base64," prefix
    let payload = match data_base64.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => data_base64,
    };

    // Reject before decoding when the encoded size already exceeds the limit
    let approx_size = payload.len() / 4 * 3;
    if approx_size > MAX_DOCUMENT_BYTES + 3 {
        return Err(DocumentError::TooLarge { size: approx_size });
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DocumentError::Encoding(e.to_string()))?;

    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(DocumentError::TooLarge { size: bytes.len() });
    }
    Ok(bytes)
}

/// Extract plain text; CPU-bound, call from a blocking task
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, DocumentError> {
    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DocumentError::Extraction(e.to_string())),
        DocumentKind::Docx => extract_docx_text(bytes),
        DocumentKind::PlainText => {
            let text = String::from_utf8_lossy(bytes);
            Ok(text.trim_start_matches('\u{feff}').to_string())
        }
    }
}

fn extract_docx_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Extraction(format!("Failed to open DOCX: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::Extraction(format!("Missing document body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Extraction(e.to_string()))?;

    docx_body_text(&xml)
}

/// Text runs of a WordprocessingML body, one line per paragraph
fn docx_body_text(xml: &str) -> Result<String, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| DocumentError::Extraction(e.to_string()))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::Extraction(format!(
                    "Invalid document XML at {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(out.trim().to_string())
}

/// Result of [`validate_document`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Heuristic checks on extracted article text
///
/// Only an empty document is an error; missing sections and unusual length
/// are warnings.
pub fn validate_document(text: &str) -> DocumentValidation {
    let lower = text.to_lowercase();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let expected = [
        ("Introdução", &["introdução", "introduction"][..]),
        ("Metodologia", &["metodologia", "método", "methodology"][..]),
        ("Resultados", &["resultados", "results"][..]),
    ];
    for (label, keywords) in expected {
        if !keywords.iter().any(|k| lower.contains(k)) {
            warnings.push(format!("Seção \"{}\" não encontrada (recomendada)", label));
        }
    }

    let chars = text.chars().count();
    if chars < SHORT_DOCUMENT_CHARS {
        warnings.push("Documento muito curto (menos de 1000 caracteres)".to_string());
    }
    if chars > LONG_DOCUMENT_CHARS {
        warnings.push(
            "Documento muito longo (mais de 50.000 caracteres). Análise pode demorar.".to_string(),
        );
    }

    if text.trim().is_empty() {
        errors.push("Documento vazio ou não foi possível extrair texto".to_string());
    }

    DocumentValidation {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}
