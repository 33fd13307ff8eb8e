//! PDF document information dictionary reader.

use super::{MetadataError, MetadataReader};
use crate::core::Metadata;
use encoding_rs::{UTF_16BE, WINDOWS_1252};
use lopdf::{Dictionary, Document, Object};
use std::path::Path;

/// (output key, information dictionary key)
const INFO_FIELDS: [(&str, &[u8]); 4] = [
    ("author", b"Author"),
    ("creator", b"Creator"),
    ("producer", b"Producer"),
    ("title", b"Title"),
];

/// Reads author, creator, producer and title from the trailer's `/Info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReader;

impl MetadataReader for PdfReader {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".pdf"]
    }

    fn read(&self, path: &Path) -> Result<Metadata, MetadataError> {
        let doc = Document::load(path)?;
        let Some(info) = info_dictionary(&doc).filter(|info| !info.is_empty()) else {
            return Ok(Metadata::new());
        };
        Ok(INFO_FIELDS
            .iter()
            .map(|(key, pdf_key)| {
                let value = info
                    .get(pdf_key)
                    .map(|obj| object_text(&doc, obj))
                    .unwrap_or_default();
                (key.to_string(), value)
            })
            .collect())
    }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn object_text(doc: &Document, obj: &Object) -> String {
    match obj {
        Object::String(bytes, _) => decode_text_string(bytes),
        Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
        Object::Integer(i) => i.to_string(),
        Object::Real(r) => r.to_string(),
        Object::Reference(id) => match doc.get_object(*id) {
            // One level of indirection; nested references are not followed
            Ok(Object::String(bytes, _)) => decode_text_string(bytes),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, UTF-8 with BOM, otherwise
/// PDFDocEncoding (approximated by Windows-1252).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        UTF_16BE.decode_without_bom_handling(rest).0.into_owned()
    } else if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(rest).into_owned()
    } else {
        WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned()
    }
}
