//! Office Open XML workbook property reader.
//!
//! Workbook properties live in `docProps/core.xml` as Dublin Core
//! elements. The archive must contain `xl/workbook.xml` to count as a
//! spreadsheet; a workbook without core properties yields empty values.

use super::{MetadataError, MetadataReader};
use crate::core::Metadata;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const CORE_PROPERTIES_PART: &str = "docProps/core.xml";
/// Upper bound on the core properties part read into memory.
const MAX_CORE_PROPERTIES_BYTES: u64 = 1024 * 1024;

static CREATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:\w+:)?creator\b[^>]*>(.*?)</(?:\w+:)?creator\s*>")
        .expect("valid creator regex")
});
static LAST_MODIFIED_BY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:\w+:)?lastModifiedBy\b[^>]*>(.*?)</(?:\w+:)?lastModifiedBy\s*>")
        .expect("valid lastModifiedBy regex")
});

/// Reads `creator` and `last_modified_by` from an `.xlsx` workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReader;

impl MetadataReader for XlsxReader {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".xlsx"]
    }

    fn read(&self, path: &Path) -> Result<Metadata, MetadataError> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        if !archive.file_names().any(|name| name == WORKBOOK_PART) {
            return Err(MetadataError::NotSpreadsheet(WORKBOOK_PART));
        }

        let core = match archive.by_name(CORE_PROPERTIES_PART) {
            Ok(part) => {
                let mut xml = String::new();
                part.take(MAX_CORE_PROPERTIES_BYTES)
                    .read_to_string(&mut xml)?;
                xml
            }
            Err(ZipError::FileNotFound) => String::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Metadata::from([
            ("creator".to_string(), element_text(&CREATOR_RE, &core)),
            (
                "last_modified_by".to_string(),
                element_text(&LAST_MODIFIED_BY_RE, &core),
            ),
        ]))
    }
}

fn element_text(re: &Regex, xml: &str) -> String {
    re.captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| unescape_xml(m.as_str().trim()))
        .unwrap_or_default()
}

/// Resolve the predefined XML entities and numeric character references.
pub fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let resolved = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match resolved {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
