//! Shared helpers for creating scan targets and indicator sets.

#![allow(dead_code)]

use cloudshield::IndicatorSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Creates a temporary file with the given content.
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Writes `content` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Builds an indicator set from in-memory lists.
pub fn indicators(hashes: &[&str], strings: &[&str], extensions: &[&str]) -> IndicatorSet {
    IndicatorSet::from_lists(hashes, strings, extensions).unwrap()
}

/// Writes a one-page PDF whose `/Info` dictionary holds `info`, or no
/// `/Info` at all when `info` is `None`.
#[cfg(feature = "metadata-pdf")]
pub fn write_pdf(path: &Path, info: Option<&[(&str, &str)]>) {
    use lopdf::{dictionary, Dictionary, Document, Object};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(fields) = info {
        let mut dict = Dictionary::new();
        for (key, value) in fields {
            dict.set(*key, Object::string_literal(*value));
        }
        let info_id = doc.add_object(dict);
        doc.trailer.set("Info", info_id);
    }
    doc.save(path).unwrap();
}

/// Writes a zip archive with the given parts.
#[cfg(feature = "metadata-xlsx")]
pub fn write_zip(path: &Path, parts: &[(&str, &str)]) {
    use zip::write::SimpleFileOptions;

    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, body) in parts {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// `docProps/core.xml` with the given creator and last modifier.
pub fn core_properties(creator: &str, last_modified_by: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/">
<dc:creator>{creator}</dc:creator>
<cp:lastModifiedBy>{last_modified_by}</cp:lastModifiedBy>
<dcterms:created>2024-01-01T00:00:00Z</dcterms:created>
</cp:coreProperties>"#
    )
}
