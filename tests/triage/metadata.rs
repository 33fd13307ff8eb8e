//! Metadata extraction through the full pipeline.

use crate::common::test_utils::*;
use cloudshield::metadata::ERROR_KEY;
use cloudshield::{analyze, IndicatorSet, RiskLevel};

#[cfg(feature = "metadata-pdf")]
#[test]
fn pdf_info_dictionary_is_extracted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.bin");
    write_pdf(&path, Some(&[("Author", "Alice"), ("Title", "Quarterly Report")][..]));

    let r = analyze(&IndicatorSet::empty(), &path, "report.PDF").unwrap();
    let m = r.metadata();
    assert_eq!(m["author"], "Alice");
    assert_eq!(m["title"], "Quarterly Report");
    assert_eq!(m["creator"], "");
    assert_eq!(m["producer"], "");
    assert_eq!(m.len(), 4);
}

#[cfg(feature = "metadata-pdf")]
#[test]
fn pdf_without_info_has_empty_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.pdf");
    write_pdf(&path, None);

    let r = analyze(&IndicatorSet::empty(), &path, "plain.pdf").unwrap();
    assert!(r.metadata().is_empty());
}

#[cfg(feature = "metadata-pdf")]
#[test]
fn pdf_with_empty_info_has_empty_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank-info.pdf");
    write_pdf(&path, Some(&[][..]));

    let r = analyze(&IndicatorSet::empty(), &path, "blank-info.pdf").unwrap();
    assert!(r.metadata().is_empty());
}

#[cfg(feature = "metadata-pdf")]
#[test]
fn pdf_metadata_survives_critical_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.pdf");
    write_pdf(&path, Some(&[("Author", "Mallory")][..]));
    let hash = cloudshield::hashing::sha256_file(&path, 4096).unwrap();

    let set = IndicatorSet::from_lists([hash], Vec::<&str>::new(), Vec::<&str>::new()).unwrap();
    let r = analyze(&set, &path, "bad.pdf").unwrap();
    assert_eq!(r.risk(), RiskLevel::Critical);
    assert_eq!(r.metadata()["author"], "Mallory");
}

#[test]
fn corrupt_pdf_yields_single_error_entry() {
    let tmp = create_temp_file(b"%PDF-1.4\n%%garbage with no xref\n");
    let r = analyze(&IndicatorSet::empty(), tmp.path(), "broken.pdf").unwrap();
    let m = r.metadata();
    if cfg!(feature = "metadata-pdf") {
        assert_eq!(m.len(), 1);
        assert!(m[ERROR_KEY].starts_with("Extraction failed: "));
    } else {
        assert!(m.is_empty());
    }
    assert_eq!(r.risk(), RiskLevel::Low);
}

#[cfg(feature = "metadata-xlsx")]
#[test]
fn xlsx_core_properties_are_extracted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book");
    let core = core_properties("Alice &amp; Co", "Bob");
    write_zip(
        &path,
        &[
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", "<workbook/>"),
            ("docProps/core.xml", &core),
        ],
    );

    let r = analyze(&IndicatorSet::empty(), &path, "budget.xlsx").unwrap();
    let m = r.metadata();
    assert_eq!(m.len(), 2);
    assert_eq!(m["creator"], "Alice & Co");
    assert_eq!(m["last_modified_by"], "Bob");
}

#[cfg(feature = "metadata-xlsx")]
#[test]
fn zip_that_is_not_a_workbook_yields_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.xlsx");
    write_zip(&path, &[("word/document.xml", "<document/>")]);

    let r = analyze(&IndicatorSet::empty(), &path, "notes.xlsx").unwrap();
    assert_eq!(r.metadata().len(), 1);
    assert!(r.metadata()[ERROR_KEY].contains("xl/workbook.xml"));
}

#[test]
fn corrupt_xlsx_yields_single_error_entry() {
    let tmp = create_temp_file(b"PK\x03\x04 truncated archive");
    let r = analyze(&IndicatorSet::empty(), tmp.path(), "sheet.xlsx").unwrap();
    if cfg!(feature = "metadata-xlsx") {
        assert_eq!(r.metadata().len(), 1);
        assert!(r.metadata().contains_key(ERROR_KEY));
    } else {
        assert!(r.metadata().is_empty());
    }
}

#[test]
fn other_extensions_are_not_extracted() {
    let tmp = create_temp_file(b"%PDF-1.4 but named as text");
    for name in ["doc.txt", "doc.docx", "doc", ".pdf", "pdf"] {
        let r = analyze(&IndicatorSet::empty(), tmp.path(), name).unwrap();
        assert!(r.metadata().is_empty(), "{name} should not be extracted");
    }
}
