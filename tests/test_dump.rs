//! Integration tests for canonical dump formatting.

use pdf_structdiff::{Document, PrintOptions};

const SIMPLE_PDF_PATH: &str = "tests/fixtures/simple.pdf";

#[test]
fn test_dump_is_idempotent() {
    let first = Document::open(SIMPLE_PDF_PATH, PrintOptions::default()).expect("open");
    let second = Document::open(SIMPLE_PDF_PATH, PrintOptions::default()).expect("open");
    assert_eq!(first.canonical(), second.canonical());
}

#[test]
fn test_dump_shows_identifiers_by_default() {
    let doc = Document::open(SIMPLE_PDF_PATH, PrintOptions::default()).expect("open");
    let dump = doc.canonical();
    assert!(dump.contains("Object( num:1, gen:0, refs:0 )"));
    assert!(dump.contains("Ref( num:2, gen:0 )"));
    assert!(dump.contains("Stream( size:"));
}

#[test]
fn test_dump_hides_identifiers_in_comparison_mode() {
    let doc = Document::open(SIMPLE_PDF_PATH, PrintOptions::comparison()).expect("open");
    let dump = doc.canonical();
    assert!(dump.contains("Object() {"));
    assert!(dump.contains("Ref()"));
    assert!(dump.contains("Stream()"));
    assert!(!dump.contains("num:"));
}

#[test]
fn test_dump_contains_sorted_dictionary_entries() {
    let doc = Document::open(SIMPLE_PDF_PATH, PrintOptions::default()).expect("open");
    let dump = doc.canonical();
    // Catalog entries sort alphabetically: Pages before Type
    let pages = dump.find("Pages -> Ref").expect("Pages entry");
    let catalog_type = dump.find("Type -> Catalog").expect("Type entry");
    assert!(pages < catalog_type);
}

#[test]
fn test_dump_length_value_is_hidden_in_comparison_mode() {
    let doc = Document::open(SIMPLE_PDF_PATH, PrintOptions::comparison()).expect("open");
    let dump = doc.canonical();
    assert!(dump.contains("Length -> String()"));
}
