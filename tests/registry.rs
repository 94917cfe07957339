use std::fs;

use assert_matches::assert_matches;

use enterobase_fetch::error::EnteroError;
use enterobase_fetch::registry::BarcodeRegistry;

#[test]
fn load_keeps_every_line_in_order() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("barcodes.tsv");
    fs::write(
        &path,
        "strainA\tESC_AA0001AA_AS\nstrainB\tESC_AA0002AA_AS\nstrainC\tESC_AA0003AA_AS\n",
    )
    .unwrap();

    let registry = BarcodeRegistry::load(&path).unwrap();
    assert_eq!(registry.len(), 3);
    let pairs: Vec<_> = registry
        .iter()
        .map(|entry| (entry.name.as_str(), entry.barcode.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("strainA", "ESC_AA0001AA_AS"),
            ("strainB", "ESC_AA0002AA_AS"),
            ("strainC", "ESC_AA0003AA_AS"),
        ]
    );
}

#[test]
fn duplicate_name_keeps_last_barcode() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("barcodes.tsv");
    fs::write(&path, "strainA\tBC1\nstrainB\tBC2\nstrainA\tBC3").unwrap();

    let registry = BarcodeRegistry::load(&path).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get("strainA"), Some("BC3"));
    assert_eq!(registry.get("strainB"), Some("BC2"));
}

#[test]
fn malformed_line_aborts_loading() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("barcodes.tsv");
    fs::write(&path, "strainA\tBC1\nstrainB\n").unwrap();

    let err = BarcodeRegistry::load(&path).unwrap_err();
    assert_matches!(err, EnteroError::MalformedBarcodeLine { line: 2, .. });
}

#[test]
fn unreadable_file_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    let err = BarcodeRegistry::load(&temp.path().join("missing.tsv")).unwrap_err();
    assert_matches!(err, EnteroError::InputRead(_));
}
