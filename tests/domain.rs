use assert_matches::assert_matches;

use enterobase_fetch::domain::{BarcodeEntry, Database};
use enterobase_fetch::error::EnteroError;

#[test]
fn every_database_round_trips_through_its_name() {
    for db in Database::ALL {
        let parsed: Database = db.as_str().parse().unwrap();
        assert_eq!(parsed, db);
    }
    assert_eq!(
        Database::names(),
        "senterica, ecoli, clostridium, vibrio, yersinia, helicobacter, mcatarrhalis"
    );
}

#[test]
fn invalid_database_message_lists_choices() {
    let err = "listeria".parse::<Database>().unwrap_err();
    assert_matches!(err, EnteroError::InvalidDatabase(ref name) if name == "listeria");
    assert!(err.to_string().contains("mcatarrhalis"));
}

#[test]
fn output_file_names() {
    let entry = BarcodeEntry::new("Sal_1", "SAL_BA1234AA_AS");
    assert_eq!(entry.file_name(false), "Sal_1.fna");
    assert_eq!(entry.file_name(true), "Sal_1__SAL_BA1234AA_AS.fna");
}
