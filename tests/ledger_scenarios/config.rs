//! `ledgerview.toml` loading

use crate::common::*;
use ledgerview::{Direction, Error, LedgerView, LedgerViewConfig, CONFIG_FILE_NAME};
use tempfile::TempDir;

#[test]
fn test_open_in_uses_existing_file() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
max_definitions_per_request = 500

[metadata]
page_size = 1
definition_lookahead_limit = 5
direction = "ascending"
"#,
    )
    .unwrap();

    let ledger = LedgerView::open_in(dir.path()).unwrap();
    assert_eq!(ledger.config().metadata.page_size, 1);
    assert_eq!(ledger.config().metadata.direction, Direction::Ascending);
    // Omitted sections keep their defaults
    assert_eq!(ledger.config().vaults, LedgerViewConfig::default().vaults);

    let writer = ledger.writer().unwrap();
    for n in 1..=2u64 {
        writer
            .upsert_metadata(entity(1), format!("k{}", n), vec![0], false, v(n))
            .unwrap();
    }
    writer.commit(v(2)).unwrap();
    let page = ledger.query().metadata_page(entity(1), v(2), None, &never()).unwrap();
    assert_eq!(page.items[0].key, "k1");
    assert!(page.next_cursor.is_some());
}

#[test]
fn test_open_in_rejects_bad_lookahead() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[resources]\npage_size = 10\ndefinition_lookahead_limit = 10\n",
    )
    .unwrap();

    match LedgerView::open_in(dir.path()) {
        Err(Error::InvalidConfig(msg)) => assert!(msg.starts_with("[resources]"), "{}", msg),
        other => panic!("expected InvalidConfig, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_default_file_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    LedgerViewConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(LedgerViewConfig::from_file(&path).unwrap(), LedgerViewConfig::default());

    let mut custom = LedgerViewConfig::default();
    custom.key_value_store.page_size = 7;
    custom.write_to_file(&path).unwrap();
    // An existing file is left alone
    LedgerViewConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(LedgerViewConfig::from_file(&path).unwrap().key_value_store.page_size, 7);
}
