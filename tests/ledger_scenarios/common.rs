//! Shared helpers for the ledger scenarios.

#![allow(dead_code)]

use ledgerview::{
    CancelToken, Direction, EntityId, LedgerView, LedgerViewConfig, LedgerWriter, Page,
    PaginationConfig, Result, StateVersion,
};
use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Route log output through the test harness once per binary.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

pub fn v(n: u64) -> StateVersion {
    StateVersion::new(n)
}

pub fn entity(n: u64) -> EntityId {
    EntityId::new(n)
}

pub fn never() -> CancelToken {
    CancelToken::never()
}

/// Config with the same knobs on every read family.
pub fn uniform_config(page_size: usize, lookahead: usize, direction: Direction) -> LedgerViewConfig {
    let section = PaginationConfig::new(page_size, lookahead, direction);
    LedgerViewConfig {
        max_definitions_per_request: lookahead * 10,
        metadata: section,
        key_value_store: section,
        resources: section,
        vaults: section,
        non_fungible_ids: section,
    }
}

/// Open a ledger and take its writer.
pub fn open(config: LedgerViewConfig) -> (LedgerView, LedgerWriter) {
    init_tracing();
    let ledger = LedgerView::open(config).unwrap();
    let writer = ledger.writer().unwrap();
    (ledger, writer)
}

/// Follow next cursors from the first page until the series is exhausted.
pub fn drain<T>(mut read: impl FnMut(Option<&str>) -> Result<Page<T>>) -> Vec<Page<T>> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = read(cursor.as_deref()).unwrap();
        cursor = page.next_cursor.clone();
        pages.push(page);
        if cursor.is_none() {
            return pages;
        }
        assert!(pages.len() < 1_000, "pagination did not terminate");
    }
}
