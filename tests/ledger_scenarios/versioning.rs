//! Version pinning, sealed versions and concurrent readers

use crate::common::*;
use ledgerview::{Cursor, Direction, Error, LedgerView, LedgerViewConfig, ResourcesRequest};
use std::sync::Arc;
use std::thread;

#[test]
fn test_read_above_tip_is_rejected() {
    let (ledger, writer) = open(Default::default());
    writer.upsert_metadata(entity(1), "k", vec![1], false, v(3)).unwrap();

    // Written but not committed
    let q = ledger.query();
    assert!(matches!(
        q.metadata_entry(entity(1), "k", v(3)),
        Err(Error::VersionAhead { .. })
    ));
    writer.commit(v(3)).unwrap();
    assert!(q.metadata_entry(entity(1), "k", v(3)).unwrap().is_some());
    assert!(q.metadata_page(entity(1), v(4), None, &never()).unwrap_err().is_client_error());
}

#[test]
fn test_malformed_cursors_are_rejected() {
    let (ledger, writer) = open(Default::default());
    writer.commit(v(1)).unwrap();
    let q = ledger.query();

    let offset_cursor = ledgerview::OffsetCursor::new(3).encode().unwrap();
    for bad in ["", "%%%", "bm90IGpzb24=", offset_cursor.as_str()] {
        assert!(
            matches!(
                q.metadata_page(entity(1), v(1), Some(bad), &never()),
                Err(Error::InvalidCursor { .. })
            ),
            "accepted cursor {:?}",
            bad
        );
    }

    let good = Cursor::new(v(1), 1).encode().unwrap();
    assert!(q.metadata_page(entity(1), v(1), Some(&good), &never()).is_ok());
}

#[test]
fn test_cursor_beyond_pinned_version_is_rejected() {
    for direction in [Direction::Ascending, Direction::Descending] {
        let (ledger, writer) = open(uniform_config(2, 4, direction));
        writer.upsert_metadata(entity(1), "k", vec![1], false, v(1)).unwrap();
        writer.upsert_kv_entry(entity(1), b"k".to_vec(), vec![1], false, v(1)).unwrap();
        writer.commit(v(1)).unwrap();
        let q = ledger.query();

        let ahead = Cursor::new(v(99), 7).encode().unwrap();
        assert!(
            matches!(
                q.metadata_page(entity(1), v(1), Some(&ahead), &never()),
                Err(Error::InvalidCursor { .. })
            ),
            "{} metadata page accepted a cursor above the pin",
            direction
        );
        assert!(matches!(
            q.kv_keys_page(entity(1), v(1), Some(&ahead), &never()),
            Err(Error::InvalidCursor { .. })
        ));
        assert!(matches!(
            q.resource_vaults_page(entity(1), entity(2), v(1), Some(&ahead), &never()),
            Err(Error::InvalidCursor { .. })
        ));
        assert!(matches!(
            q.metadata_pages(&[entity(1)], v(1), Some(&ahead), &never()),
            Err(Error::InvalidCursor { .. })
        ));
    }
}

#[test]
fn test_cursor_from_later_pin_is_not_replayed_earlier() {
    let (ledger, writer) = open(uniform_config(1, 4, Direction::Ascending));
    writer.upsert_metadata(entity(1), "k1", vec![1], false, v(1)).unwrap();
    writer.commit(v(1)).unwrap();
    writer.upsert_metadata(entity(1), "k2", vec![2], false, v(2)).unwrap();
    writer.commit(v(2)).unwrap();
    let q = ledger.query();

    let cursor = q
        .metadata_page(entity(1), v(2), None, &never())
        .unwrap()
        .next_cursor
        .unwrap();
    assert!(matches!(
        q.metadata_page(entity(1), v(1), Some(&cursor), &never()),
        Err(Error::InvalidCursor { .. })
    ));
    let rest = q.metadata_page(entity(1), v(2), Some(&cursor), &never()).unwrap();
    assert_eq!(rest.items[0].key, "k2");
}

#[test]
fn test_zero_limit_still_checks_cursors() {
    let (ledger, writer) = open(Default::default());
    writer.commit(v(1)).unwrap();
    let q = ledger.query();

    let garbage = ResourcesRequest::new()
        .with_limits(0, 1)
        .fungible_after("%%%not-base64");
    assert!(matches!(
        q.entity_resources(entity(1), v(1), &garbage, &never()),
        Err(Error::InvalidCursor { .. })
    ));

    let ahead = ResourcesRequest::new()
        .with_limits(1, 0)
        .non_fungible_after(Cursor::new(v(5), 1).encode().unwrap());
    assert!(matches!(
        q.entity_resources(entity(1), v(1), &ahead, &never()),
        Err(Error::InvalidCursor { .. })
    ));

    let fine = ResourcesRequest::new().with_limits(0, 0);
    let res = q.entity_resources(entity(1), v(1), &fine, &never()).unwrap();
    assert!(res.fungible.items.is_empty());
    assert_eq!(res.non_fungible.total_count, 0);
}

#[test]
fn test_committed_version_is_sealed() {
    let (ledger, writer) = open(Default::default());
    writer.upsert_metadata(entity(1), "k", vec![1], false, v(5)).unwrap();
    writer.commit(v(5)).unwrap();

    let err = writer
        .upsert_metadata(entity(1), "k", vec![2], false, v(5))
        .unwrap_err();
    assert!(matches!(err, Error::NonMonotonicWrite { .. }));
    assert!(writer.is_halted());
    assert!(writer.commit(v(6)).is_err());

    let value = ledger.query().metadata_value(entity(1), "k", v(5)).unwrap();
    assert_eq!(value.value, vec![1]);
    assert_eq!(ledger.current_version(), v(5));
}

#[test]
fn test_reads_are_idempotent() {
    let (ledger, writer) = open(uniform_config(3, 6, Direction::Descending));
    for n in 1..=10u64 {
        writer
            .upsert_metadata(entity(1), format!("k{}", n), vec![n as u8], false, v(n))
            .unwrap();
        if n % 3 == 0 {
            writer.delete_metadata(entity(1), format!("k{}", n - 1), v(n)).unwrap();
        }
        writer.commit(v(n)).unwrap();
    }
    let q = ledger.query();
    let a = q.metadata_page(entity(1), v(10), None, &never()).unwrap();
    let b = q.metadata_page(entity(1), v(10), None, &never()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_readers_run_alongside_the_writer() {
    init_tracing();
    let ledger = Arc::new(LedgerView::open(LedgerViewConfig::default()).unwrap());
    let writer = ledger.writer().unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let mut last = v(0);
                for _ in 0..200 {
                    let tip = ledger.current_version();
                    assert!(tip >= last, "tip moved backwards");
                    last = tip;
                    let page = ledger
                        .query()
                        .metadata_page(entity(1), tip, None, &never())
                        .unwrap();
                    // One key per committed version, none deleted
                    assert_eq!(page.total_count, tip.as_u64());
                    assert_eq!(page.items.len() as u64, tip.as_u64().min(100));
                }
            })
        })
        .collect();

    for n in 1..=300u64 {
        writer
            .upsert_metadata(entity(1), format!("k{}", n), vec![0], false, v(n))
            .unwrap();
        writer.commit(v(n)).unwrap();
    }
    for r in readers {
        r.join().unwrap();
    }
}

#[test]
fn test_cancelled_read_has_no_result() {
    let (ledger, writer) = open(Default::default());
    writer.upsert_metadata(entity(1), "k", vec![1], false, v(1)).unwrap();
    writer.commit(v(1)).unwrap();

    let token = ledgerview::CancelToken::new();
    token.cancel();
    assert!(matches!(
        ledger.query().metadata_page(entity(1), v(1), None, &token),
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        ledger.query().metadata_pages(&[entity(1), entity(2)], v(1), None, &token),
        Err(Error::Cancelled)
    ));
}
