//! Entity metadata scenarios

use crate::common::*;
use ledgerview::{Direction, Error, LedgerView, LedgerWriter};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Writes `k1..=kn` under `e`, one key per version starting at `from`.
fn write_keys(writer: &LedgerWriter, e: u64, n: u64, from: u64) -> u64 {
    let mut at = from;
    for i in 1..=n {
        writer
            .upsert_metadata(entity(e), format!("k{}", i), vec![i as u8], false, v(at))
            .unwrap();
        writer.commit(v(at)).unwrap();
        at += 1;
    }
    at - 1
}

fn keys_of(ledger: &LedgerView, e: u64, at: u64) -> Vec<Vec<String>> {
    drain(|cursor| ledger.query().metadata_page(entity(e), v(at), cursor, &never()))
        .into_iter()
        .map(|page| page.items.into_iter().map(|i| i.key).collect())
        .collect()
}

#[test]
fn test_entry_timeline() {
    let (ledger, writer) = open(Default::default());
    let e = entity(1);
    writer.upsert_metadata(e, "k1", b"a".to_vec(), false, v(10)).unwrap();
    writer.commit(v(10)).unwrap();
    writer.upsert_metadata(e, "k1", b"b".to_vec(), false, v(20)).unwrap();
    writer.commit(v(20)).unwrap();
    writer.delete_metadata(e, "k1", v(30)).unwrap();
    writer.commit(v(35)).unwrap();

    let q = ledger.query();
    let state = |n| {
        q.metadata_entry(e, "k1", v(n))
            .unwrap()
            .map(|entry| (entry.value, entry.is_deleted))
    };
    assert_eq!(state(5), None);
    assert_eq!(state(15), Some((Some(b"a".to_vec()), false)));
    assert_eq!(state(25), Some((Some(b"b".to_vec()), false)));
    assert_eq!(state(35), Some((None, true)));

    assert_eq!(q.metadata_value(e, "k1", v(25)).unwrap().value, b"b".to_vec());
    assert!(matches!(q.metadata_value(e, "k1", v(35)), Err(Error::NotFound(_))));
    assert!(matches!(q.metadata_value(e, "k1", v(5)), Err(Error::NotFound(_))));

    let history = q.metadata_history(e, "k1", v(35), None).unwrap();
    let versions: Vec<u64> = history.iter().map(|r| r.from_version.as_u64()).collect();
    assert_eq!(versions, vec![30, 20, 10]);
}

#[test]
fn test_locked_flag_is_reported() {
    let (ledger, writer) = open(Default::default());
    writer
        .upsert_metadata(entity(1), "name", b"x".to_vec(), true, v(1))
        .unwrap();
    writer.commit(v(1)).unwrap();
    let item = ledger.query().metadata_value(entity(1), "name", v(1)).unwrap();
    assert!(item.is_locked);
    assert_eq!(item.last_updated_version, v(1));
}

#[test]
fn test_window_with_probe_beyond_reports_cursor() {
    // 5 definitions, 3 tombstoned, P=2, L=4, newest first
    let (ledger, writer) = open(uniform_config(2, 4, Direction::Descending));
    write_keys(&writer, 1, 5, 1);
    for key in ["k1", "k2", "k3"] {
        writer.delete_metadata(entity(1), key, v(10)).unwrap();
    }
    writer.commit(v(10)).unwrap();

    let q = ledger.query();
    let first = q.metadata_page(entity(1), v(10), None, &never()).unwrap();
    let keys: Vec<_> = first.items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["k5", "k4"]);
    assert_eq!(first.total_count, 2);

    // k1 sits beyond the lookahead window, unresolved
    let cursor = first.next_cursor.expect("k1 lies beyond the window");
    let second = q
        .metadata_page(entity(1), v(10), Some(&cursor), &never())
        .unwrap();
    assert!(second.items.is_empty());
    assert!(second.next_cursor.is_none());
}

#[test]
fn test_window_reaching_series_end_has_no_cursor() {
    let (ledger, writer) = open(uniform_config(2, 5, Direction::Descending));
    write_keys(&writer, 1, 5, 1);
    for key in ["k1", "k2", "k3"] {
        writer.delete_metadata(entity(1), key, v(10)).unwrap();
    }
    writer.commit(v(10)).unwrap();

    let page = ledger
        .query()
        .metadata_page(entity(1), v(10), None, &never())
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.next_cursor.is_none());
}

#[test]
fn test_cursor_is_stable_across_later_commits() {
    let (ledger, writer) = open(uniform_config(2, 4, Direction::Ascending));
    let tip = write_keys(&writer, 1, 4, 1);

    let q = ledger.query();
    let first = q.metadata_page(entity(1), v(tip), None, &never()).unwrap();
    let cursor = first.next_cursor.clone().unwrap();

    // Later commits add and remove keys; the pinned read does not see them.
    writer
        .upsert_metadata(entity(1), "late", vec![0], false, v(tip + 1))
        .unwrap();
    writer.delete_metadata(entity(1), "k3", v(tip + 1)).unwrap();
    writer.commit(v(tip + 1)).unwrap();

    let second = q
        .metadata_page(entity(1), v(tip), Some(&cursor), &never())
        .unwrap();
    let mut keys: Vec<_> = first.items.iter().chain(&second.items).map(|i| i.key.clone()).collect();
    keys.sort();
    assert_eq!(keys, vec!["k1", "k2", "k3", "k4"]);
    assert!(second.next_cursor.is_none());
    assert_eq!(second.total_count, 4);

    let now: Vec<String> = keys_of(&ledger, 1, tip + 1).concat();
    assert_eq!(now, vec!["k1", "k2", "k4", "late"]);
}

#[test]
fn test_multi_entity_pages_follow_request_order() {
    let (ledger, writer) = open(uniform_config(2, 10, Direction::Ascending));
    write_keys(&writer, 3, 1, 1);
    write_keys(&writer, 1, 3, 2);

    let pages = ledger
        .query()
        .metadata_pages(&[entity(3), entity(2), entity(1), entity(3)], v(4), None, &never())
        .unwrap();
    let order: Vec<_> = pages.iter().map(|(e, _)| *e).collect();
    assert_eq!(order, vec![entity(3), entity(2), entity(1)]);

    assert_eq!(pages[0].1.total_count, 1);
    assert!(pages[1].1.items.is_empty());
    assert_eq!(pages[2].1.items.len(), 2);
    assert!(pages[2].1.next_cursor.is_some());
}

#[test]
fn test_multi_entity_budget_is_split() {
    let mut config = uniform_config(2, 10, Direction::Descending);
    config.max_definitions_per_request = 12;
    let (ledger, _writer) = open(config);
    let q = ledger.query();

    let lookahead = |n| q.split_metadata_budget(n).unwrap().definition_lookahead_limit;
    assert_eq!(lookahead(1), 10);
    assert_eq!(lookahead(2), 6);
    assert_eq!(lookahead(4), 3);
    assert!((1..=4).all(|n| n * lookahead(n) <= 12));

    // A share must exceed the page size
    assert!(matches!(q.split_metadata_budget(5), Err(Error::InvalidInput(_))));
    let many: Vec<_> = (1..=5).map(entity).collect();
    assert!(matches!(
        q.metadata_pages(&many, v(0), None, &never()),
        Err(Error::InvalidInput(_))
    ));
    // Duplicates do not count against the budget
    let repeated = [entity(1), entity(2), entity(1), entity(3), entity(2), entity(4)];
    assert_eq!(q.metadata_pages(&repeated, v(0), None, &never()).unwrap().len(), 4);
}

#[test]
fn test_cursor_with_many_entities_is_rejected() {
    let (ledger, writer) = open(uniform_config(1, 4, Direction::Ascending));
    write_keys(&writer, 1, 3, 1);
    let q = ledger.query();
    let cursor = q
        .metadata_page(entity(1), v(3), None, &never())
        .unwrap()
        .next_cursor
        .unwrap();

    assert!(matches!(
        q.metadata_pages(&[entity(1), entity(2)], v(3), Some(&cursor), &never()),
        Err(Error::InvalidInput(_))
    ));
    // The same entity twice is still a single entity
    let pages = q
        .metadata_pages(&[entity(1), entity(1)], v(3), Some(&cursor), &never())
        .unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].1.items[0].key, "k2");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every visible key is listed exactly once, however tombstones fall.
    #[test]
    fn prop_pages_list_every_visible_key_once(
        deleted in prop::collection::vec(any::<bool>(), 1..30),
        page_size in 1usize..4,
        extra in 1usize..5,
        ascending in any::<bool>(),
    ) {
        let direction = if ascending { Direction::Ascending } else { Direction::Descending };
        let (ledger, writer) = open(uniform_config(page_size, page_size + extra, direction));
        let n = deleted.len() as u64;
        write_keys(&writer, 1, n, 1);
        let tip = n + 1;
        for (i, gone) in deleted.iter().enumerate() {
            if *gone {
                writer.delete_metadata(entity(1), format!("k{}", i + 1), v(tip)).unwrap();
            }
        }
        writer.commit(v(tip)).unwrap();

        let listed: Vec<String> = keys_of(&ledger, 1, tip).concat();
        let unique: BTreeSet<_> = listed.iter().cloned().collect();
        let expected: BTreeSet<_> = deleted
            .iter()
            .enumerate()
            .filter(|(_, gone)| !**gone)
            .map(|(i, _)| format!("k{}", i + 1))
            .collect();
        prop_assert_eq!(listed.len(), unique.len());
        prop_assert_eq!(unique, expected);
    }
}
