//! Non-fungible id scenarios

use crate::common::*;
use ledgerview::{Direction, Error, Totals};

/// Mints `#1#..=#n#` under `resource`, one id per version starting at 1.
fn mint(writer: &ledgerview::LedgerWriter, resource: u64, n: u64) {
    for i in 1..=n {
        writer
            .upsert_non_fungible(entity(resource), format!("#{}#", i), vec![i as u8], false, v(i))
            .unwrap();
        writer.commit(v(i)).unwrap();
    }
}

#[test]
fn test_burned_ids_leave_pages_and_supply() {
    let (ledger, writer) = open(uniform_config(2, 4, Direction::Ascending));
    mint(&writer, 9, 5);
    writer.burn_non_fungible(entity(9), "#2#", v(6)).unwrap();
    writer.burn_non_fungible(entity(9), "#4#", v(6)).unwrap();
    writer.commit(v(6)).unwrap();

    let q = ledger.query();
    let ids = |at| -> Vec<String> {
        drain(|cursor| q.non_fungible_ids_page(entity(9), v(at), cursor, &never()))
            .into_iter()
            .flat_map(|page| page.items.into_iter().map(|i| i.non_fungible_id))
            .collect()
    };
    assert_eq!(ids(5), vec!["#1#", "#2#", "#3#", "#4#", "#5#"]);
    assert_eq!(ids(6), vec!["#1#", "#3#", "#5#"]);

    assert_eq!(q.non_fungible_totals(entity(9), v(5)).unwrap(), Totals::new(5, 5));
    assert_eq!(q.non_fungible_totals(entity(9), v(6)).unwrap(), Totals::new(3, 5));
    let page = q.non_fungible_ids_page(entity(9), v(6), None, &never()).unwrap();
    assert_eq!(page.total_count, 3);
}

#[test]
fn test_data_updates_keep_the_id_position() {
    let (ledger, writer) = open(uniform_config(10, 20, Direction::Descending));
    mint(&writer, 9, 3);
    writer
        .upsert_non_fungible(entity(9), "#1#", b"renamed".to_vec(), true, v(4))
        .unwrap();
    writer.commit(v(4)).unwrap();

    let q = ledger.query();
    let page = q.non_fungible_ids_page(entity(9), v(4), None, &never()).unwrap();
    let ids: Vec<_> = page.items.iter().map(|i| i.non_fungible_id.as_str()).collect();
    assert_eq!(ids, vec!["#3#", "#2#", "#1#"]);
    assert_eq!(page.total_count, 3);

    let item = q.non_fungible_data(entity(9), "#1#", v(4)).unwrap();
    assert_eq!(item.data, b"renamed".to_vec());
    assert!(item.is_locked);
    assert_eq!(item.last_updated_version, v(4));
    assert_eq!(q.non_fungible_data(entity(9), "#1#", v(3)).unwrap().data, vec![1]);
}

#[test]
fn test_unminted_and_burned_ids_are_not_found() {
    let (ledger, writer) = open(Default::default());
    mint(&writer, 9, 1);
    writer.burn_non_fungible(entity(9), "#1#", v(2)).unwrap();
    writer.commit(v(2)).unwrap();

    let q = ledger.query();
    assert!(matches!(q.non_fungible_data(entity(9), "#7#", v(2)), Err(Error::NotFound(_))));
    assert!(matches!(q.non_fungible_data(entity(9), "#1#", v(2)), Err(Error::NotFound(_))));
    assert!(q.non_fungible_data(entity(9), "#1#", v(1)).is_ok());

    let empty = q.non_fungible_ids_page(entity(8), v(2), None, &never()).unwrap();
    assert!(empty.items.is_empty());
    assert_eq!(empty.total_count, 0);
}

#[test]
fn test_ids_page_resumes_from_cursor() {
    let (ledger, writer) = open(uniform_config(2, 3, Direction::Descending));
    mint(&writer, 9, 5);
    let q = ledger.query();

    let first = q.non_fungible_ids_page(entity(9), v(5), None, &never()).unwrap();
    let cursor = first.next_cursor.unwrap();
    let second = q
        .non_fungible_ids_page(entity(9), v(5), Some(&cursor), &never())
        .unwrap();
    let ids: Vec<_> = first
        .items
        .iter()
        .chain(&second.items)
        .map(|i| i.non_fungible_id.as_str())
        .collect();
    assert_eq!(ids, vec!["#5#", "#4#", "#3#", "#2#"]);
    assert!(matches!(
        q.non_fungible_ids_page(entity(9), v(2), Some(&cursor), &never()),
        Err(Error::InvalidCursor { .. })
    ));
}
