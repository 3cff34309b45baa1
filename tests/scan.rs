use std::{collections::BTreeMap, ops::ControlFlow};

use proptest::prelude::*;
use rebelscan::{
    get_dup,
    scan::{self, exclusive_upper_bound},
    Cursor, DBConfig, KeyValue, Result, UpperBound, WriteBatch, DB,
};

fn open_with(entries: &[(&[u8], &[u8])]) -> DB {
    let db = DB::open("scan", &DBConfig::new()).unwrap();
    let mut batch = WriteBatch::new();
    for (key, value) in entries {
        batch.put(key, value);
    }
    db.write(&batch).unwrap();
    db
}

fn collect(scan: impl Iterator<Item = Result<KeyValue>>) -> Vec<KeyValue> {
    scan.collect::<Result<Vec<_>>>().unwrap()
}

fn pairs(entries: &[(&[u8], &[u8])]) -> Vec<KeyValue> {
    entries
        .iter()
        .map(|(key, value)| (key.to_vec(), value.to_vec()))
        .collect()
}

#[test]
fn prefix_scan_yields_matching_keys_in_order() {
    let db = open_with(&[(b"b", b"3"), (b"ab", b"2"), (b"a", b"1")]);
    let found = collect(scan::prefix(&db, b"a", None).unwrap());
    assert_eq!(pairs(&[(b"a", b"1"), (b"ab", b"2")]), found);
    assert_eq!(0, db.open_cursors());
    db.close().unwrap();
}

#[test]
fn prefix_scan_without_matches() {
    let db = open_with(&[(b"a", b"1"), (b"c", b"3")]);
    assert!(collect(scan::prefix(&db, b"b", None).unwrap()).is_empty());
    assert_eq!(0, db.open_cursors());
}

#[test]
fn prefix_scan_of_all_ones_prefix_is_unbounded() {
    let db = open_with(&[
        (&[0xfe, 0xff], b"below"),
        (&[0xff], b"exact"),
        (&[0xff, 0xff, 0xff, 0x00], b"deep"),
    ]);
    let found = collect(scan::prefix(&db, &[0xff], None).unwrap());
    assert_eq!(
        pairs(&[(&[0xff], b"exact"), (&[0xff, 0xff, 0xff, 0x00], b"deep")]),
        found
    );
    assert_eq!(UpperBound::Unbounded, exclusive_upper_bound(&[0xff]).unwrap());
}

#[test]
fn prefix_scan_with_carry_stays_in_prefix() {
    let db = open_with(&[
        (&[0x12, 0x34, 0xff], b"in"),
        (&[0x12, 0x34, 0xff, 0x01], b"in"),
        (&[0x12, 0x35], b"out"),
        (&[0x12, 0x35, 0x00], b"out"),
        (&[0x01], b"out"),
    ]);
    let found = collect(scan::prefix(&db, &[0x12, 0x34, 0xff], None).unwrap());
    assert_eq!(
        pairs(&[(&[0x12, 0x34, 0xff], b"in"), (&[0x12, 0x34, 0xff, 0x01], b"in")]),
        found
    );
    assert!(collect(scan::prefix(&db, &[0x00, 0xff], None).unwrap()).is_empty());
    // the bound itself keeps the carried zeros
    assert_eq!(
        UpperBound::Exclusive(vec![0x12, 0x35, 0x00]),
        exclusive_upper_bound(&[0x12, 0x34, 0xff]).unwrap()
    );
}

#[test]
fn prefix_scan_with_seek_stays_in_prefix() {
    let db = open_with(&[
        (b"user:1", b"ann"),
        (b"user:2", b"bob"),
        (b"user:3", b"cat"),
        (b"video:1", b"x"),
    ]);
    let found = collect(scan::prefix(&db, b"user:", Some(b"user:2")).unwrap());
    assert_eq!(pairs(&[(b"user:2", b"bob"), (b"user:3", b"cat")]), found);
}

#[test]
fn full_scan_and_seek() {
    let db = open_with(&[(b"a", b"1"), (b"b", b"2"), (b"c", b"3")]);
    assert_eq!(3, collect(scan::all(&db, None).unwrap()).len());
    let found = collect(scan::all(&db, Some(b"bb")).unwrap());
    assert_eq!(pairs(&[(b"c", b"3")]), found);

    let empty = DB::open("empty", &DBConfig::new()).unwrap();
    assert!(collect(scan::all(&empty, None).unwrap()).is_empty());
}

#[test]
fn range_scan_excludes_end() {
    let db = open_with(&[(b"a", b"1"), (b"b", b"2"), (b"c", b"3"), (b"d", b"4")]);
    let found = collect(scan::range(&db, b"b", Some(b"d")).unwrap());
    assert_eq!(pairs(&[(b"b", b"2"), (b"c", b"3")]), found);

    let open_ended = collect(scan::range(&db, b"c", None).unwrap());
    assert_eq!(pairs(&[(b"c", b"3"), (b"d", b"4")]), open_ended);

    assert!(collect(scan::range(&db, b"b", Some(b"b")).unwrap()).is_empty());
    assert!(scan::range(&db, b"d", Some(b"b")).unwrap_err().is_invalid_argument());
    assert_eq!(0, db.open_cursors());
}

#[test]
fn deleted_and_overwritten_keys() {
    let db = open_with(&[(b"k1", b"old"), (b"k2", b"gone"), (b"k3", b"v3")]);
    db.put(b"k1", b"new").unwrap();
    db.delete(b"k2").unwrap();
    let found = collect(scan::prefix(&db, b"k", None).unwrap());
    assert_eq!(pairs(&[(b"k1", b"new"), (b"k3", b"v3")]), found);
}

#[test]
fn early_termination_releases_cursor() {
    let db = open_with(&[(b"a", b"1"), (b"b", b"2"), (b"c", b"3")]);
    {
        let mut scan = scan::all(&db, None).unwrap();
        assert_eq!(1, db.open_cursors());
        let (key, _) = scan.next_entry().unwrap().unwrap();
        assert_eq!(b"a", key);
    }
    assert_eq!(0, db.open_cursors());

    let mut visited = 0;
    scan::all(&db, None)
        .unwrap()
        .visit(|_, _| {
            visited += 1;
            ControlFlow::Break(())
        })
        .unwrap();
    assert_eq!(1, visited);
    assert_eq!(0, db.open_cursors());

    let first_two: Vec<_> = scan::all(&db, None).unwrap().take(2).collect();
    assert_eq!(2, first_two.len());
    assert_eq!(0, db.open_cursors());
    db.close().unwrap();
}

#[test]
fn exhausted_scan_releases_before_drop() {
    let db = open_with(&[(b"a", b"1")]);
    let mut scan = scan::all(&db, None).unwrap();
    assert!(scan.next().is_some());
    assert!(scan.next().is_none());
    assert!(scan.is_finished());
    assert_eq!(0, db.open_cursors());
    assert!(scan.next().is_none());
}

#[test]
fn acquisition_faults_are_returned_immediately() {
    let db = DB::open("limited", &DBConfig::new().with_max_open_cursors(1)).unwrap();
    db.put(b"a", b"1").unwrap();
    let held = scan::all(&db, None).unwrap();
    assert!(scan::all(&db, None).unwrap_err().is_resource_exhausted());
    assert!(scan::prefix(&db, b"a", None).unwrap_err().is_resource_exhausted());
    assert!(scan::range(&db, b"a", None).unwrap_err().is_resource_exhausted());
    drop(held);
    assert!(scan::all(&db, None).is_ok());

    db.close().unwrap();
    assert!(scan::all(&db, None).unwrap_err().is_closed());
    assert!(scan::prefix(&db, b"a", None).unwrap_err().is_closed());
}

#[test]
fn leaked_scan_is_reported_on_close() {
    let db = open_with(&[(b"a", b"1")]);
    let scan = scan::all(&db, None).unwrap();
    assert!(db.close().unwrap_err().is_busy());
    drop(scan);
    assert_eq!(0, db.open_cursors());
}

#[test]
fn scan_does_not_see_later_writes() {
    let db = open_with(&[(b"a", b"1"), (b"c", b"3")]);
    let mut scan = scan::all(&db, None).unwrap();
    assert_eq!(b"a".to_vec(), scan.next().unwrap().unwrap().0);
    db.put(b"b", b"2").unwrap();
    assert_eq!(b"c".to_vec(), scan.next().unwrap().unwrap().0);
    assert!(scan.next().is_none());
    assert_eq!(3, collect(scan::all(&db, None).unwrap()).len());
}

#[test]
fn prefix_cursor_is_unpositioned() {
    let db = open_with(&[(b"pa", b"1"), (b"pb", b"2"), (b"q", b"3")]);
    let mut cursor = scan::prefix_cursor(&db, b"p").unwrap();
    assert!(!cursor.valid());
    cursor.seek(b"pb");
    assert_eq!(b"pb", cursor.key());
    cursor.next();
    assert!(!cursor.valid());
    assert!(cursor.status().is_ok());
    drop(cursor);
    assert_eq!(0, db.open_cursors());
}

#[test]
fn get_dup_copy_is_independent() {
    let db = open_with(&[(b"k", b"v1")]);
    let mut copy = get_dup(db.get(b"k")).unwrap();
    assert_eq!(0, db.pinned_values());
    copy.push(b'!');
    db.put(b"k", b"v2").unwrap();
    assert_eq!(b"v1!".to_vec(), copy);
    assert_eq!(b"v2".to_vec(), get_dup(db.get(b"k")).unwrap());
    assert!(get_dup(db.get(b"missing")).unwrap_err().is_not_found());
}

fn arb_entries() -> impl Strategy<Value = BTreeMap<Vec<u8>, Vec<u8>>> {
    // a narrow alphabet makes shared prefixes and 0xff runs common
    let key = prop::collection::vec(prop::sample::select(vec![0x00u8, 0x01, 0x7f, 0xfe, 0xff]), 0..5);
    prop::collection::btree_map(key, prop::collection::vec(any::<u8>(), 0..4), 0..32)
}

fn load(entries: &BTreeMap<Vec<u8>, Vec<u8>>) -> DB {
    let db = DB::open("prop", &DBConfig::new()).unwrap();
    for (key, value) in entries {
        db.put(key, value).unwrap();
    }
    db
}

proptest! {
    #[test]
    fn prefix_scan_matches_filtered_full_scan(
        entries in arb_entries(),
        prefix in prop::collection::vec(prop::sample::select(vec![0x00u8, 0x7f, 0xff]), 0..3),
    ) {
        let db = load(&entries);
        let expected: Vec<KeyValue> = collect(scan::all(&db, None).unwrap())
            .into_iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .collect();
        prop_assert_eq!(expected, collect(scan::prefix(&db, &prefix, None).unwrap()));
        prop_assert_eq!(0, db.open_cursors());
    }

    #[test]
    fn range_scan_matches_filtered_full_scan(
        entries in arb_entries(),
        start in prop::collection::vec(any::<u8>(), 0..3),
        end in prop::option::of(prop::collection::vec(any::<u8>(), 0..3)),
    ) {
        prop_assume!(end.as_ref().map_or(true, |end| &start <= end));
        let db = load(&entries);
        let expected: Vec<KeyValue> = entries
            .iter()
            .filter(|(key, _)| **key >= start && end.as_ref().map_or(true, |end| *key < end))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let found = collect(scan::range(&db, &start, end.as_deref()).unwrap());
        prop_assert_eq!(expected, found);
    }
}
