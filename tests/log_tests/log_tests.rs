//! Tests for the record Log
//!
//! These tests verify:
//! - Append offsets and file growth
//! - Reading headers, values and whole records
//! - Scans in ascending offset order
//! - Removal shifting later records left
//! - Truncated and corrupt files surfacing as MalformedRecord

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde_json::json;
use slatekv::log::{Log, ScanEntry};
use slatekv::record::encode;
use slatekv::SlateError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("test.dat");
    (temp_dir, log_path)
}

fn record_len(key: &[u8], value: &serde_json::Value) -> u64 {
    encode(key, value).unwrap().len() as u64
}

fn append_raw(path: &PathBuf, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

// =============================================================================
// Append / Read Tests
// =============================================================================

#[test]
fn test_open_creates_empty_file() {
    let (_temp, path) = setup_temp_log();

    let log = Log::open(&path).unwrap();
    assert!(path.exists());
    assert_eq!(log.size().unwrap(), 0);
    assert_eq!(log.path(), path.as_path());
}

#[test]
fn test_append_returns_offsets() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    let first = log.append(b"a", &json!(1)).unwrap();
    let second = log.append(b"bb", &json!("two")).unwrap();

    assert_eq!(first, 0);
    assert_eq!(second, record_len(b"a", &json!(1)));
    assert_eq!(
        log.size().unwrap(),
        record_len(b"a", &json!(1)) + record_len(b"bb", &json!("two"))
    );
}

#[test]
fn test_read_value_and_record() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    log.append(b"first", &json!({ "x": 1 })).unwrap();
    let offset = log.append(b"second", &json!([1, 2])).unwrap();

    assert_eq!(log.read_value(offset).unwrap(), json!([1, 2]));

    let record = log.read_record(offset).unwrap();
    assert_eq!(record.key, b"second");
    assert_eq!(record.value, json!([1, 2]));

    let header = log.read_header(offset).unwrap();
    assert_eq!(header.key_len, 6);
}

#[test]
fn test_read_header_at_end_is_end_of_log() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();
    log.append(b"k", &json!(true)).unwrap();

    let end = log.size().unwrap();
    assert!(matches!(log.read_header(end), Err(SlateError::EndOfLog(at)) if at == end));
}

#[test]
fn test_read_value_past_end_is_malformed() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    assert!(matches!(
        log.read_value(0),
        Err(SlateError::MalformedRecord { .. })
    ));
}

#[test]
fn test_reopen_preserves_records() {
    let (_temp, path) = setup_temp_log();
    {
        let mut log = Log::open(&path).unwrap();
        log.append(b"persist", &json!("me")).unwrap();
    }

    let mut log = Log::open(&path).unwrap();
    assert_eq!(log.read_value(0).unwrap(), json!("me"));
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_empty_log() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    assert!(log.scan().unwrap().is_empty());
}

#[test]
fn test_scan_in_offset_order() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    let a = log.append(b"a", &json!(1)).unwrap();
    let bb = log.append(b"bb", &json!(2)).unwrap();
    let c = log.append(b"c", &json!(3)).unwrap();

    let entries = log.scan().unwrap();
    assert_eq!(
        entries,
        vec![
            ScanEntry { key: b"a".to_vec(), offset: a },
            ScanEntry { key: b"bb".to_vec(), offset: bb },
            ScanEntry { key: b"c".to_vec(), offset: c },
        ]
    );
}

#[test]
fn test_iter_is_lazy() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();
    log.append(b"a", &json!(1)).unwrap();
    log.append(b"b", &json!(2)).unwrap();

    let mut scanner = log.iter().unwrap();
    assert_eq!(scanner.position(), 0);

    let first = scanner.next().unwrap().unwrap();
    assert_eq!(first.key, b"a");
    assert_eq!(scanner.position(), record_len(b"a", &json!(1)));
}

#[test]
fn test_scan_truncated_header() {
    let (_temp, path) = setup_temp_log();
    {
        let mut log = Log::open(&path).unwrap();
        log.append(b"good", &json!(1)).unwrap();
    }
    append_raw(&path, &[0, 0, 0]);

    let mut log = Log::open(&path).unwrap();
    let result = log.scan();
    assert!(matches!(result, Err(SlateError::MalformedRecord { .. })));
}

#[test]
fn test_scan_truncated_payload() {
    let (_temp, path) = setup_temp_log();
    {
        let mut log = Log::open(&path).unwrap();
        log.append(b"good", &json!(1)).unwrap();
    }
    let partial = encode(b"cut", &json!("short")).unwrap();
    append_raw(&path, &partial[..partial.len() - 2]);

    let mut log = Log::open(&path).unwrap();
    match log.scan() {
        Err(SlateError::MalformedRecord { offset, .. }) => {
            assert_eq!(offset, record_len(b"good", &json!(1)));
        }
        other => panic!("Expected MalformedRecord, got {:?}", other),
    }
}

// =============================================================================
// Remove / Update / Truncate Tests
// =============================================================================

#[test]
fn test_remove_shifts_later_records() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    log.append(b"a", &json!(1)).unwrap();
    let bb = log.append(b"bb", &json!(2)).unwrap();
    log.append(b"c", &json!(3)).unwrap();

    let removed = log.remove(bb).unwrap();
    assert_eq!(removed, record_len(b"bb", &json!(2)));

    let entries = log.scan().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].key, b"a");
    assert_eq!(entries[1].key, b"c");
    // "c" now starts where "bb" used to
    assert_eq!(entries[1].offset, bb);
    assert_eq!(log.read_value(bb).unwrap(), json!(3));
}

#[test]
fn test_remove_last_record() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    log.append(b"a", &json!(1)).unwrap();
    let b = log.append(b"b", &json!(2)).unwrap();

    log.remove(b).unwrap();
    assert_eq!(log.size().unwrap(), b);
    assert_eq!(log.scan().unwrap().len(), 1);
}

#[test]
fn test_remove_invalid_offset() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();
    log.append(b"a", &json!(1)).unwrap();

    let end = log.size().unwrap();
    assert!(matches!(
        log.remove(end),
        Err(SlateError::MalformedRecord { .. })
    ));
    assert_eq!(log.size().unwrap(), end);
}

#[test]
fn test_update_moves_record_to_end() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    let k = log.append(b"k", &json!("v1")).unwrap();
    log.append(b"other", &json!(0)).unwrap();

    let new_offset = log.update(k, b"k", &json!("v2")).unwrap();

    let entries = log.scan().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].key, b"other");
    assert_eq!(entries[1].key, b"k");
    assert_eq!(entries[1].offset, new_offset);
    assert_eq!(log.read_value(new_offset).unwrap(), json!("v2"));
}

#[test]
fn test_update_invalid_offset_leaves_log_untouched() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    log.append(b"a", &json!(1)).unwrap();
    log.append(b"b", &json!(2)).unwrap();
    let before = std::fs::read(&path).unwrap();

    let end = log.size().unwrap();
    assert!(matches!(
        log.update(end, b"a", &json!("new")),
        Err(SlateError::MalformedRecord { .. })
    ));

    // Nothing was removed and nothing was appended
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_truncate_then_append() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();

    log.append(b"a", &json!(1)).unwrap();
    log.append(b"b", &json!(2)).unwrap();
    log.truncate().unwrap();

    assert_eq!(log.size().unwrap(), 0);
    assert!(log.scan().unwrap().is_empty());
    assert_eq!(log.append(b"c", &json!(3)).unwrap(), 0);
}

#[test]
fn test_destroy_deletes_file() {
    let (_temp, path) = setup_temp_log();
    let mut log = Log::open(&path).unwrap();
    log.append(b"a", &json!(1)).unwrap();

    log.destroy().unwrap();
    assert!(!path.exists());
}
