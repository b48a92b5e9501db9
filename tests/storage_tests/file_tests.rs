//! Tests for RecordFile
//!
//! These tests verify:
//! - Append creates the file and writes one record per call
//! - Scan yields matches in insertion order
//! - Missing files scan as empty
//! - Partial trailing records are ignored
//! - I/O failures surface as errors
//! - An interrupt check ends a scan between records

use std::cell::Cell;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use slotstore::storage::{RecordFile, RECORD_SIZE};
use slotstore::{StoreError, SyncStrategy};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_file() -> (TempDir, PathBuf, RecordFile) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.db");
    let file = RecordFile::new(&path, SyncStrategy::OsBuffered);
    (temp_dir, path, file)
}

fn scan_all(file: &RecordFile, query: &str) -> Vec<String> {
    file.scan(query)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_append_creates_file() {
    let (_temp, path, file) = setup_temp_file();
    assert!(!path.exists());
    assert_eq!(file.path(), path.as_path());

    file.append("first").unwrap();

    assert!(path.exists());
    assert_eq!(std::fs::metadata(&path).unwrap().len(), RECORD_SIZE as u64);
}

#[test]
fn test_append_grows_by_one_record() {
    let (_temp, path, file) = setup_temp_file();

    for i in 0..5 {
        file.append(&format!("value{}", i)).unwrap();
    }

    assert_eq!(std::fs::metadata(&path).unwrap().len(), 5 * RECORD_SIZE as u64);
    assert_eq!(file.len().unwrap(), 5);
}

#[test]
fn test_append_long_value_still_one_record() {
    let (_temp, _path, file) = setup_temp_file();

    file.append(&"y".repeat(1000)).unwrap();

    assert_eq!(file.len().unwrap(), 1);
    assert_eq!(scan_all(&file, ""), vec!["y".repeat(RECORD_SIZE)]);
}

#[test]
fn test_append_with_every_write_sync() {
    let temp_dir = TempDir::new().unwrap();
    let file = RecordFile::new(temp_dir.path().join("synced.db"), SyncStrategy::EveryWrite);

    file.append("durable").unwrap();

    assert_eq!(scan_all(&file, "dur"), vec!["durable"]);
}

#[test]
fn test_append_to_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let file = RecordFile::new(temp_dir.path(), SyncStrategy::OsBuffered);

    let result = file.append("nowhere");

    assert!(matches!(result, Err(StoreError::Io(_))));
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_missing_file_is_empty() {
    let (_temp, path, file) = setup_temp_file();

    assert!(scan_all(&file, "anything").is_empty());
    assert!(!path.exists());
    assert!(file.is_empty().unwrap());
}

#[test]
fn test_scan_returns_insertion_order() {
    let (_temp, _path, file) = setup_temp_file();
    file.append("flutter").unwrap();
    file.append("dart").unwrap();
    file.append("rust").unwrap();

    assert_eq!(scan_all(&file, "t"), vec!["flutter", "dart", "rust"]);
}

#[test]
fn test_scan_filters_non_matching() {
    let (_temp, _path, file) = setup_temp_file();
    file.append("flutter").unwrap();
    file.append("dart").unwrap();

    assert_eq!(scan_all(&file, "fl"), vec!["flutter"]);
    assert!(scan_all(&file, "zzz").is_empty());
}

#[test]
fn test_scan_is_case_sensitive() {
    let (_temp, _path, file) = setup_temp_file();
    file.append("Flutter").unwrap();

    assert!(scan_all(&file, "flutter").is_empty());
    assert_eq!(scan_all(&file, "Flu"), vec!["Flutter"]);
}

#[test]
fn test_scan_empty_query_matches_everything() {
    let (_temp, _path, file) = setup_temp_file();
    file.append("a").unwrap();
    file.append("").unwrap();
    file.append("b").unwrap();

    assert_eq!(scan_all(&file, ""), vec!["a", "", "b"]);
}

#[test]
fn test_scan_returns_duplicates() {
    let (_temp, _path, file) = setup_temp_file();
    file.append("same").unwrap();
    file.append("same").unwrap();

    assert_eq!(scan_all(&file, "same"), vec!["same", "same"]);
}

#[test]
fn test_scan_ignores_partial_trailing_record() {
    let (_temp, path, file) = setup_temp_file();
    file.append("complete").unwrap();

    // Torn write: less than a full record
    let mut raw = OpenOptions::new().append(true).open(&path).unwrap();
    raw.write_all(&[b'p'; 100]).unwrap();
    drop(raw);

    assert_eq!(scan_all(&file, ""), vec!["complete"]);
    assert_eq!(file.len().unwrap(), 1);
}

#[test]
fn test_scan_directory_yields_error() {
    let temp_dir = TempDir::new().unwrap();
    let file = RecordFile::new(temp_dir.path(), SyncStrategy::OsBuffered);

    let first = file.scan("x").and_then(|mut scan| scan.next().transpose());

    assert!(matches!(first, Err(StoreError::Io(_))));
}

#[test]
fn test_scan_stops_after_error() {
    let temp_dir = TempDir::new().unwrap();
    let file = RecordFile::new(temp_dir.path(), SyncStrategy::OsBuffered);

    // Either open or first read fails; nothing follows the error
    if let Ok(mut scan) = file.scan("x") {
        assert!(matches!(scan.next(), Some(Err(_))));
        assert!(scan.next().is_none());
    }
}

// =============================================================================
// Interrupt Tests
// =============================================================================

#[test]
fn test_interrupt_checked_per_record_not_per_match() {
    let (_temp, _path, file) = setup_temp_file();
    for i in 0..10 {
        file.append(&format!("miss{}", i)).unwrap();
    }
    file.append("hit").unwrap();

    let checks = Cell::new(0);
    let mut scan = file
        .scan("hit")
        .unwrap()
        .interrupt_if(|| {
            checks.set(checks.get() + 1);
            checks.get() > 3
        });

    // Stops inside the run of misses; "hit" is never reached
    assert!(scan.next().is_none());
    assert!(scan.was_interrupted());
    assert_eq!(checks.get(), 4);

    // Stays finished
    assert!(scan.next().is_none());
    assert_eq!(checks.get(), 4);
}

#[test]
fn test_interrupt_never_firing_scans_everything() {
    let (_temp, _path, file) = setup_temp_file();
    file.append("flutter").unwrap();
    file.append("dart").unwrap();

    let mut scan = file.scan("t").unwrap().interrupt_if(|| false);
    let found: Vec<_> = scan.by_ref().map(|item| item.unwrap()).collect();

    assert_eq!(found, vec!["flutter", "dart"]);
    assert!(!scan.was_interrupted());
}

#[test]
fn test_interrupt_on_missing_file_is_not_reported() {
    let (_temp, _path, file) = setup_temp_file();

    let mut scan = file.scan("x").unwrap().interrupt_if(|| true);

    assert!(scan.next().is_none());
    assert!(!scan.was_interrupted());
}
