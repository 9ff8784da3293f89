use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use crate::persistence::queue::PersistenceQueue;
use crate::persistence::records::RecordStore;
use crate::persistence::state::SaveState;
use crate::storage::StorageProvider;

use super::{flaky, id, record, FlakyProvider, MemorySource};

const LONG: Duration = Duration::from_secs(3600);

fn queue_with(
    provider: &Arc<FlakyProvider>,
    source: &Arc<MemorySource>,
    interval: Duration,
) -> (PersistenceQueue, RecordStore) {
    let records = RecordStore::new(provider.clone() as Arc<dyn StorageProvider>, "spawners");
    let queue = PersistenceQueue::new(records.clone(), source.clone(), interval).expect("inside runtime");
    (queue, records)
}

#[tokio::test]
async fn test_queue_immediate_writes_record() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = flaky(temp_dir.path());
    let source = Arc::new(MemorySource::default());
    let (queue, records) = queue_with(&provider, &source, LONG);

    let unit = id("u1");
    source.put(&unit, record("ZOMBIE", &["STICK:40"]));
    queue.queue_immediate(&unit);
    queue.wait_idle().await;

    assert_eq!(records.read(&unit).unwrap().inventory, vec!["STICK:40".to_string()]);
    assert_eq!(queue.state_of(&unit), SaveState::Untracked);
    assert!(queue.is_idle());
}

#[tokio::test]
async fn test_unregistered_unit_record_is_deleted() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = flaky(temp_dir.path());
    let source = Arc::new(MemorySource::default());
    let (queue, records) = queue_with(&provider, &source, LONG);

    let unit = id("u1");
    source.put(&unit, record("ZOMBIE", &[]));
    queue.queue_immediate(&unit);
    queue.wait_idle().await;
    assert!(records.exists(&unit));

    source.drop_unit(&unit);
    queue.queue_immediate(&unit);
    queue.wait_idle().await;
    assert!(!records.exists(&unit));
}

#[tokio::test]
async fn test_modified_units_wait_for_flush() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = flaky(temp_dir.path());
    let source = Arc::new(MemorySource::default());
    let (queue, records) = queue_with(&provider, &source, LONG);

    let (a, b) = (id("a"), id("b"));
    source.put(&a, record("PIG", &["STICK:1"]));
    source.put(&b, record("COW", &["STICK:2"]));
    queue.mark_modified(&a);
    queue.mark_modified(&b);
    queue.mark_modified(&a);
    assert_eq!(queue.pending_modified(), 2);

    queue.wait_idle().await;
    assert_eq!(provider.write_count(), 0, "no write before a flush");

    queue.request_flush();
    queue.wait_idle().await;
    assert!(records.exists(&a) && records.exists(&b));
    assert_eq!(provider.write_count(), 2);
    assert_eq!(queue.pending_modified(), 0);
}

#[tokio::test]
async fn test_failed_write_retried_on_next_flush() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = flaky(temp_dir.path());
    let source = Arc::new(MemorySource::default());
    let (queue, records) = queue_with(&provider, &source, LONG);

    let unit = id("u1");
    source.put(&unit, record("PIG", &[]));
    provider.set_failing(true);
    queue.queue_immediate(&unit);
    queue.wait_idle().await;

    assert!(!records.exists(&unit));
    assert_eq!(queue.state_of(&unit), SaveState::Modified);

    provider.set_failing(false);
    queue.request_flush();
    queue.wait_idle().await;
    assert!(records.exists(&unit));
    assert_eq!(queue.state_of(&unit), SaveState::Untracked);
}

#[tokio::test]
async fn test_ticker_flushes_modified_set() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = flaky(temp_dir.path());
    let source = Arc::new(MemorySource::default());
    let (queue, records) = queue_with(&provider, &source, Duration::from_millis(20));

    let unit = id("u1");
    source.put(&unit, record("PIG", &["STICK:5"]));
    queue.mark_modified(&unit);
    queue.start_ticker();

    let mut written = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.wait_idle().await;
        if records.exists(&unit) {
            written = true;
            break;
        }
    }
    queue.stop_ticker();
    assert!(written, "ticker never flushed the modified set");
}

#[tokio::test]
async fn test_save_all_reports_failures_without_aborting() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = flaky(temp_dir.path());
    let source = Arc::new(MemorySource::default());
    let (queue, records) = queue_with(&provider, &source, LONG);

    for name in ["a", "b", "c"] {
        source.put(&id(name), record("PIG", &[]));
    }
    provider.set_failing(true);
    let report = queue.shutdown().await;
    assert_eq!(report.attempted, 3);
    assert_eq!(report.failed, 3);
    assert!(!report.is_clean());
    assert_eq!(queue.pending_modified(), 3, "failed units stay modified");

    provider.set_failing(false);
    let report = queue.save_all().await;
    assert_eq!((report.attempted, report.failed), (3, 0));
    assert_eq!(queue.last_report(), Some(report));
    assert_eq!(records.list().unwrap(), vec![id("a"), id("b"), id("c")]);
}

#[tokio::test]
async fn test_save_all_persists_pending_deletions() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = flaky(temp_dir.path());
    let source = Arc::new(MemorySource::default());
    let (queue, records) = queue_with(&provider, &source, LONG);

    let unit = id("gone");
    records.write(&unit, &record("PIG", &[])).unwrap();
    queue.mark_modified(&unit);

    let report = queue.save_all().await;
    assert_eq!(report.attempted, 1);
    assert!(!records.exists(&unit));
}
