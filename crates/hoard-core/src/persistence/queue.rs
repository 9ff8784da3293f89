use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use crate::kernel::component::KernelComponent;
use crate::kernel::error::{Error, Result};
use crate::persistence::records::{RecordStore, UnitId, UnitRecord};
use crate::persistence::state::{Job, QueueState, SaveState};

/// Read access to the current state of every registered unit.
///
/// The queue never holds unit data itself; it asks for a fresh record right
/// before each write.
pub trait SnapshotSource: Send + Sync + fmt::Debug {
    /// Current record of `id`, or `None` if the unit no longer exists
    fn snapshot(&self, id: &UnitId) -> Option<UnitRecord>;

    /// Every registered unit
    fn unit_ids(&self) -> Vec<UnitId>;
}

/// Outcome of a full save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub attempted: usize,
    pub failed: usize,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

struct QueueInner {
    state: Mutex<QueueState>,
    records: RecordStore,
    source: Arc<dyn SnapshotSource>,
    flush_interval: Duration,
    runtime: Handle,
    idle: Notify,
    ticker: Mutex<Option<JoinHandle<()>>>,
    last_report: Mutex<Option<SaveReport>>,
}

/// Save scheduling for storage units.
///
/// Two ways in:
/// - [`queue_immediate`](Self::queue_immediate) for structural changes
///   (create, remove, resize, forced saves), written in FIFO order as soon as
///   the writer is free;
/// - [`mark_modified`](Self::mark_modified) for routine mutations, written
///   together by the periodic batch flush.
///
/// Both funnel into a single background writer, so at most one record write
/// is in flight at any time. Enqueueing never blocks on I/O.
#[derive(Clone)]
pub struct PersistenceQueue {
    inner: Arc<QueueInner>,
}

impl PersistenceQueue {
    /// Create a queue bound to the current tokio runtime.
    pub fn new(records: RecordStore, source: Arc<dyn SnapshotSource>, flush_interval: Duration) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Other(format!("Persistence queue needs a tokio runtime: {}", e)))?;
        Ok(Self::with_handle(records, source, flush_interval, runtime))
    }

    pub fn with_handle(
        records: RecordStore,
        source: Arc<dyn SnapshotSource>,
        flush_interval: Duration,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                records,
                source,
                flush_interval,
                runtime,
                idle: Notify::new(),
                ticker: Mutex::new(None),
                last_report: Mutex::new(None),
            }),
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.inner.records
    }

    pub fn flush_interval(&self) -> Duration {
        self.inner.flush_interval
    }

    pub fn state_of(&self, id: &UnitId) -> SaveState {
        self.inner.state.lock().state_of(id)
    }

    pub fn pending_immediate(&self) -> usize {
        self.inner.state.lock().pending_immediate()
    }

    pub fn pending_modified(&self) -> usize {
        self.inner.state.lock().pending_modified()
    }

    pub fn is_idle(&self) -> bool {
        !self.inner.state.lock().writer_busy()
    }

    /// Report of the last full save, if one ran
    pub fn last_report(&self) -> Option<SaveReport> {
        *self.inner.last_report.lock()
    }

    /// Write `id` as soon as the writer is free. Duplicate requests for a
    /// unit that is already queued collapse into one write.
    pub fn queue_immediate(&self, id: &UnitId) {
        self.inner.state.lock().queue_immediate(id);
        self.kick();
    }

    /// Add `id` to the modified set for the next batch flush. Idempotent.
    pub fn mark_modified(&self, id: &UnitId) {
        self.inner.state.lock().mark_modified(id);
    }

    /// Flush the modified set now instead of waiting for the next tick
    pub fn request_flush(&self) {
        self.inner.state.lock().request_flush();
        self.kick();
    }

    fn kick(&self) {
        if !self.inner.state.lock().begin_writer() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(run_writer(inner));
    }

    /// Wait until the background writer has nothing left to do
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.inner.state.lock().writer_busy() {
                return;
            }
            notified.await;
        }
    }

    /// Start the periodic batch flush. Calling it twice restarts the ticker.
    pub fn start_ticker(&self) {
        let period = self.inner.flush_interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);
        let queue = self.clone();
        let task = self.inner.runtime.spawn(async move {
            // The first tick completes immediately
            ticks.next().await;
            while ticks.next().await.is_some() {
                queue.request_flush();
            }
        });
        if let Some(previous) = self.inner.ticker.lock().replace(task) {
            previous.abort();
        }
    }

    pub fn stop_ticker(&self) {
        if let Some(task) = self.inner.ticker.lock().take() {
            task.abort();
        }
    }

    /// Write every registered unit plus everything pending, including
    /// deletions of units that were removed but not yet persisted.
    ///
    /// Waits for the background writer first, then holds the writer slot for
    /// the whole pass. Every unit is attempted; failures are counted, logged
    /// and left `Modified` for a later retry.
    pub async fn save_all(&self) -> SaveReport {
        let ids = loop {
            self.wait_idle().await;
            let registered = self.inner.source.unit_ids();
            let claimed = self.inner.state.lock().claim_full_save(registered);
            if let Some(ids) = claimed {
                break ids;
            }
        };

        let mut report = SaveReport::default();
        for id in ids {
            report.attempted += 1;
            if !self.inner.write_unit(id).await {
                report.failed += 1;
            }
        }

        self.inner.state.lock().release_writer();
        self.inner.idle.notify_waiters();
        // Anything queued while we held the writer
        self.kick();

        if report.failed > 0 {
            log::error!("Full save finished with {} of {} units failing", report.failed, report.attempted);
        } else {
            log::info!("Full save wrote {} units", report.attempted);
        }
        *self.inner.last_report.lock() = Some(report);
        report
    }

    /// Stop the ticker and run a final full save
    pub async fn shutdown(&self) -> SaveReport {
        self.stop_ticker();
        self.save_all().await
    }
}

impl QueueInner {
    /// Snapshot `id` and write (or delete) its record off the runtime.
    async fn write_unit(&self, id: UnitId) -> bool {
        let snapshot = self.source.snapshot(&id);
        let records = self.records.clone();
        let target = id.clone();
        let outcome = tokio::task::spawn_blocking(move || match snapshot {
            Some(record) => records.write(&target, &record),
            None => records.delete(&target),
        })
        .await;

        let ok = match outcome {
            Ok(Ok(())) => {
                log::debug!("Saved unit {}", id);
                true
            }
            Ok(Err(e)) => {
                log::error!("Failed to save unit {}: {}", id, e);
                false
            }
            Err(e) => {
                log::error!("Save task for unit {} did not complete: {}", id, e);
                false
            }
        };
        self.state.lock().settle(&id, ok);
        ok
    }
}

async fn run_writer(inner: Arc<QueueInner>) {
    loop {
        let job = inner.state.lock().next_job();
        match job {
            Some(Job::Single(id)) => {
                inner.write_unit(id).await;
            }
            Some(Job::Batch(ids)) => {
                log::debug!("Flushing {} modified units", ids.len());
                for id in ids {
                    inner.write_unit(id).await;
                }
            }
            None => break,
        }
    }
    inner.idle.notify_waiters();
}

impl fmt::Debug for PersistenceQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PersistenceQueue")
            .field("records_dir", &self.inner.records.dir())
            .field("flush_interval", &self.inner.flush_interval)
            .field("pending_immediate", &state.pending_immediate())
            .field("pending_modified", &state.pending_modified())
            .field("writer_busy", &state.writer_busy())
            .finish()
    }
}

#[async_trait]
impl KernelComponent for PersistenceQueue {
    fn name(&self) -> &'static str {
        "PersistenceQueue"
    }

    async fn initialize(&self) -> Result<()> {
        let records = self.inner.records.clone();
        tokio::task::spawn_blocking(move || records.ensure_dir())
            .await
            .map_err(|e| Error::Other(format!("Record directory task failed: {}", e)))?
    }

    async fn start(&self) -> Result<()> {
        self.start_ticker();
        log::info!("Batch flush every {:?}", self.inner.flush_interval);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.shutdown().await;
        Ok(())
    }
}
