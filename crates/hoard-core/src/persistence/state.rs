use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::persistence::records::UnitId;

/// Save lifecycle of one storage unit.
///
/// ```text
/// Untracked -> Modified -> (Queued) -> Saving -> Untracked | Modified
/// ```
///
/// A unit that is mutated while its write is in flight comes back as
/// `Modified` instead of `Untracked`, so the next flush picks it up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Untracked,
    /// In the modified set, waiting for the next batch flush
    Modified,
    /// In the immediate FIFO
    Queued,
    /// Being written; `dirty` records a mutation seen during the write
    Saving { dirty: bool },
}

/// Work handed to the single writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Job {
    Single(UnitId),
    Batch(Vec<UnitId>),
}

/// Bookkeeping shared by the enqueue side and the writer, kept behind one
/// mutex. Every transition is a plain synchronous method.
#[derive(Debug, Default)]
pub(crate) struct QueueState {
    immediate: VecDeque<UnitId>,
    modified: BTreeSet<UnitId>,
    states: HashMap<UnitId, SaveState>,
    writer_busy: bool,
    flush_requested: bool,
}

impl QueueState {
    pub fn state_of(&self, id: &UnitId) -> SaveState {
        self.states.get(id).copied().unwrap_or(SaveState::Untracked)
    }

    pub fn pending_immediate(&self) -> usize {
        self.immediate.len()
    }

    pub fn pending_modified(&self) -> usize {
        self.modified.len()
    }

    pub fn writer_busy(&self) -> bool {
        self.writer_busy
    }

    pub fn mark_modified(&mut self, id: &UnitId) {
        match self.state_of(id) {
            SaveState::Untracked | SaveState::Modified => {
                self.modified.insert(id.clone());
                self.states.insert(id.clone(), SaveState::Modified);
            }
            // The queued write snapshots the unit when it runs
            SaveState::Queued => {}
            SaveState::Saving { .. } => {
                self.states.insert(id.clone(), SaveState::Saving { dirty: true });
            }
        }
    }

    pub fn queue_immediate(&mut self, id: &UnitId) {
        match self.state_of(id) {
            SaveState::Queued => {}
            // The in-flight snapshot may predate the structural change
            SaveState::Saving { .. } => {
                if !self.immediate.contains(id) {
                    self.immediate.push_back(id.clone());
                }
            }
            SaveState::Untracked | SaveState::Modified => {
                self.modified.remove(id);
                self.states.insert(id.clone(), SaveState::Queued);
                self.immediate.push_back(id.clone());
            }
        }
    }

    pub fn request_flush(&mut self) {
        self.flush_requested = true;
    }

    fn has_work(&self) -> bool {
        !self.immediate.is_empty() || (self.flush_requested && !self.modified.is_empty())
    }

    /// Claim the writer if it is idle and there is something to write
    pub fn begin_writer(&mut self) -> bool {
        if self.writer_busy {
            return false;
        }
        if !self.has_work() {
            self.flush_requested = false;
            return false;
        }
        self.writer_busy = true;
        true
    }

    /// Next job for the writer, immediate FIFO first. Releases the writer
    /// and returns `None` when nothing is left.
    pub fn next_job(&mut self) -> Option<Job> {
        if let Some(id) = self.immediate.pop_front() {
            self.states.insert(id.clone(), SaveState::Saving { dirty: false });
            return Some(Job::Single(id));
        }
        if self.flush_requested {
            self.flush_requested = false;
            if !self.modified.is_empty() {
                let ids: Vec<UnitId> = std::mem::take(&mut self.modified).into_iter().collect();
                for id in &ids {
                    self.states.insert(id.clone(), SaveState::Saving { dirty: false });
                }
                return Some(Job::Batch(ids));
            }
        }
        self.writer_busy = false;
        None
    }

    /// Record the outcome of one write
    pub fn settle(&mut self, id: &UnitId, ok: bool) {
        let remodified = matches!(
            self.state_of(id),
            SaveState::Saving { dirty: true } | SaveState::Modified
        );
        if self.immediate.contains(id) {
            self.states.insert(id.clone(), SaveState::Queued);
        } else if !ok || remodified {
            self.modified.insert(id.clone());
            self.states.insert(id.clone(), SaveState::Modified);
        } else {
            self.states.remove(id);
        }
    }

    /// Claim the writer for a full save of `extra` plus everything pending,
    /// draining both queues. `None` while the background writer still runs.
    pub fn claim_full_save<I>(&mut self, extra: I) -> Option<BTreeSet<UnitId>>
    where
        I: IntoIterator<Item = UnitId>,
    {
        if self.writer_busy {
            return None;
        }
        self.writer_busy = true;
        self.flush_requested = false;
        let mut ids: BTreeSet<UnitId> = self.immediate.drain(..).collect();
        ids.append(&mut self.modified);
        ids.extend(extra);
        for id in &ids {
            self.states.insert(id.clone(), SaveState::Saving { dirty: false });
        }
        Some(ids)
    }

    pub fn release_writer(&mut self) {
        self.writer_busy = false;
    }
}
