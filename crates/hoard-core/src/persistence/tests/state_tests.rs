use crate::persistence::state::{Job, QueueState, SaveState};

use super::id;

#[test]
fn test_mark_modified_is_idempotent() {
    let mut state = QueueState::default();
    let a = id("a");

    state.mark_modified(&a);
    state.mark_modified(&a);

    assert_eq!(state.state_of(&a), SaveState::Modified);
    assert_eq!(state.pending_modified(), 1);
    assert_eq!(state.pending_immediate(), 0);
}

#[test]
fn test_writer_only_claimed_with_work() {
    let mut state = QueueState::default();
    assert!(!state.begin_writer(), "nothing queued");

    state.mark_modified(&id("a"));
    assert!(!state.begin_writer(), "modified units wait for a flush");

    state.request_flush();
    assert!(state.begin_writer());
    assert!(!state.begin_writer(), "single flight");
}

#[test]
fn test_immediate_moves_unit_out_of_modified_set() {
    let mut state = QueueState::default();
    let a = id("a");

    state.mark_modified(&a);
    state.queue_immediate(&a);
    state.queue_immediate(&a);

    assert_eq!(state.state_of(&a), SaveState::Queued);
    assert_eq!(state.pending_modified(), 0);
    assert_eq!(state.pending_immediate(), 1, "duplicate requests collapse");

    // Routine mutations of a queued unit ride along with the queued write
    state.mark_modified(&a);
    assert_eq!(state.state_of(&a), SaveState::Queued);
}

#[test]
fn test_immediate_jobs_run_before_batch_flush() {
    let mut state = QueueState::default();
    let (a, b, c) = (id("a"), id("b"), id("c"));
    state.mark_modified(&b);
    state.mark_modified(&c);
    state.queue_immediate(&a);
    state.request_flush();
    assert!(state.begin_writer());

    assert_eq!(state.next_job(), Some(Job::Single(a.clone())));
    assert_eq!(state.state_of(&a), SaveState::Saving { dirty: false });
    state.settle(&a, true);
    assert_eq!(state.state_of(&a), SaveState::Untracked);

    assert_eq!(state.next_job(), Some(Job::Batch(vec![b.clone(), c.clone()])));
    assert_eq!(state.pending_modified(), 0, "set cleared when the batch starts");
    state.settle(&b, true);
    state.settle(&c, true);

    assert_eq!(state.next_job(), None);
    assert!(!state.writer_busy());
}

#[test]
fn test_mutation_during_save_returns_to_modified() {
    let mut state = QueueState::default();
    let a = id("a");
    state.mark_modified(&a);
    state.request_flush();
    assert!(state.begin_writer());
    assert_eq!(state.next_job(), Some(Job::Batch(vec![a.clone()])));

    state.mark_modified(&a);
    assert_eq!(state.state_of(&a), SaveState::Saving { dirty: true });

    state.settle(&a, true);
    assert_eq!(state.state_of(&a), SaveState::Modified);
    assert_eq!(state.pending_modified(), 1);
}

#[test]
fn test_failed_write_is_retried_by_next_flush() {
    let mut state = QueueState::default();
    let a = id("a");
    state.queue_immediate(&a);
    assert!(state.begin_writer());
    assert_eq!(state.next_job(), Some(Job::Single(a.clone())));

    state.settle(&a, false);
    assert_eq!(state.state_of(&a), SaveState::Modified);
    assert_eq!(state.next_job(), None, "failed units wait for the flush");

    state.request_flush();
    assert!(state.begin_writer());
    assert_eq!(state.next_job(), Some(Job::Batch(vec![a])));
}

#[test]
fn test_structural_change_during_save_requeues() {
    let mut state = QueueState::default();
    let a = id("a");
    state.queue_immediate(&a);
    assert!(state.begin_writer());
    assert_eq!(state.next_job(), Some(Job::Single(a.clone())));

    state.queue_immediate(&a);
    state.queue_immediate(&a);
    assert_eq!(state.pending_immediate(), 1);

    state.settle(&a, true);
    assert_eq!(state.state_of(&a), SaveState::Queued);
    assert_eq!(state.next_job(), Some(Job::Single(a)));
}

#[test]
fn test_full_save_claim_drains_everything() {
    let mut state = QueueState::default();
    let (a, b, c) = (id("a"), id("b"), id("c"));
    state.queue_immediate(&a);
    state.mark_modified(&b);

    let claimed = state.claim_full_save(vec![b.clone(), c.clone()]).expect("writer idle");
    assert_eq!(claimed.into_iter().collect::<Vec<_>>(), vec![a.clone(), b.clone(), c.clone()]);
    assert!(state.writer_busy());
    assert_eq!(state.pending_immediate(), 0);
    assert_eq!(state.pending_modified(), 0);
    assert!(state.claim_full_save(Vec::new()).is_none(), "writer already held");

    state.mark_modified(&c);
    for unit in [&a, &b, &c] {
        state.settle(unit, true);
    }
    state.release_writer();
    assert_eq!(state.state_of(&a), SaveState::Untracked);
    assert_eq!(state.state_of(&c), SaveState::Modified);
}
