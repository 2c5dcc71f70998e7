//! Pause state store
//!
//! Ordered stack of currently-paused threads. Position encodes recency: the
//! last record is the most recently paused thread. Mutated only by the
//! dispatcher and the notification reconciler in `coordinator`.

use crate::types::{PausedThread, ThreadId};
use tracing::warn;

/// Recency-ordered stack of paused-thread records
///
/// Invariant: at most one record per thread id. `push` detects and rejects
/// duplicates instead of silently allowing two records for the same thread.
#[derive(Debug, Default)]
pub struct PauseStack {
    records: Vec<PausedThread>,
}

impl PauseStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a record for a newly paused thread
    ///
    /// Returns `false` (and logs) if the thread already has a record; the
    /// stack is left unchanged in that case.
    pub fn push(&mut self, record: PausedThread) -> bool {
        if self.is_paused(record.thread) {
            warn!(
                "refusing duplicate pause record for thread {} ({})",
                record.thread, record.name
            );
            return false;
        }
        self.records.push(record);
        true
    }

    /// Remove the record for a thread, wherever it sits in the stack
    pub fn remove(&mut self, thread: ThreadId) -> Option<PausedThread> {
        let pos = self.records.iter().rposition(|r| r.thread == thread)?;
        Some(self.records.remove(pos))
    }

    /// Pop the most recent record
    pub fn pop(&mut self) -> Option<PausedThread> {
        self.records.pop()
    }

    /// Peek the most recent record
    pub fn top(&self) -> Option<&PausedThread> {
        self.records.last()
    }

    /// Look up a thread's record, scanning from most recent to oldest
    pub fn find(&self, thread: ThreadId) -> Option<&PausedThread> {
        self.records.iter().rev().find(|r| r.thread == thread)
    }

    /// Whether the thread currently has a pause record
    pub fn is_paused(&self, thread: ThreadId) -> bool {
        self.find(thread).is_some()
    }

    /// Iterate records from most recent to oldest
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &PausedThread> {
        self.records.iter().rev()
    }

    /// Number of paused threads
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no thread is paused
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of all records, oldest first
    pub fn snapshot(&self) -> Vec<PausedThread> {
        self.records.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PauseKind;

    fn record(id: u32, kind: PauseKind) -> PausedThread {
        PausedThread {
            thread: ThreadId(id),
            name: format!("thread-{id}"),
            kind,
        }
    }

    #[test]
    fn push_rejects_duplicate_thread() {
        let mut stack = PauseStack::new();
        assert!(stack.push(record(1, PauseKind::User)));
        assert!(!stack.push(record(1, PauseKind::Automatic)));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.find(ThreadId(1)).unwrap().kind, PauseKind::User);
    }

    #[test]
    fn top_is_most_recent() {
        let mut stack = PauseStack::new();
        stack.push(record(1, PauseKind::User));
        stack.push(record(2, PauseKind::Automatic));
        assert_eq!(stack.top().unwrap().thread, ThreadId(2));
    }

    #[test]
    fn remove_is_position_independent() {
        let mut stack = PauseStack::new();
        stack.push(record(1, PauseKind::User));
        stack.push(record(2, PauseKind::User));
        stack.push(record(3, PauseKind::User));

        let removed = stack.remove(ThreadId(2)).unwrap();
        assert_eq!(removed.thread, ThreadId(2));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top().unwrap().thread, ThreadId(3));
        assert!(stack.remove(ThreadId(2)).is_none());
    }

    #[test]
    fn iter_newest_first_orders_by_recency() {
        let mut stack = PauseStack::new();
        stack.push(record(1, PauseKind::User));
        stack.push(record(2, PauseKind::User));
        let ids: Vec<_> = stack.iter_newest_first().map(|r| r.thread).collect();
        assert_eq!(ids, vec![ThreadId(2), ThreadId(1)]);
    }
}
