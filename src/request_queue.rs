//! Pending request queues
//!
//! Two insertion-ordered queues feed the dispatcher: one for pause requests
//! and one for resume requests. Dispatch order is not simple FIFO: the pause
//! queue is consumed newest-first when any pending pause will do, but is also
//! searched front-to-back for the first automatic-kind request; the resume
//! queue is always searched by thread id, because a resume must target the
//! thread currently on top of the pause stack.

use crate::types::{PauseKind, ThreadId};
use std::collections::VecDeque;
use tokio::sync::oneshot;

/// A queued request to pause a thread
#[derive(Debug)]
pub struct PauseRequest {
    /// Thread to pause
    pub thread: ThreadId,
    /// Thread name
    pub name: String,
    /// How the pause was triggered
    pub kind: PauseKind,
    /// Resolved when the interrupt command is issued to the backend
    pub done: oneshot::Sender<()>,
}

/// A queued request to resume a thread
#[derive(Debug)]
pub struct ResumeRequest {
    /// Thread to resume
    pub thread: ThreadId,
    /// Thread name
    pub name: String,
    /// Resolved when the resume command is issued to the backend
    pub done: oneshot::Sender<()>,
}

/// Insertion-ordered queue of pending pause requests
#[derive(Debug, Default)]
pub struct PauseQueue {
    requests: VecDeque<PauseRequest>,
}

impl PauseQueue {
    /// Enqueue a pause request
    pub fn push(&mut self, request: PauseRequest) {
        self.requests.push_back(request);
    }

    /// Take the most recently enqueued request (last-writer priority)
    pub fn pop_newest(&mut self) -> Option<PauseRequest> {
        self.requests.pop_back()
    }

    /// Take the oldest automatic-kind request, if any
    pub fn take_first_automatic(&mut self) -> Option<PauseRequest> {
        let pos = self
            .requests
            .iter()
            .position(|r| r.kind == PauseKind::Automatic)?;
        self.requests.remove(pos)
    }

    /// Number of pending pause requests
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Insertion-ordered queue of pending resume requests
#[derive(Debug, Default)]
pub struct ResumeQueue {
    requests: VecDeque<ResumeRequest>,
}

impl ResumeQueue {
    /// Enqueue a resume request
    pub fn push(&mut self, request: ResumeRequest) {
        self.requests.push_back(request);
    }

    /// Take the first request targeting the given thread, if any
    pub fn take_for_thread(&mut self, thread: ThreadId) -> Option<ResumeRequest> {
        let pos = self.requests.iter().position(|r| r.thread == thread)?;
        self.requests.remove(pos)
    }

    /// Number of pending resume requests
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pause_request(id: u32, kind: PauseKind) -> PauseRequest {
        let (done, _rx) = oneshot::channel();
        PauseRequest {
            thread: ThreadId(id),
            name: format!("thread-{id}"),
            kind,
            done,
        }
    }

    fn resume_request(id: u32) -> ResumeRequest {
        let (done, _rx) = oneshot::channel();
        ResumeRequest {
            thread: ThreadId(id),
            name: format!("thread-{id}"),
            done,
        }
    }

    #[test]
    fn pop_newest_is_lifo() {
        let mut queue = PauseQueue::default();
        queue.push(pause_request(1, PauseKind::User));
        queue.push(pause_request(2, PauseKind::User));
        assert_eq!(queue.pop_newest().unwrap().thread, ThreadId(2));
        assert_eq!(queue.pop_newest().unwrap().thread, ThreadId(1));
        assert!(queue.pop_newest().is_none());
    }

    #[test]
    fn take_first_automatic_skips_user_requests() {
        let mut queue = PauseQueue::default();
        queue.push(pause_request(1, PauseKind::User));
        queue.push(pause_request(2, PauseKind::Automatic));
        queue.push(pause_request(3, PauseKind::Automatic));

        let taken = queue.take_first_automatic().unwrap();
        assert_eq!(taken.thread, ThreadId(2));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn take_first_automatic_on_user_only_queue_is_none() {
        let mut queue = PauseQueue::default();
        queue.push(pause_request(1, PauseKind::User));
        assert!(queue.take_first_automatic().is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn resume_queue_searches_by_thread_id() {
        let mut queue = ResumeQueue::default();
        queue.push(resume_request(1));
        queue.push(resume_request(2));

        assert!(queue.take_for_thread(ThreadId(3)).is_none());
        let taken = queue.take_for_thread(ThreadId(2)).unwrap();
        assert_eq!(taken.thread, ThreadId(2));
        assert_eq!(queue.len(), 1);
    }
}
