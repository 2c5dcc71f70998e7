//! Core types for interrupt/resume arbitration
//!
//! This module defines the thread identifier, pause classification, the pause
//! record tracked for every paused thread, the command enum handed to the
//! backend transport, and the issue ticket returned to callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::oneshot;

/// Opaque identifier for a guest execution thread
///
/// Stable for the lifetime of the thread; never reused while any record
/// referencing it is still held by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub u32);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a pause, driving priority and blocking rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauseKind {
    /// Pause triggered by an internal mechanism (e.g. a breakpoint firing)
    Automatic,
    /// Pause explicitly requested by an operator or control surface
    User,
}

/// Record of a thread currently believed to be paused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PausedThread {
    /// Thread ID
    pub thread: ThreadId,
    /// Thread name (for operator-facing messages)
    pub name: String,
    /// How the pause was triggered
    pub kind: PauseKind,
}

/// Command issued to the backend transport collaborator
///
/// The coordinator emits at most one of these at a time; the transport must
/// answer each with a matching confirmation or failure notification carrying
/// the same thread id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendCommand {
    /// Pause the given thread
    Interrupt(ThreadId),
    /// Resume the given thread
    Resume(ThreadId),
}

/// Completion handle for a pause/resume request
///
/// Resolves when the command has been *issued* to the backend, not when the
/// backend has confirmed it. Confirmation is delivered separately through the
/// coordinator's notification entry points. A ticket for a request that is
/// never selected by the dispatcher stays pending indefinitely.
#[derive(Debug)]
pub struct IssueTicket {
    rx: oneshot::Receiver<()>,
}

impl IssueTicket {
    /// Create a pending ticket and the sender that resolves it
    pub(crate) fn pending() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Create a ticket that is already resolved (no-op requests)
    pub(crate) fn resolved() -> Self {
        let (tx, rx) = oneshot::channel();
        // Receiver is held right here, the send cannot fail
        let _ = tx.send(());
        Self { rx }
    }

    /// Wait until the command has been issued to the backend
    pub async fn issued(self) {
        // An error means the coordinator was dropped with the request still
        // queued; treat that the same as "never issued" and return.
        let _ = self.rx.await;
    }

    /// Non-blocking check whether the command has been issued
    ///
    /// Consumes the signal: returns `true` exactly once for an issued command.
    pub fn try_issued(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_ticket_reports_issued() {
        let mut ticket = IssueTicket::resolved();
        assert!(ticket.try_issued());
    }

    #[test]
    fn pending_ticket_resolves_on_send() {
        let (tx, mut ticket) = IssueTicket::pending();
        assert!(!ticket.try_issued());
        tx.send(()).unwrap();
        assert!(ticket.try_issued());
    }

    #[test]
    fn issued_completes_once_sent() {
        let (tx, ticket) = IssueTicket::pending();
        tx.send(()).unwrap();
        tokio_test::block_on(ticket.issued());
    }

    #[test]
    fn issued_returns_when_coordinator_dropped() {
        let (tx, ticket) = IssueTicket::pending();
        drop(tx);
        tokio_test::block_on(ticket.issued());
    }

    #[test]
    fn thread_id_displays_raw_value() {
        assert_eq!(ThreadId(42).to_string(), "42");
    }
}
