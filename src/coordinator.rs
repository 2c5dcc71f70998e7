//! Interrupt coordinator
//!
//! Serializes pause and resume commands against a backend that can only
//! process one outstanding command across all threads. Callers enqueue
//! requests through [`InterruptCoordinator::request_interrupt`] and
//! [`InterruptCoordinator::request_resume`]; the transport collaborator
//! receives [`BackendCommand`]s over the channel handed in at construction
//! and answers each one through the `notify_*` entry points.
//!
//! Everything here is single-threaded and cooperative: every entry point runs
//! to completion before the next one executes, and the in-flight guard is the
//! only synchronization the protocol needs.

use crate::error::InterruptError;
use crate::pause_stack::PauseStack;
use crate::request_queue::{PauseQueue, PauseRequest, ResumeQueue, ResumeRequest};
use crate::types::{BackendCommand, IssueTicket, PauseKind, PausedThread, ThreadId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Interrupt coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Re-invoke the dispatcher after a failure notification
    ///
    /// A failure clears the in-flight guard, so without a re-dispatch the
    /// next queued request would wait for an unrelated state change. Enabled
    /// by default for liveness.
    pub redispatch_on_failure: bool,
    /// Log a warning when either request queue grows past this depth
    pub queue_depth_warning: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            redispatch_on_failure: true,
            queue_depth_warning: 32,
        }
    }
}

/// Snapshot of coordinator state and counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorStatistics {
    /// Number of threads currently recorded as paused
    pub paused_threads: usize,
    /// Pending pause requests
    pub pending_interrupts: usize,
    /// Pending resume requests
    pub pending_resumes: usize,
    /// Thread with an unconfirmed command outstanding, if any
    pub in_flight: Option<ThreadId>,
    /// Commands handed to the backend
    pub commands_issued: u64,
    /// Confirmations received from the backend
    pub commands_confirmed: u64,
    /// Failures received from the backend
    pub commands_failed: u64,
}

/// Arbitrates pause/resume commands for a single debugging session
///
/// Owns the pause stack, both request queues, and the in-flight guard. One
/// instance per session; collaborators get an explicit `&mut` handle, there
/// is no global state.
#[derive(Debug)]
pub struct InterruptCoordinator {
    config: CoordinatorConfig,
    stack: PauseStack,
    pause_queue: PauseQueue,
    resume_queue: ResumeQueue,
    /// At most one pause/resume command is outstanding system-wide
    in_flight: Option<ThreadId>,
    commands: mpsc::UnboundedSender<BackendCommand>,
    commands_issued: u64,
    commands_confirmed: u64,
    commands_failed: u64,
}

impl InterruptCoordinator {
    /// Create a coordinator with default configuration
    ///
    /// `commands` is the transport collaborator's end of the command channel;
    /// every command sent on it must eventually be answered through one of
    /// the `notify_*` entry points.
    pub fn new(commands: mpsc::UnboundedSender<BackendCommand>) -> Self {
        Self::with_config(CoordinatorConfig::default(), commands)
    }

    /// Create a coordinator with an explicit configuration
    pub fn with_config(
        config: CoordinatorConfig,
        commands: mpsc::UnboundedSender<BackendCommand>,
    ) -> Self {
        Self {
            config,
            stack: PauseStack::new(),
            pause_queue: PauseQueue::default(),
            resume_queue: ResumeQueue::default(),
            in_flight: None,
            commands,
            commands_issued: 0,
            commands_confirmed: 0,
            commands_failed: 0,
        }
    }

    /// Request that a thread be paused
    ///
    /// A thread that is already paused resolves immediately with no state
    /// change. Otherwise the request is queued and the returned ticket
    /// resolves once an interrupt command for this thread is handed to the
    /// backend, which may be never if the request is never selected.
    pub fn request_interrupt(
        &mut self,
        thread: ThreadId,
        name: impl Into<String>,
        kind: PauseKind,
    ) -> IssueTicket {
        let name = name.into();
        if self.stack.is_paused(thread) {
            warn!(
                "interrupt requested for thread {} ({}) which is already paused",
                thread, name
            );
            return IssueTicket::resolved();
        }

        let (done, ticket) = IssueTicket::pending();
        self.pause_queue.push(PauseRequest {
            thread,
            name,
            kind,
            done,
        });
        if self.pause_queue.len() > self.config.queue_depth_warning {
            warn!(
                "pause queue depth {} exceeds {}",
                self.pause_queue.len(),
                self.config.queue_depth_warning
            );
        }
        self.run_dispatch();
        ticket
    }

    /// Request that a thread be resumed
    ///
    /// A thread with no pause record resolves immediately with no state
    /// change. Resuming a user-paused thread fails with
    /// [`InterruptError::ResumeBlocked`] while other user-paused threads sit
    /// above it on the pause stack; those must be resumed first.
    pub fn request_resume(
        &mut self,
        thread: ThreadId,
        name: impl Into<String>,
    ) -> Result<IssueTicket, InterruptError> {
        let name = name.into();
        let Some(record) = self.stack.find(thread) else {
            warn!(
                "resume requested for thread {} ({}) which is not paused",
                thread, name
            );
            return Ok(IssueTicket::resolved());
        };

        if record.kind == PauseKind::User {
            let hindering = self.hindering_pauses(thread);
            if !hindering.is_empty() {
                return Err(InterruptError::ResumeBlocked {
                    thread: name,
                    hindering,
                });
            }
        }

        let (done, ticket) = IssueTicket::pending();
        self.resume_queue.push(ResumeRequest { thread, name, done });
        if self.resume_queue.len() > self.config.queue_depth_warning {
            warn!(
                "resume queue depth {} exceeds {}",
                self.resume_queue.len(),
                self.config.queue_depth_warning
            );
        }
        self.run_dispatch();
        Ok(ticket)
    }

    /// Backend confirmed a pause
    ///
    /// Also covers backend-initiated pauses that were never requested (e.g. a
    /// breakpoint fired directly in the debuggee): a missing record is
    /// created rather than warned about.
    pub fn notify_interrupted(
        &mut self,
        thread: ThreadId,
        name: impl Into<String>,
        kind: PauseKind,
    ) {
        let name = name.into();
        self.clear_guard(thread, "interrupt confirmation");
        self.commands_confirmed += 1;
        if !self.stack.is_paused(thread) {
            debug!(
                "interrupt confirmation for thread {} ({}) without a record; recording pause",
                thread, name
            );
            self.stack.push(PausedThread { thread, name, kind });
        }
        self.run_dispatch();
    }

    /// Backend failed to pause a thread
    ///
    /// Rolls back the speculative pause record pushed at issue time. Removal
    /// is idempotent: a replayed failure after a confirmed resume has nothing
    /// left to remove and changes nothing.
    pub fn notify_interrupt_failed(&mut self, thread: ThreadId, name: impl Into<String>) {
        let name = name.into();
        self.clear_guard(thread, "interrupt failure");
        self.commands_failed += 1;
        if self.stack.remove(thread).is_some() {
            warn!(
                "interrupt failed for thread {} ({}); rolled back pause record",
                thread, name
            );
        } else {
            warn!(
                "interrupt failed for thread {} ({}); no pause record to roll back",
                thread, name
            );
        }
        if self.config.redispatch_on_failure {
            self.run_dispatch();
        }
    }

    /// Backend confirmed a resume
    pub fn notify_resumed(&mut self, thread: ThreadId, name: impl Into<String>) {
        let name = name.into();
        self.commands_confirmed += 1;
        if !self.stack.is_paused(thread) {
            warn!(
                "resume confirmation for thread {} ({}) with no pause record",
                thread, name
            );
        } else if self.stack.top().map(|r| r.thread) == Some(thread) {
            self.stack.pop();
        } else {
            warn!(
                "out-of-order resume confirmation for thread {} ({}); removing record below the top",
                thread, name
            );
            self.stack.remove(thread);
        }
        self.clear_guard(thread, "resume confirmation");
        self.run_dispatch();
    }

    /// Backend failed to resume a thread
    ///
    /// The pause record stays: the thread is presumed still paused.
    pub fn notify_resume_failed(&mut self, thread: ThreadId, name: impl Into<String>) {
        let name = name.into();
        self.clear_guard(thread, "resume failure");
        self.commands_failed += 1;
        warn!("resume failed for thread {} ({})", thread, name);
        if self.config.redispatch_on_failure {
            self.run_dispatch();
        }
    }

    /// Decide and issue the single next command, if any
    ///
    /// Invoked after every state-changing event. First match wins:
    /// 1. a command is in flight: wait for its notification;
    /// 2. with a non-empty stack, only the top thread's resume may go out,
    ///    except that an automatic pause on top also lets further automatic
    ///    pause requests through;
    /// 3. with an empty stack, the newest queued pause request wins,
    ///    whatever its kind.
    fn run_dispatch(&mut self) {
        if let Some(busy) = self.in_flight {
            debug!("dispatch deferred: command for thread {} in flight", busy);
            return;
        }

        if let Some((top_thread, top_kind)) = self.stack.top().map(|r| (r.thread, r.kind)) {
            if let Some(request) = self.resume_queue.take_for_thread(top_thread) {
                self.issue_resume(request);
                return;
            }

            if top_kind == PauseKind::Automatic {
                // Only further automatic pauses may interleave under an
                // automatic pause; user requests stay queued either way.
                if let Some(request) = self.pause_queue.take_first_automatic() {
                    self.issue_interrupt(request);
                }
                return;
            }

            // User pause on top: nothing but its own resume may proceed.
            return;
        }

        if let Some(request) = self.pause_queue.pop_newest() {
            self.issue_interrupt(request);
        }
    }

    /// Hand a pause command to the backend
    fn issue_interrupt(&mut self, request: PauseRequest) {
        debug!(
            "issuing interrupt for thread {} ({})",
            request.thread, request.name
        );
        // Speculative: rolled back by notify_interrupt_failed. push() logs
        // and rejects the record if one unexpectedly exists already.
        self.stack.push(PausedThread {
            thread: request.thread,
            name: request.name,
            kind: request.kind,
        });
        self.in_flight = Some(request.thread);
        self.send_command(BackendCommand::Interrupt(request.thread));
        // Resolution means "command issued", not "thread paused".
        let _ = request.done.send(());
    }

    /// Hand a resume command to the backend
    ///
    /// The pause record is removed only on confirmation, not here.
    fn issue_resume(&mut self, request: ResumeRequest) {
        debug!(
            "issuing resume for thread {} ({})",
            request.thread, request.name
        );
        self.in_flight = Some(request.thread);
        self.send_command(BackendCommand::Resume(request.thread));
        let _ = request.done.send(());
    }

    fn send_command(&mut self, command: BackendCommand) {
        self.commands_issued += 1;
        if let Err(err) = self.commands.send(command) {
            error!("backend command channel closed; dropping {:?}", err.0);
        }
    }

    /// Clear the in-flight guard if it matches the notifying thread
    ///
    /// A mismatch is a protocol desync: logged, but the guard is left alone.
    /// Clearing another thread's guard could release a second command while
    /// one is genuinely outstanding.
    fn clear_guard(&mut self, thread: ThreadId, what: &str) {
        match self.in_flight {
            Some(busy) if busy == thread => self.in_flight = None,
            Some(busy) => warn!(
                "desync: {} for thread {} while command for thread {} is in flight",
                what, thread, busy
            ),
            None => {}
        }
    }

    /// User-paused threads sitting above `thread` on the pause stack
    ///
    /// Scans from the most recent pause toward the oldest, stopping at the
    /// target's own record; automatic pauses along the way do not hinder.
    /// Names come back newest first, the order they must be resumed in.
    fn hindering_pauses(&self, thread: ThreadId) -> Vec<String> {
        let mut hindering = Vec::new();
        for record in self.stack.iter_newest_first() {
            if record.thread == thread {
                break;
            }
            if record.kind == PauseKind::User {
                hindering.push(record.name.clone());
            }
        }
        hindering
    }

    /// Whether the thread currently has a pause record
    pub fn is_paused(&self, thread: ThreadId) -> bool {
        self.stack.is_paused(thread)
    }

    /// All paused threads, oldest pause first
    pub fn paused_threads(&self) -> Vec<PausedThread> {
        self.stack.snapshot()
    }

    /// Snapshot of state and counters
    pub fn statistics(&self) -> CoordinatorStatistics {
        CoordinatorStatistics {
            paused_threads: self.stack.len(),
            pending_interrupts: self.pause_queue.len(),
            pending_resumes: self.resume_queue.len(),
            in_flight: self.in_flight,
            commands_issued: self.commands_issued,
            commands_confirmed: self.commands_confirmed,
            commands_failed: self.commands_failed,
        }
    }
}
