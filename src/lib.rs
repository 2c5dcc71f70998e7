//! Thread interrupt and resume arbitration for the VM debugger
//!
//! The debug backend processes one pause/resume command at a time across all
//! guest threads, and confirms commands asynchronously and out of order
//! relative to requests. This crate serializes the traffic: it queues
//! requests from breakpoint logic and from the operator, tracks which threads
//! are paused, decides which single command to issue next, and reconciles the
//! backend's confirmation and failure notifications with the requests that
//! caused them.
//!
//! The crate is an in-process library boundary. The transport that actually
//! delivers commands to the debuggee is a collaborator: it consumes
//! [`BackendCommand`]s from the channel given to the coordinator and reports
//! outcomes through the coordinator's `notify_*` entry points. What triggers
//! a pause (breakpoints, stepping) and thread lifecycle are out of scope.
//!
//! # Example
//!
//! ```
//! use tokio::sync::mpsc;
//! use vm_interrupt::{BackendCommand, InterruptCoordinator, PauseKind, ThreadId};
//!
//! let (commands, mut transport) = mpsc::unbounded_channel();
//! let mut coordinator = InterruptCoordinator::new(commands);
//!
//! let mut ticket = coordinator.request_interrupt(ThreadId(1), "main", PauseKind::User);
//! assert!(ticket.try_issued()); // command handed to the backend
//! assert_eq!(transport.try_recv().unwrap(), BackendCommand::Interrupt(ThreadId(1)));
//!
//! // ... transport delivers the command, the debuggee stops ...
//! coordinator.notify_interrupted(ThreadId(1), "main", PauseKind::User);
//! assert!(coordinator.is_paused(ThreadId(1)));
//! ```

pub mod coordinator;
pub mod error;
pub mod pause_stack;
pub mod request_queue;
pub mod types;

// Re-export all arbitration functionality
pub use coordinator::{CoordinatorConfig, CoordinatorStatistics, InterruptCoordinator};
pub use error::InterruptError;
pub use pause_stack::PauseStack;
pub use request_queue::{PauseQueue, PauseRequest, ResumeQueue, ResumeRequest};
pub use types::{BackendCommand, IssueTicket, PauseKind, PausedThread, ThreadId};
