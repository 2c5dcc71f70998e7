//! Error types for the interrupt coordinator

use thiserror::Error;

/// Caller-facing errors from the interrupt coordinator
///
/// Redundant requests (pausing an already-paused thread, resuming a thread
/// that is not paused) are not errors; they resolve successfully with a
/// logged warning. Backend protocol anomalies are repaired and logged, never
/// surfaced here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterruptError {
    /// Resuming the thread requires resuming other user-paused threads first
    #[error("cannot resume thread '{thread}': blocked by paused threads [{}]", hindering.join(", "))]
    ResumeBlocked {
        /// Name of the thread the caller tried to resume
        thread: String,
        /// Names of the user-paused threads that must be resumed first,
        /// newest first (the order they have to be resumed in)
        hindering: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_blocked_lists_hindering_names() {
        let err = InterruptError::ResumeBlocked {
            thread: "worker-0".to_string(),
            hindering: vec!["worker-2".to_string(), "worker-1".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "cannot resume thread 'worker-0': blocked by paused threads [worker-2, worker-1]"
        );
    }
}
