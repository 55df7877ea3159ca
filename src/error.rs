//! Kernel-wide error taxonomy (spec §7).
//!
//! Follows the teacher's `SystemError` shape: a `thiserror` enum with
//! helper predicates, carrying enough context (pid, host, activity) for
//! diagnostics without leaking internal representations.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
use crate::util::{HostId, MailboxId, Pid};

/// The tagged error union every simcall boundary and the actor's
/// `pending_exception` slot speaks.
#[derive(Error, Debug, Clone)]
pub enum KernelError {
    /// Target host is off or failed mid-operation.
    #[error("host {host} is off or failed")]
    HostFailure { host: HostId },

    /// A communication link failed during a Comm activity.
    #[error("network failure on mailbox {mailbox}")]
    NetworkFailure { mailbox: MailboxId },

    /// A deadline (join timeout, kill timer) was reached.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// An activity was canceled before completion.
    #[error("activity canceled")]
    Cancellation,

    /// The actor was externally killed; not catchable as a host failure.
    #[error("actor {0} forcefully killed")]
    ForcefulKill(Pid),

    /// The liveness checker found a counter-example.
    #[error("liveness violation at depth {depth}: {trace}")]
    LivenessViolation { trace: String, depth: usize },

    /// An internal invariant was broken. Always fatal.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl KernelError {
    /// Errors that a retry (e.g. re-issuing the simcall) could plausibly clear.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            KernelError::Timeout(_) | KernelError::NetworkFailure { .. }
        )
    }

    /// Errors that should terminate the whole simulation run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KernelError::InvariantViolation(_) | KernelError::LivenessViolation { .. }
        )
    }

    /// Forceful kill is deliberately excluded from "catchable" errors: it
    /// unwinds scope destructors only (spec §4.6, §7).
    pub fn is_catchable(&self) -> bool {
        !matches!(self, KernelError::ForcefulKill(_)) && !self.is_fatal()
    }
}
