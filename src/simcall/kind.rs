//! Tagged call kinds and their return payloads.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::activity::ActivityOutcome;
use crate::actor::spec::ActorSpec;
use crate::error::KernelError;
use crate::util::{HostId, MailboxId, Pid};

/// The arguments an actor posts when it raises a simcall. `NONE` from the
/// spec's description is represented by `pending_simcall` being `None` on
/// [`crate::actor::handle::ActorHandle`] rather than as a variant here.
#[derive(Debug, Clone)]
pub enum SimcallKind {
    Exec { host: HostId, flops: f64 },
    CommSend { mailbox: MailboxId, buffer: Vec<u8> },
    CommRecv { mailbox: MailboxId },
    Sleep { duration: Duration },
    /// Backed by a placeholder Sync/Exec activity when not already waiting.
    Suspend,
    Resume { target: Pid },
    Kill { target: Pid },
    KillAll,
    Join { target: Pid, timeout: Option<Duration> },
    SetKillTime { at_millis: u64 },
    Daemonize,
    Undaemonize,
    ActorCreate { spec: ActorSpec },
    ThrowException { target: Pid, error: KernelError },
    /// Explicit yield with no blocking semantics (spec §5 suspension points).
    Yield,
    /// Capture `target`'s construction args, kill it, and re-create it with
    /// the same args (spec §4.3 `restart`).
    Restart { target: Pid },
}

impl SimcallKind {
    /// Short label for dot/trace output (spec §4.5 counter-example trace).
    pub fn label(&self) -> String {
        match self {
            SimcallKind::Exec { host, flops } => format!("exec({host}, {flops}flops)"),
            SimcallKind::CommSend { mailbox, .. } => format!("send({mailbox})"),
            SimcallKind::CommRecv { mailbox } => format!("recv({mailbox})"),
            SimcallKind::Sleep { duration } => format!("sleep({duration:?})"),
            SimcallKind::Suspend => "suspend".to_string(),
            SimcallKind::Resume { target } => format!("resume({target})"),
            SimcallKind::Kill { target } => format!("kill({target})"),
            SimcallKind::KillAll => "kill_all".to_string(),
            SimcallKind::Join { target, .. } => format!("join({target})"),
            SimcallKind::SetKillTime { at_millis } => format!("set_kill_time({at_millis})"),
            SimcallKind::Daemonize => "daemonize".to_string(),
            SimcallKind::Undaemonize => "undaemonize".to_string(),
            SimcallKind::ActorCreate { spec } => format!("create({})", spec.name),
            SimcallKind::ThrowException { target, .. } => format!("throw_exception({target})"),
            SimcallKind::Yield => "yield".to_string(),
            SimcallKind::Restart { target } => format!("restart({target})"),
        }
    }
}

/// What a simcall resolves to, written into the issuer's result slot.
#[derive(Debug, Clone)]
pub enum SimcallOutcome {
    Unit,
    Pid(Pid),
    Bool(bool),
    Activity(ActivityOutcome),
    Err(KernelError),
}

impl SimcallOutcome {
    pub fn into_result(self) -> Result<SimcallOutcome, KernelError> {
        match self {
            SimcallOutcome::Err(e) => Err(e),
            SimcallOutcome::Activity(ActivityOutcome::Err(e)) => Err(e),
            other => Ok(other),
        }
    }
}
