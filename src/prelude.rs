//! Convenient glob import for building against the kernel.
//!
//! ```rust
//! use simkernel::prelude::*;
//! ```

// Scheduling core
pub use crate::actor::{ActorEntry, ActorHandle, ActorLifecycle, ActorLifecycleState, ActorSpec};
pub use crate::activity::{Activity, ActivityKind, ActivityOutcome, ActivityState, CommDirection};
pub use crate::host::Host;
pub use crate::maestro::{Maestro, RunSummary};
pub use crate::mailbox::{Mailbox, MailboxRegistry};
pub use crate::registry::Registry;
pub use crate::resource::{ResourceEvent, ResourceModel, VirtualClockModel};
pub use crate::simcall::{SimcallKind, SimcallOutcome};

// Liveness model checking
pub use crate::mc::{
    Automaton, AutomatonState, CheckerLimits, CheckerModel, Label, LivenessChecker,
    PropositionalSymbol, Session, Snapshot, Transition,
};

// External interfaces
pub use crate::mpi::Deployment as MpiDeployment;

// Infrastructure
pub use crate::config::KernelConfig;
pub use crate::error::KernelError;
pub use crate::util::{HostId, MailboxId, Pid};
