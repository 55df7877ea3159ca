//! Actor construction arguments, captured verbatim for `restart()` (spec
//! §4.3: "capture current construction args ... create a new actor with the
//! same args").

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::actor::handle::ActorHandle;
use crate::error::KernelError;
use crate::util::HostId;

/// Output of a running actor body. `Err` always means the actor's stack was
/// unwound by an injected exception (`pending_exception`/`iwannadie`); it is
/// not a reportable user error (spec §7: errors cross the switch as a stored
/// exception, not a normal `Result`-returning failure mode for the kernel).
pub type ActorResult = Result<(), KernelError>;

pub type BoxActorFuture = Pin<Box<dyn Future<Output = ActorResult> + Send>>;

/// User code entry point: given its own handle, returns the body future.
/// Stored as `Arc` so an [`ActorSpec`] can be cloned cheaply for `restart()`.
pub type ActorEntry = Arc<dyn Fn(Arc<ActorHandle>) -> BoxActorFuture + Send + Sync>;

/// Everything needed to (re)create an actor with identical semantics.
#[derive(Clone)]
pub struct ActorSpec {
    pub name: String,
    pub host: HostId,
    pub properties: HashMap<String, String>,
    pub auto_restart: bool,
    pub entry: ActorEntry,
}

impl fmt::Debug for ActorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSpec")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("properties", &self.properties)
            .field("auto_restart", &self.auto_restart)
            .finish()
    }
}

impl ActorSpec {
    pub fn new(name: impl Into<String>, host: HostId, entry: ActorEntry) -> Self {
        Self {
            name: name.into(),
            host,
            properties: HashMap::new(),
            auto_restart: false,
            entry,
        }
    }

    pub fn with_auto_restart(mut self, auto_restart: bool) -> Self {
        self.auto_restart = auto_restart;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
