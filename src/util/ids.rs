// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Identity of an actor: monotonically assigned, never reused.
///
/// Mirrors `ActorImpl::pid_`/`maxpid`: every `Pid` a registry hands out is
/// strictly greater than every `Pid` handed out before it, which the liveness
/// checker and the test suite both rely on for reproducible ordering.
///
/// # Example
/// ```rust
/// use simkernel::util::PidAllocator;
///
/// let alloc = PidAllocator::new();
/// let a = alloc.next();
/// let b = alloc.next();
/// assert!(b.as_u64() > a.as_u64());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pid(u64);

impl Pid {
    /// The pid reserved for maestro itself; never issued to a user actor.
    pub const MAESTRO: Pid = Pid(0);

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid#{}", self.0)
    }
}

/// Issues strictly increasing [`Pid`]s. Shared by the actor registry.
#[derive(Debug)]
pub struct PidAllocator {
    next: AtomicU64,
}

impl PidAllocator {
    pub fn new() -> Self {
        // 0 is reserved for maestro, so user actors start at 1.
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next(&self) -> Pid {
        Pid(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for PidAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of a simulated host (`Host::get_cname()` in the external contract).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostId(String);

impl HostId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HostId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for HostId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Name of a mailbox, the key Comm activities match against (spec §4.2:
/// "matching discipline is FIFO per mailbox within one direction").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MailboxId(String);

impl MailboxId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MailboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MailboxId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MailboxId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_allocator_is_monotonic() {
        let alloc = PidAllocator::new();
        let pids: Vec<_> = (0..100).map(|_| alloc.next()).collect();
        for window in pids.windows(2) {
            assert!(window[1].as_u64() > window[0].as_u64());
        }
    }

    #[test]
    fn pid_allocator_never_issues_maestro() {
        let alloc = PidAllocator::new();
        assert_ne!(alloc.next(), Pid::MAESTRO);
    }

    #[test]
    fn host_id_display() {
        let h = HostId::new("host-a");
        assert_eq!(format!("{h}"), "host-a");
    }

    #[test]
    fn mailbox_id_equality() {
        let a: MailboxId = "m".into();
        let b: MailboxId = "m".into();
        assert_eq!(a, b);
    }
}
