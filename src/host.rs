//! Minimal host model (spec §3 Host, §6 consumed contract).
//!
//! Grounded on `ActorImpl.cpp`'s `host_->pimpl_->process_list_` usage: a
//! host is little more than an on/off flag and the resident-actor list that
//! gets force-failed when the flag flips off.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use crate::util::{HostId, Pid};

/// `is_on()`, `get_name()`, `get_cname()`, and a resident-actor list handle
/// — the exact external contract spec §6 says the core consumes.
#[derive(Debug)]
pub struct Host {
    id: HostId,
    on: AtomicBool,
    residents: Mutex<Vec<Pid>>,
}

impl Host {
    pub fn new(id: HostId) -> Arc<Self> {
        Arc::new(Self {
            id,
            on: AtomicBool::new(true),
            residents: Mutex::new(Vec::new()),
        })
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Acquire)
    }

    pub fn name(&self) -> &HostId {
        &self.id
    }

    /// Alias of `name`, for parity with the consumed contract's
    /// `get_cname()`.
    pub fn cname(&self) -> &str {
        self.id.as_str()
    }

    pub fn turn_on(&self) {
        self.on.store(true, Ordering::Release);
    }

    /// Turning a host off forcefully fails all its resident activities
    /// (spec §3); returns the resident pids so the caller can drive that
    /// failure through the maestro loop.
    pub fn turn_off(&self) -> Vec<Pid> {
        self.on.store(false, Ordering::Release);
        self.residents.lock().clone()
    }

    pub fn add_resident(&self, pid: Pid) {
        self.residents.lock().push(pid);
    }

    pub fn remove_resident(&self, pid: Pid) {
        self.residents.lock().retain(|p| *p != pid);
    }

    pub fn residents(&self) -> Vec<Pid> {
        self.residents.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_off_returns_residents() {
        let host = Host::new(HostId::new("h"));
        host.add_resident(Pid::MAESTRO);
        let residents = host.turn_off();
        assert!(!host.is_on());
        assert_eq!(residents, vec![Pid::MAESTRO]);
    }

    #[test]
    fn cname_aliases_name() {
        let host = Host::new(HostId::new("h1"));
        assert_eq!(host.cname(), host.name().as_str());
    }
}
