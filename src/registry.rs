//! The global actor and host registry, owned exclusively by maestro (spec
//! §3 Actor ownership, §5 "the global actor registry ... mutated only by
//! maestro"). Grounded on the teacher's `broker::registry` DashMap idiom,
//! retargeted from message routing to pid/host bookkeeping.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use crate::actor::ActorHandle;
use crate::host::Host;
use crate::util::{HostId, Pid, PidAllocator};

#[derive(Default)]
pub struct Registry {
    pid_alloc: PidAllocator,
    actors: DashMap<Pid, Arc<ActorHandle>>,
    hosts: DashMap<HostId, Arc<Host>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_pid(&self) -> Pid {
        self.pid_alloc.next()
    }

    pub fn insert_actor(&self, handle: Arc<ActorHandle>) {
        self.actors.insert(handle.pid, handle);
    }

    pub fn remove_actor(&self, pid: Pid) -> Option<Arc<ActorHandle>> {
        self.actors.remove(&pid).map(|(_, v)| v)
    }

    pub fn get_actor(&self, pid: Pid) -> Option<Arc<ActorHandle>> {
        self.actors.get(&pid).map(|e| Arc::clone(e.value()))
    }

    pub fn live_actors(&self) -> Vec<Arc<ActorHandle>> {
        self.actors.iter().map(|e| Arc::clone(e.value())).collect()
    }

    pub fn non_daemon_count(&self) -> usize {
        self.actors
            .iter()
            .filter(|e| !e.value().is_daemon() && !e.value().is_finished())
            .count()
    }

    pub fn get_or_create_host(&self, id: &HostId) -> Arc<Host> {
        Arc::clone(
            &self
                .hosts
                .entry(id.clone())
                .or_insert_with(|| Host::new(id.clone())),
        )
    }

    pub fn get_host(&self, id: &HostId) -> Option<Arc<Host>> {
        self.hosts.get(id).map(|e| Arc::clone(e.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorSpec;

    fn spec(name: &str) -> ActorSpec {
        ActorSpec::new(
            name,
            HostId::new("h"),
            Arc::new(|_h| Box::pin(async { Ok(()) })),
        )
    }

    #[test]
    fn pid_allocation_is_unique_and_monotonic() {
        let reg = Registry::new();
        let a = reg.next_pid();
        let b = reg.next_pid();
        assert!(b.as_u64() > a.as_u64());
    }

    #[test]
    fn insert_and_remove_round_trip() {
        let reg = Registry::new();
        let pid = reg.next_pid();
        let handle = ActorHandle::new(pid, Pid::MAESTRO, spec("a"));
        reg.insert_actor(Arc::clone(&handle));
        assert!(reg.get_actor(pid).is_some());
        reg.remove_actor(pid);
        assert!(reg.get_actor(pid).is_none());
    }

    #[test]
    fn host_registry_reuses_host_by_id() {
        let reg = Registry::new();
        let id = HostId::new("h1");
        let a = reg.get_or_create_host(&id);
        let b = reg.get_or_create_host(&id);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
