//! `register`/`register_process`/`unregister_process`/`comm_world`/
//! `universe_size` (spec §6). Grounded on `smpi_deployment.cpp`'s `Instance`
//! class: a named group of actors sharing a communicator, tracking present
//! actors and a finalization counter, and destroying `comm_world` once
//! `finalized_ranks == size`.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use crate::error::KernelError;
use crate::util::Pid;

/// A named group of actors sharing a communicator.
#[derive(Debug)]
struct Instance {
    size: usize,
    present_processes: HashMap<i32, Pid>,
    finalized_ranks: usize,
    comm_world_alive: bool,
}

impl Instance {
    fn new(size: usize) -> Self {
        Self {
            size,
            present_processes: HashMap::new(),
            finalized_ranks: 0,
            comm_world_alive: true,
        }
    }
}

/// Tracks MPI-style instances and a process-wide universe size.
#[derive(Default)]
pub struct Deployment {
    instances: DashMap<String, Instance>,
}

impl Deployment {
    pub fn new() -> Self {
        Self::default()
    }

    /// `register(name, entry, num_processes)`. `entry` is the caller's
    /// concern (it supplies the `ActorSpec`/entry point); this layer only
    /// tracks membership and rank bookkeeping.
    pub fn register(&self, name: impl Into<String>, num_processes: usize) {
        self.instances
            .insert(name.into(), Instance::new(num_processes));
    }

    pub fn register_process(
        &self,
        instance_id: &str,
        rank: i32,
        actor: Pid,
    ) -> Result<(), KernelError> {
        let mut instance = self
            .instances
            .get_mut(instance_id)
            .ok_or_else(|| KernelError::InvariantViolation(format!("no such instance {instance_id}")))?;
        instance.present_processes.insert(rank, actor);
        Ok(())
    }

    /// Destroys `comm_world` once every rank has finalized.
    pub fn unregister_process(&self, instance_id: &str) -> Result<(), KernelError> {
        let mut instance = self
            .instances
            .get_mut(instance_id)
            .ok_or_else(|| KernelError::InvariantViolation(format!("no such instance {instance_id}")))?;
        instance.finalized_ranks += 1;
        if instance.finalized_ranks >= instance.size {
            instance.comm_world_alive = false;
        }
        Ok(())
    }

    pub fn comm_world(&self, instance_id: &str) -> Option<bool> {
        self.instances
            .get(instance_id)
            .map(|i| i.comm_world_alive)
    }

    pub fn universe_size(&self) -> usize {
        self.instances.iter().map(|i| i.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comm_world_dies_once_all_ranks_finalize() {
        let dep = Deployment::new();
        dep.register("app", 2);
        dep.register_process("app", 0, Pid::MAESTRO).unwrap();
        dep.register_process("app", 1, Pid::MAESTRO).unwrap();
        assert_eq!(dep.comm_world("app"), Some(true));

        dep.unregister_process("app").unwrap();
        assert_eq!(dep.comm_world("app"), Some(true));
        dep.unregister_process("app").unwrap();
        assert_eq!(dep.comm_world("app"), Some(false));
    }

    #[test]
    fn universe_size_sums_all_instances() {
        let dep = Deployment::new();
        dep.register("a", 2);
        dep.register("b", 3);
        assert_eq!(dep.universe_size(), 5);
    }
}
