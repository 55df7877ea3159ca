//! A minimal virtual-clock resource model: a binary heap of scheduled
//! completions, advanced one event at a time. `flops` is treated as
//! milliseconds directly (1 flop == 1 simulated millisecond) — a
//! deliberately simple speed model, since the real CPU/network/disk models
//! are out of scope (spec §1).

// Layer 1: Standard library imports
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::activity::{Activity, ActivityOutcome};
use crate::resource::traits::{ResourceEvent, ResourceModel};
use crate::util::HostId;

struct ScheduledEvent {
    at_millis: u64,
    seq: u64,
    host: HostId,
    activity: Arc<Activity>,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at_millis == other.at_millis && self.seq == other.seq
    }
}
impl Eq for ScheduledEvent {}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest event pops first.
        other
            .at_millis
            .cmp(&self.at_millis)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct VirtualClockModel {
    now_millis: u64,
    heap: BinaryHeap<ScheduledEvent>,
}

impl VirtualClockModel {
    pub fn new() -> Self {
        Self {
            now_millis: 0,
            heap: BinaryHeap::new(),
        }
    }

    fn push(&mut self, at_millis: u64, host: HostId, activity: Arc<Activity>) {
        let seq = NEXT_SEQ.fetch_add(1, AtomicOrdering::Relaxed);
        self.heap.push(ScheduledEvent {
            at_millis,
            seq,
            host,
            activity,
        });
    }
}

impl Default for VirtualClockModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceModel for VirtualClockModel {
    fn now_millis(&self) -> u64 {
        self.now_millis
    }

    fn schedule_exec(&mut self, activity: Arc<Activity>, host: HostId, flops: f64) {
        let at = self.now_millis + flops.max(0.0) as u64;
        self.push(at, host, activity);
    }

    fn schedule_sleep(&mut self, activity: Arc<Activity>, host: HostId, duration: Duration) {
        let at = self.now_millis + duration.as_millis() as u64;
        self.push(at, host, activity);
    }

    fn advance(&mut self) -> Option<ResourceEvent> {
        let event = self.heap.pop()?;
        self.now_millis = self.now_millis.max(event.at_millis);
        Some(ResourceEvent {
            activity: event.activity,
            outcome: ActivityOutcome::Ok { buffer: None },
            at_millis: self.now_millis,
        })
    }

    fn fail_host(&mut self, host: &HostId) -> Vec<ResourceEvent> {
        let mut remaining = BinaryHeap::new();
        let mut failed = Vec::new();
        for event in self.heap.drain() {
            if &event.host == host {
                failed.push(ResourceEvent {
                    at_millis: self.now_millis,
                    outcome: ActivityOutcome::Err(crate::error::KernelError::HostFailure {
                        host: host.clone(),
                    }),
                    activity: event.activity,
                });
            } else {
                remaining.push(event);
            }
        }
        self.heap = remaining;
        failed
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityKind;

    #[test]
    fn advances_in_time_order() {
        let mut model = VirtualClockModel::new();
        let a = Activity::new(ActivityKind::Exec {
            host: HostId::new("h"),
            flops: 10.0,
        });
        let b = Activity::new(ActivityKind::Exec {
            host: HostId::new("h"),
            flops: 1.0,
        });
        model.schedule_exec(Arc::clone(&a), HostId::new("h"), 10.0);
        model.schedule_exec(Arc::clone(&b), HostId::new("h"), 1.0);

        let first = model.advance().unwrap();
        assert!(Arc::ptr_eq(&first.activity, &b));
        let second = model.advance().unwrap();
        assert!(Arc::ptr_eq(&second.activity, &a));
        assert!(model.advance().is_none());
    }

    #[test]
    fn fail_host_only_affects_matching_host() {
        let mut model = VirtualClockModel::new();
        let on_h1 = Activity::new(ActivityKind::Exec {
            host: HostId::new("h1"),
            flops: 5.0,
        });
        let on_h2 = Activity::new(ActivityKind::Exec {
            host: HostId::new("h2"),
            flops: 5.0,
        });
        model.schedule_exec(Arc::clone(&on_h1), HostId::new("h1"), 5.0);
        model.schedule_exec(Arc::clone(&on_h2), HostId::new("h2"), 5.0);

        let failed = model.fail_host(&HostId::new("h1"));
        assert_eq!(failed.len(), 1);
        assert!(Arc::ptr_eq(&failed[0].activity, &on_h1));
        assert!(!model.is_empty());
    }
}
