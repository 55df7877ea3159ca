//! The single-threaded scheduler (spec §4.4, component C5): runs ready
//! actors, harvests simcalls, advances resources, wakes completions.
//!
//! Grounded on `ActorImpl.cpp`'s `run_all`/`simcall_answer`/`cleanup`
//! sequencing, realized with the teacher's `DashMap`-backed registry idiom
//! and `tracing` events at every decision point.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tracing::{info, warn};

// Layer 3: Internal module imports
use crate::activity::{Activity, ActivityKind, ActivityOutcome, CommDirection};
use crate::actor::{ActorHandle, ActorLifecycleState, ActorSpec};
use crate::error::KernelError;
use crate::mailbox::MailboxRegistry;
use crate::registry::Registry;
use crate::resource::{ResourceEvent, ResourceModel};
use crate::simcall::{SimcallKind, SimcallOutcome};
use crate::util::{HostId, Pid};

/// Stable FIFO of ready pids (spec §5: "that list must be a stable FIFO
/// queue to make experiments reproducible").
#[derive(Default)]
struct RunQueue(Mutex<VecDeque<Pid>>);

impl RunQueue {
    fn push(&self, pid: Pid) {
        self.0.lock().push_back(pid);
    }

    fn pop(&self) -> Option<Pid> {
        self.0.lock().pop_front()
    }

    fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// Outcome of a full `Maestro::run()` — used by the CLI to pick an exit code
/// and by tests to assert end-to-end behavior (spec §8 scenarios).
#[derive(Debug, Default)]
pub struct RunSummary {
    pub actors_created: usize,
    pub final_time_millis: u64,
}

pub struct Maestro {
    registry: Registry,
    mailboxes: MailboxRegistry,
    resource: Box<dyn ResourceModel>,
    run_queue: Arc<RunQueue>,
    destroy_list: Mutex<Vec<Arc<ActorHandle>>>,
    /// Specs of `auto_restart` actors that exited while their host was off,
    /// re-created the next time that host turns back on (spec §8 scenario
    /// 4, §9 exit step 2).
    restart_queue: Mutex<Vec<(ActorSpec, Pid, u32)>>,
    actors_created: usize,
}

impl Maestro {
    pub fn new(resource: Box<dyn ResourceModel>) -> Self {
        Self {
            registry: Registry::new(),
            mailboxes: MailboxRegistry::new(),
            resource,
            run_queue: Arc::new(RunQueue::default()),
            destroy_list: Mutex::new(Vec::new()),
            restart_queue: Mutex::new(Vec::new()),
            actors_created: 0,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// `create(name, code, data, host, properties, parent)` (spec §4.3).
    /// Fails with `HostFailure` if the host is off.
    pub fn spawn_actor(
        &mut self,
        spec: ActorSpec,
        parent: Pid,
    ) -> Result<Arc<ActorHandle>, KernelError> {
        let host = self.registry.get_or_create_host(&spec.host);
        if !host.is_on() {
            return Err(KernelError::HostFailure {
                host: spec.host.clone(),
            });
        }
        let pid = self.registry.next_pid();
        let handle = ActorHandle::new(pid, parent, spec);
        host.add_resident(pid);
        self.registry.insert_actor(Arc::clone(&handle));
        handle.transition_lifecycle(ActorLifecycleState::Running);
        handle.spawn_body();
        self.run_queue.push(pid);
        self.actors_created += 1;
        info!(pid = %pid, host = %host.name(), "actor created");
        Ok(handle)
    }

    fn requeue(&self, pid: Pid) {
        self.run_queue.push(pid);
    }

    fn requeue_many(&self, handles: Vec<Arc<ActorHandle>>) {
        for handle in handles {
            self.requeue(handle.pid);
        }
    }

    /// Main scheduling loop (spec §4.4 steps 1-5).
    pub async fn run(&mut self) -> RunSummary {
        loop {
            self.drain_run_queue().await;
            self.service_destroy_list();
            self.service_kill_timers();

            if self.registry.non_daemon_count() == 0 {
                break;
            }
            if self.run_queue.is_empty() {
                if !self.advance_resource() {
                    // Nothing ready, nothing scheduled: quiescence.
                    break;
                }
            }
        }
        self.shutdown_daemons();
        self.drain_run_queue().await;
        self.service_destroy_list();

        RunSummary {
            actors_created: self.actors_created,
            final_time_millis: self.resource.now_millis(),
        }
    }

    async fn drain_run_queue(&mut self) {
        while let Some(pid) = self.run_queue.pop() {
            let Some(handle) = self.registry.get_actor(pid) else {
                continue;
            };
            if handle.is_finished() {
                continue;
            }
            handle.context.resume().await;

            if handle.context.is_finished() {
                self.exit_cleanup(handle);
                continue;
            }
            if let Some(kind) = handle.take_pending_simcall() {
                self.answer_simcall(handle, kind);
            }
        }
    }

    /// Spec §4.4 step 2: "answer it ... either performs the kernel action
    /// synchronously ... or stores the simcall on an Activity's `simcalls`
    /// list".
    fn answer_simcall(&mut self, issuer: Arc<ActorHandle>, kind: SimcallKind) {
        match kind {
            SimcallKind::Exec { host, flops } => self.start_exec(issuer, host, flops),
            SimcallKind::CommSend { mailbox, buffer } => self.start_comm_send(issuer, mailbox, buffer),
            SimcallKind::CommRecv { mailbox } => self.start_comm_recv(issuer, mailbox),
            SimcallKind::Sleep { duration } => self.start_sleep(issuer, duration),
            SimcallKind::Suspend => self.start_suspend(issuer),
            SimcallKind::Resume { target } => self.do_resume(issuer, target),
            SimcallKind::Kill { target } => self.do_kill(issuer, target),
            SimcallKind::KillAll => self.do_kill_all(issuer),
            SimcallKind::Join { target, timeout } => self.start_join(issuer, target, timeout),
            SimcallKind::SetKillTime { at_millis } => self.do_set_kill_time(issuer, at_millis),
            SimcallKind::Daemonize => self.answer_sync(issuer, SimcallOutcome::Unit),
            SimcallKind::Undaemonize => self.answer_sync(issuer, SimcallOutcome::Unit),
            SimcallKind::ActorCreate { spec } => self.do_actor_create(issuer, spec),
            SimcallKind::ThrowException { target, error } => {
                self.do_throw_exception(issuer, target, error)
            }
            SimcallKind::Yield => self.answer_sync(issuer, SimcallOutcome::Unit),
            SimcallKind::Restart { target } => self.do_restart(issuer, target),
        }
    }

    fn answer_sync(&mut self, issuer: Arc<ActorHandle>, outcome: SimcallOutcome) {
        issuer.deliver_outcome(outcome);
        self.requeue(issuer.pid);
    }

    fn host_for(&mut self, host: &HostId) -> Arc<crate::host::Host> {
        self.registry.get_or_create_host(host)
    }

    fn start_exec(&mut self, issuer: Arc<ActorHandle>, host: HostId, flops: f64) {
        if !self.host_for(&host).is_on() {
            let activity = Activity::new(ActivityKind::Exec {
                host: host.clone(),
                flops,
            });
            activity.wait(Arc::clone(&issuer));
            issuer.set_waiting_synchro(Some(Arc::clone(&activity)));
            let _ = activity.fail(KernelError::HostFailure { host });
            self.requeue(issuer.pid);
            return;
        }
        let activity = Activity::new(ActivityKind::Exec {
            host: host.clone(),
            flops,
        });
        activity.start();
        activity.wait(Arc::clone(&issuer));
        issuer.set_waiting_synchro(Some(Arc::clone(&activity)));
        self.resource.schedule_exec(activity, host, flops);
    }

    fn start_sleep(&mut self, issuer: Arc<ActorHandle>, duration: std::time::Duration) {
        let host = issuer.spec.host.clone();
        let activity = Activity::new(ActivityKind::Sleep {
            host: host.clone(),
            duration,
        });
        activity.start();
        activity.wait(Arc::clone(&issuer));
        issuer.set_waiting_synchro(Some(Arc::clone(&activity)));
        self.resource.schedule_sleep(activity, host, duration);
    }

    fn start_comm_send(&mut self, issuer: Arc<ActorHandle>, mailbox_id: crate::util::MailboxId, buffer: Vec<u8>) {
        let activity = Activity::new(ActivityKind::Comm {
            mailbox: mailbox_id.clone(),
            direction: CommDirection::Send,
            buffer: Some(buffer.clone()),
        });
        activity.start();
        activity.wait(Arc::clone(&issuer));
        issuer.set_waiting_synchro(Some(Arc::clone(&activity)));
        issuer.register_outbound_comm(Arc::clone(&activity));

        let mailbox = self.mailboxes.get_or_create(&mailbox_id);
        if let Some(recv_activity) = mailbox.offer_send(Arc::clone(&activity)) {
            let a_issuers = activity.post(ActivityOutcome::Ok { buffer: None });
            let b_issuers = recv_activity.post(ActivityOutcome::Ok {
                buffer: Some(buffer),
            });
            self.requeue_many(a_issuers);
            self.requeue_many(b_issuers);
        }
    }

    fn start_comm_recv(&mut self, issuer: Arc<ActorHandle>, mailbox_id: crate::util::MailboxId) {
        let activity = Activity::new(ActivityKind::Comm {
            mailbox: mailbox_id.clone(),
            direction: CommDirection::Recv,
            buffer: None,
        });
        activity.start();
        activity.wait(Arc::clone(&issuer));
        issuer.set_waiting_synchro(Some(Arc::clone(&activity)));

        let mailbox = self.mailboxes.get_or_create(&mailbox_id);
        if let Some(send_activity) = mailbox.offer_recv(Arc::clone(&activity)) {
            let buffer = match &send_activity.kind {
                ActivityKind::Comm { buffer, .. } => buffer.clone(),
                _ => None,
            };
            let a_issuers = activity.post(ActivityOutcome::Ok { buffer });
            let b_issuers = send_activity.post(ActivityOutcome::Ok { buffer: None });
            self.requeue_many(a_issuers);
            self.requeue_many(b_issuers);
        }
    }

    fn start_suspend(&mut self, issuer: Arc<ActorHandle>) {
        let placeholder = match issuer.waiting_synchro() {
            Some(existing) => existing,
            None => {
                let placeholder = Activity::new_internal(ActivityKind::Sync);
                placeholder.start();
                issuer.set_waiting_synchro(Some(Arc::clone(&placeholder)));
                placeholder
            }
        };
        issuer.transition_lifecycle(ActorLifecycleState::Suspended);
        placeholder.wait(issuer);
    }

    /// Only un-parks an actor truly blocked on the `suspend()` placeholder —
    /// mirrors `resume()`'s documented inverse relationship with `suspend()`
    /// (spec §4.3), not a generic "complete whatever you're blocked on".
    fn do_resume(&mut self, issuer: Arc<ActorHandle>, target: Pid) {
        if let Some(target_handle) = self.registry.get_actor(target) {
            if let Some(activity) = target_handle.waiting_synchro() {
                if matches!(activity.kind, ActivityKind::Sync) && activity.is_internal {
                    let drained = activity.post(ActivityOutcome::Ok { buffer: None });
                    target_handle.transition_lifecycle(ActorLifecycleState::Running);
                    self.requeue_many(drained);
                }
            }
        }
        self.answer_sync(issuer, SimcallOutcome::Unit);
    }

    /// `kill(target)`: routes through `exit()` semantics by injecting the
    /// exception and letting the target unwind on its own next yield (spec
    /// §4.3, §9 self-kill reordering resolution in DESIGN.md).
    fn do_kill(&mut self, issuer: Arc<ActorHandle>, target: Pid) {
        if let Some(target_handle) = self.registry.get_actor(target) {
            if !target_handle.is_finished() {
                target_handle.mark_for_death();
                target_handle.inject_exception(KernelError::ForcefulKill(target));
                if let Some(activity) = target_handle.waiting_synchro() {
                    let drained = activity.cancel();
                    target_handle.remove_comm(&activity);
                    self.requeue_many(drained);
                } else {
                    self.requeue(target);
                }
            }
        }
        self.answer_sync(issuer, SimcallOutcome::Unit);
    }

    fn do_kill_all(&mut self, issuer: Arc<ActorHandle>) {
        let targets: Vec<Pid> = self
            .registry
            .live_actors()
            .into_iter()
            .map(|h| h.pid)
            .filter(|pid| *pid != issuer.pid)
            .collect();
        for target in targets {
            self.do_kill_silent(target);
        }
        self.answer_sync(issuer, SimcallOutcome::Unit);
    }

    fn do_kill_silent(&mut self, target: Pid) {
        if let Some(target_handle) = self.registry.get_actor(target) {
            if !target_handle.is_finished() {
                target_handle.mark_for_death();
                target_handle.inject_exception(KernelError::ForcefulKill(target));
                if let Some(activity) = target_handle.waiting_synchro() {
                    let drained = activity.cancel();
                    target_handle.remove_comm(&activity);
                    self.requeue_many(drained);
                } else {
                    self.requeue(target);
                }
            }
        }
    }

    fn start_join(&mut self, issuer: Arc<ActorHandle>, target: Pid, timeout: Option<std::time::Duration>) {
        let activity = Activity::new_internal(ActivityKind::Sync);
        activity.start();
        activity.wait(Arc::clone(&issuer));
        issuer.set_waiting_synchro(Some(Arc::clone(&activity)));

        match self.registry.get_actor(target) {
            Some(target_handle) if !target_handle.is_finished() => {
                let completion_activity = Arc::clone(&activity);
                let run_queue = Arc::clone(&self.run_queue);
                target_handle.register_on_exit(Box::new(move |_failed| {
                    let drained = completion_activity.post(ActivityOutcome::Ok { buffer: None });
                    for handle in drained {
                        run_queue.push(handle.pid);
                    }
                }));
                if let Some(duration) = timeout {
                    let host = issuer.spec.host.clone();
                    self.resource.schedule_sleep(Arc::clone(&activity), host, duration);
                }
            }
            _ => {
                let drained = activity.post(ActivityOutcome::Ok { buffer: None });
                self.requeue_many(drained);
            }
        }
    }

    fn do_set_kill_time(&mut self, issuer: Arc<ActorHandle>, at_millis: u64) {
        if at_millis > self.resource.now_millis() {
            issuer.set_kill_time_raw(Some(at_millis));
        }
        self.answer_sync(issuer, SimcallOutcome::Unit);
    }

    fn do_actor_create(&mut self, issuer: Arc<ActorHandle>, spec: ActorSpec) {
        match self.spawn_actor(spec, issuer.pid) {
            Ok(new_handle) => self.answer_sync(issuer, SimcallOutcome::Pid(new_handle.pid)),
            Err(e) => self.answer_sync(issuer, SimcallOutcome::Err(e)),
        }
    }

    fn do_throw_exception(&mut self, issuer: Arc<ActorHandle>, target: Pid, error: KernelError) {
        if let Some(target_handle) = self.registry.get_actor(target) {
            if !target_handle.is_finished() {
                target_handle.inject_exception(error);
                if let Some(activity) = target_handle.waiting_synchro() {
                    let drained = activity.cancel();
                    // Remove the canceled activity from `comms` now rather
                    // than waiting for exit cleanup (spec §4.3: canceling a
                    // waiting activity removes it from `comms` if it was a
                    // Comm).
                    target_handle.remove_comm(&activity);
                    self.requeue_many(drained);
                } else {
                    self.requeue(target);
                }
            }
        }
        self.answer_sync(issuer, SimcallOutcome::Unit);
    }

    /// `restart(target)`: capture `target`'s construction args, kill it, and
    /// create a new actor with the same args, answering with the new pid
    /// (spec §4.3). Distinct from [`Self::restart_enrolled_actors`], which
    /// only fires `auto_restart` actors back to life when their host
    /// recovers; this fires on demand, independent of host state. Maestro
    /// cannot be restarted.
    fn do_restart(&mut self, issuer: Arc<ActorHandle>, target: Pid) {
        if target == Pid::MAESTRO {
            self.answer_sync(
                issuer,
                SimcallOutcome::Err(KernelError::InvariantViolation(
                    "maestro cannot be restarted".into(),
                )),
            );
            return;
        }
        let Some(target_handle) = self.registry.get_actor(target) else {
            self.answer_sync(
                issuer,
                SimcallOutcome::Err(KernelError::InvariantViolation(format!(
                    "restart target {target} not found"
                ))),
            );
            return;
        };
        let spec = target_handle.spec.clone();
        let parent = target_handle.ppid;
        let prior_restarts = target_handle.restart_count();
        self.do_kill_silent(target);
        match self.spawn_actor(spec, parent) {
            Ok(new_handle) => {
                for _ in 0..=prior_restarts {
                    new_handle.bump_restart_count();
                }
                info!(old = %target, new = %new_handle.pid, "actor restarted on demand");
                self.answer_sync(issuer, SimcallOutcome::Pid(new_handle.pid));
            }
            Err(e) => self.answer_sync(issuer, SimcallOutcome::Err(e)),
        }
    }

    /// Registry-owning part of the exit path (spec §4.3 steps 2, 5, 6, 7).
    /// Step 1/3/4 already ran actor-side in `ActorHandle::local_exit`.
    fn exit_cleanup(&mut self, handle: Arc<ActorHandle>) {
        let host = self.registry.get_or_create_host(&handle.spec.host);
        if handle.spec.auto_restart && !host.is_on() {
            // Step 2: host is off — the restart will be driven when the
            // host comes back on (see `Maestro::turn_host_on`).
            info!(pid = %handle.pid, "actor enrolled for restart when host recovers");
            self.restart_queue.lock().push((
                handle.spec.clone(),
                handle.ppid,
                handle.restart_count() + 1,
            ));
        }
        host.remove_resident(handle.pid);
        self.registry.remove_actor(handle.pid);
        handle.set_kill_time_raw(None);
        handle.transition_lifecycle(ActorLifecycleState::Finished);
        self.destroy_list.lock().push(Arc::clone(&handle));
        info!(pid = %handle.pid, "actor exited");
    }

    fn service_destroy_list(&mut self) {
        self.destroy_list.lock().clear();
    }

    /// Scans live actors for expired kill timers (spec §4.4 step 4). A
    /// binary heap would scale better; a linear scan is adequate at the
    /// scale this kernel targets and keeps the ordering obviously correct.
    fn service_kill_timers(&mut self) -> bool {
        let now = self.resource.now_millis();
        let mut fired = false;
        let expired: Vec<Pid> = self
            .registry
            .live_actors()
            .into_iter()
            .filter(|h| matches!(h.kill_time_millis(), Some(t) if t <= now))
            .map(|h| h.pid)
            .collect();
        for pid in expired {
            self.do_kill_silent(pid);
            fired = true;
        }
        fired
    }

    fn advance_resource(&mut self) -> bool {
        match self.resource.advance() {
            Some(ResourceEvent {
                activity, outcome, ..
            }) => {
                let drained = activity.post(outcome);
                self.requeue_many(drained);
                true
            }
            None => false,
        }
    }

    /// Turning a host off fails all resident activities immediately (spec
    /// §3). Turning it back on re-creates any actor enrolled for restart.
    pub fn turn_host_off(&mut self, id: &HostId) {
        let host = self.registry.get_or_create_host(id);
        let residents = host.turn_off();
        let failed = self.resource.fail_host(id);
        for event in failed {
            let drained = event.activity.post(event.outcome);
            self.requeue_many(drained);
        }
        for pid in residents {
            self.do_kill_silent(pid);
        }
        warn!(host = %id, "host turned off");
    }

    pub fn turn_host_on(&mut self, id: &HostId) {
        let host = self.registry.get_or_create_host(id);
        host.turn_on();
        info!(host = %id, "host turned on");
        self.restart_enrolled_actors(id);
    }

    /// Re-creates every `auto_restart` actor enrolled for `id`, preserving
    /// name/entry/properties and bumping `restart_count` (spec §8 scenario
    /// 4: "re-created ... with the same name and entry").
    fn restart_enrolled_actors(&mut self, id: &HostId) {
        let mut pending = self.restart_queue.lock();
        let (to_restart, rest): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|(spec, ..)| &spec.host == id);
        *pending = rest;
        drop(pending);

        for (spec, parent, restart_count) in to_restart {
            let name = spec.name.clone();
            match self.spawn_actor(spec, parent) {
                Ok(handle) => {
                    for _ in 0..restart_count {
                        handle.bump_restart_count();
                    }
                    info!(pid = %handle.pid, name = %name, "actor restarted");
                }
                Err(err) => {
                    warn!(name = %name, error = %err, "actor restart failed");
                }
            }
        }
    }

    /// Daemons are ignored when computing "is any non-daemon still alive";
    /// when that count reaches zero, maestro kills all remaining daemons
    /// (spec §4.3, §4.4 step 5, end-to-end scenario 3).
    fn shutdown_daemons(&mut self) {
        let daemons: Vec<Pid> = self
            .registry
            .live_actors()
            .into_iter()
            .filter(|h| h.is_daemon() && !h.is_finished())
            .map(|h| h.pid)
            .collect();
        for pid in daemons {
            self.do_kill_silent(pid);
        }
    }
}
