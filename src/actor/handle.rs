//! The Actor data model and its user-facing operations (spec §3, §4.3,
//! component C4) — the busiest consumer of [`super::context::Context`],
//! [`crate::activity::Activity`], and [`crate::simcall::SimcallKind`].
//!
//! Grounded on the teacher's `actor::lifecycle::ActorLifecycle` (state +
//! timestamp + restart-count bookkeeping) and `system::errors::SystemError`
//! helper-predicate style, retargeted from the message-passing actor model
//! onto simcall-mediated cooperative scheduling per `ActorImpl.cpp`.

// Layer 1: Standard library imports
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY
use parking_lot::Mutex;
use tracing::{debug, trace};

// Layer 3: Internal module imports
use crate::activity::{Activity, ActivityOutcome};
use crate::actor::context::Context;
use crate::actor::lifecycle::{ActorLifecycle, ActorLifecycleState};
use crate::actor::spec::ActorSpec;
use crate::error::KernelError;
use crate::simcall::{SimcallKind, SimcallOutcome};
use crate::util::{HostId, MailboxId, Pid};

/// Runs once an actor finishes, in LIFO order, receiving `failed = true` iff
/// `iwannadie` caused the exit (spec §4.3 exit path, step 3).
pub type OnExitHook = Box<dyn FnMut(bool) + Send>;

/// Shared, reference-counted actor state. User code receives its own
/// `Arc<ActorHandle>` and calls the async operations below; the maestro loop
/// and registry reach the rest (bookkeeping fields) directly.
pub struct ActorHandle {
    pub pid: Pid,
    pub ppid: Pid,
    pub spec: ActorSpec,
    pub context: Arc<Context>,
    created_at: DateTime<Utc>,
    suspended: AtomicBool,
    finished: AtomicBool,
    daemon: AtomicBool,
    kill_time_millis: Mutex<Option<u64>>,
    pending_exception: Mutex<Option<KernelError>>,
    /// The single activity this actor is parked on, if any (spec §3: "at
    /// most one `waiting_synchro` at a time").
    waiting_synchro: Mutex<Option<Arc<Activity>>>,
    /// Pending outbound Comm activities, canceled on exit (spec §4.3 step 4).
    comms: Mutex<Vec<Arc<Activity>>>,
    on_exit: Mutex<Vec<OnExitHook>>,
    pending_simcall: Mutex<Option<SimcallKind>>,
    result_slot: Mutex<Option<SimcallOutcome>>,
    lifecycle: Mutex<ActorLifecycle>,
}

impl ActorHandle {
    pub fn new(pid: Pid, ppid: Pid, spec: ActorSpec) -> Arc<Self> {
        Arc::new(Self {
            pid,
            ppid,
            spec,
            context: Context::new(),
            created_at: Utc::now(), // §3.2
            suspended: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            daemon: AtomicBool::new(false),
            kill_time_millis: Mutex::new(None),
            pending_exception: Mutex::new(None),
            waiting_synchro: Mutex::new(None),
            comms: Mutex::new(Vec::new()),
            on_exit: Mutex::new(Vec::new()),
            pending_simcall: Mutex::new(None),
            result_slot: Mutex::new(None),
            lifecycle: Mutex::new(ActorLifecycle::new()),
        })
    }

    /// Wrap the user entry point with the mandatory exit bookkeeping and
    /// spawn it as a `tokio::task` via [`Context::start`] (spec §4.3
    /// `start`, §4.1 the `iwannadie` discipline).
    pub fn spawn_body(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let handle = Arc::clone(self);
        let entry = Arc::clone(&self.spec.entry);
        let ctx = Arc::clone(&self.context);
        let body: Pin<Box<dyn Future<Output = ()> + Send>> = Box::pin(async move {
            let result = (entry)(Arc::clone(&handle)).await;
            let failed = result.is_err();
            handle.local_exit(failed);
        });
        ctx.start(body)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn is_daemon(&self) -> bool {
        self.daemon.load(Ordering::Acquire)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }

    pub fn kill_time_millis(&self) -> Option<u64> {
        *self.kill_time_millis.lock()
    }

    pub fn lifecycle_state(&self) -> ActorLifecycleState {
        self.lifecycle.lock().state
    }

    pub fn restart_count(&self) -> u32 {
        self.lifecycle.lock().restart_count
    }

    // ---- simcall plumbing -------------------------------------------------

    /// Maestro-side: take the simcall the actor posted before its last
    /// `suspend`, if any.
    pub fn take_pending_simcall(&self) -> Option<SimcallKind> {
        self.pending_simcall.lock().take()
    }

    /// Maestro/Activity-side: deliver a blocking activity's terminal outcome
    /// into this actor's result slot ahead of its next `resume`, and clear
    /// `waiting_synchro` — this actor is no longer parked on anything (spec
    /// §3: "at most one `waiting_synchro` at a time").
    pub fn deliver_activity_outcome(&self, outcome: ActivityOutcome) {
        *self.result_slot.lock() = Some(SimcallOutcome::Activity(outcome));
        *self.waiting_synchro.lock() = None;
    }

    pub fn deliver_outcome(&self, outcome: SimcallOutcome) {
        *self.result_slot.lock() = Some(outcome);
    }

    pub fn register_on_exit(&self, hook: OnExitHook) {
        self.on_exit.lock().push(hook);
    }

    pub fn register_outbound_comm(&self, activity: Arc<Activity>) {
        self.comms.lock().push(activity);
    }

    /// Drop `activity` from the outbound-Comm list, a no-op if it was never
    /// registered (spec §4.3: canceling a waiting activity removes it from
    /// `comms` if it was a Comm).
    pub(crate) fn remove_comm(&self, activity: &Arc<Activity>) {
        self.comms.lock().retain(|c| !Arc::ptr_eq(c, activity));
    }

    pub fn waiting_synchro(&self) -> Option<Arc<Activity>> {
        self.waiting_synchro.lock().clone()
    }

    /// Post a simcall and block until maestro answers it. Checks
    /// `pending_exception` (covers both `throw_exception` and `kill`,
    /// which injects a [`KernelError::ForcefulKill`]) before reading the
    /// result slot, matching spec §4.1's "stored exception re-raised on
    /// yield-return" discipline.
    async fn post_and_wait(&self, kind: SimcallKind) -> Result<SimcallOutcome, KernelError> {
        trace!(pid = %self.pid, simcall = %kind.label(), "posting simcall");
        *self.pending_simcall.lock() = Some(kind);
        self.context.suspend().await;

        if let Some(e) = self.pending_exception.lock().take() {
            return Err(e);
        }
        if self.context.wants_to_die() {
            return Err(KernelError::ForcefulKill(self.pid));
        }
        match self.result_slot.lock().take() {
            Some(outcome) => outcome.into_result(),
            None => Ok(SimcallOutcome::Unit),
        }
    }

    /// Actor-local part of the exit path (spec §4.3 steps 1, 3, 4). The
    /// registry-owning steps (2, 5, 6, 7) run in maestro once it observes
    /// the task has finished.
    fn local_exit(&self, failed: bool) {
        self.finished.store(true, Ordering::Release);
        let mut hooks = self.on_exit.lock();
        while let Some(mut hook) = hooks.pop() {
            hook(failed);
        }
        drop(hooks);
        let comms = std::mem::take(&mut *self.comms.lock());
        for comm in comms {
            let _ = comm.cancel();
        }
        debug!(pid = %self.pid, failed, "actor local exit complete");
    }

    // ---- user-facing operations (spec §4.3) --------------------------------

    pub async fn exec(&self, host: HostId, flops: f64) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::Exec { host, flops }).await?;
        Ok(())
    }

    pub async fn send(&self, mailbox: MailboxId, buffer: Vec<u8>) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::CommSend { mailbox, buffer })
            .await?;
        Ok(())
    }

    pub async fn recv(&self, mailbox: MailboxId) -> Result<Vec<u8>, KernelError> {
        let outcome = self.post_and_wait(SimcallKind::CommRecv { mailbox }).await?;
        match outcome {
            SimcallOutcome::Activity(ActivityOutcome::Ok { buffer }) => Ok(buffer.unwrap_or_default()),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn sleep(&self, duration: Duration) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::Sleep { duration }).await?;
        Ok(())
    }

    /// Idempotent: maestro reuses the existing placeholder if this actor is
    /// already parked (spec §4.2, §8 round-trip property).
    pub async fn suspend_self(&self) -> Result<(), KernelError> {
        self.suspended.store(true, Ordering::Release);
        let result = self.post_and_wait(SimcallKind::Suspend).await;
        self.suspended.store(false, Ordering::Release);
        result.map(|_| ())
    }

    /// Idempotent inverse of `suspend_self`; ignored if dying (spec §4.3).
    pub async fn resume(&self, target: Pid) -> Result<(), KernelError> {
        if self.context.wants_to_die() {
            return Ok(());
        }
        self.post_and_wait(SimcallKind::Resume { target }).await?;
        Ok(())
    }

    pub async fn kill(&self, target: Pid) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::Kill { target }).await?;
        Ok(())
    }

    pub async fn kill_all(&self) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::KillAll).await?;
        Ok(())
    }

    pub async fn join(&self, target: Pid, timeout: Option<Duration>) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::Join { target, timeout }).await?;
        Ok(())
    }

    /// No-op if `at_millis <= now` is decided by maestro at answer time
    /// (spec §8 boundary behavior).
    pub async fn set_kill_time(&self, at_millis: u64) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::SetKillTime { at_millis }).await?;
        Ok(())
    }

    pub async fn daemonize(&self) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::Daemonize).await?;
        self.daemon.store(true, Ordering::Release);
        Ok(())
    }

    pub async fn undaemonize(&self) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::Undaemonize).await?;
        self.daemon.store(false, Ordering::Release);
        Ok(())
    }

    pub async fn throw_exception(&self, target: Pid, error: KernelError) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::ThrowException { target, error })
            .await?;
        Ok(())
    }

    pub async fn yield_now(&self) -> Result<(), KernelError> {
        self.post_and_wait(SimcallKind::Yield).await?;
        Ok(())
    }

    /// Capture `target`'s construction args, kill it, and create a new actor
    /// with the same args, returning the new actor's pid (spec §4.3).
    /// Maestro cannot be restarted. If `target` is the issuer itself, the
    /// issuer is the one being killed — it observes the usual
    /// `ForcefulKill` on its next yield rather than this call's `Ok` return,
    /// the same self-kill ordering `kill()` already documents.
    pub async fn restart(&self, target: Pid) -> Result<Pid, KernelError> {
        let outcome = self.post_and_wait(SimcallKind::Restart { target }).await?;
        match outcome {
            SimcallOutcome::Pid(pid) => Ok(pid),
            _ => Err(KernelError::InvariantViolation(
                "restart did not return a pid".into(),
            )),
        }
    }

    // ---- maestro-only mutators ---------------------------------------------

    pub(crate) fn inject_exception(&self, error: KernelError) {
        *self.pending_exception.lock() = Some(error);
    }

    pub(crate) fn mark_for_death(&self) {
        self.context.signal_die();
    }

    pub(crate) fn set_kill_time_raw(&self, at_millis: Option<u64>) {
        *self.kill_time_millis.lock() = at_millis;
    }

    pub(crate) fn set_waiting_synchro(&self, activity: Option<Arc<Activity>>) {
        *self.waiting_synchro.lock() = activity;
    }

    pub(crate) fn transition_lifecycle(&self, state: ActorLifecycleState) {
        self.lifecycle.lock().transition_to(state);
    }

    pub(crate) fn bump_restart_count(&self) {
        self.lifecycle.lock().restart_count += 1;
    }
}

impl std::fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorHandle")
            .field("pid", &self.pid)
            .field("ppid", &self.ppid)
            .field("name", &self.spec.name)
            .field("finished", &self.is_finished())
            .field("daemon", &self.is_daemon())
            .finish()
    }
}
