//! The cooperative switch primitive between an actor and maestro (spec §4.1,
//! component C1).
//!
//! Rust has no safe stackful-coroutine switch without `unsafe` `ucontext`
//! tricks, and the teacher crate never reaches for `unsafe` to move control
//! between tasks — it relies on `tokio::sync` primitives throughout (the
//! message broker's `oneshot` request/reply, the mailbox's `mpsc` queues).
//! `Context` follows that idiom: each actor body runs as its own
//! `tokio::task` and the strict handoff invariant is enforced by a pair of
//! [`tokio::sync::Notify`] handles, one per direction. Only one side is ever
//! unparked at a time, which reproduces "either exactly one actor is running
//! and maestro is parked, or maestro is running and no actor is" without
//! needing real preemption.

// Layer 1: Standard library imports
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::Notify;
use tokio::task::JoinHandle;

// Layer 3: Internal module imports
// (none)

/// A boxed, `'static` actor body future. Actor entry points are stored this
/// way so the registry can hold heterogeneous actor code behind one type.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Cooperative switch primitive shared between maestro and one actor task.
///
/// Invariant enforced by construction: `suspend` and `resume` always occur
/// in alternation — the actor never calls `suspend` twice without an
/// intervening `resume`, because the actor task is blocked on `to_actor`
/// the whole time maestro is running.
#[derive(Debug)]
pub struct Context {
    to_actor: Notify,
    to_maestro: Notify,
    iwannadie: AtomicBool,
    finished: AtomicBool,
}

impl Context {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            to_actor: Notify::new(),
            to_maestro: Notify::new(),
            iwannadie: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        })
    }

    /// Spawn the actor body as its own task. The task parks on the first
    /// `to_actor` notification before running any user code, so creation
    /// (which enqueues the actor onto `actors_to_run`) and first execution
    /// (driven by maestro's first `resume`) stay decoupled, per spec §4.3
    /// `create` vs `start`.
    pub fn start(self: &Arc<Self>, body: BoxFuture) -> JoinHandle<()> {
        let ctx = Arc::clone(self);
        tokio::spawn(async move {
            ctx.to_actor.notified().await;
            body.await;
            ctx.finished.store(true, Ordering::Release);
            ctx.to_maestro.notify_one();
        })
    }

    /// Actor side: hand control back to maestro, block until resumed.
    pub async fn suspend(&self) {
        self.to_maestro.notify_one();
        self.to_actor.notified().await;
    }

    /// Maestro side: wake the named actor and wait for it to yield back,
    /// either via `suspend` or by running to completion.
    pub async fn resume(&self) {
        self.to_actor.notify_one();
        self.to_maestro.notified().await;
    }

    /// Signal maestro-initiated termination. Observed by the actor on its
    /// next `suspend` return (spec §4.1).
    pub fn signal_die(&self) {
        self.iwannadie.store(true, Ordering::Release);
    }

    pub fn wants_to_die(&self) -> bool {
        self.iwannadie.load(Ordering::Acquire)
    }

    /// Reset `iwannadie` to false; part of the documented
    /// `iwannadie=false → on-termination simcall → iwannadie=true → stop`
    /// sequence (spec §4.1) run from within `cleanup`.
    pub fn clear_die_signal(&self) {
        self.iwannadie.store(false, Ordering::Release);
    }

    /// Unwinds the actor's stack and returns control to maestro permanently.
    /// In the task model this is simply "the body future returns"; callers
    /// observe it by awaiting the `JoinHandle` or polling [`Context::is_finished`].
    pub fn stop(&self) {
        self.finished.store(true, Ordering::Release);
        self.to_maestro.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}
