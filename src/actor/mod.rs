//! Actor lifecycle, scheduling bookkeeping, and simcall-facing operations
//! (spec §3, §4.3, component C4).
//!
//! # Module organization
//!
//! - `context.rs` — the cooperative switch primitive (C1).
//! - `handle.rs` — `ActorHandle`, the actor data model and its operations.
//! - `lifecycle.rs` — coarse lifecycle phase + restart-count tracking.
//! - `spec.rs` — `ActorSpec`/`ActorEntry`, captured for `restart()`.
//!
//! `traits.rs` is the teacher's message-broker-oriented `Actor` trait; this
//! crate's actor code is a plain async entry point (see [`spec::ActorEntry`])
//! rather than a trait object dispatched through a broker, so it is not part
//! of this module tree.

pub mod context;
pub mod handle;
pub mod lifecycle;
pub mod spec;

pub use context::Context;
pub use handle::{ActorHandle, OnExitHook};
pub use lifecycle::{ActorLifecycle, ActorLifecycleState};
pub use spec::{ActorEntry, ActorResult, ActorSpec};
