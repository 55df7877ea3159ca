//! # simkernel — a discrete-event simulation kernel
//!
//! A cooperative actor/simcall scheduler paired with a liveness model
//! checker: actors run as cooperative tasks that only make progress
//! between simcalls (`exec`, `comm`, `sleep`, …), a single maestro
//! schedules them deterministically, and a nested depth-first search
//! over the (app-state × Büchi-automaton-state) product graph checks
//! liveness properties across every interleaving.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use simkernel::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut maestro = Maestro::new(Box::new(VirtualClockModel::new()));
//!     let host: HostId = "node0".into();
//!
//!     let spec = ActorSpec::new("worker", host.clone(), std::sync::Arc::new(move |me: std::sync::Arc<ActorHandle>| {
//!         let host = host.clone();
//!         Box::pin(async move { me.exec(host, 10.0).await })
//!     }));
//!
//!     maestro.spawn_actor(spec, Pid::MAESTRO).unwrap();
//!     let summary = maestro.run().await;
//!     println!("{summary:?}");
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Scheduling core
//! - [`actor`] - actor handle, lifecycle, construction spec, cooperative context
//! - [`activity`] - blocking activities (Exec/Comm/Sleep/Sync) and their state machine
//! - [`simcall`] - the synchronous/blocking simcall vocabulary
//! - [`maestro`] - the single scheduler loop (component C5)
//! - [`host`] - host on/off state and resident actors
//! - [`mailbox`] - Comm-activity matching, FIFO per direction
//! - [`registry`] - actor/host registries and pid allocation
//! - [`resource`] - the pluggable resource-completion model (virtual clock)
//!
//! ## Liveness model checking
//! - [`mc`] - nested DFS checker, property automaton, state/pair bookkeeping
//!
//! ## External interfaces
//! - [`mpi`] - MPI-style deployment/communicator bookkeeping
//!
//! ## Infrastructure
//! - [`error`] - the kernel-wide error type
//! - [`config`] - `KernelConfig` and its builder
//! - [`cli`] - the `simkernel` binary's command surface
//! - [`util`] - Pid/HostId/MailboxId newtypes
//!
//! # Standards Compliance
//!
//! - 3-layer import organization (std → third-party → internal) throughout
//! - `chrono::DateTime<Utc>` for all timestamps
//! - `thiserror`-based error types, no `unwrap`/`expect`/`panic!` outside tests
//! - `tracing` events at every scheduling decision point

pub mod actor;
pub mod activity;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod host;
pub mod maestro;
pub mod mailbox;
pub mod mc;
pub mod mpi;
pub mod registry;
pub mod resource;
pub mod simcall;
pub mod util;

pub mod prelude;

pub use error::KernelError;
pub use maestro::{Maestro, RunSummary};
pub use util::{HostId, MailboxId, Pid};
