//! The mediated request an actor posts to the kernel (spec §3, §4.4,
//! component C3).
//!
//! [`SimcallKind`] is a lightweight record of *what was requested*; the
//! issuer and the reply mechanics live on
//! [`crate::actor::handle::ActorHandle`] (`pending_simcall`/`result_slot`),
//! the same way the teacher's `broker::InMemoryMessageBroker::request_impl`
//! pairs a posted message with a `tokio::sync::oneshot` reply channel rather
//! than blocking the caller's stack directly.

pub mod kind;

pub use kind::{SimcallKind, SimcallOutcome};
