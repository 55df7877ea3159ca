//! Shared identifier types used across the kernel.

pub mod ids;

pub use ids::{HostId, MailboxId, Pid, PidAllocator};
