//! The resource/performance model contract (spec §1 out-of-scope, §6
//! consumed interface) plus one minimal, swappable implementation.
//!
//! The full CPU/network/disk models SimGrid's `surf::Action` hierarchy
//! implements are explicitly out of scope; this module carries just enough
//! — a virtual-clock event heap — to drive Exec/Comm/Sleep completion so the
//! kernel is runnable and testable end-to-end.

pub mod traits;
pub mod virtual_clock;

pub use traits::{ResourceEvent, ResourceModel};
pub use virtual_clock::VirtualClockModel;
