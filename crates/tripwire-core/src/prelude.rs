//! Common module for library exports

pub use crate::context::{DebugContext, MemoryContext};
pub use crate::error::{InvalidRequest, WatchError, WatchResult};
#[cfg(all(target_os = "macos", target_arch = "x86_64"))]
pub use crate::platform::macos::MachThreadContext;
pub use crate::registers::{DebugControl, DebugRegisterState, SlotIndex};
pub use crate::types::Address;
pub use crate::watchpoint::{AccessWidth, Condition, HardwareWatchpoint, WatchRequest};
