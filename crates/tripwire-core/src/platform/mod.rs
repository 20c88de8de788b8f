//! # Platform-Specific Implementations
//!
//! Register accessors backed by a real operating system.
//!
//! - **macOS (x86-64)**: Mach `thread_get_state`/`thread_set_state` with the
//!   `x86_DEBUG_STATE64` flavor
//!   - See: [Apple Mach Kernel Programming](https://developer.apple.com/library/archive/documentation/Darwin/Conceptual/KernelProgramming/Mach/Mach.html)
//!
//! Everything else goes through a caller-supplied
//! [`DebugContext`](crate::context::DebugContext).

#[cfg(target_os = "macos")]
pub mod macos;
