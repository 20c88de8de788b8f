//! # macOS Debug Register Access
//!
//! Debug registers of a Mach thread are part of its thread state and are
//! moved with `thread_get_state()`/`thread_set_state()` using the
//! `x86_DEBUG_STATE64` flavor. The kernel loads them into DR0-DR7 when the
//! thread is next scheduled.
//!
//! ## Dependencies
//!
//! - **mach2 crate**: `mach_thread_self`, `mach_task_self`, `KERN_SUCCESS`
//! - **libc crate**: Mach type definitions (`thread_act_t`, `natural_t`, ...)
//! - **extern "C"**: `thread_get_state`/`thread_set_state`/`mach_port_deallocate`
//!
//! Apple Silicon has a different debug register model, so only the error
//! type is built there.

pub mod error;

#[cfg(target_arch = "x86_64")]
pub mod context;
#[cfg(target_arch = "x86_64")]
mod ffi;

#[cfg(target_arch = "x86_64")]
pub use context::MachThreadContext;
