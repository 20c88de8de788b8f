//! # Mach FFI Declarations
//!
//! Thread state functions not exported by `mach2` in the form we need.
//!
//! ## Safety Notes
//!
//! All of these talk to the kernel directly. The state buffer passed to
//! `thread_get_state()`/`thread_set_state()` must be exactly as large as the
//! flavor says, or the kernel reads/writes past it.

// Allow doc comments in extern blocks - they're useful for developers even if rustdoc doesn't generate docs
#![allow(unused_doc_comments)]

use libc::{c_int, kern_return_t, mach_msg_type_number_t, mach_port_t, natural_t, thread_act_t};

/// x86-64 debug state flavor (flavor 11)
pub const X86_DEBUG_STATE64: c_int = 11;

/// x86-64 debug state count (64 bytes / 4 = 16 `natural_t` values)
pub const X86_DEBUG_STATE64_COUNT: mach_msg_type_number_t = 16;

/// Mirror of `x86_debug_state64_t` (`__dr0` .. `__dr7`).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct X86DebugState64
{
    pub dr0: u64,
    pub dr1: u64,
    pub dr2: u64,
    pub dr3: u64,
    pub dr4: u64,
    pub dr5: u64,
    pub dr6: u64,
    pub dr7: u64,
}

extern "C" {
    /// Read thread state of the given flavor.
    ///
    /// `old_state_count` is in/out: buffer size in `natural_t` units, then
    /// the size actually written.
    ///
    /// See: [thread_get_state(3) man page](https://developer.apple.com/documentation/kernel/1418576-thread_get_state/)
    pub fn thread_get_state(
        target_act: thread_act_t,
        flavor: c_int,
        old_state: *mut natural_t,
        old_state_count: *mut mach_msg_type_number_t,
    ) -> kern_return_t;

    /// Write thread state of the given flavor.
    ///
    /// For the debug flavor the kernel validates the addresses (user space
    /// only) and the DR7 bits before accepting the state.
    ///
    /// See: [thread_set_state(3) man page](https://developer.apple.com/documentation/kernel/1418827-thread_set_state/)
    pub fn thread_set_state(
        target_act: thread_act_t,
        flavor: c_int,
        new_state: *const natural_t,
        new_state_count: mach_msg_type_number_t,
    ) -> kern_return_t;

    /// Drop a send right (e.g. the one `mach_thread_self()` hands out).
    pub fn mach_port_deallocate(task: mach_port_t, name: mach_port_t) -> kern_return_t;
}
