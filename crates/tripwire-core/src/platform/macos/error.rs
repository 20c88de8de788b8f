//! # macOS Mach API Errors
//!
//! Mach APIs return `kern_return_t` codes. This converts the ones the debug
//! state calls produce into a Rust error with a readable message.

use thiserror::Error;

/// Mach kernel API error
///
/// ## References
///
/// - [kern_return_t documentation](https://developer.apple.com/documentation/kernel/kern_return_t)
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachError
{
    /// `KERN_INVALID_ARGUMENT` (4)
    ///
    /// Wrong flavor or count, or the kernel rejected the debug state (for
    /// example a kernel-space address in DR0-DR3).
    #[error("KERN_INVALID_ARGUMENT: invalid thread or debug state")]
    InvalidArgument,

    /// `KERN_PROTECTION_FAILURE` (2)
    #[error("KERN_PROTECTION_FAILURE: Permission denied")]
    ProtectionFailure,

    /// `KERN_FAILURE` (5) / `KERN_TERMINATED` (37)
    ///
    /// The thread has exited or its port is no longer valid.
    #[error("thread is no longer valid (kern_return {0})")]
    ThreadGone(i32),

    /// Unknown Mach error code, preserved so it can be looked up.
    #[error("Unknown Mach error: {0}")]
    Unknown(i32),
}

/// `KERN_TERMINATED`, not exported by `libc`.
const KERN_TERMINATED: libc::kern_return_t = 37;

impl From<libc::kern_return_t> for MachError
{
    fn from(code: libc::kern_return_t) -> Self
    {
        match code {
            libc::KERN_INVALID_ARGUMENT => MachError::InvalidArgument,
            libc::KERN_PROTECTION_FAILURE => MachError::ProtectionFailure,
            libc::KERN_FAILURE | KERN_TERMINATED => MachError::ThreadGone(code),
            _ => MachError::Unknown(code),
        }
    }
}
