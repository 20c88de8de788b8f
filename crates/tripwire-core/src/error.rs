//! # Error Types
//!
//! Error handling for watchpoint operations.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::types::Address;

/// Why a watchpoint request was refused.
///
/// Every refusal happens before any register is written, so the caller's
/// previous watchpoint (if any) is still live.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRequest
{
    /// The access width is not 1, 2 or 4 bytes
    #[error("unsupported watch width of {0} bytes (expected 1, 2 or 4)")]
    UnsupportedWidth(usize),

    /// A null address can't be watched
    #[error("cannot watch the null address")]
    NullAddress,

    /// The address is not aligned to the access width
    ///
    /// The CPU ignores the low address bits covered by the length field, so a
    /// misaligned request would silently watch the wrong bytes.
    #[error("address {address} is not aligned to {width} bytes")]
    Misaligned
    {
        /// Requested address
        address: Address,
        /// Requested width in bytes
        width: usize,
    },

    /// All four debug address registers are in use
    #[error("no free hardware watchpoint slots (maximum 4 on x86)")]
    NoFreeSlot,
}

/// Main error type for watchpoint operations
///
/// ## Error Categories
///
/// 1. **Request errors**: `InvalidBreakpointRequest` (bad width, bad address, slots exhausted)
/// 2. **Context errors**: `ContextAccess` (the register accessor failed)
/// 3. **Platform errors**: `MachError` (macOS-specific)
#[derive(Error, Debug)]
pub enum WatchError
{
    /// The watchpoint request can't be satisfied
    ///
    /// No register state was modified.
    #[error("Invalid breakpoint request: {0}")]
    InvalidBreakpointRequest(#[from] InvalidRequest),

    /// Reading or writing the execution context's debug registers failed
    #[error("Debug register access failed: {0}")]
    ContextAccess(String),

    /// macOS-specific Mach API error
    ///
    /// Raised by `thread_get_state()`/`thread_set_state()` when the thread
    /// port is stale or the debug state flavor is rejected.
    #[cfg(target_os = "macos")]
    #[error("Mach API error: {0}")]
    MachError(#[from] crate::platform::macos::error::MachError),
}

impl WatchError
{
    /// The request refusal, if this is one.
    #[must_use]
    pub const fn invalid_request(&self) -> Option<InvalidRequest>
    {
        match self {
            WatchError::InvalidBreakpointRequest(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Convenience type alias for `Result<T, WatchError>`
///
/// ```rust
/// use tripwire_core::error::WatchResult;
/// fn foo() -> WatchResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type WatchResult<T> = std::result::Result<T, WatchError>;
