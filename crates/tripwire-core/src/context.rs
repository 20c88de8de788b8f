//! # Execution Context Access
//!
//! A watchpoint lives in the debug registers of one execution context
//! (normally a thread). How those registers are fetched and stored is
//! platform business; the controller only sees this trait.
//!
//! - [`MemoryContext`]: in-memory register file, for tests and simulators
//! - `MachThreadContext` (macOS x86-64): a Mach thread's `x86_DEBUG_STATE64`

use tracing::trace;

use crate::error::WatchResult;
use crate::registers::DebugRegisterState;

/// Read/write access to one execution context's debug registers.
///
/// `write_debug_state` must either apply the whole snapshot or fail without
/// applying any of it, and must be complete before it returns.
pub trait DebugContext
{
    /// Fetch the current debug register snapshot.
    ///
    /// ## Errors
    ///
    /// `ContextAccess` (or a platform error) if the registers can't be read.
    fn read_debug_state(&mut self) -> WatchResult<DebugRegisterState>;

    /// Install a debug register snapshot.
    ///
    /// ## Errors
    ///
    /// `ContextAccess` (or a platform error) if the registers can't be written.
    fn write_debug_state(&mut self, state: &DebugRegisterState) -> WatchResult<()>;
}

impl<C: DebugContext + ?Sized> DebugContext for &mut C
{
    fn read_debug_state(&mut self) -> WatchResult<DebugRegisterState>
    {
        (**self).read_debug_state()
    }

    fn write_debug_state(&mut self, state: &DebugRegisterState) -> WatchResult<()>
    {
        (**self).write_debug_state(state)
    }
}

impl<C: DebugContext + ?Sized> DebugContext for Box<C>
{
    fn read_debug_state(&mut self) -> WatchResult<DebugRegisterState>
    {
        (**self).read_debug_state()
    }

    fn write_debug_state(&mut self, state: &DebugRegisterState) -> WatchResult<()>
    {
        (**self).write_debug_state(state)
    }
}

/// Debug registers held in memory.
///
/// Counts every read and write so callers can check that a refused request
/// never touched the registers.
#[derive(Debug, Default, Clone)]
pub struct MemoryContext
{
    state: DebugRegisterState,
    reads: usize,
    writes: usize,
}

impl MemoryContext
{
    /// All registers zero: every slot free.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Start from an existing snapshot (e.g. slots already taken by someone else).
    #[must_use]
    pub fn with_state(state: DebugRegisterState) -> Self
    {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Current register contents.
    #[must_use]
    pub const fn state(&self) -> &DebugRegisterState
    {
        &self.state
    }

    /// Number of `read_debug_state` calls so far.
    #[must_use]
    pub const fn reads(&self) -> usize
    {
        self.reads
    }

    /// Number of `write_debug_state` calls so far.
    #[must_use]
    pub const fn writes(&self) -> usize
    {
        self.writes
    }
}

impl DebugContext for MemoryContext
{
    fn read_debug_state(&mut self) -> WatchResult<DebugRegisterState>
    {
        self.reads += 1;
        Ok(self.state)
    }

    fn write_debug_state(&mut self, state: &DebugRegisterState) -> WatchResult<()>
    {
        self.writes += 1;
        trace!(dr7 = state.control.raw(), "memory context updated");
        self.state = *state;
        Ok(())
    }
}
