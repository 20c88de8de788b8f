//! Mach thread debug state as a [`DebugContext`].

use libc::{mach_msg_type_number_t, natural_t, thread_act_t};
use mach2::kern_return::KERN_SUCCESS;
use tracing::{trace, warn};

use crate::context::DebugContext;
use crate::error::{WatchError, WatchResult};
use crate::platform::macos::error::MachError;
use crate::platform::macos::ffi::{self, X86DebugState64};
use crate::registers::{DebugControl, DebugRegisterState};

/// Debug registers of one Mach thread.
///
/// [`current`](Self::current) targets the calling thread, which is what an
/// in-process watchpoint wants: the kernel reloads DR0-DR7 from the saved
/// state on the way back to user space, so the watchpoint is live as soon as
/// `write_debug_state` returns.
#[derive(Debug)]
pub struct MachThreadContext
{
    thread: thread_act_t,
    owns_port: bool,
}

impl MachThreadContext
{
    /// The calling thread.
    ///
    /// Takes a send right from `mach_thread_self()`, released on drop.
    #[must_use]
    pub fn current() -> Self
    {
        let thread = unsafe { mach2::mach_init::mach_thread_self() };
        Self {
            thread,
            owns_port: true,
        }
    }

    /// A thread port obtained elsewhere (e.g. from `task_threads()`).
    ///
    /// The caller keeps ownership of the port.
    #[must_use]
    pub const fn from_port(thread: thread_act_t) -> Self
    {
        Self {
            thread,
            owns_port: false,
        }
    }

    /// The underlying thread port.
    #[must_use]
    pub const fn port(&self) -> thread_act_t
    {
        self.thread
    }

    fn get_state(&self) -> WatchResult<X86DebugState64>
    {
        let mut raw = X86DebugState64::default();
        let mut count: mach_msg_type_number_t = ffi::X86_DEBUG_STATE64_COUNT;
        let kr = unsafe {
            ffi::thread_get_state(
                self.thread,
                ffi::X86_DEBUG_STATE64,
                std::ptr::addr_of_mut!(raw).cast::<natural_t>(),
                &mut count,
            )
        };

        if kr != KERN_SUCCESS {
            return Err(WatchError::MachError(MachError::from(kr)));
        }
        if count != ffi::X86_DEBUG_STATE64_COUNT {
            return Err(WatchError::ContextAccess(format!(
                "x86_DEBUG_STATE64 returned {count} words, expected {}",
                ffi::X86_DEBUG_STATE64_COUNT
            )));
        }
        Ok(raw)
    }
}

impl DebugContext for MachThreadContext
{
    fn read_debug_state(&mut self) -> WatchResult<DebugRegisterState>
    {
        let raw = self.get_state()?;
        trace!(thread = self.thread, dr7 = raw.dr7, "thread_get_state(x86_DEBUG_STATE64)");
        Ok(DebugRegisterState {
            address: [raw.dr0, raw.dr1, raw.dr2, raw.dr3],
            status: raw.dr6,
            control: DebugControl::from_raw(raw.dr7),
        })
    }

    fn write_debug_state(&mut self, state: &DebugRegisterState) -> WatchResult<()>
    {
        // DR4/DR5 are reserved aliases; send back whatever the kernel gave us
        let current = self.get_state()?;
        let raw = X86DebugState64 {
            dr0: state.address[0],
            dr1: state.address[1],
            dr2: state.address[2],
            dr3: state.address[3],
            dr4: current.dr4,
            dr5: current.dr5,
            dr6: state.status,
            dr7: state.control.raw(),
        };

        let kr = unsafe {
            ffi::thread_set_state(
                self.thread,
                ffi::X86_DEBUG_STATE64,
                std::ptr::addr_of!(raw).cast::<natural_t>(),
                ffi::X86_DEBUG_STATE64_COUNT,
            )
        };

        if kr != KERN_SUCCESS {
            return Err(WatchError::MachError(MachError::from(kr)));
        }
        trace!(thread = self.thread, dr7 = raw.dr7, "thread_set_state(x86_DEBUG_STATE64)");
        Ok(())
    }
}

impl Drop for MachThreadContext
{
    fn drop(&mut self)
    {
        if self.owns_port {
            let kr = unsafe { ffi::mach_port_deallocate(mach2::traps::mach_task_self(), self.thread) };
            if kr != KERN_SUCCESS {
                warn!(thread = self.thread, error = %MachError::from(kr), "failed to release thread port");
            }
        }
    }
}
