//! # Hardware Watchpoint Controller
//!
//! [`HardwareWatchpoint`] owns at most one debug register slot in one
//! execution context and releases it when dropped.
//!
//! ```text
//!            activate                 activate (re-arm)
//!  Unarmed ───────────► Armed(slot) ◄──────────────┐
//!     ▲                     │ └────────────────────┘
//!     └─── deactivate/drop ─┘
//! ```
//!
//! ## Slot ownership
//!
//! A controller only knows about its own slot. Free slots are found by
//! looking at the L/G enable bits in DR7, so several controllers can share a
//! context as long as the caller serializes their calls; there is no lock
//! here.

use tracing::{debug, trace, warn};

use crate::context::DebugContext;
use crate::error::{InvalidRequest, WatchResult};
use crate::registers::SlotIndex;
use crate::types::Address;
use crate::watchpoint::{Condition, WatchRequest};

#[derive(Debug, Clone, Copy)]
struct Armed
{
    slot: SlotIndex,
    request: WatchRequest,
}

/// A data watchpoint backed by one of the four x86 debug address registers.
///
/// ## Example
///
/// ```rust
/// use tripwire_core::context::MemoryContext;
/// use tripwire_core::types::Address;
/// use tripwire_core::watchpoint::{Condition, HardwareWatchpoint};
///
/// let mut ctx = MemoryContext::new();
/// {
///     let mut watch = HardwareWatchpoint::new(&mut ctx);
///     let slot = watch.activate(Address::from(0x1000), 4, Condition::Write)?;
///     assert_eq!(watch.context().state().address_of(slot), 0x1000);
/// }
/// // Dropping the controller released the slot
/// assert_eq!(ctx.state().control.first_free_slot().map(|s| s.index()), Some(0));
/// # Ok::<(), tripwire_core::error::WatchError>(())
/// ```
#[derive(Debug)]
pub struct HardwareWatchpoint<C: DebugContext>
{
    context: C,
    armed: Option<Armed>,
}

impl<C: DebugContext> HardwareWatchpoint<C>
{
    /// An unarmed controller for `context`.
    pub const fn new(context: C) -> Self
    {
        Self { context, armed: None }
    }

    /// A controller armed on construction.
    ///
    /// ## Errors
    ///
    /// Same as [`activate`](Self::activate). The context is dropped with the
    /// failed controller.
    pub fn armed(context: C, address: Address, width: usize, condition: Condition) -> WatchResult<Self>
    {
        let mut watchpoint = Self::new(context);
        watchpoint.activate(address, width, condition)?;
        Ok(watchpoint)
    }

    /// Watch `width` bytes at `address`.
    ///
    /// If this controller is already armed, its slot is released in the same
    /// register update that installs the new watchpoint.
    ///
    /// ## Errors
    ///
    /// - `InvalidBreakpointRequest`: width not 1, 2 or 4; null or misaligned
    ///   address; all four slots in use
    /// - `ContextAccess`/platform errors from the register accessor
    ///
    /// On error nothing was written and the previous watchpoint (if any) is
    /// still active.
    pub fn activate(&mut self, address: Address, width: usize, condition: Condition) -> WatchResult<SlotIndex>
    {
        let request = WatchRequest::new(address, width, condition)?;
        self.activate_request(request)
    }

    /// Install an already-built request. See [`activate`](Self::activate).
    ///
    /// ## Errors
    ///
    /// Same as [`activate`](Self::activate).
    pub fn activate_request(&mut self, request: WatchRequest) -> WatchResult<SlotIndex>
    {
        request.validate()?;

        let mut state = self.context.read_debug_state()?;
        trace!(dr7 = state.control.raw(), "read debug state");

        if let Some(previous) = self.armed {
            state.control.disarm(previous.slot);
        }

        let slot = state
            .control
            .first_free_slot()
            .ok_or(InvalidRequest::NoFreeSlot)?;

        state.set_address(slot, request.address.value());
        state.control.arm(slot, request.condition, request.width);

        self.context.write_debug_state(&state)?;

        if let Some(previous) = self.armed {
            debug!(from = %previous.slot, to = %slot, "watchpoint re-armed");
        }
        self.armed = Some(Armed { slot, request });

        debug!(
            slot = %slot,
            address = %request.address,
            width = request.width.bytes(),
            condition = ?request.condition,
            "watchpoint armed"
        );
        Ok(slot)
    }

    /// Release the slot, if one is held.
    ///
    /// Only the slot's L*n* bit is cleared. Never fails: if the registers
    /// can't be updated the failure is logged and the slot is still
    /// forgotten, since there is nothing a caller could do about it.
    pub fn deactivate(&mut self)
    {
        let Some(armed) = self.armed.take() else {
            return;
        };

        match self.release(armed.slot) {
            Ok(()) => debug!(slot = %armed.slot, address = %armed.request.address, "watchpoint disarmed"),
            Err(e) => warn!(slot = %armed.slot, error = %e, "failed to disarm watchpoint"),
        }
    }

    fn release(&mut self, slot: SlotIndex) -> WatchResult<()>
    {
        let mut state = self.context.read_debug_state()?;
        state.control.disarm(slot);
        self.context.write_debug_state(&state)
    }

    /// Slot held by this controller.
    pub fn slot(&self) -> Option<SlotIndex>
    {
        self.armed.map(|armed| armed.slot)
    }

    /// The request currently installed.
    pub fn request(&self) -> Option<WatchRequest>
    {
        self.armed.map(|armed| armed.request)
    }

    pub fn is_armed(&self) -> bool
    {
        self.armed.is_some()
    }

    /// The register accessor.
    pub const fn context(&self) -> &C
    {
        &self.context
    }
}

impl<C: DebugContext> Drop for HardwareWatchpoint<C>
{
    fn drop(&mut self)
    {
        self.deactivate();
    }
}
