//! # x86 Debug Registers
//!
//! Bit-exact model of the debug register set a watchpoint lives in.
//!
//! ## Layout
//!
//! - **DR0-DR3**: linear addresses, one per slot
//! - **DR6**: debug status (which slot fired); carried through untouched
//! - **DR7**: debug control, shared by all four slots (see [`DebugControl`])
//!
//! DR4/DR5 are aliases of DR6/DR7 and are not modelled.
//!
//! ## See Also
//!
//! - Intel SDM Vol. 3B, section 17.2 "Debug Registers"

pub mod control;

pub use control::{get_bits, set_bits, DebugControl};

/// Number of hardware address registers (DR0-DR3).
pub const SLOT_COUNT: usize = 4;

/// One of the four hardware breakpoint slots.
///
/// A slot index is always in `0..=3`; an unreserved slot is expressed as
/// `Option<SlotIndex>::None` rather than a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(u8);

impl SlotIndex
{
    /// All slots, in allocation order.
    pub const ALL: [SlotIndex; SLOT_COUNT] = [SlotIndex(0), SlotIndex(1), SlotIndex(2), SlotIndex(3)];

    /// Slot for a raw index, or `None` if it is not 0-3.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self>
    {
        if (index as usize) < SLOT_COUNT {
            Some(SlotIndex(index))
        } else {
            None
        }
    }

    /// Raw index (0-3).
    #[must_use]
    pub const fn index(self) -> usize
    {
        self.0 as usize
    }
}

impl std::fmt::Display for SlotIndex
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "DR{}", self.0)
    }
}

/// Snapshot of one execution context's debug registers.
///
/// Always read and written as a whole, so an update to DR7 and the matching
/// address register lands in a single accessor call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DebugRegisterState
{
    /// DR0-DR3
    pub address: [u64; SLOT_COUNT],
    /// DR6
    pub status: u64,
    /// DR7
    pub control: DebugControl,
}

impl DebugRegisterState
{
    /// Address register for `slot`.
    #[must_use]
    pub const fn address_of(&self, slot: SlotIndex) -> u64
    {
        self.address[slot.index()]
    }

    /// Set the address register for `slot`.
    pub fn set_address(&mut self, slot: SlotIndex, address: u64)
    {
        self.address[slot.index()] = address;
    }
}
