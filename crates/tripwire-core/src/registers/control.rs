//! DR7 (debug control) encoding.
//!
//! DR7 packs the configuration of all four slots into one word:
//!
//! ```text
//!  31 30 29 28 | 27 26 25 24 | 23 22 21 20 | 19 18 17 16 | 15 .. 8 | 7  6  5  4  3  2  1  0
//!  LEN3  RW3   | LEN2  RW2   | LEN1  RW1   | LEN0  RW0   |  (misc) | G3 L3 G2 L2 G1 L1 G0 L0
//! ```
//!
//! Every edit must touch only the bits of the slot being changed. Nothing in
//! the hardware catches a shifted field; it just reconfigures a neighbour.

use crate::registers::SlotIndex;
use crate::watchpoint::{AccessWidth, Condition};

/// First RW bit (RW0).
const CONDITION_BASE_BIT: u32 = 16;
/// First LEN bit (LEN0).
const LENGTH_BASE_BIT: u32 = 18;
/// Distance between consecutive slots' RW/LEN groups.
const FIELD_STRIDE: u32 = 4;
/// Distance between consecutive slots' L/G pairs.
const ENABLE_STRIDE: u32 = 2;

/// Replace `bits` bits of `word` starting at `low_bit` with `value`.
///
/// `value` is masked to the field width, so an oversized value cannot leak
/// into the bits above the field. All bits outside the field are preserved.
///
/// ```rust
/// use tripwire_core::registers::set_bits;
///
/// assert_eq!(set_bits(0b1111_0000, 2, 2, 0b01), 0b1111_0100);
/// assert_eq!(set_bits(u64::MAX, 16, 4, 0), 0xffff_ffff_fff0_ffff);
/// ```
#[must_use]
pub const fn set_bits(word: u64, low_bit: u32, bits: u32, value: u64) -> u64
{
    debug_assert!(low_bit + bits <= u64::BITS);
    let mask = field_mask(bits);
    (word & !(mask << low_bit)) | ((value & mask) << low_bit)
}

/// Extract `bits` bits of `word` starting at `low_bit`.
#[must_use]
pub const fn get_bits(word: u64, low_bit: u32, bits: u32) -> u64
{
    debug_assert!(low_bit + bits <= u64::BITS);
    (word >> low_bit) & field_mask(bits)
}

const fn field_mask(bits: u32) -> u64
{
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

const fn local_enable_bit(slot: SlotIndex) -> u32
{
    slot.index() as u32 * ENABLE_STRIDE
}

const fn global_enable_bit(slot: SlotIndex) -> u32
{
    local_enable_bit(slot) + 1
}

const fn condition_bit(slot: SlotIndex) -> u32
{
    CONDITION_BASE_BIT + slot.index() as u32 * FIELD_STRIDE
}

const fn length_bit(slot: SlotIndex) -> u32
{
    LENGTH_BASE_BIT + slot.index() as u32 * FIELD_STRIDE
}

/// Image of the DR7 register.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebugControl(u64);

impl DebugControl
{
    /// Wrap a raw DR7 value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self
    {
        DebugControl(raw)
    }

    /// Raw DR7 value.
    #[must_use]
    pub const fn raw(self) -> u64
    {
        self.0
    }

    /// L*n* bit: slot enabled for the current task.
    #[must_use]
    pub const fn is_local_enabled(self, slot: SlotIndex) -> bool
    {
        get_bits(self.0, local_enable_bit(slot), 1) == 1
    }

    /// G*n* bit: slot enabled for all tasks (usually owned by the OS).
    #[must_use]
    pub const fn is_global_enabled(self, slot: SlotIndex) -> bool
    {
        get_bits(self.0, global_enable_bit(slot), 1) == 1
    }

    /// A slot is free when neither enable bit is set.
    #[must_use]
    pub const fn is_slot_free(self, slot: SlotIndex) -> bool
    {
        !self.is_local_enabled(slot) && !self.is_global_enabled(slot)
    }

    /// Lowest-numbered free slot.
    #[must_use]
    pub fn first_free_slot(self) -> Option<SlotIndex>
    {
        SlotIndex::ALL.into_iter().find(|&slot| self.is_slot_free(slot))
    }

    /// Raw RW*n* field.
    #[must_use]
    pub const fn condition_bits(self, slot: SlotIndex) -> u8
    {
        get_bits(self.0, condition_bit(slot), 2) as u8
    }

    /// Raw LEN*n* field.
    #[must_use]
    pub const fn length_bits(self, slot: SlotIndex) -> u8
    {
        get_bits(self.0, length_bit(slot), 2) as u8
    }

    /// Decoded trigger condition, `None` for execute and I/O encodings.
    #[must_use]
    pub const fn condition(self, slot: SlotIndex) -> Option<Condition>
    {
        Condition::from_bits(self.condition_bits(slot))
    }

    /// Decoded access width, `None` for the 8-byte encoding.
    #[must_use]
    pub const fn width(self, slot: SlotIndex) -> Option<AccessWidth>
    {
        AccessWidth::from_bits(self.length_bits(slot))
    }

    /// Program RW*n*/LEN*n* and set L*n*.
    ///
    /// Only the five bits belonging to `slot` change; the G*n* bit is left
    /// as found.
    pub fn arm(&mut self, slot: SlotIndex, condition: Condition, width: AccessWidth)
    {
        let mut raw = self.0;
        raw = set_bits(raw, condition_bit(slot), 2, u64::from(condition.bits()));
        raw = set_bits(raw, length_bit(slot), 2, u64::from(width.bits()));
        raw = set_bits(raw, local_enable_bit(slot), 1, 1);
        self.0 = raw;
    }

    /// Clear L*n*.
    ///
    /// RW*n*/LEN*n* keep their stale values; the CPU ignores them while the
    /// slot is disabled and [`arm`](Self::arm) overwrites them on reuse.
    pub fn disarm(&mut self, slot: SlotIndex)
    {
        self.0 = set_bits(self.0, local_enable_bit(slot), 1, 0);
    }
}
