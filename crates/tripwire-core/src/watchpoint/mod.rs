//! Watchpoint requests and the hardware watchpoint controller.
//!
//! The request vocabulary maps one-to-one onto DR7 bit patterns. The patterns
//! are fixed by the processor, so they live here as enum lookups instead of
//! being spelled out where DR7 is edited.

pub mod controller;

pub use controller::HardwareWatchpoint;

use crate::error::{InvalidRequest, WatchResult};
use crate::types::Address;

/// When the watchpoint fires.
///
/// There is no read-only mode: the hardware's read encoding (`11`) traps on
/// reads *and* writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Condition
{
    /// Trap on data writes (RW = `01`)
    Write = 0b01,
    /// Trap on data reads or writes (RW = `11`)
    ReadOrWrite = 0b11,
}

impl Condition
{
    /// RW*n* bit pattern.
    #[must_use]
    pub const fn bits(self) -> u8
    {
        self as u8
    }

    /// Decode an RW*n* pattern. Execute (`00`) and I/O (`10`) are not
    /// watchpoint conditions and decode to `None`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self>
    {
        match bits {
            0b01 => Some(Condition::Write),
            0b11 => Some(Condition::ReadOrWrite),
            _ => None,
        }
    }
}

/// Number of bytes watched, starting at the watched address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AccessWidth
{
    /// 1 byte (LEN = `00`)
    Byte = 0b00,
    /// 2 bytes (LEN = `01`)
    Word = 0b01,
    /// 4 bytes (LEN = `11`)
    Dword = 0b11,
}

impl AccessWidth
{
    /// Width for a byte count.
    ///
    /// ## Errors
    ///
    /// `InvalidBreakpointRequest` for anything but 1, 2 or 4.
    pub fn from_bytes(bytes: usize) -> WatchResult<Self>
    {
        match bytes {
            1 => Ok(AccessWidth::Byte),
            2 => Ok(AccessWidth::Word),
            4 => Ok(AccessWidth::Dword),
            other => Err(InvalidRequest::UnsupportedWidth(other).into()),
        }
    }

    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize
    {
        match self {
            AccessWidth::Byte => 1,
            AccessWidth::Word => 2,
            AccessWidth::Dword => 4,
        }
    }

    /// LEN*n* bit pattern.
    #[must_use]
    pub const fn bits(self) -> u8
    {
        self as u8
    }

    /// Decode a LEN*n* pattern. `10` (8 bytes, 64-bit mode only) decodes to `None`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self>
    {
        match bits {
            0b00 => Some(AccessWidth::Byte),
            0b01 => Some(AccessWidth::Word),
            0b11 => Some(AccessWidth::Dword),
            _ => None,
        }
    }
}

/// A validated (address, width, condition) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchRequest
{
    pub address: Address,
    pub width: AccessWidth,
    pub condition: Condition,
}

impl WatchRequest
{
    /// Build and validate a request from a raw byte width.
    ///
    /// ```rust
    /// use tripwire_core::types::Address;
    /// use tripwire_core::watchpoint::{AccessWidth, Condition, WatchRequest};
    ///
    /// let request = WatchRequest::new(Address::from(0x1002), 2, Condition::ReadOrWrite)?;
    /// assert_eq!(request.width, AccessWidth::Word);
    ///
    /// assert!(WatchRequest::new(Address::from(0x1002), 4, Condition::Write).is_err());
    /// # Ok::<(), tripwire_core::error::WatchError>(())
    /// ```
    ///
    /// ## Errors
    ///
    /// `InvalidBreakpointRequest` if the width is unsupported, the address is
    /// null, or the address is not aligned to the width.
    pub fn new(address: Address, width: usize, condition: Condition) -> WatchResult<Self>
    {
        let request = WatchRequest {
            address,
            width: AccessWidth::from_bytes(width)?,
            condition,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the address against the width.
    ///
    /// ## Errors
    ///
    /// `InvalidBreakpointRequest` for a null or misaligned address.
    pub fn validate(&self) -> WatchResult<()>
    {
        if self.address.is_null() {
            return Err(InvalidRequest::NullAddress.into());
        }
        let width = self.width.bytes();
        if !self.address.is_aligned_to(width as u64) {
            return Err(InvalidRequest::Misaligned {
                address: self.address,
                width,
            }
            .into());
        }
        Ok(())
    }
}
