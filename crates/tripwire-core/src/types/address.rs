//! Memory address type.

use std::fmt;

/// Strongly typed memory address
///
/// This wrapper around `u64` keeps watched addresses apart from widths, slot
/// numbers and raw register words, which are all plain integers too.
///
/// ## Example
///
/// ```rust
/// use tripwire_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// assert!(addr.is_aligned_to(4));
/// assert_eq!(addr.value(), 0x1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Address of a value in this process.
    ///
    /// ```rust
    /// use tripwire_core::types::Address;
    ///
    /// let counter = 0u32;
    /// let addr = Address::from_ptr(&counter);
    /// assert!(addr.is_aligned_to(4));
    /// ```
    pub fn from_ptr<T>(ptr: *const T) -> Self
    {
        Address(ptr as usize as u64)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Whether the address is a multiple of `bytes`.
    ///
    /// Zero is treated as "no alignment", which nothing satisfies.
    pub const fn is_aligned_to(self, bytes: u64) -> bool
    {
        bytes != 0 && self.0 % bytes == 0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use tripwire_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x2), Some(Address::from(0x1002)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}
