//! # tripwire-core
//!
//! Hardware data watchpoints on the x86 debug registers.
//!
//! A [`HardwareWatchpoint`] claims one of the four debug address registers
//! (DR0-DR3) of an execution context, encodes the watched width and trigger
//! condition into DR7, and gives the slot back when it is dropped. The
//! target code is never patched and never single-stepped.
//!
//! ```rust
//! use tripwire_core::prelude::*;
//!
//! let mut ctx = MemoryContext::new();
//! let mut watch = HardwareWatchpoint::new(&mut ctx);
//! let slot = watch.activate(Address::from(0x1000), 4, Condition::Write)?;
//!
//! let control = watch.context().state().control;
//! assert_eq!(control.condition_bits(slot), 0b01);
//! assert_eq!(control.length_bits(slot), 0b11);
//! # Ok::<(), WatchError>(())
//! ```
//!
//! ## Out of scope
//!
//! - Delivering the debug exception when a watchpoint fires
//! - Coordinating slots between unrelated tools: a slot is "free" when its
//!   L/G bits in DR7 are clear, nothing more
//!
//! ## Platform Support
//!
//! - **Any OS**: bring your own [`DebugContext`](context::DebugContext)
//! - **macOS x86-64**: `platform::macos::MachThreadContext`
//!
//! ## Why unsafe code is needed
//!
//! Only the Mach accessor uses `unsafe`, to call `thread_get_state()` and
//! `thread_set_state()`. Register encoding and slot bookkeeping are safe code.

#![allow(unsafe_code)] // Required for the Mach thread state calls

pub mod context;
pub mod error;
pub mod platform;
pub mod prelude;
pub mod registers;
pub mod types;
pub mod watchpoint;

pub use context::{DebugContext, MemoryContext};
pub use error::{InvalidRequest, WatchError, WatchResult};
pub use watchpoint::{AccessWidth, Condition, HardwareWatchpoint, WatchRequest};
