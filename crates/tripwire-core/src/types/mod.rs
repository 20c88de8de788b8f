//! # Types
//!
//! Small value types shared by the register and watchpoint modules.

pub mod address;

pub use address::Address;
