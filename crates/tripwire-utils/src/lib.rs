//! # Tripwire Utilities
//!
//! Shared utilities, logging, and configuration for tripwire.
//!
//! This crate provides common functionality used across the tripwire workspace,
//! mainly the logging setup built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
