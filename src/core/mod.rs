//! Shared foundation for the instrumentation core.
//!
//! Holds the error type and the configuration structs that parameterize
//! the sampling and rate-tracking primitives.

#![warn(missing_docs)]

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{MeterConfig, ReservoirConfig};
pub use error::{MetronError, Result};
