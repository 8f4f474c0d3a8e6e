//! IMDF Builder Common Utilities
//!
//! Shared infrastructure for all IMDF Builder crates:
//! - Error taxonomy and result alias
//! - Clock abstraction and timestamp formatting
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
