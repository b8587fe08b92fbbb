//! Validation utilities
//!
//! This module consolidates validation functions that were previously
//! scattered across different crates.

pub mod protocol;
pub mod session;
pub mod timeout;

pub use protocol::*;
pub use session::*;
pub use timeout::*; 