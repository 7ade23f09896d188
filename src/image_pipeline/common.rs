//! Common utilities module
//!
//! Shared error type and the integer helpers used by every pixel decoder.

pub mod error;
pub mod numeric;

pub use error::{CaptureError, Result};
