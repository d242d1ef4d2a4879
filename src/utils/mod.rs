//! Shared utilities: the crate error type and logging setup.

pub mod error;
pub mod logging;

pub use error::{RelayError, Result};
