//! The `utils` module provides shared definitions used across `ssecast`:
//! the error taxonomy and tracing setup.

pub mod error;
pub mod logging;
