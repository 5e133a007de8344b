//! Error handling system using `thiserror` and `anyhow`.
//!
//! This module provides domain-specific error types for precise error
//! handling and operational error context propagation at the binary
//! boundary.

pub mod domain;
pub mod operational;

pub use {
    domain::{ConfigError, ConvertError, SessionError},
    operational::{ResultExt, SessionErrorReporter},
};
