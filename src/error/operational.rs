//! Operational error context propagation with `anyhow`.
//!
//! This module provides an extension trait for enhancing error context at
//! the binary boundary, plus a reporter that surfaces session-fatal errors
//! distinctly from the per-file conversion log.

use std::{error::Error as StdError, fmt::Display};

use {
    anyhow::{Context, Result as AnyhowResult},
    tracing::error,
};

use crate::error::domain::SessionError;

/// Extension trait for enhanced error context.
pub trait ResultExt<T, E> {
    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Adds context to an error with a formatted string.
    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(context)
    }

    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(format.to_string())
    }
}

/// Surfaces session-fatal errors to the user.
///
/// Per-file failures flow through the conversion event log; anything routed
/// through this reporter terminates the session and deserves a distinct,
/// blocking-style notification from the consumer.
pub struct SessionErrorReporter;

impl SessionErrorReporter {
    /// Logs a fatal session error and returns the user-facing message.
    pub fn fatal(error: &SessionError) -> String {
        error!(error = %error, "session terminated");
        Self::to_user_message(error)
    }

    /// Converts a session error to a user-friendly message.
    pub fn to_user_message(error: &SessionError) -> String {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Error, ErrorKind::NotFound};

    use crate::error::{
        domain::SessionError,
        operational::{ResultExt, SessionErrorReporter},
    };

    #[test]
    fn test_result_ext_add_context() {
        let result: Result<i32, Error> = Err(Error::new(NotFound, "missing"));
        let with_context = result.add_context("loading settings");

        assert!(with_context.is_err());
        assert!(
            with_context
                .unwrap_err()
                .to_string()
                .contains("loading settings")
        );
    }

    #[test]
    fn test_result_ext_add_contextf() {
        let result: Result<i32, Error> = Err(Error::new(NotFound, "missing"));
        let with_context = result.add_contextf(format!("loading {}", "settings.json"));

        assert!(with_context.is_err());
        assert!(
            with_context
                .unwrap_err()
                .to_string()
                .contains("loading settings.json")
        );
    }

    #[test]
    fn test_reporter_user_message() {
        let error = SessionError::InvalidState {
            reason: "already started".to_string(),
        };
        assert_eq!(
            SessionErrorReporter::to_user_message(&error),
            "invalid session state: already started"
        );
    }
}
