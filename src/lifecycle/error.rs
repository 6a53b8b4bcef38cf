//! Lifecycle-specific error types

use super::Stage;
use thiserror::Error;

/// Errors that can occur during lifecycle operations
///
/// Errors returned by a hook are handed back to the caller of
/// `start()`, `shutdown()` or `add_*_hook()` exactly as the hook produced them.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// `start()` was called on a session that already left `INITIALIZING`
    #[error("Session {session} is already {stage}")]
    AlreadyStarted {
        /// Display name of the session
        session: String,
        /// Stage observed when the transition was attempted
        stage: Stage,
    },

    /// Service initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Service startup failed
    #[error("Startup failed: {0}")]
    StartupFailed(String),

    /// Shutdown operation failed
    #[error("Shutdown failed: {0}")]
    ShutdownFailed(String),

    /// Hook execution failed
    #[error("Hook execution failed for {service}: {message}")]
    HookFailed {
        /// Name of the service that failed
        service: String,
        /// Error message
        message: String,
    },

    /// Any other error raised by a hook
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LifecycleError {
    /// Create an invalid `start()` transition error
    pub fn already_started(session: impl Into<String>, stage: Stage) -> Self {
        Self::AlreadyStarted {
            session: session.into(),
            stage,
        }
    }

    /// Create an initialization failure error
    pub fn init_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    /// Create a startup failure error
    pub fn startup_failed(msg: impl Into<String>) -> Self {
        Self::StartupFailed(msg.into())
    }

    /// Create a shutdown failure error
    pub fn shutdown_failed(msg: impl Into<String>) -> Self {
        Self::ShutdownFailed(msg.into())
    }

    /// Create a hook failure error
    pub fn hook_failed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HookFailed {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_started_message_names_stage() {
        let err = LifecycleError::already_started("app", Stage::Started);
        assert_eq!(err.to_string(), "Session app is already STARTED");
    }

    #[test]
    fn test_anyhow_errors_are_transparent() {
        let err: LifecycleError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }
}
