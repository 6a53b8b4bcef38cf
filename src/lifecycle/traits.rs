//! Lifecycle hook traits
//!
//! These traits define the contract for components that need to participate
//! in session lifecycle events. Each one pairs with a [`Hook`] constructor,
//! e.g. [`Hook::on_start`], so a component registers its hooks without
//! writing closures by hand.
//!
//! [`Hook`]: super::Hook
//! [`Hook::on_start`]: super::Hook::on_start

use super::Result;

/// Called once when the component is constructed
///
/// Use this hook to:
/// - Validate configuration
/// - Allocate resources that do not depend on other components being started
///
/// # Example
///
/// ```rust,ignore
/// use meshestra_lifecycle::lifecycle::{OnInit, LifecycleError, Result};
///
/// impl OnInit for DatabaseService {
///     fn on_init(&self) -> Result<()> {
///         self.pool.connect(&self.config)
///             .map_err(|e| LifecycleError::init_failed(e.to_string()))
///     }
/// }
/// ```
pub trait OnInit: Send + Sync {
    /// Called when the component is initialized
    fn on_init(&self) -> Result<()>;
}

/// Called every time the component is injected somewhere
///
/// Unlike the other hooks this one is never deduplicated.
pub trait OnInject: Send + Sync {
    /// Called at each injection point
    fn on_inject(&self) -> Result<()>;
}

/// Called when the session starts
///
/// Start hooks run in registration order. A component registered after the
/// session has started is started immediately.
///
/// Use this hook to:
/// - Start background tasks
/// - Register event listeners
/// - Perform warm-up operations that depend on other components
pub trait OnStart: Send + Sync {
    /// Called when the session starts
    fn on_start(&self) -> Result<()>;
}

/// Called when the session begins shutting down, before any [`OnShutdown`] hook
///
/// Use this hook to:
/// - Stop accepting new work
/// - Flush buffers
pub trait OnPreShutdown: Send + Sync {
    /// Called before shutdown hooks run
    fn on_pre_shutdown(&self) -> Result<()>;
}

/// Called when the session shuts down
///
/// # Note
///
/// Components are shut down in **reverse order** of their registration
/// to properly handle dependencies.
///
/// # Example
///
/// ```rust,ignore
/// use meshestra_lifecycle::lifecycle::{OnShutdown, LifecycleError, Result};
///
/// impl OnShutdown for DatabaseService {
///     fn on_shutdown(&self) -> Result<()> {
///         self.pool.close()
///             .map_err(|e| LifecycleError::shutdown_failed(e.to_string()))
///     }
/// }
/// ```
pub trait OnShutdown: Send + Sync {
    /// Called when the component is being shut down
    fn on_shutdown(&self) -> Result<()>;
}
