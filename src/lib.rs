//! # Meshestra Lifecycle
//!
//! The session lifecycle coordinator underneath Meshestra's dependency
//! injection container.
//!
//! Every session owns a [`LifecycleManager`] that moves through a fixed
//! sequence of stages and fires the hooks components registered with it:
//!
//! - **Exactly once**: a component's init, start, pre-shutdown and shutdown
//!   hooks each fire at most once, however many times they are registered
//! - **Ordered**: start hooks run in registration order, shutdown hooks in
//!   reverse (FILO)
//! - **Late joiners**: a start hook registered after the session started
//!   runs immediately
//! - **Hierarchical**: hooks for types bound in a parent session are owned by
//!   the parent's manager
//! - **Thread-safe**: `start()` and `shutdown()` are atomic one-shot
//!   transitions; `shutdown()` is idempotent
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meshestra_lifecycle::prelude::*;
//!
//! struct Database;
//!
//! impl OnStart for Database {
//!     fn on_start(&self) -> Result<(), LifecycleError> {
//!         tracing::info!("Connecting...");
//!         Ok(())
//!     }
//! }
//!
//! impl OnShutdown for Database {
//!     fn on_shutdown(&self) -> Result<(), LifecycleError> {
//!         tracing::info!("Disconnecting...");
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), LifecycleError> {
//!     let session = SessionBuilder::new()
//!         .name("app")
//!         .handler(FiloHookExecutor.and_then(ShowLifecycleLog::info()))
//!         .build();
//!
//!     let db = Arc::new(Database);
//!     let manager = session.lifecycle_manager();
//!     manager.add_start_hook(Hook::on_start(&db))?;
//!     manager.add_shutdown_hook(Hook::on_shutdown(&db));
//!
//!     session.start()?;
//!     // ... application runs ...
//!     session.shutdown()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod lifecycle;
pub mod session;
pub mod tracer;

// Re-export core types
pub use config::{ConfigService, LifecycleConfig};
pub use lifecycle::{
    FiloHookExecutor, Hook, LifecycleError, LifecycleEventHandler, LifecycleManager, Result,
    Stage, TypeToken,
};
pub use session::{DefaultSession, Session, SessionBuilder};
pub use tracer::Tracer;

/// Prelude module for convenient imports
///
/// ```
/// use meshestra_lifecycle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigService, LifecycleConfig, LifecycleLogging};
    pub use crate::lifecycle::{
        FiloHookExecutor, Hook, HookRegistry, LifecycleError, LifecycleEventHandler,
        LifecycleEventHandlerChain, LifecycleEventHandlerExt, LifecycleManager, OnInit, OnInject,
        OnPreShutdown, OnShutdown, OnStart, ShowLifecycleLog, Stage, TypeToken,
        UnboundLifecycleManager,
    };
    pub use crate::session::{DefaultSession, Session, SessionBuilder};
    pub use crate::tracer::{LogTracer, NoopTracer, Tracer};
    pub use std::sync::Arc;
}
