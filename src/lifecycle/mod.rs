//! Lifecycle Hooks Module
//!
//! This module coordinates the lifecycle of the components living in a
//! session: it fires per-component hooks exactly once, in a well-defined
//! order, at the right stage transition.
//!
//! # Lifecycle Stages
//!
//! ```text
//! 1. INITIALIZING                       ← init hooks run as components are built
//!    ↓ start()
//! 2. STARTING                           ← start hooks (registration order)
//!    ↓
//! 3. STARTED                            ← late start hooks run immediately
//!    ↓ shutdown()
//! 4. STOPPING                           ← pre-shutdown hooks (reverse order)
//!    ↓                                  ← shutdown hooks (reverse order)
//! 5. STOPPED
//! ```
//!
//! `shutdown()` may also be called from `INITIALIZING` or `STARTING` to
//! clean up a session that never finished starting.
//!
//! # Example
//!
//! ```rust,ignore
//! use meshestra_lifecycle::lifecycle::{Hook, OnStart, OnShutdown, Result};
//! use meshestra_lifecycle::session::SessionBuilder;
//! use std::sync::Arc;
//!
//! pub struct DatabaseService { /* ... */ }
//!
//! impl OnStart for DatabaseService {
//!     fn on_start(&self) -> Result<()> {
//!         tracing::info!("Opening database connections");
//!         Ok(())
//!     }
//! }
//!
//! impl OnShutdown for DatabaseService {
//!     fn on_shutdown(&self) -> Result<()> {
//!         tracing::info!("Closing database connections");
//!         Ok(())
//!     }
//! }
//!
//! let session = SessionBuilder::new().name("app").build();
//! let db = Arc::new(DatabaseService { /* ... */ });
//! session.lifecycle_manager().add_start_hook(Hook::on_start(&db))?;
//! session.lifecycle_manager().add_shutdown_hook(Hook::on_shutdown(&db));
//! session.start()?;
//! ```

mod error;
mod executor;
mod handler;
mod hook;
mod logging;
mod manager;
mod registry;
mod stage;
mod traits;

pub use error::{LifecycleError, Result};
pub use executor::FiloHookExecutor;
pub use handler::{LifecycleEventHandler, LifecycleEventHandlerChain, LifecycleEventHandlerExt};
pub use hook::{Hook, TypeToken};
pub use logging::{LogLevel, ShowLifecycleLog};
pub use manager::{LifecycleManager, LifecycleSnapshot, UnboundLifecycleManager};
pub use registry::HookRegistry;
pub use stage::Stage;
pub use traits::{OnInit, OnInject, OnPreShutdown, OnShutdown, OnStart};

pub(crate) use stage::AtomicStage;
