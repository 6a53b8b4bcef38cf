//! Lifecycle Manager
//!
//! Owns a session's stage and hook registries, and drives the
//! `start()` / `shutdown()` transitions.

use super::{
    AtomicStage, Hook, HookRegistry, LifecycleError, LifecycleEventHandler, Result, Stage,
    TypeToken,
};
use crate::session::Session;
use crate::tracer::{NoopTracer, Tracer};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use std::any::Any;
use std::ptr;
use std::sync::{Arc, Weak};

/// A lifecycle manager that is not attached to a session yet
///
/// Sessions and their managers refer to each other, so a manager is created
/// first and then bound once its session exists. Only a bound
/// [`LifecycleManager`] accepts hooks or reports its stage.
pub struct UnboundLifecycleManager {
    handler: Arc<dyn LifecycleEventHandler>,
    tracer: Arc<dyn Tracer>,
}

impl UnboundLifecycleManager {
    /// Create a manager that notifies `handler` at every transition
    pub fn new<H: LifecycleEventHandler + 'static>(handler: H) -> Self {
        Self::new_shared(Arc::new(handler))
    }

    /// Like [`UnboundLifecycleManager::new`] for an already shared handler
    pub fn new_shared(handler: Arc<dyn LifecycleEventHandler>) -> Self {
        Self {
            handler,
            tracer: Arc::new(NoopTracer),
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Attach the manager to its owning session
    ///
    /// `session` is typically the weak self-reference handed out by
    /// [`Arc::new_cyclic`] while the session is being constructed.
    pub fn bind(self, session: Weak<dyn Session>, session_name: impl Into<String>) -> LifecycleManager {
        LifecycleManager {
            stage: AtomicStage::new(Stage::Initializing),
            init_hooks: HookRegistry::new(),
            start_hooks: HookRegistry::new(),
            pre_shutdown_hooks: HookRegistry::new(),
            shutdown_hooks: HookRegistry::new(),
            handler: self.handler,
            tracer: self.tracer,
            session,
            session_name: session_name.into(),
            lock: ReentrantMutex::new(()),
            started_at: Mutex::new(None),
            stopped_at: Mutex::new(None),
        }
    }
}

/// Drives a session through its lifecycle stages and fires its hooks
///
/// The LifecycleManager is responsible for:
/// - Recording hooks, at most one per component and hook kind
/// - Firing each hook exactly once at the right transition
/// - Running hooks registered after their transition when that is still meaningful
///
/// # Example
///
/// ```rust,ignore
/// let session = SessionBuilder::new().name("app").build();
/// let manager = session.lifecycle_manager();
///
/// manager.add_start_hook(Hook::on_start(&db))?;
/// manager.add_shutdown_hook(Hook::on_shutdown(&db));
///
/// manager.start()?;
/// // ... application runs ...
/// manager.shutdown()?;
/// ```
pub struct LifecycleManager {
    stage: AtomicStage,
    init_hooks: HookRegistry,
    start_hooks: HookRegistry,
    pre_shutdown_hooks: HookRegistry,
    shutdown_hooks: HookRegistry,
    handler: Arc<dyn LifecycleEventHandler>,
    tracer: Arc<dyn Tracer>,
    session: Weak<dyn Session>,
    session_name: String,
    // Held across "register, check stage, maybe run"; re-entrant so hooks may register hooks.
    // Nested acquisitions always go from a session to one of its ancestors.
    lock: ReentrantMutex<()>,
    started_at: Mutex<Option<DateTime<Utc>>>,
    stopped_at: Mutex<Option<DateTime<Utc>>>,
}

impl LifecycleManager {
    /// Start the session
    ///
    /// Runs start hooks in registration order. Only the first call can
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyStarted`] if the session is no
    /// longer `INITIALIZING`; nothing runs in that case. Any error returned
    /// by a hook is passed through unchanged and leaves the session in
    /// `STARTING`.
    pub fn start(&self) -> Result<()> {
        if !self.stage.compare_and_set(Stage::Initializing, Stage::Starting) {
            return Err(LifecycleError::already_started(
                &self.session_name,
                self.current_stage(),
            ));
        }

        tracing::info!("[{}] Starting session...", self.session_name);
        self.tracer.on_session_start(&self.session_name);
        self.handler.before_start(self)?;

        if !self.stage.compare_and_set(Stage::Starting, Stage::Started) {
            // shutdown() took over while start hooks were running
            tracing::debug!("[{}] Session stopped before it finished starting", self.session_name);
            return Ok(());
        }
        *self.started_at.lock() = Some(Utc::now());
        self.handler.after_start(self)?;

        tracing::info!("[{}] Session started", self.session_name);
        Ok(())
    }

    /// Shut the session down
    ///
    /// Runs pre-shutdown hooks and then shutdown hooks, each in reverse
    /// registration order. Sessions that were never started can be shut
    /// down too. Calling this on a session that is already stopping or
    /// stopped does nothing, so concurrent callers are safe: exactly one
    /// of them performs the shutdown.
    ///
    /// # Errors
    ///
    /// Any error returned by a hook is passed through unchanged and leaves
    /// the session in `STOPPING`.
    pub fn shutdown(&self) -> Result<()> {
        if !self.begin_shutdown() {
            tracing::debug!(
                "[{}] Ignoring shutdown(): session is already {}",
                self.session_name,
                self.current_stage()
            );
            return Ok(());
        }

        tracing::info!("[{}] Shutting down session...", self.session_name);
        self.tracer.on_before_shutdown(&self.session_name);
        self.handler.before_shutdown(self)?;

        self.stage.store(Stage::Stopped);
        *self.stopped_at.lock() = Some(Utc::now());
        self.handler.after_shutdown(self)?;
        self.tracer.on_session_end(&self.session_name);

        tracing::info!("[{}] Session shutdown complete", self.session_name);
        Ok(())
    }

    /// Move a stoppable stage to `STOPPING`; false if another caller got there first
    fn begin_shutdown(&self) -> bool {
        loop {
            let current = self.stage.load();
            if !current.is_stoppable() {
                return false;
            }
            if self.stage.compare_and_set(current, Stage::Stopping) {
                return true;
            }
        }
    }

    pub fn current_stage(&self) -> Stage {
        self.stage.load()
    }

    /// Register a hook to run once when its component is constructed
    ///
    /// The hook runs immediately unless a hook for the same component was
    /// already registered anywhere in the owning session.
    pub fn add_init_hook(&self, hook: Hook) -> Result<()> {
        let surface = *hook.surface();
        self.with_owner(&surface, |owner| owner.register_init_hook(hook))
    }

    /// Run a hook now; inject hooks are never deduplicated
    pub fn add_inject_hook(&self, hook: Hook) -> Result<()> {
        self.tracer.on_inject_instance(&self.session_name, &hook);
        hook.execute_again()
    }

    /// Register a hook to run when the session starts
    ///
    /// If the owning session has already started, the hook runs
    /// immediately, while the owner's registration lock is held.
    ///
    /// A hook that runs this way may register further hooks on its own
    /// session or on any ancestor. It must not register hooks directly on a
    /// descendant session. Owner resolution only ever nests locks from a
    /// session to its ancestors, and going the other way can deadlock
    /// against a concurrent registration on that descendant.
    pub fn add_start_hook(&self, hook: Hook) -> Result<()> {
        let surface = *hook.surface();
        self.with_owner(&surface, |owner| owner.register_start_hook(hook))
    }

    /// Register a hook to run at the beginning of shutdown
    ///
    /// Hooks registered after the session has stopped never run.
    pub fn add_pre_shutdown_hook(&self, hook: Hook) {
        let surface = *hook.surface();
        self.with_owner(&surface, |owner| {
            owner.register_deferred(&owner.pre_shutdown_hooks, hook, "pre-shutdown")
        })
    }

    /// Register a hook to run at shutdown
    ///
    /// Hooks registered after the session has stopped never run.
    pub fn add_shutdown_hook(&self, hook: Hook) {
        let surface = *hook.surface();
        self.with_owner(&surface, |owner| {
            owner.register_deferred(&owner.shutdown_hooks, hook, "shutdown")
        })
    }

    /// Notify the event handlers that a component was constructed
    pub fn on_init(&self, surface: &TypeToken, injectee: &(dyn Any + Send + Sync)) {
        self.handler.on_init(self, surface, injectee);
    }

    fn register_init_hook(&self, hook: Hook) -> Result<()> {
        let hook = Arc::new(hook);
        if self.init_hooks.register_if_absent(Arc::clone(&hook)) {
            hook.execute(|hook| self.tracer.on_init_instance(&self.session_name, hook))?;
        }
        Ok(())
    }

    fn register_start_hook(&self, hook: Hook) -> Result<()> {
        let hook = Arc::new(hook);
        let _guard = self.lock.lock();
        if self.start_hooks.register_if_absent(Arc::clone(&hook)) {
            tracing::debug!("[{}] Added start hook for {}", self.session_name, hook.surface());
            if self.current_stage() == Stage::Started {
                hook.execute(|hook| self.tracer.on_start_instance(&self.session_name, hook))?;
            }
        }
        Ok(())
    }

    fn register_deferred(&self, registry: &HookRegistry, hook: Hook, kind: &str) {
        let _guard = self.lock.lock();
        let surface = *hook.surface();
        if registry.register_if_absent(Arc::new(hook)) {
            tracing::debug!("[{}] Added {} hook for {}", self.session_name, kind, surface);
            if self.current_stage() == Stage::Stopped {
                tracing::debug!(
                    "[{}] Session already stopped; {} hook for {} will not run",
                    self.session_name,
                    kind,
                    surface
                );
            }
        }
    }

    /// Run `f` on the manager owning hooks declared against `surface`
    ///
    /// The owner is this manager or one of its session's ancestors, so
    /// registration locks nest from descendant to ancestor, never the other
    /// way round.
    fn with_owner<R>(&self, surface: &TypeToken, f: impl FnOnce(&LifecycleManager) -> R) -> R {
        let owner = self
            .session
            .upgrade()
            .and_then(|session| session.find_owner_session_of(surface));

        match owner {
            Some(session) if !ptr::eq(session.lifecycle_manager(), self) => {
                tracing::debug!(
                    "[{}] {} is owned by session {}",
                    self.session_name,
                    surface,
                    session.name()
                );
                f(session.lifecycle_manager())
            }
            _ => f(self),
        }
    }

    /// The owning session, if it is still alive
    pub fn session(&self) -> Option<Arc<dyn Session>> {
        self.session.upgrade()
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn tracer(&self) -> &dyn Tracer {
        self.tracer.as_ref()
    }

    /// Init hooks in registration order
    pub fn init_hooks(&self) -> Vec<Arc<Hook>> {
        self.init_hooks.snapshot()
    }

    /// Start hooks in registration order
    pub fn start_hooks(&self) -> Vec<Arc<Hook>> {
        self.start_hooks.snapshot()
    }

    /// Pre-shutdown hooks in registration order
    pub fn pre_shutdown_hooks(&self) -> Vec<Arc<Hook>> {
        self.pre_shutdown_hooks.snapshot()
    }

    /// Shutdown hooks in registration order
    pub fn shutdown_hooks(&self) -> Vec<Arc<Hook>> {
        self.shutdown_hooks.snapshot()
    }

    pub(crate) fn start_hook_registry(&self) -> &HookRegistry {
        &self.start_hooks
    }

    /// When the session reached `STARTED`
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        *self.started_at.lock()
    }

    /// When the session reached `STOPPED`
    pub fn stopped_at(&self) -> Option<DateTime<Utc>> {
        *self.stopped_at.lock()
    }

    /// A serializable view of the manager's state
    pub fn snapshot(&self) -> LifecycleSnapshot {
        fn surfaces(hooks: Vec<Arc<Hook>>) -> Vec<&'static str> {
            hooks.iter().map(|hook| hook.surface().name()).collect()
        }

        LifecycleSnapshot {
            session: self.session_name.clone(),
            stage: self.current_stage(),
            started_at: self.started_at(),
            stopped_at: self.stopped_at(),
            init_hooks: surfaces(self.init_hooks()),
            start_hooks: surfaces(self.start_hooks()),
            pre_shutdown_hooks: surfaces(self.pre_shutdown_hooks()),
            shutdown_hooks: surfaces(self.shutdown_hooks()),
        }
    }
}

/// Point-in-time view of a [`LifecycleManager`], for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleSnapshot {
    pub session: String,
    pub stage: Stage,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    /// Surface names, in registration order
    pub init_hooks: Vec<&'static str>,
    pub start_hooks: Vec<&'static str>,
    pub pre_shutdown_hooks: Vec<&'static str>,
    pub shutdown_hooks: Vec<&'static str>,
}
