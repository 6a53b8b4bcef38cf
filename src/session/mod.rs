//! Sessions
//!
//! A session owns exactly one [`LifecycleManager`]. Sessions may form a
//! hierarchy; a hook declared against a type bound in a parent session is
//! held and fired by the parent's manager rather than the child's.

mod builder;

pub use builder::SessionBuilder;

use crate::lifecycle::{LifecycleManager, Result, Stage, TypeToken};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::{Arc, Weak};

/// The owner of a [`LifecycleManager`]
pub trait Session: Send + Sync {
    /// Display name of the session
    fn name(&self) -> &str;

    /// The session, in this session's hierarchy, that owns hooks declared against `surface`
    ///
    /// `None` means the caller's own manager keeps the hook.
    fn find_owner_session_of(&self, surface: &TypeToken) -> Option<Arc<dyn Session>>;

    /// The manager driving this session's lifecycle
    fn lifecycle_manager(&self) -> &LifecycleManager;
}

/// A named session with an optional parent and a set of bound types
///
/// # Example
///
/// ```rust,ignore
/// let root = SessionBuilder::new().name("app").bind::<Database>().build();
/// let request = SessionBuilder::new().name("request").parent(&root).build();
///
/// // Database hooks end up on the root session's manager
/// request.lifecycle_manager().add_shutdown_hook(Hook::on_shutdown(&db));
/// ```
pub struct DefaultSession {
    name: String,
    parent: Option<Arc<DefaultSession>>,
    bindings: DashMap<TypeId, TypeToken>,
    manager: LifecycleManager,
    this: Weak<DefaultSession>,
}

impl DefaultSession {
    /// Create a new session builder
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn parent(&self) -> Option<&Arc<DefaultSession>> {
        self.parent.as_ref()
    }

    /// Bind `T` to this session after construction
    pub fn register<T: ?Sized + 'static>(&self) {
        self.register_surface(TypeToken::of::<T>());
    }

    /// Bind `surface` to this session after construction
    pub fn register_surface(&self, surface: TypeToken) {
        tracing::debug!("[{}] Binding {}", self.name, surface);
        self.bindings.insert(surface.id(), surface);
    }

    /// Whether `surface` is bound directly in this session
    pub fn binds(&self, surface: &TypeToken) -> bool {
        self.bindings.contains_key(&surface.id())
    }

    /// Start the session
    pub fn start(&self) -> Result<()> {
        self.manager.start()
    }

    /// Shut the session down; calling it again has no effect
    pub fn shutdown(&self) -> Result<()> {
        self.manager.shutdown()
    }

    pub fn current_stage(&self) -> Stage {
        self.manager.current_stage()
    }
}

impl Session for DefaultSession {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_owner_session_of(&self, surface: &TypeToken) -> Option<Arc<dyn Session>> {
        if self.binds(surface) {
            return self.this.upgrade().map(|session| session as Arc<dyn Session>);
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.find_owner_session_of(surface))
    }

    fn lifecycle_manager(&self) -> &LifecycleManager {
        &self.manager
    }
}

impl std::fmt::Debug for DefaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultSession")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name.as_str()))
            .field("stage", &self.manager.current_stage())
            .finish()
    }
}
