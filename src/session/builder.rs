//! Session bootstrap
//!
//! Provides a fluent API for constructing sessions together with their
//! lifecycle manager.

use super::{DefaultSession, Session};
use crate::config::LifecycleConfig;
use crate::lifecycle::{
    FiloHookExecutor, LifecycleEventHandler, LifecycleEventHandlerChain, TypeToken,
    UnboundLifecycleManager,
};
use crate::tracer::{NoopTracer, Tracer};
use dashmap::DashMap;
use std::sync::{Arc, Weak};

/// Builder for [`DefaultSession`]
///
/// # Example
///
/// ```rust,ignore
/// use meshestra_lifecycle::session::SessionBuilder;
///
/// let session = SessionBuilder::new()
///     .name("app")
///     .bind::<Database>()
///     .config(&LifecycleConfig::from_env()?)
///     .build();
///
/// session.lifecycle_manager().add_start_hook(Hook::on_start(&db))?;
/// session.start()?;
/// // ... application runs ...
/// session.shutdown()?;
/// ```
pub struct SessionBuilder {
    name: Option<String>,
    parent: Option<Arc<DefaultSession>>,
    bindings: Vec<TypeToken>,
    handler: Option<Arc<dyn LifecycleEventHandler>>,
    tracer: Option<Arc<dyn Tracer>>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    /// Create a new session builder
    pub fn new() -> Self {
        Self {
            name: None,
            parent: None,
            bindings: Vec::new(),
            handler: None,
            tracer: None,
        }
    }

    /// Set the session's display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Nest the session under `parent`
    pub fn parent(mut self, parent: &Arc<DefaultSession>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Bind `T` to the session so hooks declared against it are owned here
    pub fn bind<T: ?Sized + 'static>(mut self) -> Self {
        self.bindings.push(TypeToken::of::<T>());
        self
    }

    /// Set the lifecycle event handler
    ///
    /// Defaults to a bare [`FiloHookExecutor`]. A handler chain that leaves
    /// the executor out never runs any start or shutdown hook.
    pub fn handler<H: LifecycleEventHandler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Set the tracer; defaults to [`NoopTracer`]
    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Take the handler chain and tracer from `config`
    pub fn config(mut self, config: &LifecycleConfig) -> Self {
        self.handler = Some(Arc::new(config.handler_chain()));
        self.tracer = Some(config.tracer());
        self
    }

    /// Build the session and bind its lifecycle manager to it
    pub fn build(self) -> Arc<DefaultSession> {
        let name = self
            .name
            .unwrap_or_else(|| format!("session:{}", uuid::Uuid::new_v4().simple()));
        let handler = self.handler.unwrap_or_else(|| {
            Arc::new(LifecycleEventHandlerChain::new().and_then(FiloHookExecutor))
        });
        let tracer = self.tracer.unwrap_or_else(|| Arc::new(NoopTracer));

        let unbound = UnboundLifecycleManager::new_shared(handler).with_tracer(tracer);
        let bindings: DashMap<_, _> = self
            .bindings
            .into_iter()
            .map(|surface| (surface.id(), surface))
            .collect();

        let session = Arc::new_cyclic(|this: &Weak<DefaultSession>| {
            let owner: Weak<dyn Session> = this.clone();
            DefaultSession {
                manager: unbound.bind(owner, name.clone()),
                name,
                parent: self.parent,
                bindings,
                this: this.clone(),
            }
        });

        tracing::debug!(
            "Created session {} (parent: {})",
            session.name,
            session.parent.as_ref().map_or("none", |p| p.name.as_str())
        );
        session
    }
}
