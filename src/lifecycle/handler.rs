//! Lifecycle event handlers and their composition

use super::{LifecycleManager, Result, TypeToken};
use std::any::Any;
use std::sync::Arc;

/// Observer of the transition points of a [`LifecycleManager`]
///
/// Every method defaults to a no-op. Handlers other than the
/// [`FiloHookExecutor`](super::FiloHookExecutor) are expected to be purely
/// observational and must not register hooks or drive the stage themselves.
///
/// # Example
///
/// ```rust,ignore
/// struct Metrics;
///
/// impl LifecycleEventHandler for Metrics {
///     fn after_start(&self, manager: &LifecycleManager) -> Result<()> {
///         gauge!("sessions_running").increment(1.0);
///         Ok(())
///     }
/// }
///
/// let chain = FiloHookExecutor.and_then(Metrics);
/// ```
pub trait LifecycleEventHandler: Send + Sync {
    /// A component was constructed; observation only
    fn on_init(&self, _manager: &LifecycleManager, _surface: &TypeToken, _injectee: &(dyn Any + Send + Sync)) {}

    /// `start()` won its transition; the stage is `STARTING`
    fn before_start(&self, _manager: &LifecycleManager) -> Result<()> {
        Ok(())
    }

    /// The stage just became `STARTED`
    fn after_start(&self, _manager: &LifecycleManager) -> Result<()> {
        Ok(())
    }

    /// `shutdown()` won its transition; the stage is `STOPPING`
    fn before_shutdown(&self, _manager: &LifecycleManager) -> Result<()> {
        Ok(())
    }

    /// The stage just became `STOPPED`
    fn after_shutdown(&self, _manager: &LifecycleManager) -> Result<()> {
        Ok(())
    }
}

/// Combinator for building handler chains
pub trait LifecycleEventHandlerExt: LifecycleEventHandler + Sized + 'static {
    /// Run `self` and then `next` at every event
    fn and_then<H: LifecycleEventHandler + 'static>(self, next: H) -> LifecycleEventHandlerChain {
        LifecycleEventHandlerChain::new().and_then(self).and_then(next)
    }
}

impl<H: LifecycleEventHandler + 'static> LifecycleEventHandlerExt for H {}

/// Handlers invoked one after another, in insertion order, for every event
///
/// If a handler fails, the remaining handlers are not invoked for that event
/// and the error is returned.
#[derive(Clone, Default)]
pub struct LifecycleEventHandlerChain {
    handlers: Vec<Arc<dyn LifecycleEventHandler>>,
}

impl LifecycleEventHandlerChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the end of the chain
    ///
    /// A chain appended to another chain runs as a single step in sequence,
    /// so grouping never changes the order in which handlers run.
    pub fn and_then<H: LifecycleEventHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Append an already shared handler
    pub fn and_then_shared(mut self, handler: Arc<dyn LifecycleEventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn each(&self, mut f: impl FnMut(&dyn LifecycleEventHandler) -> Result<()>) -> Result<()> {
        self.handlers.iter().try_for_each(|handler| f(handler.as_ref()))
    }
}

impl LifecycleEventHandler for LifecycleEventHandlerChain {
    fn on_init(&self, manager: &LifecycleManager, surface: &TypeToken, injectee: &(dyn Any + Send + Sync)) {
        for handler in &self.handlers {
            handler.on_init(manager, surface, injectee);
        }
    }

    fn before_start(&self, manager: &LifecycleManager) -> Result<()> {
        self.each(|handler| handler.before_start(manager))
    }

    fn after_start(&self, manager: &LifecycleManager) -> Result<()> {
        self.each(|handler| handler.after_start(manager))
    }

    fn before_shutdown(&self, manager: &LifecycleManager) -> Result<()> {
        self.each(|handler| handler.before_shutdown(manager))
    }

    fn after_shutdown(&self, manager: &LifecycleManager) -> Result<()> {
        self.each(|handler| handler.after_shutdown(manager))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::LifecycleError;
    use crate::session::{Session, SessionBuilder};
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Arc::clone(log),
            }
        }

        fn record(&self, event: &str) -> Result<()> {
            self.log.lock().push(format!("{}:{}", self.name, event));
            Ok(())
        }
    }

    impl LifecycleEventHandler for Recorder {
        fn on_init(&self, _manager: &LifecycleManager, _surface: &TypeToken, _injectee: &(dyn Any + Send + Sync)) {
            let _ = self.record("init");
        }

        fn before_start(&self, _manager: &LifecycleManager) -> Result<()> {
            self.record("before_start")
        }

        fn after_start(&self, _manager: &LifecycleManager) -> Result<()> {
            self.record("after_start")
        }

        fn before_shutdown(&self, _manager: &LifecycleManager) -> Result<()> {
            self.record("before_shutdown")
        }

        fn after_shutdown(&self, _manager: &LifecycleManager) -> Result<()> {
            self.record("after_shutdown")
        }
    }

    struct Failing;

    impl LifecycleEventHandler for Failing {
        fn before_start(&self, _manager: &LifecycleManager) -> Result<()> {
            Err(LifecycleError::startup_failed("refused"))
        }
    }

    fn drive(handler: &dyn LifecycleEventHandler) {
        let session = SessionBuilder::new().name("composition").build();
        let manager = session.lifecycle_manager();
        let component = Arc::new(());

        handler.on_init(manager, &TypeToken::of::<()>(), component.as_ref());
        handler.before_start(manager).unwrap();
        handler.after_start(manager).unwrap();
        handler.before_shutdown(manager).unwrap();
        handler.after_shutdown(manager).unwrap();
    }

    #[test]
    fn test_chain_runs_handlers_in_order_for_every_event() {
        let log = Log::default();
        let chain = Recorder::new("h1", &log).and_then(Recorder::new("h2", &log));

        drive(&chain);

        assert_eq!(
            *log.lock(),
            vec![
                "h1:init",
                "h2:init",
                "h1:before_start",
                "h2:before_start",
                "h1:after_start",
                "h2:after_start",
                "h1:before_shutdown",
                "h2:before_shutdown",
                "h1:after_shutdown",
                "h2:after_shutdown",
            ]
        );
    }

    #[test]
    fn test_composition_is_associative() {
        let left_log = Log::default();
        let left = Recorder::new("h1", &left_log)
            .and_then(Recorder::new("h2", &left_log))
            .and_then(Recorder::new("h3", &left_log));

        let right_log = Log::default();
        let right = Recorder::new("h1", &right_log)
            .and_then(Recorder::new("h2", &right_log).and_then(Recorder::new("h3", &right_log)));

        drive(&left);
        drive(&right);

        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 2);
        assert_eq!(*left_log.lock(), *right_log.lock());
    }

    #[test]
    fn test_failing_handler_stops_the_chain() {
        let log = Log::default();
        let chain = Recorder::new("h1", &log)
            .and_then(Failing)
            .and_then(Recorder::new("h3", &log));
        let session = SessionBuilder::new().name("failing").build();

        let err = chain.before_start(session.lifecycle_manager()).unwrap_err();

        assert!(matches!(err, LifecycleError::StartupFailed(_)));
        assert_eq!(*log.lock(), vec!["h1:before_start"]);
    }

    #[test]
    fn test_empty_chain_is_a_no_op() {
        let chain = LifecycleEventHandlerChain::new();
        assert!(chain.is_empty());
        drive(&chain);
    }
}
