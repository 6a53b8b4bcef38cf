//! FILO hook executor
//!
//! The one event handler that actually runs hooks. Start hooks run in
//! registration order; pre-shutdown and shutdown hooks run in reverse
//! registration order so components are torn down after everything that
//! was registered later (and may depend on them).

use super::{LifecycleEventHandler, LifecycleManager, Result};

/// Runs the hooks registered on a [`LifecycleManager`] at each transition
#[derive(Debug, Clone, Copy, Default)]
pub struct FiloHookExecutor;

impl FiloHookExecutor {
    /// Run every start hook that has not run yet, in registration order
    ///
    /// Hooks appended while the drain is in progress are picked up too.
    fn drain_start_hooks(&self, manager: &LifecycleManager) -> Result<usize> {
        let session = manager.session_name();
        let registry = manager.start_hook_registry();
        let mut executed = 0;
        let mut index = 0;

        while let Some(hook) = registry.get(index) {
            index += 1;
            // Hooks already fired by a late-joining registration are neither traced nor rerun
            match hook.execute(|hook| manager.tracer().on_start_instance(session, hook)) {
                Ok(true) => executed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("[{}] Start hook for {} failed: {}", session, hook.surface(), e);
                    return Err(e);
                }
            }
        }
        Ok(executed)
    }
}

impl LifecycleEventHandler for FiloHookExecutor {
    fn before_start(&self, manager: &LifecycleManager) -> Result<()> {
        let executed = self.drain_start_hooks(manager)?;
        tracing::debug!("[{}] Executed {} start hooks", manager.session_name(), executed);
        Ok(())
    }

    fn after_start(&self, manager: &LifecycleManager) -> Result<()> {
        // Hooks registered after the drain but before the stage became STARTED
        let stragglers = self.drain_start_hooks(manager)?;
        if stragglers > 0 {
            tracing::debug!(
                "[{}] Executed {} start hooks registered during startup",
                manager.session_name(),
                stragglers
            );
        }
        Ok(())
    }

    fn before_shutdown(&self, manager: &LifecycleManager) -> Result<()> {
        let session = manager.session_name();
        let tracer = manager.tracer();

        // Execute in reverse order
        for hook in manager.pre_shutdown_hooks().iter().rev() {
            if let Err(e) = hook.execute(|hook| tracer.on_before_shutdown_instance(session, hook)) {
                tracing::warn!("[{}] Pre-shutdown hook for {} failed: {}", session, hook.surface(), e);
                return Err(e);
            }
        }

        for hook in manager.shutdown_hooks().iter().rev() {
            if let Err(e) = hook.execute(|hook| tracer.on_shutdown_instance(session, hook)) {
                tracing::warn!("[{}] Shutdown hook for {} failed: {}", session, hook.surface(), e);
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{Hook, LifecycleEventHandlerChain, Stage};
    use crate::session::{Session, SessionBuilder};
    use crate::tracer::Tracer;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<String>>>;

    struct RecordingTracer {
        log: Log,
    }

    impl Tracer for RecordingTracer {
        fn on_session_start(&self, session: &str) {
            self.log.lock().push(format!("trace:session_start:{}", session));
        }

        fn on_start_instance(&self, _session: &str, _hook: &Hook) {
            self.log.lock().push("trace:start".to_string());
        }

        fn on_before_shutdown(&self, session: &str) {
            self.log.lock().push(format!("trace:before_shutdown:{}", session));
        }

        fn on_before_shutdown_instance(&self, _session: &str, _hook: &Hook) {
            self.log.lock().push("trace:pre_shutdown".to_string());
        }

        fn on_shutdown_instance(&self, _session: &str, _hook: &Hook) {
            self.log.lock().push("trace:shutdown".to_string());
        }

        fn on_session_end(&self, session: &str) {
            self.log.lock().push(format!("trace:session_end:{}", session));
        }
    }

    struct Component {
        id: &'static str,
        log: Log,
    }

    fn component(id: &'static str, log: &Log) -> Arc<Component> {
        Arc::new(Component {
            id,
            log: Arc::clone(log),
        })
    }

    fn record(event: &'static str) -> impl Fn(&Component) -> Result<()> + Send + Sync + 'static {
        move |c: &Component| {
            c.log.lock().push(format!("{}:{}", event, c.id));
            Ok(())
        }
    }

    #[test]
    fn test_tracer_wraps_every_hook() {
        let log = Log::default();
        let session = SessionBuilder::new()
            .name("traced")
            .tracer(Arc::new(RecordingTracer { log: Arc::clone(&log) }))
            .build();
        let manager = session.lifecycle_manager();
        let a = component("a", &log);
        let b = component("b", &log);

        manager.add_start_hook(Hook::new(&a, record("start"))).unwrap();
        manager.add_pre_shutdown_hook(Hook::new(&a, record("pre")));
        manager.add_pre_shutdown_hook(Hook::new(&b, record("pre")));
        manager.add_shutdown_hook(Hook::new(&a, record("shutdown")));
        manager.add_shutdown_hook(Hook::new(&b, record("shutdown")));

        manager.start().unwrap();
        manager.shutdown().unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "trace:session_start:traced",
                "trace:start",
                "start:a",
                "trace:before_shutdown:traced",
                "trace:pre_shutdown",
                "pre:b",
                "trace:pre_shutdown",
                "pre:a",
                "trace:shutdown",
                "shutdown:b",
                "trace:shutdown",
                "shutdown:a",
                "trace:session_end:traced",
            ]
        );
    }

    #[test]
    fn test_chain_without_executor_runs_no_hooks() {
        let log = Log::default();
        let session = SessionBuilder::new()
            .name("observed")
            .handler(LifecycleEventHandlerChain::new())
            .build();
        let manager = session.lifecycle_manager();
        let a = component("a", &log);

        manager.add_start_hook(Hook::new(&a, record("start"))).unwrap();
        manager.add_shutdown_hook(Hook::new(&a, record("shutdown")));
        manager.start().unwrap();
        manager.shutdown().unwrap();

        assert!(log.lock().is_empty());
        assert_eq!(manager.current_stage(), Stage::Stopped);
    }

    #[test]
    fn test_start_hooks_of_dropped_components_are_skipped() {
        let log = Log::default();
        let session = SessionBuilder::new().name("dropped").build();
        let manager = session.lifecycle_manager();
        let kept = component("kept", &log);
        let dropped = component("dropped", &log);

        manager.add_start_hook(Hook::new(&dropped, record("start"))).unwrap();
        manager.add_start_hook(Hook::new(&kept, record("start"))).unwrap();
        drop(dropped);

        manager.start().unwrap();

        assert_eq!(*log.lock(), vec!["start:kept"]);
    }

    #[test]
    fn test_already_fired_start_hooks_are_not_traced_again() {
        let log = Log::default();
        let session = SessionBuilder::new()
            .name("fired")
            .tracer(Arc::new(RecordingTracer { log: Arc::clone(&log) }))
            .build();
        let manager = session.lifecycle_manager();
        let early = component("early", &log);
        let pending = component("pending", &log);

        manager.add_start_hook(Hook::new(&early, record("start"))).unwrap();
        manager.add_start_hook(Hook::new(&pending, record("start"))).unwrap();
        assert!(manager.start_hooks()[0].execute(|_| {}).unwrap());

        manager.start().unwrap();

        assert_eq!(
            *log.lock(),
            vec!["start:early", "trace:session_start:fired", "trace:start", "start:pending"]
        );
    }
}
