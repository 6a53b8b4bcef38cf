//! Lifecycle tracing
//!
//! A [`Tracer`] receives a notification for every coarse session event and
//! for each individual hook invocation. Tracers are purely observational:
//! they cannot fail and cannot influence the lifecycle.

use crate::lifecycle::Hook;

/// Observer of session and per-instance lifecycle events
///
/// All methods default to no-ops.
pub trait Tracer: Send + Sync {
    /// An init hook is about to run
    fn on_init_instance(&self, _session: &str, _hook: &Hook) {}

    /// An inject hook is about to run
    fn on_inject_instance(&self, _session: &str, _hook: &Hook) {}

    /// `start()` won its transition
    fn on_session_start(&self, _session: &str) {}

    /// A start hook is about to run
    fn on_start_instance(&self, _session: &str, _hook: &Hook) {}

    /// `shutdown()` won its transition
    fn on_before_shutdown(&self, _session: &str) {}

    /// A pre-shutdown hook is about to run
    fn on_before_shutdown_instance(&self, _session: &str, _hook: &Hook) {}

    /// A shutdown hook is about to run
    fn on_shutdown_instance(&self, _session: &str, _hook: &Hook) {}

    /// The session reached `STOPPED`
    fn on_session_end(&self, _session: &str) {}
}

/// Tracer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Tracer that emits a `TRACE` level event for everything it observes
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn on_init_instance(&self, session: &str, hook: &Hook) {
        tracing::trace!(session, surface = %hook.surface(), "init instance");
    }

    fn on_inject_instance(&self, session: &str, hook: &Hook) {
        tracing::trace!(session, surface = %hook.surface(), "inject instance");
    }

    fn on_session_start(&self, session: &str) {
        tracing::trace!(session, "session start");
    }

    fn on_start_instance(&self, session: &str, hook: &Hook) {
        tracing::trace!(session, surface = %hook.surface(), "start instance");
    }

    fn on_before_shutdown(&self, session: &str) {
        tracing::trace!(session, "before shutdown");
    }

    fn on_before_shutdown_instance(&self, session: &str, hook: &Hook) {
        tracing::trace!(session, surface = %hook.surface(), "before shutdown instance");
    }

    fn on_shutdown_instance(&self, session: &str, hook: &Hook) {
        tracing::trace!(session, surface = %hook.surface(), "shutdown instance");
    }

    fn on_session_end(&self, session: &str) {
        tracing::trace!(session, "session end");
    }
}
