//! Lifecycle logging
//!
//! [`ShowLifecycleLog`] reports session transitions and uptime through
//! `tracing`. It only observes and never runs hooks.

use super::{LifecycleEventHandler, LifecycleManager, Result, TypeToken};
use std::any::Any;

/// Level at which [`ShowLifecycleLog`] reports session transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
}

/// An event handler that logs session transitions and their timing
///
/// Component initialization is always reported at `DEBUG`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowLifecycleLog {
    level: LogLevel,
}

impl ShowLifecycleLog {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn info() -> Self {
        Self::new(LogLevel::Info)
    }

    pub fn debug() -> Self {
        Self::new(LogLevel::Debug)
    }

    fn log(&self, session: &str, message: &str) {
        match self.level {
            LogLevel::Info => tracing::info!("[{}] {}", session, message),
            LogLevel::Debug => tracing::debug!("[{}] {}", session, message),
        }
    }
}

impl LifecycleEventHandler for ShowLifecycleLog {
    fn on_init(&self, manager: &LifecycleManager, surface: &TypeToken, _injectee: &(dyn Any + Send + Sync)) {
        tracing::debug!("[{}] Initialized {}", manager.session_name(), surface);
    }

    fn before_start(&self, manager: &LifecycleManager) -> Result<()> {
        self.log(manager.session_name(), "--> Starting session");
        Ok(())
    }

    fn after_start(&self, manager: &LifecycleManager) -> Result<()> {
        self.log(
            manager.session_name(),
            &format!("<-- Session started ({} start hooks)", manager.start_hooks().len()),
        );
        Ok(())
    }

    fn before_shutdown(&self, manager: &LifecycleManager) -> Result<()> {
        self.log(manager.session_name(), "--> Stopping session");
        Ok(())
    }

    fn after_shutdown(&self, manager: &LifecycleManager) -> Result<()> {
        let message = match (manager.started_at(), manager.stopped_at()) {
            (Some(started), Some(stopped)) => {
                let uptime = stopped - started;
                format!("<-- Session stopped after {} ms", uptime.num_milliseconds())
            }
            _ => "<-- Session stopped".to_string(),
        };
        self.log(manager.session_name(), &message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{FiloHookExecutor, Hook, LifecycleEventHandlerExt, Stage};
    use crate::session::{Session, SessionBuilder};
    use std::sync::Arc;

    struct Component;

    #[test]
    fn test_logging_does_not_change_lifecycle() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();

        let session = SessionBuilder::new()
            .name("logged")
            .handler(FiloHookExecutor.and_then(ShowLifecycleLog::debug()))
            .build();
        let manager = session.lifecycle_manager();
        let component = Arc::new(Component);
        manager.on_init(&TypeToken::of::<Component>(), component.as_ref());
        manager
            .add_start_hook(Hook::new(&component, |_: &Component| Ok(())))
            .unwrap();

        manager.start().unwrap();
        manager.shutdown().unwrap();

        assert_eq!(manager.current_stage(), Stage::Stopped);
        assert!(manager.start_hooks()[0].has_fired());
    }
}
