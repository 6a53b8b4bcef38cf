//! Lifecycle configuration
//!
//! | Key                          | Values                   | Default |
//! |------------------------------|--------------------------|---------|
//! | `MESHESTRA_LIFECYCLE_LOG`    | `off`, `info`, `debug`   | `info`  |
//! | `MESHESTRA_LIFECYCLE_TRACE`  | `true`, `false`          | `false` |

use crate::lifecycle::{FiloHookExecutor, LifecycleEventHandlerChain, LogLevel, ShowLifecycleLog};
use crate::tracer::{LogTracer, NoopTracer, Tracer};
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub const LOG_KEY: &str = "MESHESTRA_LIFECYCLE_LOG";
pub const TRACE_KEY: &str = "MESHESTRA_LIFECYCLE_TRACE";

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Create a configuration seeded from the process environment
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// How much the lifecycle reports about session transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LifecycleLogging {
    Off,
    #[default]
    Info,
    Debug,
}

/// Typed lifecycle settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleConfig {
    pub logging: LifecycleLogging,
    /// Emit per-hook trace events through [`LogTracer`]
    pub trace: bool,
}

impl LifecycleConfig {
    /// Read the lifecycle settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_config(&ConfigService::new())
    }

    pub fn from_config(config: &ConfigService) -> Result<Self, ConfigError> {
        Ok(Self {
            logging: parse_or_default(config, LOG_KEY)?,
            trace: parse_or_default(config, TRACE_KEY)?,
        })
    }

    /// The event handler chain sessions should use
    ///
    /// Always starts with the [`FiloHookExecutor`]; lifecycle logging is
    /// appended when enabled.
    pub fn handler_chain(&self) -> LifecycleEventHandlerChain {
        let chain = LifecycleEventHandlerChain::new().and_then(FiloHookExecutor);
        match self.logging {
            LifecycleLogging::Off => chain,
            LifecycleLogging::Info => chain.and_then(ShowLifecycleLog::new(LogLevel::Info)),
            LifecycleLogging::Debug => chain.and_then(ShowLifecycleLog::new(LogLevel::Debug)),
        }
    }

    pub fn tracer(&self) -> Arc<dyn Tracer> {
        if self.trace {
            Arc::new(LogTracer)
        } else {
            Arc::new(NoopTracer)
        }
    }
}

fn parse_or_default<T: FromStr + Default>(config: &ConfigService, key: &str) -> Result<T, ConfigError> {
    match config.get(key) {
        None => Ok(T::default()),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
    }
}
