//! Lifecycle stages and their atomic cell

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use strum_macros::{Display, IntoStaticStr};

/// The stage a session's lifecycle is in
///
/// Stages only ever move forward:
///
/// ```text
/// INITIALIZING ──start()──▶ STARTING ──▶ STARTED
///      │                       │            │
///      └──────────shutdown()───┴────────────┴──▶ STOPPING ──▶ STOPPED
/// ```
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Initializing = 0,
    Starting = 1,
    Started = 2,
    Stopping = 3,
    Stopped = 4,
}

impl Stage {
    /// Whether `shutdown()` can still move this stage to `STOPPING`
    pub fn is_stoppable(self) -> bool {
        match self {
            Stage::Initializing | Stage::Starting | Stage::Started => true,
            Stage::Stopping | Stage::Stopped => false,
        }
    }
}

impl From<u8> for Stage {
    fn from(val: u8) -> Self {
        match val {
            0 => Stage::Initializing,
            1 => Stage::Starting,
            2 => Stage::Started,
            3 => Stage::Stopping,
            _ => Stage::Stopped,
        }
    }
}

/// A [`Stage`] that can be read and swapped atomically
#[derive(Debug)]
pub(crate) struct AtomicStage(AtomicU8);

impl AtomicStage {
    pub(crate) fn new(stage: Stage) -> Self {
        Self(AtomicU8::new(stage as u8))
    }

    pub(crate) fn load(&self) -> Stage {
        Stage::from(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn store(&self, stage: Stage) {
        self.0.store(stage as u8, Ordering::SeqCst);
    }

    /// Move from `current` to `new`; only one caller wins a given edge
    pub(crate) fn compare_and_set(&self, current: Stage, new: Stage) -> bool {
        self.0
            .compare_exchange(current as u8, new as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
