//! Hook registry

use super::Hook;
use parking_lot::Mutex;
use std::sync::Arc;

/// An append-only, insertion-ordered list of hooks, one per component
#[derive(Debug, Default)]
pub struct HookRegistry {
    hooks: Mutex<Vec<Arc<Hook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `hook` unless a hook for the same component is already present
    ///
    /// Returns `true` when the hook was added.
    pub fn register_if_absent(&self, hook: Arc<Hook>) -> bool {
        let mut hooks = self.hooks.lock();
        if hooks.iter().any(|existing| existing.same_injectee(&hook)) {
            return false;
        }
        hooks.push(hook);
        true
    }

    /// The hook at `index` in registration order
    pub fn get(&self, index: usize) -> Option<Arc<Hook>> {
        self.hooks.lock().get(index).cloned()
    }

    /// All hooks in registration order
    pub fn snapshot(&self) -> Vec<Arc<Hook>> {
        self.hooks.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.hooks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.lock().is_empty()
    }
}
