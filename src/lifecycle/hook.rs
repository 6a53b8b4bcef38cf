//! Hooks and the type tokens they are declared against

use super::{OnInit, OnInject, OnPreShutdown, OnShutdown, OnStart, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Opaque identifier for a component's declared type
///
/// Sessions use it to decide which lifecycle manager in a hierarchy owns a
/// hook; everything else only prints it.
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

impl TypeToken {
    /// Token for the type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, for diagnostics only
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeToken").field(&self.name).finish()
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

type HookAction = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// An action bound to a component, fired at a lifecycle transition
///
/// A hook only holds a weak reference to its component: the lifecycle
/// manager orchestrates calls into components but never keeps them alive.
/// If the component is gone by the time the hook fires, the hook is skipped.
///
/// Two hooks are considered the same when they target the same component
/// instance, regardless of their actions.
pub struct Hook {
    surface: TypeToken,
    injectee: Weak<dyn Any + Send + Sync>,
    action: HookAction,
    fired: AtomicBool,
}

impl Hook {
    /// Create a hook running `action` against `injectee`
    ///
    /// The hook is declared against `T`; use [`Hook::declared_as`] when the
    /// component is bound under a different type.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let hook = Hook::new(&cache, |cache: &Cache| {
    ///     cache.warm_up();
    ///     Ok(())
    /// });
    /// manager.add_start_hook(hook)?;
    /// ```
    pub fn new<T, F>(injectee: &Arc<T>, action: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        let surface = TypeToken::of::<T>();
        let target = Arc::downgrade(injectee);
        let erased: Weak<dyn Any + Send + Sync> = target.clone();
        let action = move || match target.upgrade() {
            Some(component) => action(&component),
            None => {
                tracing::debug!("Skipping hook for {}: component already dropped", surface);
                Ok(())
            }
        };

        Self {
            surface,
            injectee: erased,
            action: Box::new(action),
            fired: AtomicBool::new(false),
        }
    }

    /// Hook calling [`OnInit::on_init`]
    pub fn on_init<T: OnInit + 'static>(injectee: &Arc<T>) -> Self {
        Self::new(injectee, T::on_init)
    }

    /// Hook calling [`OnInject::on_inject`]
    pub fn on_inject<T: OnInject + 'static>(injectee: &Arc<T>) -> Self {
        Self::new(injectee, T::on_inject)
    }

    /// Hook calling [`OnStart::on_start`]
    pub fn on_start<T: OnStart + 'static>(injectee: &Arc<T>) -> Self {
        Self::new(injectee, T::on_start)
    }

    /// Hook calling [`OnPreShutdown::on_pre_shutdown`]
    pub fn on_pre_shutdown<T: OnPreShutdown + 'static>(injectee: &Arc<T>) -> Self {
        Self::new(injectee, T::on_pre_shutdown)
    }

    /// Hook calling [`OnShutdown::on_shutdown`]
    pub fn on_shutdown<T: OnShutdown + 'static>(injectee: &Arc<T>) -> Self {
        Self::new(injectee, T::on_shutdown)
    }

    /// Declare the hook against `surface` instead of the component's concrete type
    pub fn declared_as(mut self, surface: TypeToken) -> Self {
        self.surface = surface;
        self
    }

    /// The type this hook was declared against
    pub fn surface(&self) -> &TypeToken {
        &self.surface
    }

    /// Whether both hooks target the same component instance
    pub fn same_injectee(&self, other: &Hook) -> bool {
        ptr::addr_eq(self.injectee.as_ptr(), other.injectee.as_ptr())
    }

    /// Whether the targeted component has been dropped
    pub fn is_detached(&self) -> bool {
        self.injectee.strong_count() == 0
    }

    /// Whether the action has already been invoked
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Run the action unless it already ran
    ///
    /// `before` is called only when this call is the one that runs the
    /// action. Returns whether the action ran.
    pub(crate) fn execute(&self, before: impl FnOnce(&Hook)) -> Result<bool> {
        if self.fired.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        before(self);
        (self.action)()?;
        Ok(true)
    }

    /// Run the action regardless of earlier invocations
    pub(crate) fn execute_again(&self) -> Result<()> {
        self.fired.store(true, Ordering::SeqCst);
        (self.action)()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("surface", &self.surface)
            .field("injectee", &self.injectee.as_ptr().cast::<()>())
            .field("fired", &self.has_fired())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::LifecycleError;
    use std::sync::atomic::AtomicUsize;

    struct Counter {
        calls: AtomicUsize,
    }

    impl Counter {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn bump(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    trait Repository: Send + Sync {}

    #[test]
    fn test_execute_runs_at_most_once() {
        let counter = Counter::new();
        let hook = Hook::new(&counter, Counter::bump);

        assert!(hook.execute(|_| {}).unwrap());
        assert!(!hook.execute(|_| {}).unwrap());

        assert!(hook.has_fired());
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_before_callback_skipped_once_fired() {
        let counter = Counter::new();
        let hook = Hook::new(&counter, Counter::bump);
        let observed = AtomicUsize::new(0);

        hook.execute(|_| {
            observed.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        hook.execute(|_| {
            observed.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_execute_again_reruns() {
        let counter = Counter::new();
        let hook = Hook::new(&counter, Counter::bump);

        hook.execute_again().unwrap();
        hook.execute_again().unwrap();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_identity_is_by_instance() {
        let a = Counter::new();
        let b = Counter::new();

        let first = Hook::new(&a, Counter::bump);
        let second = Hook::new(&a, |_: &Counter| Ok(()));
        let other = Hook::new(&b, Counter::bump);

        assert!(first.same_injectee(&second));
        assert!(!first.same_injectee(&other));
    }

    #[test]
    fn test_dropped_component_is_skipped() {
        let counter = Counter::new();
        let hook = Hook::new(&counter, |_: &Counter| {
            Err(LifecycleError::startup_failed("should not run"))
        });
        drop(counter);

        assert!(hook.is_detached());
        assert!(hook.execute(|_| {}).is_ok());
    }

    #[test]
    fn test_declared_as_overrides_surface() {
        let counter = Counter::new();
        let hook = Hook::new(&counter, Counter::bump).declared_as(TypeToken::of::<dyn Repository>());

        assert_eq!(*hook.surface(), TypeToken::of::<dyn Repository>());
        assert_ne!(*hook.surface(), TypeToken::of::<Counter>());
    }

    impl OnInit for Counter {
        fn on_init(&self) -> Result<()> {
            self.bump()
        }
    }

    impl OnPreShutdown for Counter {
        fn on_pre_shutdown(&self) -> Result<()> {
            self.bump()
        }
    }

    #[test]
    fn test_trait_constructors_call_trait_methods() {
        let counter = Counter::new();

        Hook::on_init(&counter).execute(|_| {}).unwrap();
        Hook::on_pre_shutdown(&counter).execute(|_| {}).unwrap();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_errors_are_returned_as_is() {
        let counter = Counter::new();
        let hook = Hook::new(&counter, |_: &Counter| Err(LifecycleError::hook_failed("Counter", "boom")));

        let err = hook.execute(|_| {}).unwrap_err();
        assert!(matches!(err, LifecycleError::HookFailed { ref service, .. } if service == "Counter"));
    }
}
