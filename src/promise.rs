use std::{cell::RefCell, fmt, rc::Rc, task::Waker};
use tracing::trace;
use crate::Settled;

/// A callback fed the resolved value.
pub type SuccessFn<T> = Box<dyn FnOnce(T)>;
/// A callback fed the rejection error.
pub type FailureFn<E> = Box<dyn FnOnce(E)>;

/// Where a promise is in its lifetime. `Waiting` is the only state with an
/// outgoing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Waiting,
    Resolved,
    Rejected,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Waiting => "waiting",
            Status::Resolved => "resolved",
            Status::Rejected => "rejected",
        })
    }
}

/// The consumer side of a [`Deferred`](crate::Deferred): a value with a
/// temporal status and the callbacks waiting on it.
///
/// Cloning a `Promise` hands out another reference to the same promise, so
/// any number of consumers may subscribe and read. Only the owning
/// `Deferred` can settle it.
///
/// # Examples
///
/// ```
/// let deferred = oath::defer::<&str, ()>();
/// let promise = deferred.promise().clone();
/// let same = promise.then(|_| {}).then(|_| {});
/// assert!(oath::Promise::ptr_eq(&promise, same));
/// assert_eq!(promise.success_callback_count(), 2);
/// ```
pub struct Promise<T, E> {
    pub(crate) inner: Rc<RefCell<Inner<T, E>>>,
}

pub(crate) struct Inner<T, E> {
    pub(crate) value: Option<T>,
    pub(crate) status: Status,
    pub(crate) success_callbacks: Vec<SuccessFn<T>>,
    // Collected by `then_with`, never fired. `reject` only uses `failure`.
    pub(crate) fail_callbacks: Vec<FailureFn<E>>,
    pub(crate) failure: Option<FailureFn<E>>,
    pub(crate) wakers: Vec<Waker>,
    pub(crate) abandoned: bool,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Promise")
            .field("status", &inner.status)
            .field("success_callbacks", &inner.success_callbacks.len())
            .field("fail_callbacks", &inner.fail_callbacks.len())
            .field("has_catch", &inner.failure.is_some())
            .finish()
    }
}

impl<T, E> Promise<T, E> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: None,
                status: Status::Waiting,
                success_callbacks: vec![],
                fail_callbacks: vec![],
                failure: None,
                wakers: vec![],
                abandoned: false,
            })),
        }
    }

    /// Append a success callback. Nothing is invoked now; the first
    /// registered success callback is the one `resolve` fires.
    ///
    /// Returns this same promise, so calls can be strung together. No new
    /// promise is created and the callback's return value goes nowhere.
    pub fn then<F>(&self, on_success: F) -> &Self
    where
        F: FnOnce(T) + 'static,
    {
        self.then_opt(Some(Box::new(on_success)), None)
    }

    /// Append a success callback and a failure callback.
    ///
    /// Failure callbacks added here are kept but `reject` never calls them;
    /// use [`catch`](Self::catch) to observe a rejection.
    pub fn then_with<F, G>(&self, on_success: F, on_failure: G) -> &Self
    where
        F: FnOnce(T) + 'static,
        G: FnOnce(E) + 'static,
    {
        self.then_opt(Some(Box::new(on_success)), Some(Box::new(on_failure)))
    }

    /// `then` with both arguments optional. Each provided callback is
    /// appended to its list.
    pub fn then_opt(&self, on_success: Option<SuccessFn<T>>, on_failure: Option<FailureFn<E>>) -> &Self {
        let mut inner = self.inner.borrow_mut();
        if let Some(callback) = on_success {
            inner.success_callbacks.push(callback);
        }
        if let Some(callback) = on_failure {
            inner.fail_callbacks.push(callback);
        }
        trace!(
            success = inner.success_callbacks.len(),
            fail = inner.fail_callbacks.len(),
            "then registered"
        );
        self
    }

    /// Set the rejection handler. Only one is kept: a later `catch`
    /// replaces an earlier one.
    pub fn catch<G>(&self, on_failure: G)
    where
        G: FnOnce(E) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let previous = inner.failure.replace(Box::new(on_failure));
        drop(inner);
        trace!(replaced = previous.is_some(), "catch registered");
    }

    pub fn status(&self) -> Status {
        self.inner.borrow().status
    }

    pub fn is_waiting(&self) -> bool {
        self.status() == Status::Waiting
    }

    pub fn is_resolved(&self) -> bool {
        self.status() == Status::Resolved
    }

    pub fn is_rejected(&self) -> bool {
        self.status() == Status::Rejected
    }

    /// The resolved value, or `None` while waiting or after a rejection.
    pub fn value(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.borrow().value.clone()
    }

    /// Success callbacks still held by the promise. `resolve` removes the
    /// one it fires.
    pub fn success_callback_count(&self) -> usize {
        self.inner.borrow().success_callbacks.len()
    }

    pub fn fail_callback_count(&self) -> usize {
        self.inner.borrow().fail_callbacks.len()
    }

    pub fn has_catch(&self) -> bool {
        self.inner.borrow().failure.is_some()
    }

    /// Whether both handles refer to the same promise.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.inner, &other.inner)
    }

    /// A future completing when this promise settles.
    pub fn settled(&self) -> Settled<T, E> {
        Settled::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_new_promise_is_waiting() {
        let promise = Promise::<i32, String>::new();
        assert_eq!(promise.status(), Status::Waiting);
        assert_eq!(promise.value(), None);
        assert_eq!(promise.success_callback_count(), 0);
        assert_eq!(promise.fail_callback_count(), 0);
        assert!(!promise.has_catch());
    }

    #[test]
    fn test_then_appends_without_invoking() {
        let promise = Promise::<i32, String>::new();
        let calls = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let calls = calls.clone();
            promise.then(move |_| calls.set(calls.get() + 1));
        }
        assert_eq!(promise.success_callback_count(), 3);
        assert_eq!(calls.get(), 0);
        assert!(promise.is_waiting());
    }

    #[test]
    fn test_then_opt_appends_only_what_is_given() {
        let promise = Promise::<i32, String>::new();
        promise.then_opt(None, None);
        assert_eq!(promise.success_callback_count(), 0);
        assert_eq!(promise.fail_callback_count(), 0);

        promise.then_opt(None, Some(Box::new(|_: String| {})));
        assert_eq!(promise.success_callback_count(), 0);
        assert_eq!(promise.fail_callback_count(), 1);

        promise.then_with(|_| {}, |_| {});
        assert_eq!(promise.success_callback_count(), 1);
        assert_eq!(promise.fail_callback_count(), 2);
    }

    #[test]
    fn test_then_returns_same_promise() {
        let promise = Promise::<(), ()>::new();
        let returned = promise.then(|_| {});
        assert!(Promise::ptr_eq(&promise, returned));
        assert!(!Promise::ptr_eq(&promise, &Promise::new()));
    }

    #[test]
    fn test_clone_shares_state() {
        let promise = Promise::<(), ()>::new();
        let other = promise.clone();
        other.then(|_| {});
        other.catch(|_| {});
        assert_eq!(promise.success_callback_count(), 1);
        assert!(promise.has_catch());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Waiting.to_string(), "waiting");
        assert_eq!(Status::Resolved.to_string(), "resolved");
        assert_eq!(Status::Rejected.to_string(), "rejected");
    }
}
