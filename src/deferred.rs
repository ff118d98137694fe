use std::{fmt, mem};
use tracing::{debug, warn};
use crate::{Error, Promise, Result, Status};

/// The producer side of a promise and the only thing that can settle it.
///
/// A `Deferred` is not `Clone`: hand out [`promise`](Self::promise) clones to
/// consumers and keep the deferred where the work finishes.
///
/// # Examples
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// let deferred = oath::defer::<(), String>();
/// let error = Rc::new(RefCell::new(None));
/// let sink = error.clone();
/// deferred.promise().catch(move |e| *sink.borrow_mut() = Some(e));
/// deferred.reject("💥".into()).unwrap();
/// assert_eq!(error.borrow().as_deref(), Some("💥"));
/// assert!(deferred.promise().is_rejected());
/// ```
pub struct Deferred<T, E> {
    promise: Promise<T, E>,
}

impl<T, E> Deferred<T, E> {
    pub fn new() -> Self {
        Self { promise: Promise::new() }
    }

    pub fn promise(&self) -> &Promise<T, E> {
        &self.promise
    }

    /// Resolve the promise with `data` and hand `data` to the first success
    /// callback registered with `then`. Success callbacks after the first
    /// stay registered and are never called.
    ///
    /// Fails with [`Error::NoSuccessCallback`] if `then` was never called,
    /// and with [`Error::AlreadySettled`] if the promise has left the waiting
    /// state. On failure the promise is not modified.
    ///
    /// The callback runs before this returns. A panic inside it reaches the
    /// caller.
    pub fn resolve(&self, data: T) -> Result<()>
    where
        T: Clone,
    {
        let (callback, wakers) = {
            let mut inner = self.promise.inner.borrow_mut();
            if inner.status != Status::Waiting {
                warn!(status = %inner.status, "resolve on a settled promise");
                return Err(Error::AlreadySettled { status: inner.status });
            }
            if inner.success_callbacks.is_empty() {
                warn!("resolve with no success callback registered");
                return Err(Error::NoSuccessCallback);
            }
            inner.value = Some(data.clone());
            inner.status = Status::Resolved;
            let callback = inner.success_callbacks.remove(0);
            debug!(unreached = inner.success_callbacks.len(), "promise resolved");
            (callback, mem::take(&mut inner.wakers))
        };
        for waker in wakers {
            waker.wake()
        }
        callback(data);
        Ok(())
    }

    /// Reject the promise and hand `error` to the `catch` handler.
    ///
    /// The promise's value is left unset, and failure callbacks passed to
    /// [`Promise::then_with`] are not called. Fails with
    /// [`Error::NoCatchHandler`] if `catch` was never called, and with
    /// [`Error::AlreadySettled`] if the promise has left the waiting state.
    /// On failure the promise is not modified.
    pub fn reject(&self, error: E) -> Result<()> {
        let (handler, wakers) = {
            let mut inner = self.promise.inner.borrow_mut();
            if inner.status != Status::Waiting {
                warn!(status = %inner.status, "reject on a settled promise");
                return Err(Error::AlreadySettled { status: inner.status });
            }
            let Some(handler) = inner.failure.take() else {
                warn!("reject with no catch handler registered");
                return Err(Error::NoCatchHandler);
            };
            inner.status = Status::Rejected;
            debug!(ignored = inner.fail_callbacks.len(), "promise rejected");
            (handler, mem::take(&mut inner.wakers))
        };
        for waker in wakers {
            waker.wake()
        }
        handler(error);
        Ok(())
    }
}

impl<T, E> Default for Deferred<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").field("promise", &self.promise).finish()
    }
}

impl<T, E> Drop for Deferred<T, E> {
    /// If the promise is still waiting, wake anything awaiting it so it sees
    /// [`Error::DeferredDropped`].
    fn drop(&mut self) {
        let wakers = match self.promise.inner.try_borrow_mut() {
            Ok(mut inner) if inner.status == Status::Waiting => {
                inner.abandoned = true;
                mem::take(&mut inner.wakers)
            }
            _ => return,
        };
        debug!(waiters = wakers.len(), "deferred dropped while waiting");
        for waker in wakers {
            waker.wake()
        }
    }
}
