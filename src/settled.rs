//! An awaitable view of a promise's settlement.
//!
//! Any number of `Settled` futures may wait on the same promise. Every one of
//! them is woken when the promise settles or when its deferred is dropped
//! while the promise is still waiting.
//!
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use crate::{Error, Promise, Result, Status};

/// Returned by [`Promise::settled`].
///
/// # Examples
///
/// ```
/// use futures::executor::block_on;
/// let deferred = oath::defer::<String, ()>();
/// deferred.promise().then(|_| {});
/// let settled = deferred.promise().settled();
/// deferred.resolve("Hi".into()).unwrap();
/// assert_eq!(block_on(settled), Ok("Hi".to_string()));
/// ```
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Settled<T, E> {
    promise: Promise<T, E>,
}

impl<T, E> Settled<T, E> {
    pub(crate) fn new(promise: Promise<T, E>) -> Self {
        Self { promise }
    }
}

impl<T: Clone, E> Future for Settled<T, E> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.promise.inner.borrow_mut();
        match inner.status {
            Status::Resolved => {
                if let Some(value) = inner.value.clone() {
                    return Poll::Ready(Ok(value));
                }
            }
            Status::Rejected => return Poll::Ready(Err(Error::Rejected)),
            Status::Waiting if inner.abandoned => return Poll::Ready(Err(Error::DeferredDropped)),
            Status::Waiting => {}
        }
        if !inner.wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            inner.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
