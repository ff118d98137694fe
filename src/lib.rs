//! A single-shot deferred/promise primitive.
//!
//! [`defer`] creates a [`Deferred`] owning a fresh, waiting [`Promise`].
//! Consumers register callbacks on the promise with [`Promise::then`] and
//! [`Promise::catch`]; the producer later calls [`Deferred::resolve`] or
//! [`Deferred::reject`], which settles the promise and calls back right away,
//! on the caller's stack.
//!
//! The contract is deliberately small:
//!
//! - `resolve` fires only the *first* success callback given to `then`.
//! - `reject` fires only the handler given to `catch`. A later `catch`
//!   replaces an earlier one, and failure callbacks given to `then_with` are
//!   never called.
//! - Settling without the matching callback registered, or settling twice,
//!   is an [`Error`]. The promise is left as it was.
//!
//! # Examples
//!
//! ```
//! use oath::{defer, Status};
//! use std::{cell::Cell, rc::Rc};
//!
//! let deferred = defer::<i32, String>();
//! let seen = Rc::new(Cell::new(None));
//! let sink = seen.clone();
//! deferred.promise().then(move |x| sink.set(Some(x)));
//!
//! deferred.resolve(42).unwrap();
//! assert_eq!(seen.get(), Some(42));
//! assert_eq!(deferred.promise().status(), Status::Resolved);
//! assert_eq!(deferred.promise().value(), Some(42));
//! ```
mod deferred;
mod error;
mod promise;
mod settled;

pub use deferred::Deferred;
pub use error::{Error, Result};
pub use promise::{FailureFn, Promise, Status, SuccessFn};
pub use settled::Settled;

/// Create a deferred holding a new promise in [`Status::Waiting`] with no
/// value and no callbacks.
pub fn defer<T, E>() -> Deferred<T, E> {
    Deferred::new()
}
