use crate::Status;

/// Faults surfaced by settling or awaiting a promise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// `resolve` was called before any success callback was registered with
    /// `then`.
    #[error("resolve called with no success callback registered")]
    NoSuccessCallback,
    /// `reject` was called before a handler was registered with `catch`.
    #[error("reject called with no catch handler registered")]
    NoCatchHandler,
    /// The promise already left the waiting state.
    #[error("promise already settled ({status})")]
    AlreadySettled { status: Status },
    /// The awaited promise was rejected. The rejection itself goes to the
    /// `catch` handler.
    #[error("promise was rejected")]
    Rejected,
    /// The deferred was dropped before it settled its promise.
    #[error("deferred dropped before settling")]
    DeferredDropped,
}

pub type Result<T> = std::result::Result<T, Error>;
