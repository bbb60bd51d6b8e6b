// protocol violation error types.

use thiserror::Error;


/// Misuse of the subscriber protocol by an upstream producer
///
/// A [`Serialized`](crate::Serialized) never panics or returns this. It cancels the offending
/// subscription and delivers the violation downstream as a terminal error, converted into the
/// stream's error type.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Error)]
pub enum ProtocolViolation {
    /// A subscription was bound when one was already bound
    #[error("subscription already set")]
    DuplicateSubscription,
    /// A producer emitted an absent value
    #[error("absent value emitted")]
    NullValue,
}
