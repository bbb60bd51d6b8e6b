//! Serialized delivery of a notification stream to a single [`Subscriber`].
//!
//! Any number of producer threads may push values, an error, or a completion signal into a
//! [`Serialized`] forwarder at once. The forwarder guarantees that the downstream subscriber sees
//! them one at a time, in arrival order, with at most one terminal notification, and without ever
//! blocking a producer on another producer's delivery.

#[macro_use]
extern crate tracing;

mod serialized;
mod subscriber;
mod notification;
mod channel;
pub mod util;

pub use crate::{
    serialized::Serialized,
    subscriber::{Subscriber, Subscription, SubscriptionHandle},
    notification::Notification,
    channel::{channel, ChannelSubscriber, NotificationStream},
};

/// Error types
pub mod error {
    pub use crate::serialized::error::*;
}
