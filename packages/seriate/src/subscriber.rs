// the consumer-facing protocol: subscribe, next*, (error | complete).

use std::sync::Arc;


/// Handle by which a subscriber can stop its upstream from producing
///
/// There is no demand signalling: producers emit at whatever rate they like, and anything that
/// needs flow control must layer it on top.
pub trait Subscription: Send + Sync {
    /// Ask the upstream to stop producing
    ///
    /// May be called more than once and from any thread. Later calls should be no-ops.
    fn cancel(&self);
}

/// Shared, type-erased [`Subscription`]
pub type SubscriptionHandle = Arc<dyn Subscription>;

/// Receiver of a notification stream
///
/// Implementations may assume that calls arrive in the order `on_subscribe`, any number of
/// `on_next`, then at most one of `on_error` or `on_complete`, and that no two calls overlap, but
/// only if the calls are funneled through a [`Serialized`](crate::Serialized). Implementations
/// must not panic.
pub trait Subscriber<T, E> {
    /// Bind the upstream subscription
    fn on_subscribe(&self, subscription: SubscriptionHandle);

    /// Receive a value
    fn on_next(&self, item: T);

    /// Receive a terminal error
    fn on_error(&self, error: E);

    /// Receive the terminal completion signal
    fn on_complete(&self);
}

impl<T, E, S: Subscriber<T, E> + ?Sized> Subscriber<T, E> for &S {
    fn on_subscribe(&self, subscription: SubscriptionHandle) {
        (**self).on_subscribe(subscription)
    }

    fn on_next(&self, item: T) {
        (**self).on_next(item)
    }

    fn on_error(&self, error: E) {
        (**self).on_error(error)
    }

    fn on_complete(&self) {
        (**self).on_complete()
    }
}

impl<T, E, S: Subscriber<T, E> + ?Sized> Subscriber<T, E> for Arc<S> {
    fn on_subscribe(&self, subscription: SubscriptionHandle) {
        (**self).on_subscribe(subscription)
    }

    fn on_next(&self, item: T) {
        (**self).on_next(item)
    }

    fn on_error(&self, error: E) {
        (**self).on_error(error)
    }

    fn on_complete(&self) {
        (**self).on_complete()
    }
}
