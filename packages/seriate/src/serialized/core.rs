// the serialized forwarder.

use super::error::ProtocolViolation;
use crate::{
    notification::Notification,
    subscriber::{Subscriber, SubscriptionHandle},
    util::append_log::AppendLog,
};
use std::sync::{
    atomic::{
        Ordering::{Acquire, Relaxed, Release},
        AtomicBool,
    },
    Arc,
    Mutex,
    MutexGuard,
    OnceLock,
    PoisonError,
};


/// Serializes the calls of any number of concurrent producers onto one [`Subscriber`]
///
/// `on_next`, `on_error` and `on_complete` may be called from many threads at once through a
/// shared reference. Exactly one thread at a time delivers to the wrapped subscriber; any other
/// thread that arrives meanwhile enqueues its notification and returns without blocking, and the
/// delivering thread replays the queue before it gives up exclusivity. Notifications reach the
/// subscriber in the order they were accepted, and at most one terminal notification ever does.
///
/// `on_subscribe` is not serialized against the other calls, so the subscription should be bound
/// before any producer starts emitting.
///
/// The wrapped subscriber is called without any internal lock held, so it may call back into this
/// forwarder. Such calls are queued and delivered after the callback returns.
pub struct Serialized<S, T, E> {
    // the downstream subscriber.
    subscriber: S,
    // whether an error queues behind pending values rather than preempting them.
    delay_errors: bool,
    // the upstream subscription, once bound.
    subscription: OnceLock<SubscriptionHandle>,
    // mutex around lockable state.
    lockable: Mutex<Lockable<T, E>>,
    // begins false. set to true, while locked, once a terminal notification has been accepted.
    // never changes again after that.
    done: AtomicBool,
}

// forwarder lockable state.
struct Lockable<T, E> {
    // whether some thread currently holds the right to call into the subscriber.
    emitting: bool,
    // notifications that arrived while emitting was true.
    //
    // invariant: if some, not empty.
    queue: Option<AppendLog<Notification<T, E>>>,
}

impl<S, T, E> Serialized<S, T, E> {
    /// Wrap `subscriber`, with errors preempting any queued values
    pub fn new(subscriber: S) -> Self {
        Self::with_delay_errors(subscriber, false)
    }

    /// Wrap `subscriber`, choosing how an error that races with an in-progress delivery is queued
    ///
    /// If `delay_errors` is true, the error is queued behind any values already waiting, so they
    /// are all delivered first. Otherwise the error takes the front of the queue and the values
    /// behind it are dropped.
    pub fn with_delay_errors(subscriber: S, delay_errors: bool) -> Self {
        Serialized {
            subscriber,
            delay_errors,
            subscription: OnceLock::new(),
            lockable: Mutex::new(Lockable { emitting: false, queue: None }),
            done: AtomicBool::new(false),
        }
    }

    /// Whether errors queue behind pending values
    pub fn delay_errors(&self) -> bool {
        self.delay_errors
    }

    /// Whether a terminal notification has been accepted
    ///
    /// It may not have reached the subscriber yet if it was queued.
    pub fn is_done(&self) -> bool {
        self.done.load(Acquire)
    }

    /// Reference to the wrapped subscriber
    pub fn get_ref(&self) -> &S {
        &self.subscriber
    }

    /// Unwrap the subscriber
    ///
    /// Anything still queued is dropped. Since this takes ownership, no thread can be in the
    /// middle of delivering, so the queue is only non-empty if a delivery panicked.
    pub fn into_inner(self) -> S {
        self.subscriber
    }

    // lock the lockable state.
    //
    // the subscriber is never called while locked, so poisoning can only come from a panic in our
    // own short critical sections, which leave the state consistent.
    fn lock(&self) -> MutexGuard<'_, Lockable<T, E>> {
        self.lockable.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, T, E> Serialized<S, T, E>
where
    S: Subscriber<T, E>,
    E: From<ProtocolViolation>,
{
    /// Receive a value that may be absent
    ///
    /// An absent value is a protocol violation: the bound subscription is cancelled and a
    /// [`ProtocolViolation::NullValue`] error is delivered in its place. The subscription is
    /// cancelled even if the stream has already terminated.
    pub fn on_next_opt(&self, item: Option<T>) {
        match item {
            Some(item) => self.on_next(item),
            None => {
                warn!("absent value emitted, cancelling upstream subscription");
                if let Some(subscription) = self.subscription.get() {
                    subscription.cancel();
                }
                self.on_error(ProtocolViolation::NullValue.into());
            }
        }
    }

    // replay queued notifications until the queue is found empty, then stop emitting.
    //
    // only called by the thread that is currently emitting.
    fn emit_loop(&self) {
        let mut terminated = false;
        loop {
            let queue = {
                let mut lock = self.lock();
                match lock.queue.take() {
                    Some(queue) => queue,
                    None => {
                        lock.emitting = false;
                        trace!("emit loop found queue empty, no longer emitting");
                        return;
                    }
                }
            };

            // nothing is enqueued once done is set, so nothing follows a terminal notification
            debug_assert!(!terminated, "notifications queued after termination");

            trace!(len = queue.len(), "emit loop replaying queued notifications");
            terminated = !queue.for_each_while(|notification| notification.accept(&self.subscriber));
        }
    }
}

impl<S, T, E> Subscriber<T, E> for Serialized<S, T, E>
where
    S: Subscriber<T, E>,
    E: From<ProtocolViolation>,
{
    fn on_subscribe(&self, subscription: SubscriptionHandle) {
        if self.subscription.set(Arc::clone(&subscription)).is_err() {
            warn!("subscription already set, cancelling the new one");
            subscription.cancel();
            self.on_error(ProtocolViolation::DuplicateSubscription.into());
            return;
        }

        self.subscriber.on_subscribe(subscription);
    }

    fn on_next(&self, item: T) {
        if self.done.load(Acquire) {
            return;
        }

        {
            let mut lock = self.lock();

            // now that we're locked, we can check for termination without race conditions
            if self.done.load(Relaxed) {
                return;
            }

            if lock.emitting {
                lock.queue.get_or_insert_with(AppendLog::new).push(Notification::Next(item));
                return;
            }
            lock.emitting = true;
        }

        self.subscriber.on_next(item);

        self.emit_loop();
    }

    fn on_error(&self, error: E) {
        if self.done.load(Acquire) {
            return;
        }

        {
            let mut lock = self.lock();

            // another terminal notification won the race, and whoever accepted it delivers it
            if self.done.load(Relaxed) {
                return;
            }
            self.done.store(true, Release);

            if lock.emitting {
                let queue = lock.queue.get_or_insert_with(AppendLog::new);
                if self.delay_errors {
                    queue.push(Notification::Error(error));
                } else {
                    let dropped = queue.len();
                    queue.set_first(Notification::Error(error));
                    if dropped > 0 {
                        debug!(dropped, "error preempted queued values");
                    }
                }
                return;
            }
            lock.emitting = true;
        }

        // no need to loop, this is the last event
        self.subscriber.on_error(error);
    }

    fn on_complete(&self) {
        if self.done.load(Acquire) {
            return;
        }

        {
            let mut lock = self.lock();

            if self.done.load(Relaxed) {
                return;
            }
            self.done.store(true, Release);

            if lock.emitting {
                lock.queue.get_or_insert_with(AppendLog::new).push(Notification::Complete);
                return;
            }
            lock.emitting = true;
        }

        // no need to loop, this is the last event
        self.subscriber.on_complete();
    }
}
