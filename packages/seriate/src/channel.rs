// adapter from the subscriber protocol to an async stream of notifications.

use crate::{
    notification::Notification,
    subscriber::{Subscriber, SubscriptionHandle},
};
use std::{
    sync::{Arc, OnceLock},
    task::{Context, Poll},
};
use tokio::sync::mpsc::{
    self,
    error::TryRecvError,
    UnboundedReceiver,
    UnboundedSender,
};


/// Create a subscriber that forwards everything it receives to an async stream
///
/// The subscriber half does not serialize anything on its own. To feed the stream from many
/// threads, wrap it in a [`Serialized`](crate::Serialized).
pub fn channel<T, E>() -> (ChannelSubscriber<T, E>, NotificationStream<T, E>) {
    let (send, recv) = mpsc::unbounded_channel();
    let subscription = Arc::new(OnceLock::new());
    let subscriber = ChannelSubscriber { send, subscription: Arc::clone(&subscription) };
    let stream = NotificationStream { recv, subscription, finished: false };
    (subscriber, stream)
}

/// Subscriber half of a [`channel`]
pub struct ChannelSubscriber<T, E> {
    send: UnboundedSender<Notification<T, E>>,
    subscription: Arc<OnceLock<SubscriptionHandle>>,
}

impl<T, E> ChannelSubscriber<T, E> {
    // send notification to the stream, or cancel upstream if the stream is gone.
    fn forward(&self, notification: Notification<T, E>) {
        if self.send.send(notification).is_err() {
            trace!("notification stream gone, cancelling upstream subscription");
            if let Some(subscription) = self.subscription.get() {
                subscription.cancel();
            }
        }
    }
}

impl<T, E> Subscriber<T, E> for ChannelSubscriber<T, E> {
    fn on_subscribe(&self, subscription: SubscriptionHandle) {
        if let Err(subscription) = self.subscription.set(subscription) {
            warn!("subscription already set, cancelling the new one");
            subscription.cancel();
        }
    }

    fn on_next(&self, item: T) {
        self.forward(Notification::Next(item));
    }

    fn on_error(&self, error: E) {
        self.forward(Notification::Error(error));
    }

    fn on_complete(&self) {
        self.forward(Notification::Complete);
    }
}

/// Stream half of a [`channel`]
///
/// Yields notifications in the order the subscriber half received them. Ends after yielding a
/// terminal notification, or once the subscriber half is dropped. With the `futures` feature, this
/// implements `futures::Stream`.
pub struct NotificationStream<T, E> {
    recv: UnboundedReceiver<Notification<T, E>>,
    subscription: Arc<OnceLock<SubscriptionHandle>>,
    finished: bool,
}

impl<T, E> NotificationStream<T, E> {
    /// Receive the next notification, or `None` if the stream has ended
    pub async fn recv(&mut self) -> Option<Notification<T, E>> {
        if self.finished {
            return None;
        }
        let notification = self.recv.recv().await;
        self.observe(notification)
    }

    /// Receive the next notification without waiting
    ///
    /// Errors with [`TryRecvError::Disconnected`] once the stream has ended.
    pub fn try_recv(&mut self) -> Result<Notification<T, E>, TryRecvError> {
        if self.finished {
            return Err(TryRecvError::Disconnected);
        }
        match self.recv.try_recv() {
            Ok(notification) => {
                self.observe(Some(notification)).ok_or(TryRecvError::Disconnected)
            }
            Err(TryRecvError::Disconnected) => {
                self.observe(None);
                Err(TryRecvError::Disconnected)
            }
            Err(TryRecvError::Empty) => Err(TryRecvError::Empty),
        }
    }

    /// Poll for the next notification, or `None` if the stream has ended
    pub fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<Notification<T, E>>> {
        if self.finished {
            return Poll::Ready(None);
        }
        self.recv.poll_recv(cx).map(|notification| self.observe(notification))
    }

    /// Cancel the upstream subscription, if one has been bound
    ///
    /// Notifications already sent remain receivable.
    pub fn cancel(&self) {
        if let Some(subscription) = self.subscription.get() {
            subscription.cancel();
        }
    }

    /// Whether the stream has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    // mark finished upon seeing a terminal notification or the end of the channel.
    fn observe(&mut self, notification: Option<Notification<T, E>>) -> Option<Notification<T, E>> {
        if notification.as_ref().is_none_or(Notification::is_terminal) {
            self.finished = true;
            self.recv.close();
        }
        notification
    }
}

#[cfg(feature = "futures")]
impl<T, E> futures::Stream for NotificationStream<T, E> {
    type Item = Notification<T, E>;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Notification<T, E>>> {
        self.get_mut().poll_recv(cx)
    }
}

#[cfg(feature = "futures")]
impl<T, E> futures::stream::FusedStream for NotificationStream<T, E> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}
