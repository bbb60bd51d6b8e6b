// a single queued notification, reified so it can sit in a buffer and be replayed later.

use crate::subscriber::Subscriber;


/// One event of a notification stream, as a value
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Notification<T, E> {
    /// A value
    Next(T),
    /// Terminal error
    Error(E),
    /// Terminal completion
    Complete,
}

impl<T, E> Notification<T, E> {
    /// Whether this is an error or completion
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }

    /// Replay this notification to `subscriber`
    ///
    /// Returns whether the stream may continue, which is false if this was terminal.
    pub fn accept<S>(self, subscriber: &S) -> bool
    where
        S: Subscriber<T, E> + ?Sized,
    {
        match self {
            Notification::Next(item) => {
                subscriber.on_next(item);
                true
            }
            Notification::Error(error) => {
                subscriber.on_error(error);
                false
            }
            Notification::Complete => {
                subscriber.on_complete();
                false
            }
        }
    }
}
