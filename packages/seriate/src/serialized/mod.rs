// implementation of the serialized forwarder.
//
// the architecture is as such:
//
// Serialized wraps the downstream subscriber plus:
//          |
//          |------ a Mutex<Lockable>, which is held only briefly and never while calling into the
//          |       downstream subscriber. it contains:
//          |
//          |       - the "emitting" bool. whichever thread flips it false->true becomes the sole
//          |         emitter until it flips it back. only the emitter calls into the subscriber.
//          |       - the pending queue, an Option<AppendLog<Notification>>. threads that find
//          |         another thread emitting push onto it and return immediately.
//          |
//          |------ an AtomicBool "done" flag. once any terminal notification is accepted, it is
//          |       set (under the lock) and never cleared. it is read without locking as a fast
//          |       path for producers that lost the race to terminate.
//          |
//          \------ a OnceLock for the upstream subscription. binding is not serialized against
//                  the other notifications, only against itself.
//
// after an emitter delivers its own value, it repeatedly takes the whole pending queue out of the
// lock and replays it, until it finds the queue empty, at which point it clears the emitting flag
// in the same critical section. a terminal notification never needs a drain loop, because
// nothing can be enqueued after one.
//
// the organization of these modules is as such:
//
//      core: the forwarder itself.
//
//      error: the protocol violation error, re-exported publically.

pub(crate) mod error;

mod core;

pub use self::core::Serialized;
