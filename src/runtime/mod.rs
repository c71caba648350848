//! A small single-threaded cooperative task runtime, generalizing the
//! original implementation's C++-coroutine-based dispatcher
//! (`xxxDispatcher.h`) onto `std::future::Future` + `std::task::Waker`.

mod dispatcher;
mod event_source;
mod generator;
mod task;

pub use dispatcher::{Dispatcher, TimerHandle};
pub use event_source::{EventSource, EventSourceWait, WaiterHandle};
pub use generator::Generator;
pub use task::{TaskHandle, TaskState};

// Used by `crate::session` to build `wait_for_message`/`wait_for_messages`
// directly on top of a task's shared completion slot, rather than through
// `Dispatcher::spawn_task`'s always-`Ok` body — those waits need to finish
// with a `TaskError` from inside the task body itself (cancellation
// propagated from the session's internal `EventSource`), and to deregister
// that task's `EventSource` awaiter the moment it is cancelled or times out
// (`is_terminal` guards against registering a fresh awaiter after that).
pub(crate) use task::{complete, finish, is_terminal, mark_runnable};
