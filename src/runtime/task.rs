//! A spawned, dispatcher-driven unit of work and its completion handle.
//!
//! Grounded on `xxxDispatcher.h`'s `PromiseBase`/`TaskPromise`: the state
//! machine (`Suspended`/`Runnable`/`Complete`/`Cancelled`/`TimedOut`/
//! `Faulted`), delete listeners fired once when the task's shared state is
//! dropped (there: from `~PromiseBase`), and a monotonic, never-reused
//! delete-listener handle starting at `0x10`. Rust drives the coroutine body
//! as a boxed `Future` polled by [`super::Dispatcher`] rather than a
//! hand-written resumable state machine.
//!
//! Delete listeners fire the moment the task reaches a terminal state
//! (`finish`), not only when the shared state is eventually dropped --
//! spec §5 is explicit that "cancellation of a task blocked on an
//! `EventSource` removes it from the awaiter list *through the
//! delete-listener hook*", which only works if the hook runs synchronously
//! with `cancel()`/`time_out()` rather than waiting for every `TaskHandle`
//! clone to go out of scope. `Drop` still fires them as a fallback, for a
//! task dropped while still `Suspended`/`Runnable`. A guard flag keeps them
//! from firing twice.

use std::{
  future::Future,
  pin::Pin,
  sync::{Arc, Mutex},
  task::{Context, Poll, Waker},
};

use crate::error::TaskError;

/// Lifecycle of a spawned task, mirroring the original's promise states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  Suspended,
  Runnable,
  Complete,
  Cancelled,
  TimedOut,
  Faulted,
}

type DeleteListener = Box<dyn FnMut() + Send>;

pub(crate) struct Shared<T> {
  state: Mutex<TaskState>,
  result: Mutex<Option<Result<T, TaskError>>>,
  waker: Mutex<Option<Waker>>,
  delete_listeners: Mutex<Vec<(u64, DeleteListener)>>,
  next_listener_handle: Mutex<u64>,
  delete_listeners_fired: Mutex<bool>,
}

impl<T> Shared<T> {
  fn new() -> Self {
    Self {
      state: Mutex::new(TaskState::Suspended),
      result: Mutex::new(None),
      waker: Mutex::new(None),
      delete_listeners: Mutex::new(Vec::new()),
      next_listener_handle: Mutex::new(0x10),
      delete_listeners_fired: Mutex::new(false),
    }
  }

  fn finish(&self, result: Result<T, TaskError>) {
    let mut state_guard = self.state.lock().unwrap();
    if matches!(*state_guard, TaskState::Complete | TaskState::Cancelled | TaskState::TimedOut | TaskState::Faulted) {
      return;
    }
    *state_guard = match &result {
      Ok(_) => TaskState::Complete,
      Err(TaskError::Cancelled) => TaskState::Cancelled,
      Err(TaskError::TimedOut) => TaskState::TimedOut,
      Err(TaskError::Faulted(_)) => TaskState::Faulted,
    };
    drop(state_guard);
    *self.result.lock().unwrap() = Some(result);
    if let Some(waker) = self.waker.lock().unwrap().take() {
      waker.wake();
    }
    self.fire_delete_listeners();
  }

  /// Runs every registered delete listener exactly once, whichever of
  /// `finish` or `Drop` reaches it first.
  fn fire_delete_listeners(&self) {
    let mut fired = self.delete_listeners_fired.lock().unwrap();
    if *fired {
      return;
    }
    *fired = true;
    drop(fired);
    for (_, mut listener) in self.delete_listeners.lock().unwrap().drain(..) {
      listener();
    }
  }
}

impl<T> Drop for Shared<T> {
  fn drop(&mut self) {
    self.fire_delete_listeners();
  }
}

/// A handle to a task spawned on a [`super::Dispatcher`]: `.await` it to get
/// the task's result, or call [`TaskHandle::cancel`]/[`TaskHandle::time_out`]
/// to force early completion. Cloning shares the same underlying task.
pub struct TaskHandle<T> {
  shared: Arc<Shared<T>>,
}

impl<T> Clone for TaskHandle<T> {
  fn clone(&self) -> Self {
    Self { shared: Arc::clone(&self.shared) }
  }
}

impl<T> TaskHandle<T> {
  pub(crate) fn new() -> (Self, Arc<Shared<T>>) {
    let shared = Arc::new(Shared::new());
    (Self { shared: Arc::clone(&shared) }, shared)
  }

  pub fn state(&self) -> TaskState {
    *self.shared.state.lock().unwrap()
  }

  /// Forces the task to finish with [`TaskError::Cancelled`] if it has not
  /// already reached a terminal state. A no-op otherwise.
  pub fn cancel(&self) {
    self.shared.finish(Err(TaskError::Cancelled));
  }

  /// Forces the task to finish with [`TaskError::TimedOut`] if it has not
  /// already reached a terminal state. A no-op otherwise.
  pub fn time_out(&self) {
    self.shared.finish(Err(TaskError::TimedOut));
  }

  /// Registers a callback to run exactly once, the moment this task first
  /// reaches a terminal state (completed, cancelled, timed out, or
  /// faulted) -- or, failing that, when its shared state is finally dropped
  /// (every `TaskHandle` clone gone) without ever reaching one. Returns a
  /// handle for [`TaskHandle::remove_delete_listener`].
  pub fn add_delete_listener(&self, listener: impl FnMut() + Send + 'static) -> u64 {
    let mut next = self.shared.next_listener_handle.lock().unwrap();
    let handle = *next;
    *next += 1;
    self.shared.delete_listeners.lock().unwrap().push((handle, Box::new(listener)));
    handle
  }

  pub fn remove_delete_listener(&self, handle: u64) {
    self.shared.delete_listeners.lock().unwrap().retain(|(h, _)| *h != handle);
  }
}

impl<T> Future for TaskHandle<T> {
  type Output = Result<T, TaskError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut result = self.shared.result.lock().unwrap();
    if let Some(result) = result.take() {
      return Poll::Ready(result);
    }
    drop(result);
    *self.shared.waker.lock().unwrap() = Some(cx.waker().clone());
    Poll::Pending
  }
}

pub(crate) fn complete<T>(shared: &Shared<T>, value: T) {
  shared.finish(Ok(value));
}

/// Finishes a task's shared state with an arbitrary outcome, including a
/// fault originating from inside the task body itself (as opposed to
/// [`TaskHandle::cancel`]/[`TaskHandle::time_out`], which finish it from the
/// outside). A no-op if the task already reached a terminal state.
pub(crate) fn finish<T>(shared: &Shared<T>, result: Result<T, TaskError>) {
  shared.finish(result);
}

pub(crate) fn mark_runnable<T>(shared: &Shared<T>) {
  let mut state = shared.state.lock().unwrap();
  if *state == TaskState::Suspended {
    *state = TaskState::Runnable;
  }
}

/// Whether `shared` has already reached a terminal state. Used by a task
/// body to bail out before registering a new await point -- e.g. a new
/// [`super::EventSource`] awaiter -- if it was cancelled or timed out
/// before ever running, so it never creates an awaiter nothing will clean
/// up.
pub(crate) fn is_terminal<T>(shared: &Shared<T>) -> bool {
  matches!(*shared.state.lock().unwrap(), TaskState::Complete | TaskState::Cancelled | TaskState::TimedOut | TaskState::Faulted)
}
