//! A one-to-many wakeup point: any number of tasks can call [`EventSource::wait`]
//! and each gets its own copy of the next value [`EventSource::fire`]s.
//!
//! Grounded on `xxxDispatcher.h`'s `EventSource<T>`: `Fire`/`Cancel` swap the
//! listener list out before walking it, so a listener that calls `Wait`
//! again from inside its own wakeup is not re-fired in the same pass — it
//! joins the list for the *next* fire instead.
//!
//! Each [`EventSource::wait`] also returns a monotonic [`WaiterHandle`], the
//! concrete form of spec §4.4/§9's "delete-listener hook": a task blocked on
//! an `EventSource` is expected to be removable from the awaiter list on its
//! own, independent of whether or when the source itself next fires or is
//! cancelled wholesale. [`EventSource::deregister`] pulls exactly one
//! awaiter back out (waking it with [`crate::error::TaskError::Cancelled`]
//! if it is still pending), which is what lets a cancelled or timed-out
//! `wait_for_message` task detach itself without waiting for every other
//! awaiter to resolve (spec §5's "cancellation of a task blocked on an
//! `EventSource` removes it from the awaiter list").

use std::{
  future::Future,
  pin::Pin,
  sync::{Arc, Mutex},
  task::{Context, Poll, Waker},
};

use crate::error::TaskError;

enum Slot<T> {
  Pending(Option<Waker>),
  Ready(T),
  Cancelled,
}

/// Identifies one outstanding [`EventSource::wait`] call, returned alongside
/// its future so the waiter can later be pulled back out with
/// [`EventSource::deregister`] without disturbing any other awaiter.
pub type WaiterHandle = u64;

/// A broadcast wakeup point for values of type `T`.
///
/// `T: Clone` because each outstanding waiter receives its own copy of the
/// fired value — the original's `Fire` passes `value` by copy to every
/// listener in the same way.
pub struct EventSource<T> {
  listeners: Mutex<Vec<(WaiterHandle, Arc<Mutex<Slot<T>>>)>>,
  next_handle: Mutex<WaiterHandle>,
}

impl<T> Default for EventSource<T> {
  fn default() -> Self {
    Self { listeners: Mutex::new(Vec::new()), next_handle: Mutex::new(0x10) }
  }
}

impl<T: Clone> EventSource<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a new waiter, returning a future that resolves when this
  /// `EventSource` is next fired or cancelled, plus the [`WaiterHandle`]
  /// that identifies it for [`EventSource::deregister`].
  pub fn wait(&self) -> (EventSourceWait<T>, WaiterHandle) {
    let slot = Arc::new(Mutex::new(Slot::Pending(None)));
    let mut next_handle = self.next_handle.lock().unwrap();
    let handle = *next_handle;
    *next_handle += 1;
    drop(next_handle);
    self.listeners.lock().unwrap().push((handle, Arc::clone(&slot)));
    (EventSourceWait { slot }, handle)
  }

  /// Delivers `value` to every waiter registered before this call, then
  /// clears the listener list. Waiters added while delivering (from within
  /// a woken task, before it yields back) are not delivered to in this pass.
  pub fn fire(&self, value: T) {
    let fired = std::mem::take(&mut *self.listeners.lock().unwrap());
    for (_, slot) in fired {
      let waker = {
        let mut guard = slot.lock().unwrap();
        match std::mem::replace(&mut *guard, Slot::Ready(value.clone())) {
          Slot::Pending(waker) => waker,
          other => {
            *guard = other;
            None
          }
        }
      };
      if let Some(waker) = waker {
        waker.wake();
      }
    }
  }

  /// Cancels every outstanding waiter registered before this call with
  /// [`TaskError::Cancelled`].
  pub fn cancel(&self) {
    let fired = std::mem::take(&mut *self.listeners.lock().unwrap());
    for (_, slot) in fired {
      let waker = {
        let mut guard = slot.lock().unwrap();
        match std::mem::replace(&mut *guard, Slot::Cancelled) {
          Slot::Pending(waker) => waker,
          other => {
            *guard = other;
            None
          }
        }
      };
      if let Some(waker) = waker {
        waker.wake();
      }
    }
  }

  /// Removes the single waiter registered under `handle`, waking it with
  /// [`TaskError::Cancelled`] if it is still pending. A no-op if `handle`
  /// was already resolved by [`EventSource::fire`]/[`EventSource::cancel`]
  /// or previously deregistered.
  pub fn deregister(&self, handle: WaiterHandle) {
    let mut listeners = self.listeners.lock().unwrap();
    let Some(index) = listeners.iter().position(|(h, _)| *h == handle) else {
      return;
    };
    let (_, slot) = listeners.remove(index);
    drop(listeners);

    let waker = {
      let mut guard = slot.lock().unwrap();
      match std::mem::replace(&mut *guard, Slot::Cancelled) {
        Slot::Pending(waker) => waker,
        other => {
          *guard = other;
          None
        }
      }
    };
    if let Some(waker) = waker {
      waker.wake();
    }
  }

  /// Number of waiters currently registered. Exposed for tests asserting
  /// that cancellation/timeout actually detaches an awaiter rather than
  /// leaking it.
  pub fn awaiter_count(&self) -> usize {
    self.listeners.lock().unwrap().len()
  }
}

/// The future returned by [`EventSource::wait`].
pub struct EventSourceWait<T> {
  slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Future for EventSourceWait<T> {
  type Output = Result<T, TaskError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut guard = self.slot.lock().unwrap();
    let current = std::mem::replace(&mut *guard, Slot::Pending(None));
    match current {
      Slot::Pending(_) => {
        *guard = Slot::Pending(Some(cx.waker().clone()));
        Poll::Pending
      }
      Slot::Cancelled => {
        *guard = Slot::Cancelled;
        Poll::Ready(Err(TaskError::Cancelled))
      }
      Slot::Ready(value) => Poll::Ready(Ok(value)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::executor::block_on;

  #[test]
  fn fire_delivers_the_same_value_to_every_waiter() {
    let source = EventSource::<u32>::new();
    let (a, _) = source.wait();
    let (b, _) = source.wait();
    source.fire(42);
    assert_eq!(block_on(a), Ok(42));
    assert_eq!(block_on(b), Ok(42));
  }

  #[test]
  fn cancel_resolves_waiters_with_cancelled_error() {
    let source = EventSource::<u32>::new();
    let (waiting, _) = source.wait();
    source.cancel();
    assert!(matches!(block_on(waiting), Err(TaskError::Cancelled)));
  }

  #[test]
  fn waiters_added_after_fire_wait_for_the_next_fire() {
    let source = EventSource::<u32>::new();
    source.fire(1);
    let (waiting, _) = source.wait();
    source.fire(2);
    assert_eq!(block_on(waiting), Ok(2));
  }

  #[test]
  fn deregister_removes_exactly_one_waiter_and_resolves_it_cancelled() {
    let source = EventSource::<u32>::new();
    let (a, handle_a) = source.wait();
    let (b, _handle_b) = source.wait();
    assert_eq!(source.awaiter_count(), 2);

    source.deregister(handle_a);

    assert_eq!(source.awaiter_count(), 1);
    assert!(matches!(block_on(a), Err(TaskError::Cancelled)));

    source.fire(7);
    assert_eq!(block_on(b), Ok(7));
  }

  #[test]
  fn deregister_is_a_no_op_once_the_waiter_already_resolved() {
    let source = EventSource::<u32>::new();
    let (_waiting, handle) = source.wait();
    source.fire(1);
    assert_eq!(source.awaiter_count(), 0);
    source.deregister(handle); // already gone: must not panic or affect anything.
    assert_eq!(source.awaiter_count(), 0);
  }
}
