//! Single-threaded cooperative scheduler: a FIFO run queue plus a timer
//! min-heap, pumped one step at a time by the caller.
//!
//! Grounded on `xxxDispatcher.h`'s `Dispatcher`: `Post` (FIFO enqueue),
//! `Push` (head-insert, used to resume a just-woken task ahead of
//! previously-queued work), `PumpMessages`, and `AddTimer`/
//! `AddIntervalTimer`/`CancelTimer` backed by a handle counter starting at
//! `0x10`. Unlike the original's hidden per-thread singleton
//! (`Dispatcher::CurrentDispatcher()`), this `Dispatcher` is an explicit
//! value the caller owns and passes around — the spec's Design Notes
//! explicitly allow this to avoid hidden coupling.

use std::{
  cmp::Ordering,
  collections::{BinaryHeap, VecDeque},
  future::Future,
  sync::{Arc, Mutex},
  task::Context,
  time::{Duration, Instant},
};

use futures::task::{waker_ref, ArcWake};

use super::task::{self, Shared, TaskHandle};

pub type TimerHandle = u64;

struct Runnable {
  future: Mutex<std::pin::Pin<Box<dyn Future<Output = ()> + Send>>>,
  queue: Arc<Mutex<VecDeque<Arc<Runnable>>>>,
}

impl ArcWake for Runnable {
  fn wake_by_ref(arc_self: &Arc<Self>) {
    arc_self.queue.lock().unwrap().push_back(Arc::clone(arc_self));
  }
}

struct TimerEntry {
  due: Instant,
  interval: Option<Duration>,
  handle: TimerHandle,
  callback: Box<dyn FnMut() + Send>,
}

impl PartialEq for TimerEntry {
  fn eq(&self, other: &Self) -> bool {
    self.due == other.due
  }
}
impl Eq for TimerEntry {}
impl PartialOrd for TimerEntry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}
impl Ord for TimerEntry {
  fn cmp(&self, other: &Self) -> Ordering {
    // BinaryHeap is a max-heap; we want the earliest due time on top.
    other.due.cmp(&self.due)
  }
}

/// A single-threaded run queue and timer wheel for [`TaskHandle`]s.
///
/// Not `Send`/`Sync`: one `Dispatcher` belongs to one thread, created and
/// owned explicitly by that thread rather than looked up through a
/// thread-local singleton.
pub struct Dispatcher {
  queue: Arc<Mutex<VecDeque<Arc<Runnable>>>>,
  timers: BinaryHeap<TimerEntry>,
  next_timer_handle: TimerHandle,
}

impl Default for Dispatcher {
  fn default() -> Self {
    Self::new()
  }
}

impl Dispatcher {
  pub fn new() -> Self {
    Self { queue: Arc::new(Mutex::new(VecDeque::new())), timers: BinaryHeap::new(), next_timer_handle: 0x10 }
  }

  fn enqueue(&self, future: impl Future<Output = ()> + Send + 'static, front: bool) {
    let runnable = Arc::new(Runnable { future: Mutex::new(Box::pin(future)), queue: Arc::clone(&self.queue) });
    let mut queue = self.queue.lock().unwrap();
    if front {
      queue.push_front(runnable);
    } else {
      queue.push_back(runnable);
    }
  }

  /// Enqueues `future` at the back of the run queue.
  pub fn post(&self, future: impl Future<Output = ()> + Send + 'static) {
    self.enqueue(future, false);
  }

  /// Enqueues `future` at the front of the run queue, ahead of anything
  /// already waiting.
  pub fn push(&self, future: impl Future<Output = ()> + Send + 'static) {
    self.enqueue(future, true);
  }

  /// Spawns `future` as a task and returns a handle for awaiting, cancelling,
  /// or timing it out.
  pub fn spawn_task<T>(&self, future: impl Future<Output = T> + Send + 'static) -> TaskHandle<T>
  where
    T: Send + 'static,
  {
    let (handle, shared) = TaskHandle::new();
    task::mark_runnable(&shared);
    let body = run_to_completion(future, shared);
    self.post(body);
    handle
  }

  /// Schedules `callback` to run once, `delay` from now.
  pub fn add_timer(&mut self, delay: Duration, callback: impl FnMut() + Send + 'static) -> TimerHandle {
    self.schedule_timer(delay, None, callback)
  }

  /// Schedules `callback` to run repeatedly, every `interval`, starting one
  /// `interval` from now.
  pub fn add_interval_timer(&mut self, interval: Duration, callback: impl FnMut() + Send + 'static) -> TimerHandle {
    self.schedule_timer(interval, Some(interval), callback)
  }

  fn schedule_timer(&mut self, delay: Duration, interval: Option<Duration>, callback: impl FnMut() + Send + 'static) -> TimerHandle {
    let handle = self.next_timer_handle;
    self.next_timer_handle += 1;
    self.timers.push(TimerEntry { due: Instant::now() + delay, interval, handle, callback: Box::new(callback) });
    handle
  }

  /// Removes a pending timer. A no-op if `handle` already fired (for a
  /// one-shot timer) or does not exist.
  pub fn cancel_timer(&mut self, handle: TimerHandle) {
    let remaining: Vec<_> = self.timers.drain().filter(|entry| entry.handle != handle).collect();
    self.timers.extend(remaining);
  }

  /// Runs every timer that is now due, in due-time order (ties broken by
  /// insertion order), then resumes every handle that was queued before
  /// this call, in FIFO order. A handle that re-queues itself while being
  /// resumed (e.g. a task that immediately re-awaits and is woken inline)
  /// is picked up on the *next* pump, not this one — mirroring the
  /// listener-dispatch snapshot discipline in [`crate::session`]. Returns
  /// `true` if there is more work to do (pending timers or queued tasks)
  /// after this call.
  pub fn pump_messages(&mut self) -> bool {
    self.fire_due_timers();

    let due = { std::mem::take(&mut *self.queue.lock().unwrap()) };
    for runnable in due {
      let waker = waker_ref(&runnable);
      let mut cx = Context::from_waker(&waker);
      let mut future = runnable.future.lock().unwrap();
      let _ = future.as_mut().poll(&mut cx);
    }

    !self.queue.lock().unwrap().is_empty() || !self.timers.is_empty()
  }

  fn fire_due_timers(&mut self) {
    let now = Instant::now();
    while matches!(self.timers.peek(), Some(entry) if entry.due <= now) {
      let mut entry = self.timers.pop().expect("just peeked Some");
      (entry.callback)();
      if let Some(interval) = entry.interval {
        entry.due = now + interval;
        self.timers.push(entry);
      }
    }
  }

  /// Runs [`Dispatcher::pump_messages`] until it reports no remaining work.
  pub fn run_until_idle(&mut self) {
    while self.pump_messages() {}
  }
}

async fn run_to_completion<T: Send + 'static>(future: impl Future<Output = T>, shared: Arc<Shared<T>>) {
  let value = future.await;
  task::complete(&shared, value);
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::executor::block_on;
  use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

  #[test]
  fn spawned_task_result_is_available_after_pumping() {
    let mut dispatcher = Dispatcher::new();
    let handle = dispatcher.spawn_task(async { 21u32 * 2 });
    dispatcher.run_until_idle();
    assert_eq!(block_on(handle), Ok(42));
  }

  #[test]
  fn post_is_fifo_and_push_inserts_at_the_front() {
    let mut dispatcher = Dispatcher::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let o1 = Arc::clone(&order);
    dispatcher.post(async move { o1.lock().unwrap().push(1) });
    let o2 = Arc::clone(&order);
    dispatcher.post(async move { o2.lock().unwrap().push(2) });
    let o0 = Arc::clone(&order);
    dispatcher.push(async move { o0.lock().unwrap().push(0) });

    dispatcher.run_until_idle();
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
  }

  #[test]
  fn timer_fires_once_pending_time_has_elapsed() {
    let mut dispatcher = Dispatcher::new();
    let fired = Arc::new(AtomicU32::new(0));
    let fired_clone = Arc::clone(&fired);
    dispatcher.add_timer(Duration::from_millis(0), move || {
      fired_clone.fetch_add(1, AtomicOrdering::SeqCst);
    });
    dispatcher.run_until_idle();
    assert_eq!(fired.load(AtomicOrdering::SeqCst), 1);
  }

  #[test]
  fn cancelled_timer_does_not_fire() {
    let mut dispatcher = Dispatcher::new();
    let fired = Arc::new(AtomicU32::new(0));
    let fired_clone = Arc::clone(&fired);
    let handle = dispatcher.add_timer(Duration::from_millis(0), move || {
      fired_clone.fetch_add(1, AtomicOrdering::SeqCst);
    });
    dispatcher.cancel_timer(handle);
    dispatcher.run_until_idle();
    assert_eq!(fired.load(AtomicOrdering::SeqCst), 0);
  }
}
