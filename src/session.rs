//! The session manager: owns the control-socket transport and the listener
//! table, drains inbound frames, classifies them via [`crate::event`], and
//! fans each resulting [`EventRecord`] out to synchronous listeners and to
//! tasks parked in [`Session::wait_for_message`]/[`Session::wait_for_messages`].
//!
//! Grounded on `original_source/lib/p2psession/SessionManager.h` and
//! `SessionManager.cpp` in full: the `Open`/`Close` state machine, the
//! monotonic listener-handle counter starting at `0x100`, the
//! `ProcessMessage` drain loop, and `FireEvent`'s snapshot-then-iterate
//! dispatch discipline. The one documented defect in the original —
//! `FireEvent` invoking every listener's callback regardless of its computed
//! filter match (`SessionManager.cpp:244`) — is not carried over; see
//! DESIGN.md.

use std::{
  collections::HashSet,
  fmt,
  sync::{Arc, Mutex},
  time::Duration,
};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::{
  config::SessionConfig,
  error::{SessionError, TaskError, TransportError},
  event::{parse_line, EventRecord, MessageKind},
  runtime::{self, Dispatcher, EventSource, TaskHandle},
  transport::{ReceiveOutcome, Transport},
};

/// Severity of a diagnostic line emitted by the session's own log sink
/// (spec §4.3/§6), distinct from [`crate::event::EventPriority`] which is
/// carried *in* a parsed supplicant event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
  Debug,
  Info,
  Warning,
  Error,
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Debug => "DEBUG",
      Self::Info => "INFO",
      Self::Warning => "WARNING",
      Self::Error => "ERROR",
    };
    f.write_str(s)
  }
}

type LogCallback = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Open/Attached state machine (spec §4.3): `Closed -> Open -> Attached`,
/// with `Close` reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
  Closed,
  Open,
  Attached,
}

/// One registered listener: a monotonic handle, the set of kinds it wants,
/// and its callback. Handles start at `0x100` and are never reused, matching
/// the original's `nextHandle` counter (`SessionManager.h:16`).
struct ListenerEntry {
  handle: u64,
  filter: HashSet<MessageKind>,
  callback: Arc<dyn Fn(&EventRecord) + Send + Sync>,
}

impl Clone for ListenerEntry {
  fn clone(&self) -> Self {
    Self { handle: self.handle, filter: self.filter.clone(), callback: Arc::clone(&self.callback) }
  }
}

struct ListenerTable {
  entries: Vec<ListenerEntry>,
  next_handle: u64,
}

/// A cheaply-cloneable handle to a session's listener table. Listener
/// callbacks may capture their own clone of this (obtained via
/// [`Session::listener_registry`] before dispatch begins) to register or
/// remove listeners *from within their own invocation* — the registry's
/// interior mutability is what lets [`Session::fire_event`]'s snapshot
/// discipline (spec §4.3/§8) work: a listener added mid-dispatch lands in
/// the shared table immediately but is invisible to the snapshot already
/// taken for the event in progress.
#[derive(Clone)]
pub struct ListenerRegistry {
  table: Arc<Mutex<ListenerTable>>,
}

impl ListenerRegistry {
  fn new() -> Self {
    Self { table: Arc::new(Mutex::new(ListenerTable { entries: Vec::new(), next_handle: 0x100 })) }
  }

  /// Registers `callback` for every event whose kind matches `filter`.
  /// Returns a handle usable with [`ListenerRegistry::remove`].
  pub fn add(&self, filter: impl Into<KindFilter>, callback: impl Fn(&EventRecord) + Send + Sync + 'static) -> u64 {
    let mut table = self.table.lock().unwrap();
    let handle = table.next_handle;
    table.next_handle += 1;
    table.entries.push(ListenerEntry { handle, filter: filter.into().0, callback: Arc::new(callback) });
    handle
  }

  /// Removes the listener with `handle`. A no-op if no such listener exists.
  pub fn remove(&self, handle: u64) {
    self.table.lock().unwrap().entries.retain(|entry| entry.handle != handle);
  }

  fn snapshot(&self) -> Vec<ListenerEntry> {
    self.table.lock().unwrap().entries.clone()
  }
}

/// A set of [`MessageKind`]s a listener or a `wait_for_*` call is interested
/// in. Accepts either a single kind or a collection — spec §4.3's
/// `AddEventListener`/`WaitForMessage(s)` take either shape.
#[derive(Debug, Clone, Default)]
pub struct KindFilter(HashSet<MessageKind>);

impl KindFilter {
  pub fn contains(&self, kind: MessageKind) -> bool {
    self.0.contains(&kind)
  }
}

impl From<MessageKind> for KindFilter {
  fn from(kind: MessageKind) -> Self {
    Self(HashSet::from([kind]))
  }
}

impl From<&[MessageKind]> for KindFilter {
  fn from(kinds: &[MessageKind]) -> Self {
    Self(kinds.iter().copied().collect())
  }
}

impl<const N: usize> From<[MessageKind; N]> for KindFilter {
  fn from(kinds: [MessageKind; N]) -> Self {
    Self(kinds.into_iter().collect())
  }
}

impl FromIterator<MessageKind> for KindFilter {
  fn from_iter<I: IntoIterator<Item = MessageKind>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

/// Owns one transport and one listener table; drives the receive loop;
/// classifies and dispatches events; exposes the `wait_for_message` task API
/// (spec §4.3).
///
/// `T` is the concrete [`Transport`] implementation — typically
/// [`crate::transport::ControlSocketTransport`] in production, or a fake in
/// tests.
pub struct Session<T: Transport> {
  transport: T,
  state: SessionState,
  config: SessionConfig,
  listeners: ListenerRegistry,
  log_level: LogLevel,
  log_callback: Option<LogCallback>,
  message_source: Arc<EventSource<EventRecord>>,
  dispatcher: Arc<Mutex<Dispatcher>>,
  scratch: EventRecord,
}

impl<T: Transport> Session<T> {
  /// Builds a session around an unopened transport, using `config`'s
  /// initial log level and buffer size.
  pub fn new(transport: T, config: SessionConfig) -> Self {
    Self {
      transport,
      state: SessionState::Closed,
      config,
      listeners: ListenerRegistry::new(),
      log_level: LogLevel::Info,
      log_callback: None,
      message_source: Arc::new(EventSource::new()),
      dispatcher: Arc::new(Mutex::new(Dispatcher::new())),
      scratch: EventRecord::default(),
    }
  }

  /// Opens the control socket at `path` and attaches to its unsolicited
  /// event stream. Fails with [`SessionError::AlreadyOpen`] if a handle is
  /// already held. If `attach` fails after a successful `open`, the
  /// transport is closed and the failure propagates — the session is left
  /// `Closed`, not half-open.
  pub fn open(&mut self, path: &str) -> Result<(), SessionError> {
    if self.state != SessionState::Closed {
      return Err(SessionError::AlreadyOpen);
    }
    self.transport.open(path).map_err(SessionError::Transport)?;
    self.state = SessionState::Open;

    if let Err(e) = self.transport.attach() {
      self.transport.close();
      self.state = SessionState::Closed;
      return Err(SessionError::Transport(e));
    }
    self.state = SessionState::Attached;
    self.log(LogLevel::Info, &format!("control session attached at {path}"));
    Ok(())
  }

  /// Detaches (if attached) and closes (if open) the transport. Idempotent;
  /// safe to call from a `Drop` impl. Also cancels the session's internal
  /// message event source, so any task parked in
  /// [`Session::wait_for_message`]/[`Session::wait_for_messages`] (with or
  /// without a timeout) resolves with [`TaskError::Cancelled`] instead of
  /// leaking, forever parked on a source that will never fire again.
  pub fn close(&mut self) {
    if self.state == SessionState::Closed {
      return;
    }
    self.transport.detach();
    self.transport.close();
    self.state = SessionState::Closed;
    self.message_source.cancel();
  }

  pub fn log_level(&self) -> LogLevel {
    self.log_level
  }

  pub fn set_log_level(&mut self, level: LogLevel) {
    self.log_level = level;
  }

  /// Installs `callback` as the session's diagnostic sink. Only messages at
  /// or above [`Session::log_level`] are delivered to it (spec §4.3/§6).
  pub fn set_log_callback(&mut self, callback: impl Fn(LogLevel, &str) + Send + Sync + 'static) {
    self.log_callback = Some(Arc::new(callback));
  }

  fn log(&self, level: LogLevel, message: &str) {
    if level < self.log_level {
      return;
    }
    match &self.log_callback {
      Some(cb) => cb(level, message),
      None => match level {
        LogLevel::Debug => debug!("{message}"),
        LogLevel::Info => info!("{message}"),
        LogLevel::Warning => warn!("{message}"),
        LogLevel::Error => error!("{message}"),
      },
    }
  }

  /// Registers `callback` for every event whose kind matches `filter`.
  /// Returns a handle usable with [`Session::remove_event_listener`].
  pub fn add_event_listener(
    &mut self,
    filter: impl Into<KindFilter>,
    callback: impl Fn(&EventRecord) + Send + Sync + 'static,
  ) -> u64 {
    self.listeners.add(filter, callback)
  }

  /// Removes the listener with `handle`. A no-op if no such listener exists.
  pub fn remove_event_listener(&mut self, handle: u64) {
    self.listeners.remove(handle);
  }

  /// Reads and dispatches exactly one inbound frame (spec §4.3's
  /// `ProcessMessage`). Returns `Ok(())` on a recoverable outcome (an empty
  /// line, a malformed line, a receive timeout); returns
  /// [`SessionError::Transport`] with [`TransportError`] on connection loss,
  /// terminal for the caller's drain loop.
  pub fn process_message(&mut self) -> Result<(), SessionError> {
    if self.state != SessionState::Attached {
      return Err(SessionError::NotOpen);
    }

    let mut buffer = vec![0u8; self.config.read_buffer_size];
    match self.transport.receive(&mut buffer) {
      Ok(ReceiveOutcome::Timeout) => {
        self.log(LogLevel::Debug, "control socket receive timed out");
        Ok(())
      }
      Ok(ReceiveOutcome::Lost) => {
        self.log(LogLevel::Error, "control socket connection lost");
        Err(SessionError::Transport(TransportError::Io(std::io::Error::new(
          std::io::ErrorKind::ConnectionReset,
          "control socket connection lost",
        ))))
      }
      Ok(ReceiveOutcome::Frame { len }) => {
        let line = String::from_utf8_lossy(&buffer[..len]);
        self.log(LogLevel::Debug, &format!("WpaRead: {line}"));
        self.dispatch_line(&line);
        Ok(())
      }
      Err(e) => Err(SessionError::Transport(e)),
    }
  }

  fn dispatch_line(&mut self, line: &str) {
    if !parse_line(line, &mut self.scratch) {
      self.log(LogLevel::Debug, &format!("failed to parse control line: {line}"));
      return;
    }
    if self.scratch.priority.is_none() {
      return; // empty line or bare prompt echo: no event.
    }
    if self.scratch.kind == MessageKind::Unknown {
      self.log(LogLevel::Debug, &format!("Unknown message received: {}", self.scratch.raw_kind));
    }

    let record = std::mem::take(&mut self.scratch);
    self.fire_event(record);
  }

  /// Snapshots the listener table, then invokes every listener whose
  /// filter contains `record.kind`, in registration order. A listener
  /// registered or removed *during* this call does not affect this fire
  /// (spec §4.3/§8's snapshot-semantics testable properties). A panicking
  /// listener is caught and logged at [`LogLevel::Error`]; it never aborts
  /// the drain loop. After synchronous dispatch, the same record is
  /// published to the task runtime's internal event source.
  fn fire_event(&mut self, record: EventRecord) {
    let snapshot = self.listeners.snapshot();
    for entry in &snapshot {
      if !entry.filter.contains(&record.kind) {
        continue;
      }
      let callback = Arc::clone(&entry.callback);
      let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(&record)));
      if outcome.is_err() {
        self.log(LogLevel::Error, &format!("event listener (handle {:#x}) panicked", entry.handle));
      }
    }
    self.message_source.fire(record);
  }

  /// Posts `future` onto the session's dispatcher and returns a handle for
  /// awaiting, cancelling, or timing it out (spec §4.3's `StartTask`).
  pub fn start_task<R>(&self, future: impl std::future::Future<Output = R> + Send + 'static) -> TaskHandle<R>
  where
    R: Send + 'static,
  {
    self.dispatcher.lock().unwrap().spawn_task(future)
  }

  /// Equivalent to [`Session::wait_for_messages`] with a single-kind filter.
  pub fn wait_for_message(&self, kind: MessageKind, timeout_ms: Option<u64>) -> TaskHandle<EventRecord> {
    self.wait_for_messages(KindFilter::from(kind), timeout_ms)
  }

  /// Builds and starts a task that completes with the next event whose kind
  /// is in `filter`, or with [`TaskError::TimedOut`] after `timeout_ms`
  /// (`None` waits indefinitely, like spec §4.3's default), or with
  /// [`TaskError::Cancelled`] if the task handle is cancelled or the
  /// session's internal event source is cancelled (e.g. on session close).
  pub fn wait_for_messages(&self, filter: impl Into<KindFilter>, timeout_ms: Option<u64>) -> TaskHandle<EventRecord> {
    let filter = filter.into();
    let timeout_ms = timeout_ms.or(self.config.default_wait_timeout_ms);

    let (handle, shared) = TaskHandle::<EventRecord>::new();
    runtime::mark_runnable(&shared);

    let timer_dispatcher = Arc::clone(&self.dispatcher);
    let timer_handle_for_cancel = handle.clone();
    let timer = timeout_ms.map(|ms| {
      timer_dispatcher.lock().unwrap().add_timer(Duration::from_millis(ms), move || {
        timer_handle_for_cancel.time_out();
      })
    });

    // Tracks whichever `message_source` awaiter the task body is currently
    // parked on (`None` while it's running between await points). The
    // delete listener below uses this to pull *that one* awaiter back out
    // of `message_source` -- not the whole listener list -- the instant the
    // task is cancelled, times out, or is dropped before it ever fires
    // (spec §4.4/§5/§9's delete-listener hook).
    let current_awaiter: Arc<Mutex<Option<runtime::WaiterHandle>>> = Arc::new(Mutex::new(None));

    let source = Arc::clone(&self.message_source);
    let delete_source = Arc::clone(&source);
    let delete_awaiter = Arc::clone(&current_awaiter);
    handle.add_delete_listener(move || {
      if let Some(awaiter) = delete_awaiter.lock().unwrap().take() {
        delete_source.deregister(awaiter);
      }
    });

    let cancel_dispatcher = Arc::clone(&self.dispatcher);
    let body = async move {
      loop {
        // Already cancelled/timed out before this poll (e.g. the timeout
        // timer fired, or the caller called `cancel()`, before the body
        // ever ran): stop here rather than registering an awaiter nobody
        // will ever deregister.
        if runtime::is_terminal(&shared) {
          return;
        }

        let (wait_future, awaiter) = source.wait();
        *current_awaiter.lock().unwrap() = Some(awaiter);
        let outcome = wait_future.await;
        *current_awaiter.lock().unwrap() = None;

        match outcome {
          Ok(event) if filter.contains(event.kind) => {
            if let Some(timer) = timer {
              cancel_dispatcher.lock().unwrap().cancel_timer(timer);
            }
            runtime::finish(&shared, Ok(event));
            return;
          }
          Ok(_) => continue,
          Err(TaskError::Cancelled) => {
            runtime::finish(&shared, Err(TaskError::Cancelled));
            return;
          }
          Err(other) => {
            runtime::finish(&shared, Err(other));
            return;
          }
        }
      }
    };
    self.dispatcher.lock().unwrap().post(body);
    handle
  }

  /// Runs one dispatcher pump: fires due timers, resumes one queued
  /// continuation, then attempts one [`Session::process_message`] if the
  /// session is attached (spec §4.6). Returns `true` if there is more work
  /// to do — queued continuations, pending timers, or an attached
  /// transport — `false` if quiescent.
  pub fn pump(&mut self) -> bool {
    let more_runtime_work = self.dispatcher.lock().unwrap().pump_messages();

    if self.state == SessionState::Attached {
      if let Err(e) = self.process_message() {
        self.log(LogLevel::Error, &format!("drain loop terminated: {e}"));
      }
    }

    more_runtime_work || self.state == SessionState::Attached
  }
}

impl<T: Transport> Drop for Session<T> {
  fn drop(&mut self) {
    self.close();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::{
    collections::VecDeque,
    sync::{
      atomic::{AtomicU32, Ordering},
      Mutex as StdMutex,
    },
  };

  /// A scripted transport: `open`/`attach` always succeed, `receive` pops
  /// one canned outcome per call, defaulting to `Timeout` once the script is
  /// exhausted.
  #[derive(Default)]
  struct FakeTransport {
    script: VecDeque<Vec<u8>>,
    opened: bool,
    attached: bool,
  }

  impl FakeTransport {
    fn with_lines(lines: &[&str]) -> Self {
      Self { script: lines.iter().map(|l| l.as_bytes().to_vec()).collect(), opened: false, attached: false }
    }
  }

  impl Transport for FakeTransport {
    fn open(&mut self, _path: &str) -> Result<(), TransportError> {
      self.opened = true;
      Ok(())
    }
    fn attach(&mut self) -> Result<(), TransportError> {
      self.attached = true;
      Ok(())
    }
    fn detach(&mut self) {
      self.attached = false;
    }
    fn receive(&mut self, buffer: &mut [u8]) -> Result<ReceiveOutcome, TransportError> {
      match self.script.pop_front() {
        Some(bytes) => {
          let len = bytes.len().min(buffer.len());
          buffer[..len].copy_from_slice(&bytes[..len]);
          Ok(ReceiveOutcome::Frame { len })
        }
        None => Ok(ReceiveOutcome::Timeout),
      }
    }
    fn send(&mut self, _request: &[u8]) -> Result<Vec<u8>, TransportError> {
      Ok(Vec::new())
    }
    fn close(&mut self) {
      self.opened = false;
    }
  }

  fn open_session(lines: &[&str]) -> Session<FakeTransport> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut session = Session::new(FakeTransport::with_lines(lines), SessionConfig::default());
    session.open("/does/not/matter").unwrap();
    session
  }

  #[test]
  fn open_twice_fails_with_already_open() {
    let mut session = open_session(&[]);
    assert!(matches!(session.open("/again"), Err(SessionError::AlreadyOpen)));
  }

  #[test]
  fn close_is_idempotent() {
    let mut session = open_session(&[]);
    session.close();
    session.close();
  }

  #[test]
  fn listener_filtered_on_one_kind_receives_only_matching_event() {
    let mut session = open_session(&[
      "<3>CTRL-EVENT-SCAN-STARTED ",
      "<2>CTRL-EVENT-SCAN-RESULTS ",
      r#"<2>P2P-DEVICE-FOUND 02:aa:bb:cc:dd:ee name="x""#,
    ]);

    let hits = Arc::new(StdMutex::new(Vec::new()));
    let hits_clone = Arc::clone(&hits);
    session.add_event_listener(MessageKind::P2pEventDeviceFound, move |event| {
      hits_clone.lock().unwrap().push(event.clone());
    });

    for _ in 0..3 {
      session.process_message().unwrap();
    }

    let hits = hits.lock().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].positional, vec!["02:aa:bb:cc:dd:ee"]);
    assert_eq!(hits[0].get_named("name"), "\"x\"");
  }

  #[test]
  fn unknown_kind_listener_receives_raw_kind_and_named_params() {
    let mut session = open_session(&["<2>CTRL-EVENT-NOVEL-THING alpha=1"]);

    let seen = Arc::new(StdMutex::new(None));
    let seen_clone = Arc::clone(&seen);
    session.add_event_listener(MessageKind::Unknown, move |event| {
      *seen_clone.lock().unwrap() = Some(event.clone());
    });
    session.process_message().unwrap();

    let seen = seen.lock().unwrap();
    let event = seen.as_ref().expect("listener should have fired");
    assert_eq!(event.raw_kind, "CTRL-EVENT-NOVEL-THING");
    assert_eq!(event.get_named("alpha"), "1");
  }

  #[test]
  fn listener_registered_during_dispatch_is_not_invoked_for_the_same_event_but_is_for_the_next() {
    // A first listener fires for both CTRL-EVENT-CONNECTED lines; it
    // registers a second listener on the first firing only. The second
    // listener must be excluded from that first event and included in the
    // second, for a combined fire count of 1 (first listener, event 1) + 2
    // (both listeners, event 2) = 3.
    let mut session = open_session(&["<2>CTRL-EVENT-CONNECTED ", "<2>CTRL-EVENT-CONNECTED "]);
    let total_fires = Arc::new(AtomicU32::new(0));

    session.process_message().unwrap(); // first CTRL-EVENT-CONNECTED, no listeners yet
    let total_fires_first = Arc::clone(&total_fires);
    session.add_event_listener(MessageKind::WpaEventConnected, move |_event| {
      total_fires_first.fetch_add(1, Ordering::SeqCst);
    });
    let total_fires_second = Arc::clone(&total_fires);
    session.add_event_listener(MessageKind::WpaEventConnected, move |_event| {
      total_fires_second.fetch_add(1, Ordering::SeqCst);
    });
    session.process_message().unwrap(); // second CTRL-EVENT-CONNECTED, both listeners fire

    assert_eq!(total_fires.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn listener_removed_during_dispatch_still_fires_for_that_event_not_subsequent_ones() {
    let mut session = open_session(&["<2>CTRL-EVENT-CONNECTED ", "<2>CTRL-EVENT-CONNECTED "]);
    let fire_count = Arc::new(AtomicU32::new(0));
    let fire_count_clone = Arc::clone(&fire_count);

    let handle = session.add_event_listener(MessageKind::WpaEventConnected, move |_event| {
      fire_count_clone.fetch_add(1, Ordering::SeqCst);
    });

    session.process_message().unwrap();
    session.remove_event_listener(handle);
    session.process_message().unwrap();

    assert_eq!(fire_count.load(Ordering::SeqCst), 1);
  }

  #[test_log::test]
  fn wait_for_message_completes_when_a_matching_event_arrives() {
    let mut session = open_session(&["<3>CTRL-EVENT-SCAN-STARTED ", "<2>WPS-SUCCESS "]);
    let task = session.wait_for_message(MessageKind::WpsEventSuccess, None);

    session.process_message().unwrap();
    session.pump();
    session.process_message().unwrap();
    session.pump();

    assert_eq!(task.state(), crate::runtime::TaskState::Complete);
    let event = futures::executor::block_on(task).unwrap();
    assert_eq!(event.kind, MessageKind::WpsEventSuccess);
  }

  #[test]
  fn wait_for_message_times_out_when_nothing_matches() {
    let mut session = open_session(&["<3>CTRL-EVENT-SCAN-STARTED "]);
    let task = session.wait_for_message(MessageKind::WpaEventConnected, Some(0));

    session.process_message().unwrap();
    session.pump();
    std::thread::sleep(Duration::from_millis(5));
    session.pump();

    assert_eq!(task.state(), crate::runtime::TaskState::TimedOut);
  }

  #[test]
  fn cancelling_a_waiting_task_resolves_it_as_cancelled() {
    let session = open_session(&[]);
    let task = session.wait_for_message(MessageKind::WpsEventSuccess, None);
    task.cancel();
    assert_eq!(task.state(), crate::runtime::TaskState::Cancelled);
  }

  #[test]
  fn cancelling_a_parked_task_removes_it_from_the_event_source() {
    let mut session = open_session(&[]);
    let task = session.wait_for_message(MessageKind::WpsEventSuccess, None);

    // Pump once so the task body actually runs and parks itself on
    // `message_source`, the way it would in real use.
    session.pump();
    assert_eq!(session.message_source.awaiter_count(), 1);

    task.cancel();

    assert_eq!(task.state(), crate::runtime::TaskState::Cancelled);
    assert_eq!(
      session.message_source.awaiter_count(),
      0,
      "cancelling a parked task must deregister its awaiter, not just mark the task cancelled"
    );
  }

  #[test]
  fn timing_out_a_parked_task_removes_it_from_the_event_source() {
    let mut session = open_session(&["<3>CTRL-EVENT-SCAN-STARTED "]);
    let task = session.wait_for_message(MessageKind::WpaEventConnected, Some(0));

    session.process_message().unwrap();
    session.pump();
    std::thread::sleep(Duration::from_millis(5));
    session.pump();

    assert_eq!(task.state(), crate::runtime::TaskState::TimedOut);
    assert_eq!(
      session.message_source.awaiter_count(),
      0,
      "timing out a parked task must deregister its awaiter, not just mark the task timed out"
    );
  }

  #[test]
  fn closing_the_session_cancels_tasks_waiting_with_no_timeout() {
    let mut session = open_session(&[]);
    let task = session.wait_for_message(MessageKind::WpsEventSuccess, None);
    session.pump();
    assert_eq!(session.message_source.awaiter_count(), 1);

    session.close();
    session.pump();

    assert_eq!(task.state(), crate::runtime::TaskState::Cancelled);
    assert_eq!(session.message_source.awaiter_count(), 0);
  }
}
