//! The narrow contract the session manager needs from a control-socket
//! implementation (spec §4.2), plus the concrete Unix-domain-datagram
//! transport that talks to a real `wpa_supplicant` control interface.

mod control_socket;

pub use control_socket::ControlSocketTransport;

use crate::error::TransportError;

/// Outcome of one [`Transport::receive`] call.
#[derive(Debug)]
pub enum ReceiveOutcome {
  /// A complete frame was read into the first `len` bytes of the caller's
  /// buffer.
  Frame { len: usize },
  /// No frame arrived within the transport's inner timeout. Recoverable —
  /// the session manager logs and keeps draining.
  Timeout,
  /// The connection is gone. Terminal for the current drain.
  Lost,
}

/// Mirrors `rustdds`'s `StatusEvented` trait (`dds/statusevents.rs`): a
/// narrow contract over an external, poll-registerable transport, kept
/// deliberately thin so the session manager and the task runtime's readiness
/// plumbing can share one implementation.
pub trait Transport {
  /// Opens the control socket at `path`. Fails with
  /// [`TransportError::NotFound`] or [`TransportError::Io`].
  fn open(&mut self, path: &str) -> Result<(), TransportError>;

  /// Subscribes to the supplicant's unsolicited event stream. Must only be
  /// called once per `open`.
  fn attach(&mut self) -> Result<(), TransportError>;

  /// Unsubscribes from the event stream. Idempotent.
  fn detach(&mut self);

  /// Reads one frame into `buffer`, never delivering a partial frame.
  fn receive(&mut self, buffer: &mut [u8]) -> Result<ReceiveOutcome, TransportError>;

  /// Sends `request` and returns the supplicant's synchronous response.
  /// Used by callers outside the core; specified here only for completeness.
  fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError>;

  /// Closes the control socket. Idempotent.
  fn close(&mut self);
}
