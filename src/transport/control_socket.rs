//! Unix-domain-datagram transport for a real `wpa_supplicant` control
//! interface (see <https://w1.fi/wpa_supplicant/devel/ctrl_iface_page.html>,
//! referenced directly in `original_source/lib/p2psession/WpaEvent.h:8`).
//!
//! The client binds a private path, connects it to the supplicant's socket,
//! and sends `"ATTACH"` to subscribe to the unsolicited event stream —
//! `original_source/lib/SessionManager.cpp`'s `wpa_ctrl_open`/
//! `wpa_ctrl_attach` calls, reimplemented directly over the socket rather
//! than through the external `wpa_ctrl` library. The socket itself is
//! nonblocking; `receive`'s "blocking with an inner timeout" contract
//! (spec §4.2) is built on one dedicated `mio::Poll` per transport, the same
//! register/reregister/deregister delegation pattern `rustdds` uses to let a
//! wrapper type pose as an `event::Source` (`dds/no_key/datareader.rs`).

use std::{
  io,
  os::unix::net::UnixDatagram as StdUnixDatagram,
  path::{Path, PathBuf},
  sync::atomic::{AtomicU32, Ordering},
  time::{Duration, Instant},
};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use mio::{event, net::UnixDatagram as MioUnixDatagram, Events, Interest, Poll, Registry, Token};

use super::{ReceiveOutcome, Transport};
use crate::error::TransportError;

const ATTACH_REQUEST: &[u8] = b"ATTACH";
const DETACH_REQUEST: &[u8] = b"DETACH";
const ATTACH_TIMEOUT: Duration = Duration::from_secs(2);
const SOCKET_TOKEN: Token = Token(0);

static PRIVATE_PATH_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Concrete [`Transport`] over a Unix domain datagram socket.
pub struct ControlSocketTransport {
  socket: Option<MioUnixDatagram>,
  poll: Poll,
  events: Events,
  local_path: Option<PathBuf>,
  attached: bool,
  read_timeout: Duration,
}

impl ControlSocketTransport {
  pub fn new() -> io::Result<Self> {
    Ok(Self {
      socket: None,
      poll: Poll::new()?,
      events: Events::with_capacity(1),
      local_path: None,
      attached: false,
      read_timeout: Duration::from_millis(500),
    })
  }

  /// Overrides the default per-`receive` inner timeout (500ms).
  pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
    self.read_timeout = timeout;
    self
  }

  fn private_bind_path() -> PathBuf {
    let n = PRIVATE_PATH_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("wpa-p2p-session-{}-{n}.sock", std::process::id()))
  }

  fn socket_mut(&mut self) -> Result<&mut MioUnixDatagram, TransportError> {
    self.socket.as_mut().ok_or(TransportError::NotOpen)
  }

  /// Blocks until the socket is readable or `timeout` elapses.
  fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
    self.events.clear();
    self.poll.poll(&mut self.events, Some(timeout))?;
    Ok(self.events.iter().any(|event| event.token() == SOCKET_TOKEN && event.is_readable()))
  }

  /// Repeatedly waits for readability and attempts `recv` until `deadline`,
  /// tolerating the spurious-wakeup case where poll reports readable but a
  /// concurrent reader (there is none here, but the contract should hold)
  /// already drained the datagram.
  fn recv_before(&mut self, buffer: &mut [u8], deadline: Instant) -> io::Result<Option<usize>> {
    loop {
      let remaining = deadline.saturating_duration_since(Instant::now());
      if remaining.is_zero() {
        return Ok(None);
      }
      if !self.wait_readable(remaining)? {
        continue; // Instant::now() re-checked against deadline above.
      }
      let socket = self.socket.as_ref().expect("socket present while polling");
      match socket.recv(buffer) {
        Ok(len) => return Ok(Some(len)),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
        Err(e) => return Err(e),
      }
    }
  }
}

impl Transport for ControlSocketTransport {
  fn open(&mut self, path: &str) -> Result<(), TransportError> {
    if self.socket.is_some() {
      return Err(TransportError::AlreadyAttached);
    }
    let remote = Path::new(path);
    if !remote.exists() {
      return Err(TransportError::NotFound { path: path.to_string() });
    }

    let local_path = Self::private_bind_path();
    let std_socket = StdUnixDatagram::bind(&local_path).map_err(TransportError::Io)?;
    std_socket.connect(remote).map_err(TransportError::Io)?;
    std_socket.set_nonblocking(true).map_err(TransportError::Io)?;

    let mut socket = MioUnixDatagram::from_std(std_socket);
    self.poll.registry().register(&mut socket, SOCKET_TOKEN, Interest::READABLE).map_err(TransportError::Io)?;
    self.socket = Some(socket);
    self.local_path = Some(local_path);
    debug!("control socket opened at {path}");
    Ok(())
  }

  fn attach(&mut self) -> Result<(), TransportError> {
    if self.attached {
      return Err(TransportError::AlreadyAttached);
    }
    self.socket_mut()?.send(ATTACH_REQUEST).map_err(TransportError::Io)?;

    let mut buf = [0u8; 16];
    let deadline = Instant::now() + ATTACH_TIMEOUT;
    match self.recv_before(&mut buf, deadline).map_err(TransportError::Io)? {
      Some(len) if buf[..len].starts_with(b"OK") => {
        self.attached = true;
        Ok(())
      }
      Some(_) => Err(TransportError::Io(io::Error::new(io::ErrorKind::Other, "attach rejected by supplicant"))),
      None => Err(TransportError::Io(io::Error::new(io::ErrorKind::TimedOut, "attach timed out"))),
    }
  }

  fn detach(&mut self) {
    if !self.attached {
      return;
    }
    if let Some(socket) = self.socket.as_mut() {
      let _ = socket.send(DETACH_REQUEST);
    }
    self.attached = false;
  }

  fn receive(&mut self, buffer: &mut [u8]) -> Result<ReceiveOutcome, TransportError> {
    if self.socket.is_none() {
      return Err(TransportError::NotOpen);
    }
    let deadline = Instant::now() + self.read_timeout;
    match self.recv_before(buffer, deadline) {
      Ok(Some(len)) => Ok(ReceiveOutcome::Frame { len }),
      Ok(None) => Ok(ReceiveOutcome::Timeout),
      Err(e) if matches!(e.kind(), io::ErrorKind::ConnectionReset | io::ErrorKind::BrokenPipe | io::ErrorKind::NotConnected) => {
        warn!("control socket connection lost: {e}");
        Ok(ReceiveOutcome::Lost)
      }
      Err(e) => Err(TransportError::Io(e)),
    }
  }

  fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
    if request.len() > 4096 {
      return Err(TransportError::MessageTooLarge);
    }
    self.socket_mut()?.send(request).map_err(TransportError::Io)?;
    let mut buf = vec![0u8; 4096];
    let deadline = Instant::now() + self.read_timeout;
    let len = self
      .recv_before(&mut buf, deadline)
      .map_err(TransportError::Io)?
      .ok_or_else(|| TransportError::Io(io::Error::new(io::ErrorKind::TimedOut, "send response timed out")))?;
    buf.truncate(len);
    Ok(buf)
  }

  fn close(&mut self) {
    self.detach();
    if let Some(mut socket) = self.socket.take() {
      let _ = self.poll.registry().deregister(&mut socket);
    }
    if let Some(path) = self.local_path.take() {
      let _ = std::fs::remove_file(path);
    }
  }
}

impl Drop for ControlSocketTransport {
  fn drop(&mut self) {
    self.close();
  }
}

impl event::Source for ControlSocketTransport {
  fn register(&mut self, registry: &Registry, token: Token, interests: Interest) -> io::Result<()> {
    match self.socket.as_mut() {
      Some(socket) => socket.register(registry, token, interests),
      None => Err(io::Error::new(io::ErrorKind::NotConnected, "control socket not open")),
    }
  }

  fn reregister(&mut self, registry: &Registry, token: Token, interests: Interest) -> io::Result<()> {
    match self.socket.as_mut() {
      Some(socket) => socket.reregister(registry, token, interests),
      None => Err(io::Error::new(io::ErrorKind::NotConnected, "control socket not open")),
    }
  }

  fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
    match self.socket.as_mut() {
      Some(socket) => socket.deregister(registry),
      None => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn open_on_missing_path_fails_with_not_found() {
    let mut transport = ControlSocketTransport::new().unwrap();
    let err = transport.open("/nonexistent/path/to/wpa_ctrl_sock").unwrap_err();
    assert!(matches!(err, TransportError::NotFound { .. }));
  }

  #[test]
  fn receive_before_open_fails_with_not_open() {
    let mut transport = ControlSocketTransport::new().unwrap();
    let mut buf = [0u8; 64];
    assert!(matches!(transport.receive(&mut buf), Err(TransportError::NotOpen)));
  }

  #[test]
  fn attach_before_open_fails_with_not_open() {
    let mut transport = ControlSocketTransport::new().unwrap();
    assert!(matches!(transport.attach(), Err(TransportError::NotOpen)));
  }
}
