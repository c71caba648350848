//! Error taxonomy for the session client, standing in for the original
//! implementation's `P2pException` family
//! (`original_source/lib/p2psession/P2pException.h`).

use std::io;

use thiserror::Error;

/// Failures from the control-socket transport adapter.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("control socket path {path} does not exist")]
  NotFound { path: String },

  #[error("control socket I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("control socket is already attached")]
  AlreadyAttached,

  #[error("control socket is not open")]
  NotOpen,

  #[error("send buffer exceeds supplicant's control-interface limit")]
  MessageTooLarge,
}

/// Failures from session lifecycle and dispatch.
#[derive(Debug, Error)]
pub enum SessionError {
  #[error("session is already open")]
  AlreadyOpen,

  #[error("session is not open")]
  NotOpen,

  #[error(transparent)]
  Transport(#[from] TransportError),

  #[error("wait cancelled before a matching message arrived")]
  Cancelled,

  #[error("wait timed out before a matching message arrived")]
  TimedOut,
}

/// Failures surfaced by the cooperative task runtime.
#[derive(Debug, Error)]
pub enum TaskError {
  #[error("task was cancelled before completion")]
  Cancelled,

  #[error("task timed out before completion")]
  TimedOut,

  #[error("task panicked: {0}")]
  Faulted(String),
}
