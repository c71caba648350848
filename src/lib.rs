//! Client library for driving Wi-Fi Direct (P2P) sessions over a local
//! `wpa_supplicant` control-interface socket.
//!
//! [`event`] parses the supplicant's line-oriented event protocol into a
//! typed [`event::EventRecord`]. [`session::Session`] owns the transport and
//! the listener table, drains inbound frames, and fans parsed events out to
//! synchronous listeners and to tasks parked on [`runtime`]'s cooperative
//! dispatcher. [`transport`] is the narrow contract the session needs from a
//! control-socket implementation, with [`transport::ControlSocketTransport`]
//! as the concrete Unix-domain-datagram implementation.
//!
//! See `DESIGN.md` for how each part of this crate is grounded against the
//! original implementation, and `SPEC_FULL.md` for the full behavioral
//! contract.

pub mod config;
pub mod error;
pub mod event;
pub mod path;
pub mod runtime;
pub mod session;
pub mod transport;

pub use config::SessionConfig;
pub use error::{SessionError, TaskError, TransportError};
pub use event::{EventPriority, EventRecord, MessageKind};
pub use session::{LogLevel, Session};
