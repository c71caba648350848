//! Ambient configuration knobs, serde-derived the way `rustdds`'s QoS policy
//! structs are (`security/config.rs`): a small `Default`-able value type
//! passed by reference into the session at open time rather than a builder.

use serde::{Deserialize, Serialize};

/// Tunables for [`crate::session::Session`] and its transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  /// Path to the supplicant's control-interface socket directory, e.g.
  /// `/var/run/wpa_supplicant/wlan0`.
  pub control_socket_path: String,

  /// Size of the receive buffer used for each `recv` on the control socket.
  /// The original implementation used a fixed 512-byte `char reply[512]`
  /// (`SessionManager.cpp:157`); kept as the default here, but configurable
  /// since some supplicant builds emit longer `P2P-DEVICE-FOUND` lines.
  pub read_buffer_size: usize,

  /// How long `Session::wait_for_message`/`wait_for_messages` block before
  /// giving up with [`crate::error::SessionError::TimedOut`], in
  /// milliseconds. `None` waits indefinitely.
  pub default_wait_timeout_ms: Option<u64>,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      control_socket_path: String::new(),
      read_buffer_size: 512,
      default_wait_timeout_ms: None,
    }
  }
}
