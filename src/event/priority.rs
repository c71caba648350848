use std::fmt;

/// Severity of one parsed supplicant event, in the order the control
/// interface reports it: a smaller numeric prefix is noisier, a larger one
/// is more severe. See <https://w1.fi/wpa_supplicant/devel/ctrl_iface_page.html>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventPriority {
  MsgDump = 0,
  Debug = 1,
  Info = 2,
  Warning = 3,
  Error = 4,
}

impl EventPriority {
  /// Parses the numeric prefix the control interface puts between `<` and
  /// `>`. Returns `None` for any value outside the closed MsgDump..=Error
  /// range, per the parser's priority invariant.
  pub fn from_u8(value: u8) -> Option<Self> {
    match value {
      0 => Some(Self::MsgDump),
      1 => Some(Self::Debug),
      2 => Some(Self::Info),
      3 => Some(Self::Warning),
      4 => Some(Self::Error),
      _ => None,
    }
  }
}

impl fmt::Display for EventPriority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::MsgDump => "MSGDUMP",
      Self::Debug => "DEBUG",
      Self::Info => "INFO",
      Self::Warning => "WARNING",
      Self::Error => "ERROR",
    };
    f.write_str(s)
  }
}
