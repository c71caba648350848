use super::{message::MessageKind, priority::EventPriority};

/// One parsed supplicant event: a priority, a kind, and the ordered
/// positional/named parameters that followed the kind token on the line.
///
/// Positional order and named-parameter insertion order are both preserved;
/// duplicate named keys are kept rather than overwritten (first-wins on
/// lookup via [`EventRecord::get_named`]).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventRecord {
  pub priority: Option<EventPriority>,
  pub kind: MessageKind,
  /// Only populated when `kind == MessageKind::Unknown`: the literal
  /// on-wire token that did not match the known-kind table.
  pub raw_kind: String,
  pub positional: Vec<String>,
  pub named: Vec<(String, String)>,
}

impl EventRecord {
  pub(crate) fn clear(&mut self) {
    self.priority = None;
    self.kind = MessageKind::Unknown;
    self.raw_kind.clear();
    self.positional.clear();
    self.named.clear();
  }

  /// Returns the first value whose key equals `name`, or `""` if absent.
  /// Matches the original's `GetNamedParameter`: duplicate keys keep their
  /// first occurrence.
  pub fn get_named(&self, name: &str) -> &str {
    self
      .named
      .iter()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value.as_str())
      .unwrap_or("")
  }

  /// Parses a named parameter's value as a signed integer: optional leading
  /// `+`/`-`, then either decimal digits or `0x`/`0X` hex digits. An empty,
  /// missing, or malformed value returns `default`. Overflow saturates
  /// rather than silently substituting `default` (see DESIGN.md's Open
  /// Question resolution).
  pub fn get_named_numeric(&self, name: &str, default: i64) -> i64 {
    parse_numeric(self.get_named(name), default)
  }
}

fn parse_numeric(text: &str, default: i64) -> i64 {
  let mut chars = text.chars().peekable();
  let negative = match chars.peek() {
    Some('+') => {
      chars.next();
      false
    }
    Some('-') => {
      chars.next();
      true
    }
    _ => false,
  };

  let rest: String = chars.collect();
  if rest.is_empty() {
    return default;
  }

  let magnitude = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
      return default;
    }
    let mut value: i64 = 0;
    for b in hex.bytes() {
      let digit = (b as char).to_digit(16).expect("validated hex digit") as i64;
      value = value.saturating_mul(16).saturating_add(digit);
    }
    value
  } else {
    if !rest.bytes().all(|b| b.is_ascii_digit()) {
      return default;
    }
    let mut value: i64 = 0;
    for b in rest.bytes() {
      let digit = (b - b'0') as i64;
      value = value.saturating_mul(10).saturating_add(digit);
    }
    value
  };

  if negative {
    magnitude.saturating_neg()
  } else {
    magnitude
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  fn record_with_named(pairs: &[(&str, &str)]) -> EventRecord {
    let mut record = EventRecord::default();
    for (k, v) in pairs {
      record.named.push((k.to_string(), v.to_string()));
    }
    record
  }

  #[test]
  fn get_named_returns_empty_string_when_absent() {
    let record = EventRecord::default();
    assert_eq!(record.get_named("missing"), "");
  }

  #[test]
  fn get_named_is_first_wins_on_duplicates() {
    let record = record_with_named(&[("freq", "2412"), ("freq", "5180")]);
    assert_eq!(record.get_named("freq"), "2412");
  }

  #[test_case("0x2A", 42 ; "lowercase hex prefix")]
  #[test_case("0X2a", 42 ; "uppercase hex prefix lowercase digits")]
  #[test_case("-0x1", -1 ; "negative hex")]
  #[test_case("+0x10", 16 ; "explicit plus hex")]
  #[test_case("0x2G", -1 ; "invalid hex digit falls back to default")]
  #[test_case("42", 42 ; "plain decimal")]
  #[test_case("-7", -7 ; "negative decimal")]
  #[test_case("+7", 7 ; "explicit plus decimal")]
  #[test_case("", -1 ; "empty value falls back to default")]
  #[test_case("abc", -1 ; "non numeric falls back to default")]
  #[test_case("12abc", -1 ; "trailing garbage falls back to default")]
  fn numeric_parsing_matches_contract(value: &str, expected: i64) {
    let record = record_with_named(&[("flags", value)]);
    assert_eq!(record.get_named_numeric("flags", -1), expected);
  }

  #[test]
  fn accumulator_initializes_to_zero_unlike_the_original_bug() {
    // The original C++ GetNamedNumericParameter never initializes `val` and
    // never advances `p` in its decimal loop, so parsing "0" would read
    // garbage stack memory; this must not reproduce that.
    let record = record_with_named(&[("n", "0")]);
    assert_eq!(record.get_named_numeric("n", -1), 0);
  }

  #[test]
  fn overflow_saturates_rather_than_falling_back() {
    let record = record_with_named(&[("big", "99999999999999999999")]);
    assert_eq!(record.get_named_numeric("big", -1), i64::MAX);
  }
}
