//! Line parser: turns one null-terminated supplicant event line into an
//! [`EventRecord`]. Ported from `WpaEvent::ParseLine` /
//! `skipBalancedPair` (`original_source/lib/WpaEvent.cpp`), fixing the two
//! bugs the spec calls out (`GetNamedNumericParameter`'s accumulator, fixed
//! in `record.rs`) while keeping the tokenizer's actual scanning behavior.

use super::{message::MessageKind, priority::EventPriority, record::EventRecord};

/// Parses one supplicant control-interface line into `record`, overwriting
/// its previous contents.
///
/// Returns `true` on success — including the two documented no-op
/// successes: an empty line, and a line that was nothing but a bare `>`
/// prompt echo. Returns `false` (leaving `record` cleared) when the line,
/// after consuming any leading `>`, does not begin with `<`, or when the
/// priority digits are not terminated by `>`.
pub fn parse_line(line: &str, record: &mut EventRecord) -> bool {
  record.clear();

  let mut rest = line;
  if let Some(after_prompt) = rest.strip_prefix('>') {
    rest = after_prompt;
  }
  if rest.is_empty() {
    return true;
  }
  let Some(after_angle) = rest.strip_prefix('<') else {
    return false;
  };
  rest = after_angle;

  let digit_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
  if digit_end == 0 || rest.as_bytes().get(digit_end) != Some(&b'>') {
    return false;
  }
  let Ok(priority_value) = rest[..digit_end].parse::<u32>() else {
    return false;
  };
  let Some(priority) = EventPriority::from_u8(priority_value.min(u8::MAX as u32) as u8) else {
    return false;
  };
  record.priority = Some(priority);
  rest = &rest[digit_end + 1..];

  let kind_end = rest.find(' ').unwrap_or(rest.len());
  let kind_token = &rest[..kind_end];
  rest = &rest[kind_end..];

  record.kind = MessageKind::lookup(kind_token);
  if record.kind == MessageKind::Unknown {
    record.raw_kind.push_str(kind_token);
  }

  loop {
    rest = rest.trim_start_matches(' ');
    if rest.is_empty() {
      break;
    }

    if let Some((token, remainder)) = skip_balanced_pair(rest) {
      record.positional.push(token.to_string());
      rest = remainder;
      continue;
    }

    // Bareword, possibly `key=value`.
    let mut scan = rest;
    let mut equals_at = None;
    loop {
      match scan.as_bytes().first() {
        None | Some(b' ') => break,
        Some(b'=') if equals_at.is_none() => {
          equals_at = Some(rest.len() - scan.len());
          scan = &scan[1..];
          if let Some((_value_token, after_value)) = skip_balanced_pair(scan) {
            scan = after_value;
          } else {
            while let Some(&b) = scan.as_bytes().first() {
              if b == b' ' {
                break;
              }
              scan = &scan[1..];
            }
          }
          break;
        }
        _ => scan = &scan[1..],
      }
    }

    let consumed_end = rest.len() - scan.len();
    match equals_at {
      Some(eq) => {
        let key = &rest[..eq];
        let value = &rest[eq + 1..consumed_end];
        record.named.push((key.to_string(), value.to_string()));
      }
      None => {
        record.positional.push(rest[..consumed_end].to_string());
      }
    }
    rest = &rest[consumed_end..];
  }

  true
}

/// If `input` starts with a balanced-pair opener (`"`, `'`, `[`), consumes
/// through the matching terminator (or to end of string if unterminated) and
/// returns the consumed token (delimiters included) plus the remainder.
/// Returns `None` if `input` does not start with an opener.
fn skip_balanced_pair(input: &str) -> Option<(&str, &str)> {
  let opener = input.as_bytes().first().copied()?;
  let terminator = match opener {
    b'"' => b'"',
    b'\'' => b'\'',
    b'[' => b']',
    _ => return None,
  };
  let mut end = 1;
  let bytes = input.as_bytes();
  while end < bytes.len() && bytes[end] != terminator {
    end += 1;
  }
  if end < bytes.len() {
    end += 1; // include the terminator
  }
  Some((&input[..end], &input[end..]))
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  fn parse(line: &str) -> Option<EventRecord> {
    let mut record = EventRecord::default();
    if parse_line(line, &mut record) {
      Some(record)
    } else {
      None
    }
  }

  #[test]
  fn empty_line_succeeds_with_no_event() {
    let mut record = EventRecord::default();
    record.positional.push("leftover".into());
    assert!(parse_line("", &mut record));
    assert!(record.positional.is_empty());
    assert_eq!(record.priority, None);
  }

  #[test]
  fn leading_prompt_is_consumed_silently() {
    let record = parse(">").unwrap();
    assert_eq!(record.priority, None);
  }

  #[test_case("hello" ; "no angle bracket at all")]
  #[test_case("<>CTRL-EVENT-CONNECTED" ; "no priority digits")]
  #[test_case("<2CTRL-EVENT-CONNECTED" ; "priority not terminated by angle bracket")]
  fn malformed_lines_are_rejected(line: &str) {
    assert!(parse(line).is_none());
  }

  #[test]
  fn every_message_kind_round_trips_with_positional_params() {
    for &(kind, prefix) in MessageKind::KNOWN {
      let line = format!("<2>{prefix} a b c");
      let record = parse(&line).unwrap_or_else(|| panic!("failed to parse {line}"));
      assert_eq!(record.priority, Some(EventPriority::Info));
      assert_eq!(record.kind, kind);
      assert_eq!(record.positional, vec!["a", "b", "c"]);
      assert!(record.named.is_empty());
    }
  }

  #[test]
  fn unknown_kind_surfaces_raw_kind() {
    let record = parse("<2>CTRL-EVENT-NOVEL-THING alpha=1").unwrap();
    assert_eq!(record.kind, MessageKind::Unknown);
    assert_eq!(record.raw_kind, "CTRL-EVENT-NOVEL-THING");
    assert_eq!(record.get_named("alpha"), "1");
  }

  #[test]
  fn keyed_quoted_value_is_a_named_pair_with_delimiters_preserved() {
    // `subject=` followed directly by a balanced pair is `bareword "=" quoted`
    // per the parser's EBNF, so it lands in `named`, not `positional` --
    // matching WpaEvent::ParseLine's actual skipBalancedPair-after-'='
    // handling (see DESIGN.md).
    let record = parse("<2>CTRL-EVENT-EAP-PEER-CERT subject='/CN=foo bar'").unwrap();
    assert!(record.positional.is_empty());
    assert_eq!(record.get_named("subject"), "'/CN=foo bar'");
  }

  #[test]
  fn bare_quoted_token_is_positional_and_preserves_delimiters() {
    let record = parse("<2>CTRL-EVENT-EAP-PEER-CERT '/CN=foo bar'").unwrap();
    assert_eq!(record.positional, vec!["'/CN=foo bar'"]);
    assert!(record.named.is_empty());
  }

  #[test]
  fn named_pairs_extracted_with_mixed_positional() {
    let record =
      parse(r#"<2>P2P-DEVICE-FOUND 02:11:22:33:44:55 name="Foo" pri_dev_type=1-0050F204-1"#).unwrap();
    assert_eq!(record.positional, vec!["02:11:22:33:44:55"]);
    assert_eq!(record.get_named("name"), "\"Foo\"");
    assert_eq!(record.get_named("pri_dev_type"), "1-0050F204-1");
  }

  #[test]
  fn unterminated_balanced_pair_is_tolerated() {
    let record = parse(r#"<2>CTRL-EVENT-EAP-PEER-CERT subject="/CN=foo"#).unwrap();
    assert_eq!(record.positional, vec![r#""/CN=foo"#]);
  }

  #[test]
  fn bracketed_token_is_preserved_verbatim() {
    let record = parse("<1>CTRL-EVENT-STATE-CHANGE [foo bar]").unwrap();
    assert_eq!(record.positional, vec!["[foo bar]"]);
  }
}
