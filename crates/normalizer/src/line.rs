//! Tokenizer for pipeline log lines.
//!
//! A line looks like
//!
//! ```text
//! 2024-01-01 00:00:00: agent="web_researcher" task="find sources" status="started"
//! ```
//!
//! Values are quoted but never escaped, so they may hold quotes and newlines
//! of their own. A value ends at the first `"` followed either by whitespace
//! and the next `key=`, or by the end of the line.

/// `YYYY-MM-DD HH:MM:SS`
const TIMESTAMP_LEN: usize = 19;
const TIMESTAMP_SHAPE: &[u8; TIMESTAMP_LEN] = b"dddd-dd-dd dd:dd:dd";

/// One `key="value"` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogField {
    pub key: String,
    pub value: String,
}

/// A log line that matched the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: String,
    /// In line order; a repeated key keeps every occurrence.
    pub fields: Vec<LogField>,
}

impl LogEvent {
    /// Value of `key`; the last occurrence wins when a key repeats.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|field| field.key == key)
            .map(|field| field.value.as_str())
    }
}

/// Parse one raw line. `None` for anything that does not match the grammar
/// or carries no fields.
#[must_use]
pub fn parse_line(raw: &str) -> Option<LogEvent> {
    let line = raw.trim();
    let timestamp = line.get(..TIMESTAMP_LEN)?;
    if !is_timestamp(timestamp) {
        return None;
    }
    let rest = line[TIMESTAMP_LEN..].strip_prefix(':')?;

    let fields = scan_fields(rest.trim_start());
    if fields.is_empty() {
        return None;
    }

    Some(LogEvent {
        timestamp: timestamp.to_string(),
        fields,
    })
}

/// Parse every line, keeping input order and dropping the ones that do not match.
pub fn parse_lines<I, S>(lines: I) -> Vec<LogEvent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let line = line.as_ref();
            let event = parse_line(line);
            if event.is_none() {
                log::trace!("dropping unmatched log line: {line:?}");
            }
            event
        })
        .collect()
}

/// Split a raw log dump into entries, one per timestamped line.
///
/// Continuation lines stay with the entry above them. Entries are trimmed and
/// blank ones dropped; text before the first timestamp is kept as its own entry.
pub fn split_log_entries(blob: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();

    for line in blob.split_inclusive('\n') {
        if starts_entry(line) && !current.is_empty() {
            push_entry(&mut entries, &current);
            current.clear();
        }
        current.push_str(line);
    }
    push_entry(&mut entries, &current);

    entries
}

fn push_entry(entries: &mut Vec<String>, entry: &str) {
    let entry = entry.trim();
    if !entry.is_empty() {
        entries.push(entry.to_string());
    }
}

fn starts_entry(line: &str) -> bool {
    line.get(..TIMESTAMP_LEN).is_some_and(is_timestamp)
        && line.as_bytes().get(TIMESTAMP_LEN) == Some(&b':')
}

fn is_timestamp(candidate: &str) -> bool {
    candidate.len() == TIMESTAMP_LEN
        && candidate
            .bytes()
            .zip(TIMESTAMP_SHAPE)
            .all(|(byte, &slot)| match slot {
                b'd' => byte.is_ascii_digit(),
                separator => byte == separator,
            })
}

const fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

// Keys, quotes and `=` are ASCII, so every index used for slicing below sits
// on a char boundary even when values carry multi-byte text.
fn scan_fields(text: &str) -> Vec<LogField> {
    let bytes = text.as_bytes();
    let mut fields = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let at_word_start =
            is_word_byte(bytes[pos]) && (pos == 0 || !is_word_byte(bytes[pos - 1]));
        if !at_word_start {
            pos += 1;
            continue;
        }

        let key_end = pos + bytes[pos..].iter().take_while(|b| is_word_byte(**b)).count();
        if !text[key_end..].starts_with("=\"") {
            pos = key_end;
            continue;
        }

        let value_start = key_end + 2;
        match scan_quoted_value(&text[value_start..]) {
            Some(len) => {
                fields.push(LogField {
                    key: text[pos..key_end].to_string(),
                    value: text[value_start..value_start + len].to_string(),
                });
                pos = value_start + len + 1;
            }
            None => pos = key_end,
        }
    }

    fields
}

/// Length of a quoted value starting right after its opening `"`, or `None`
/// when no closing quote sits on a field boundary.
pub(crate) fn scan_quoted_value(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut search = 0;

    while let Some(offset) = bytes[search..].iter().position(|&b| b == b'"') {
        let quote = search + offset;
        if closes_field(&bytes[quote + 1..]) {
            return Some(quote);
        }
        search = quote + 1;
    }

    None
}

/// End of input, or whitespace then `key=`.
fn closes_field(after: &[u8]) -> bool {
    if after.is_empty() {
        return true;
    }
    let spaces = after.iter().take_while(|b| b.is_ascii_whitespace()).count();
    if spaces == 0 {
        return false;
    }
    let word = after[spaces..]
        .iter()
        .take_while(|b| is_word_byte(**b))
        .count();
    word > 0 && after.get(spaces + word) == Some(&b'=')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn field(key: &str, value: &str) -> LogField {
        LogField {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn parses_timestamp_and_fields() {
        let event = parse_line(
            r#"2024-01-01 00:00:00: agent="R" task="find" status="completed" output="done""#,
        )
        .expect("event");

        assert_eq!(event.timestamp, "2024-01-01 00:00:00");
        assert_eq!(
            event.fields,
            vec![
                field("agent", "R"),
                field("task", "find"),
                field("status", "completed"),
                field("output", "done"),
            ]
        );
    }

    #[test]
    fn values_keep_embedded_quotes_and_newlines() {
        let event = parse_line(
            "2024-01-01 00:00:00: agent=\"R\" output=\"He said \"hi\" there\nline two\" status=\"completed\"",
        )
        .expect("event");

        assert_eq!(event.field("output"), Some("He said \"hi\" there\nline two"));
        assert_eq!(event.field("status"), Some("completed"));
    }

    #[test]
    fn quote_before_key_like_text_without_equals_does_not_close() {
        let event =
            parse_line(r#"2024-01-01 00:00:00: task="say "hello world" now" agent="A""#).expect("event");
        assert_eq!(event.field("task"), Some(r#"say "hello world" now"#));
        assert_eq!(event.field("agent"), Some("A"));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let event = parse_line("  \n2024-01-01 00:00:00:agent=\"A\"  \n").expect("event");
        assert_eq!(event.fields, vec![field("agent", "A")]);
    }

    #[test]
    fn repeated_key_resolves_to_last_value() {
        let event =
            parse_line(r#"2024-01-01 00:00:00: agent="A" agent="B""#).expect("event");
        assert_eq!(event.fields.len(), 2);
        assert_eq!(event.field("agent"), Some("B"));
    }

    #[test]
    fn unterminated_value_is_skipped() {
        let event = parse_line(r#"2024-01-01 00:00:00: agent="A" note="open"x"#).expect("event");
        assert_eq!(event.fields, vec![field("agent", "A")]);
    }

    #[test]
    fn rejects_lines_outside_the_grammar() {
        for line in [
            "",
            "agent=\"A\"",
            "2024-1-01 00:00:00: agent=\"A\"",
            "2024-01-01T00:00:00: agent=\"A\"",
            "2024-01-01 00:00:00 agent=\"A\"",
            "2024-01-01 00:00:00: no fields here",
            "2024-01-01 00:00:00: agent=A",
            "[2024-01-01 00:00:00]: agent=\"A\"",
        ] {
            assert_eq!(parse_line(line), None, "line {line:?}");
        }
    }

    #[test]
    fn timestamp_is_pattern_checked_only() {
        let event = parse_line(r#"2024-13-45 99:99:99: agent="A""#).expect("event");
        assert_eq!(event.timestamp, "2024-13-45 99:99:99");
    }

    #[test]
    fn multibyte_values_are_sliced_safely() {
        let event =
            parse_line("2024-01-01 00:00:00: agent=\"ü\" task=\"поиск «новостей»\"").expect("event");
        assert_eq!(event.field("agent"), Some("ü"));
        assert_eq!(event.field("task"), Some("поиск «новостей»"));

        assert_eq!(parse_line("2024-01-01 00:00:0é: agent=\"A\""), None);
    }

    #[test]
    fn parse_lines_preserves_order() {
        let events = parse_lines([
            r#"2024-01-01 00:00:02: agent="B""#,
            "garbage",
            r#"2024-01-01 00:00:01: agent="A""#,
        ]);
        let agents: Vec<_> = events.iter().filter_map(|e| e.field("agent")).collect();
        assert_eq!(agents, vec!["B", "A"]);
    }

    #[test]
    fn splits_dump_on_timestamps() {
        let blob = "\n2024-01-01 00:00:00: agent=\"A\" output=\"line one\nline two\"\n\
                    2024-01-01 00:00:05: agent=\"B\" task=\"t\"\n\n";
        let entries = split_log_entries(blob);
        assert_eq!(
            entries,
            vec![
                "2024-01-01 00:00:00: agent=\"A\" output=\"line one\nline two\"".to_string(),
                "2024-01-01 00:00:05: agent=\"B\" task=\"t\"".to_string(),
            ]
        );
        assert_eq!(
            parse_line(&entries[0]).and_then(|e| e.field("output").map(str::to_string)),
            Some("line one\nline two".to_string())
        );
    }

    #[test]
    fn split_keeps_preamble_and_ignores_mid_line_timestamps() {
        let blob = "crew starting\n2024-01-01 00:00:00: agent=\"A\" task=\"see 2024-01-01 00:00:01: x\"";
        let entries = split_log_entries(blob);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], "crew starting");
        assert!(split_log_entries("  \n\n").is_empty());
    }

    proptest! {
        #[test]
        fn proptest_never_panics(line in "\\PC{0,80}") {
            let _ = parse_line(&line);
            let _ = split_log_entries(&line);
        }

        #[test]
        fn proptest_roundtrips_plain_values(
            agent in "[A-Za-z_]{1,12}",
            task in "[A-Za-z0-9 .,:!?]{0,40}",
        ) {
            let line = format!("2024-01-01 00:00:00: agent=\"{agent}\" task=\"{task}\"");
            let event = parse_line(&line).expect("event");
            prop_assert_eq!(event.field("agent"), Some(agent.as_str()));
            prop_assert_eq!(event.field("task"), Some(task.as_str()));
        }
    }
}
