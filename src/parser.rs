use crate::record::{normalize_whitespace, sort_by_year_desc, Record, KEY_FIELD, TYPE_FIELD};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// `<type>{<key>` on the first line of an entry
static ENTRY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+)\s*\{([^,}\r\n]*)").expect("entry header pattern is valid")
});

/// `<name> = {` opening a field value
static FIELD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s*=\s*\{").expect("field pattern is valid"));

/// Deepest brace nesting accepted inside a field value. `{A {B} C}` is fine,
/// `{A {B {C}} D}` is rejected.
const MAX_VALUE_NESTING: usize = 1;

/// Parse bibliography text into publication records sorted by year, newest
/// first.
///
/// The text is split on `@` and each chunk is parsed on its own; chunks
/// without a `<type>{<key>` header are dropped without affecting the rest.
pub fn parse(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for chunk in text.split('@').filter(|c| !c.trim().is_empty()) {
        match parse_entry(chunk) {
            Some(record) => records.push(record),
            None => {
                trace!(chunk = %first_line(chunk), "dropping chunk without entry header");
                dropped += 1;
            }
        }
    }

    debug!(entries = records.len(), dropped, "parsed bibliography");

    sort_by_year_desc(&mut records);
    records
}

/// Parse a single entry, the text following one `@`.
///
/// Returns `None` when the first line has no `<type>{<key>` header. Fields
/// that cannot be read are skipped; an entry with no fields at all is still
/// a valid record.
pub fn parse_entry(chunk: &str) -> Option<Record> {
    let caps = ENTRY_HEADER.captures(first_line(chunk))?;
    let entry_type = caps.get(1)?.as_str();
    let key = caps.get(2)?.as_str().trim();
    if key.is_empty() {
        return None;
    }

    let mut record = Record::publication(entry_type, key);
    let body_start = caps.get(0)?.end();

    for (name, value) in FieldScanner::new(chunk, body_start) {
        let name = name.to_lowercase();
        // The header's type and key stay authoritative
        if name == TYPE_FIELD || name == KEY_FIELD {
            trace!(key, field = %name, "ignoring field shadowing entry header");
            continue;
        }
        // Left-to-right scan, so later duplicates win
        record.insert(name, normalize_whitespace(value));
    }

    Some(record)
}

fn first_line(chunk: &str) -> &str {
    chunk.lines().next().unwrap_or("")
}

/// Iterates over `name = {value}` pairs in an entry body
struct FieldScanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> FieldScanner<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }
}

impl<'a> Iterator for FieldScanner<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let caps = FIELD_START.captures_at(self.text, self.pos)?;
            let name = caps.get(1)?.as_str();
            let value_start = caps.get(0)?.end();

            match scan_braced_value(&self.text[value_start..]) {
                BracedValue::Complete { value, consumed } => {
                    self.pos = value_start + consumed;
                    return Some((name, value));
                }
                BracedValue::TooDeep { consumed } => {
                    debug!(field = name, "skipping field nested deeper than one brace level");
                    self.pos = value_start + consumed;
                }
                BracedValue::Unterminated => {
                    debug!(field = name, "unterminated field value");
                    return None;
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BracedValue<'a> {
    /// Value text without the outer braces, and bytes consumed through the
    /// closing brace
    Complete { value: &'a str, consumed: usize },
    /// Balanced, but nested past `MAX_VALUE_NESTING`
    TooDeep { consumed: usize },
    Unterminated,
}

/// Scan a value whose opening brace has already been consumed
fn scan_braced_value(text: &str) -> BracedValue<'_> {
    let mut depth = 1usize;
    let mut deepest = 0usize;

    for (idx, c) in text.char_indices() {
        match c {
            '{' => {
                depth += 1;
                deepest = deepest.max(depth - 1);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let consumed = idx + 1;
                    return if deepest > MAX_VALUE_NESTING {
                        BracedValue::TooDeep { consumed }
                    } else {
                        BracedValue::Complete {
                            value: &text[..idx],
                            consumed,
                        }
                    };
                }
            }
            _ => {}
        }
    }

    BracedValue::Unterminated
}
