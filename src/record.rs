use serde::Serialize;
use std::collections::BTreeMap;

/// Field holding the lowercased bibliographic entry type
pub const TYPE_FIELD: &str = "type";
/// Field holding the citation key
pub const KEY_FIELD: &str = "key";
/// Field used for ordering collections
pub const YEAR_FIELD: &str = "year";

/// One parsed unit of site data: a teaching activity or a publication.
///
/// Records carry no fixed schema; the fields present depend on the source
/// file. Only `type`, `key` and `year` are load-bearing: publications always
/// have `type` and `key`, and every collection is ordered by `year`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a publication record from its entry type and citation key
    pub fn publication(entry_type: &str, key: &str) -> Self {
        let mut record = Self::new();
        record.insert(TYPE_FIELD, entry_type.to_lowercase());
        record.insert(KEY_FIELD, key);
        record
    }

    /// Set a field, replacing any earlier value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Field value, treating a blank string as absent
    pub fn get_nonempty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entry type (publications only)
    pub fn entry_type(&self) -> Option<&str> {
        self.get(TYPE_FIELD)
    }

    /// Citation key (publications only)
    pub fn key(&self) -> Option<&str> {
        self.get(KEY_FIELD)
    }

    /// Numeric year used for ordering; missing or non-numeric years are 0
    pub fn year(&self) -> i64 {
        self.get(YEAR_FIELD).map(parse_leading_int).unwrap_or(0)
    }

    /// Display title: `course_name` for teaching, `title` for publications
    pub fn title(&self) -> Option<&str> {
        self.get_nonempty("course_name")
            .or_else(|| self.get_nonempty("title"))
    }

    /// Publication venue: `journal`, falling back to `booktitle`
    pub fn venue(&self) -> Option<&str> {
        self.get_nonempty("journal")
            .or_else(|| self.get_nonempty("booktitle"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse a leading integer the way browsers' `parseInt` does: optional
/// leading whitespace and sign, then the longest run of ASCII digits.
/// No digits yields 0; a run too long for `i64` saturates.
pub fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }

    match (digits[..end].parse::<i64>(), negative) {
        (Ok(n), true) => -n,
        (Ok(n), false) => n,
        // Only overflow can fail on a non-empty digit run
        (Err(_), true) => i64::MIN,
        (Err(_), false) => i64::MAX,
    }
}

/// Collapse whitespace runs to a single space and trim both ends
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Order records newest first. `sort_by` is stable, so records sharing a
/// year keep their source order.
pub fn sort_by_year_desc(records: &mut [Record]) {
    records.sort_by(|a, b| b.year().cmp(&a.year()));
}
