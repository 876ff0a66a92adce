use crate::record::{sort_by_year_desc, Record};
use tracing::{debug, trace};

/// Parse comma-separated text with a header row into records sorted by year,
/// newest first.
///
/// The header row is split on plain commas. Data rows go through
/// [`split_fields`], so a quoted span may contain commas. Rows with fewer
/// fields than the header are skipped; extra trailing fields are ignored.
pub fn parse(text: &str) -> Vec<Record> {
    let mut lines = text.trim().split('\n').map(strip_cr);

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    let mut records: Vec<Record> = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in lines.enumerate() {
        let values = split_fields(line);
        if values.len() < headers.len() {
            trace!(
                line = idx + 2,
                fields = values.len(),
                expected = headers.len(),
                "skipping short row"
            );
            skipped += 1;
            continue;
        }

        records.push(
            headers
                .iter()
                .zip(values.iter())
                .map(|(header, value)| (*header, value.trim()))
                .collect(),
        );
    }

    debug!(records = records.len(), skipped, "parsed delimited text");

    sort_by_year_desc(&mut records);
    records
}

/// Split one data row into fields.
///
/// A double quote toggles quoted mode and is dropped; commas inside quotes
/// are kept. Escaped quotes are not supported.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.get("name").unwrap()).collect()
    }

    #[test]
    fn test_sorts_newest_first() {
        let records = parse("year,name\n2020,A\n2019,B\n2021,C\n");
        assert_eq!(names(&records), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_quoted_comma_is_preserved() {
        let records = parse("year,name\n2020,\"A, B\"\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name"), Some("A, B"));
    }

    #[test]
    fn test_short_row_is_dropped_not_padded() {
        let records = parse("year,name,place\n2020,A,Oslo\n2019,B\n");
        assert_eq!(records.len(), 1);
        assert_eq!(names(&records), vec!["A"]);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let records = parse("year,name\n2020,A,extra,more\n");
        assert_eq!(records[0].len(), 2);
        assert_eq!(records[0].get("name"), Some("A"));
    }

    #[test]
    fn test_header_only_or_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \n  ").is_empty());
        assert!(parse("year,name\n").is_empty());
    }

    #[test]
    fn test_headers_and_values_are_trimmed() {
        let records = parse(" year , course_name \n 2022 ,  Intro to Rust \n");
        assert_eq!(records[0].get("year"), Some("2022"));
        assert_eq!(records[0].get("course_name"), Some("Intro to Rust"));
    }

    #[test]
    fn test_ties_keep_source_order() {
        let records = parse("year,name\n2020,A\nsoon,B\n2020,C\n,D\n2021,E\n");
        assert_eq!(names(&records), vec!["E", "A", "C", "B", "D"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let records = parse("year,name\r\n2020,A\r\n2021,B\r\n");
        assert_eq!(names(&records), vec!["B", "A"]);
        assert_eq!(records[0].get("year"), Some("2021"));
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_fields("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
        assert_eq!(split_fields("a,"), vec!["a", ""]);
        assert_eq!(split_fields(""), vec![""]);
    }
}
