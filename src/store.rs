use crate::record::Record;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Entry types selected for display. Empty means no filtering.
pub type FilterSet = BTreeSet<String>;

/// Parsed records plus the active type filter.
///
/// Records never change after construction; the filter set is the only
/// mutable state. Everything shown to a reader (visible records, legend) is
/// recomputed from those two on request.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    filters: FilterSet,
}

/// One legend badge: a distinct entry type and how many records carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendItem {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub count: usize,
    pub active: bool,
}

/// Immutable view handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub legend: Vec<LegendItem>,
    /// Records before filtering
    pub total: usize,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            filters: FilterSet::new(),
        }
    }

    /// The full collection in its sorted order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records passing the current filter, in collection order
    pub fn visible_records(&self) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| self.is_visible(record))
            .collect()
    }

    fn is_visible(&self, record: &Record) -> bool {
        self.filters.is_empty()
            || record
                .entry_type()
                .is_some_and(|t| self.filters.contains(t))
    }

    /// Add `entry_type` to the filter if absent, remove it if present.
    /// Returns whether the type is selected afterwards.
    pub fn toggle_filter(&mut self, entry_type: &str) -> bool {
        let active = if self.filters.remove(entry_type) {
            false
        } else {
            self.filters.insert(entry_type.to_string());
            true
        };
        debug!(entry_type, active, filters = self.filters.len(), "toggled filter");
        active
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Distinct entry types in order of first appearance, with counts over
    /// the whole collection
    pub fn legend(&self) -> Vec<LegendItem> {
        let mut legend: Vec<LegendItem> = Vec::new();

        for entry_type in self.records.iter().filter_map(Record::entry_type) {
            match legend.iter_mut().find(|item| item.entry_type == entry_type) {
                Some(item) => item.count += 1,
                None => legend.push(LegendItem {
                    entry_type: entry_type.to_string(),
                    count: 1,
                    active: self.filters.contains(entry_type),
                }),
            }
        }

        legend
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            records: self.visible_records().into_iter().cloned().collect(),
            legend: self.legend(),
            total: self.records.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pub_record(entry_type: &str, key: &str) -> Record {
        Record::publication(entry_type, key)
    }

    fn sample_store() -> RecordStore {
        RecordStore::new(vec![
            pub_record("article", "a1"),
            pub_record("inproceedings", "c1"),
            pub_record("article", "a2"),
            pub_record("book", "b1"),
        ])
    }

    fn visible_keys(store: &RecordStore) -> Vec<&str> {
        store
            .visible_records()
            .into_iter()
            .map(|r| r.key().unwrap())
            .collect()
    }

    #[test]
    fn test_empty_filter_shows_everything() {
        let store = sample_store();
        let visible: Vec<Record> = store.visible_records().into_iter().cloned().collect();
        assert_eq!(visible, store.records());
    }

    #[test]
    fn test_filter_keeps_collection_order() {
        let mut store = sample_store();
        assert!(store.toggle_filter("book"));
        assert!(store.toggle_filter("article"));
        assert_eq!(visible_keys(&store), vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn test_double_toggle_restores_filters() {
        let mut store = sample_store();
        store.toggle_filter("book");
        let before = store.filters().clone();

        assert!(store.toggle_filter("article"));
        assert!(!store.toggle_filter("article"));

        assert_eq!(store.filters(), &before);
        assert_eq!(visible_keys(&store), vec!["b1"]);
    }

    #[test]
    fn test_unknown_type_filters_everything_out() {
        let mut store = sample_store();
        store.toggle_filter("patent");
        assert!(store.visible_records().is_empty());

        store.clear_filters();
        assert_eq!(store.visible_records().len(), 4);
    }

    #[test]
    fn test_records_without_type_hidden_only_when_filtering() {
        let mut store = RecordStore::new(vec![
            Record::from_iter([("course_name", "Compilers")]),
            pub_record("article", "a1"),
        ]);
        assert_eq!(store.visible_records().len(), 2);

        store.toggle_filter("article");
        assert_eq!(visible_keys(&store), vec!["a1"]);
    }

    #[test]
    fn test_legend_counts_and_active_flags() {
        let mut store = sample_store();
        store.toggle_filter("book");

        let legend = store.legend();
        let summary: Vec<_> = legend
            .iter()
            .map(|i| (i.entry_type.as_str(), i.count, i.active))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("article", 2, false),
                ("inproceedings", 1, false),
                ("book", 1, true),
            ]
        );
    }

    #[test]
    fn test_snapshot_reflects_filter() {
        let mut store = sample_store();
        store.toggle_filter("inproceedings");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.total, 4);
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].key(), Some("c1"));
        assert_eq!(snapshot.legend.len(), 3);
    }
}
