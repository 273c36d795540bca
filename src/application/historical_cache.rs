// Historical cache - per-tag series from the latest historical batch
use crate::domain::history::{HistoricalSample, HistoricalSeries};
use crate::domain::rows::HistoricalRow;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct HistoricalCache {
    series: HashMap<String, HistoricalSeries>,
}

impl HistoricalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache with the series found in `rows`.
    ///
    /// Tags missing from this batch lose whatever history they had before;
    /// there is no per-tag merge. Returns the number of tags cached.
    pub fn rebuild_from_batch(&mut self, rows: &[Value]) -> usize {
        let mut rebuilt: HashMap<String, HistoricalSeries> = HashMap::new();

        for row in rows.iter().filter_map(HistoricalRow::from_json) {
            rebuilt.entry(row.name).or_default().push(row.sample);
        }

        for series in rebuilt.values_mut() {
            series.sort_by(|a, b| a.time.cmp(&b.time));
        }

        tracing::info!(
            "Historical cache built for {} tags from {} rows",
            rebuilt.len(),
            rows.len()
        );

        self.series = rebuilt;
        self.tag_count()
    }

    pub fn get_series(&self, tag: &str) -> Option<&[HistoricalSample]> {
        self.series.get(tag).map(Vec::as_slice)
    }

    pub fn tag_count(&self) -> usize {
        self.series.len()
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }
}
