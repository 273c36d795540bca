// Tag state store - latest reading per tag and derived connection status
use crate::domain::rows::LiveRow;
use crate::domain::tag::{TagDisplay, TagState};
use crate::domain::units::UnitRegistry;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct LiveBatchOutcome {
    pub displays: Vec<TagDisplay>,
    pub processed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub loaded: usize,
    pub connected: bool,
}

#[derive(Debug, Clone)]
pub struct TagStateStore {
    units: UnitRegistry,
    tags: HashMap<String, TagState>,
    last_batch_count: usize,
    last_updated: Option<DateTime<Utc>>,
}

impl TagStateStore {
    pub fn new(units: UnitRegistry) -> Self {
        Self {
            units,
            tags: HashMap::new(),
            last_batch_count: 0,
            last_updated: None,
        }
    }

    /// Apply one live batch. Connection status reflects this batch only.
    pub fn apply_live_batch(&mut self, rows: &[Value], now: DateTime<Utc>) -> LiveBatchOutcome {
        let mut displays = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(row) = LiveRow::from_json(row) else {
                continue;
            };
            let unit = self.units.unit_for(&row.name).to_string();
            displays.push(TagDisplay::new(
                row.name.clone(),
                row.value,
                unit,
                &row.quality,
            ));
            self.tags.insert(
                row.name,
                TagState {
                    value: row.value,
                    quality: row.quality,
                },
            );
        }

        self.last_batch_count = displays.len();
        self.last_updated = Some(now);

        tracing::debug!(
            "Live batch: {} rows received, {} tags updated",
            rows.len(),
            displays.len()
        );

        LiveBatchOutcome {
            processed: displays.len(),
            displays,
        }
    }

    /// Current reading, if one was received and is a number.
    pub fn current_value(&self, tag: &str) -> Option<f64> {
        self.tags
            .get(tag)
            .map(|state| state.value)
            .filter(|v| !v.is_nan())
    }

    pub fn unit_for(&self, tag: &str) -> &str {
        self.units.unit_for(tag)
    }

    pub fn display(&self, tag: &str) -> Option<TagDisplay> {
        self.tags.get(tag).map(|state| {
            TagDisplay::new(
                tag.to_string(),
                state.value,
                self.unit_for(tag).to_string(),
                &state.quality,
            )
        })
    }

    /// Every known tag, sorted by name
    pub fn displays(&self) -> Vec<TagDisplay> {
        let mut names: Vec<&String> = self.tags.keys().collect();
        names.sort();
        names
            .into_iter()
            .filter_map(|name| self.display(name))
            .collect()
    }

    pub fn connection(&self) -> ConnectionStatus {
        ConnectionStatus {
            loaded: self.last_batch_count,
            connected: self.last_batch_count > 0,
        }
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Drop all readings, keeping the unit registry
    pub fn clear(&mut self) {
        self.tags.clear();
        self.last_batch_count = 0;
        self.last_updated = None;
    }
}
