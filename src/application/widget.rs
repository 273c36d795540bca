// Biogas display widget - owns all per-instance state
use crate::application::chart_preparer::prepare_chart;
use crate::application::data_sources::{DataSources, LiveFeed};
use crate::application::error::WidgetError;
use crate::application::historical_cache::HistoricalCache;
use crate::application::history_resolver::{
    HistoryResolver, PanelState, RequeryTicket, ResolveContext, Selection,
};
use crate::application::tag_store::TagStateStore;
use crate::domain::chart::{ChartLayout, PreparedChart};
use crate::domain::history::{HistoricalSample, SeriesSource};
use crate::domain::locale::Locale;
use crate::domain::tag::{TagDisplay, to_fixed1};
use crate::domain::units::UnitRegistry;
use chrono::{FixedOffset, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct WidgetSettings {
    pub locale: Locale,
    pub expected_tags: usize,
    pub layout: ChartLayout,
    pub display_offset: FixedOffset,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusLabels {
    pub status: &'static str,
    pub updated: &'static str,
    pub tags: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub loaded: usize,
    pub expected: usize,
    pub tag_count: String,
    pub connected: bool,
    pub status_text: &'static str,
    pub last_updated: Option<String>,
    pub labels: StatusLabels,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveBatchView {
    pub tags: Vec<TagDisplay>,
    pub status: StatusView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPhase {
    Loading,
    Displayed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRow {
    pub day: String,
    pub date: String,
    pub average: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTable {
    pub date_header: String,
    pub value_header: String,
    pub rows: Vec<DailyRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub tag: String,
    pub unit: String,
    pub visible: bool,
    pub phase: PanelPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loading_text: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<DailyTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SeriesSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<PreparedChart>,
}

pub struct BiogasWidget {
    settings: WidgetSettings,
    live_feed: LiveFeed,
    historical_feed: bool,
    requery_available: bool,
    attached: bool,
    store: TagStateStore,
    cache: HistoricalCache,
    resolver: HistoryResolver,
}

impl BiogasWidget {
    pub fn new(settings: WidgetSettings, units: UnitRegistry, sources: &DataSources) -> Self {
        tracing::info!(
            "Widget initialised: locale={}, {} units, live feed={}, historical feed={}, re-query={}",
            settings.locale,
            units.len(),
            sources.live,
            sources.historical_feed,
            sources.requery.is_some()
        );

        Self {
            settings,
            live_feed: sources.live,
            historical_feed: sources.historical_feed,
            requery_available: sources.requery.is_some(),
            attached: true,
            store: TagStateStore::new(units),
            cache: HistoricalCache::new(),
            resolver: HistoryResolver::new(),
        }
    }

    /// Live subscription callback. Batches from a feed this widget is not wired to are ignored.
    pub fn apply_live_batch(
        &mut self,
        feed: LiveFeed,
        rows: &[Value],
    ) -> Result<LiveBatchView, WidgetError> {
        if !self.attached {
            return Err(WidgetError::Detached);
        }
        if feed != self.live_feed {
            tracing::warn!(
                "Ignoring {} rows from {} (subscribed to {})",
                rows.len(),
                feed,
                self.live_feed
            );
            return Err(WidgetError::FeedNotSubscribed(feed));
        }

        let outcome = self.store.apply_live_batch(rows, Utc::now());
        tracing::debug!("Updated {} tags from {}", outcome.processed, feed);

        Ok(LiveBatchView {
            tags: outcome.displays,
            status: self.status(),
        })
    }

    /// Historical subscription callback. Returns the number of tags now cached.
    pub fn rebuild_history(&mut self, rows: &[Value]) -> Result<usize, WidgetError> {
        if !self.attached {
            return Err(WidgetError::Detached);
        }
        if !self.historical_feed {
            return Err(WidgetError::HistoricalFeedDisabled);
        }
        Ok(self.cache.rebuild_from_batch(rows))
    }

    pub fn status(&self) -> StatusView {
        let t = self.settings.locale.translations();
        let connection = self.store.connection();

        StatusView {
            loaded: connection.loaded,
            expected: self.settings.expected_tags,
            tag_count: format!("{}/{}", connection.loaded, self.settings.expected_tags),
            connected: connection.connected,
            status_text: if connection.connected {
                t.connected
            } else {
                t.disconnected
            },
            last_updated: self.store.last_updated().map(|ts| {
                let local = ts.with_timezone(&self.settings.display_offset);
                self.settings.locale.format_time(local.time())
            }),
            labels: StatusLabels {
                status: t.status,
                updated: t.updated,
                tags: t.tags,
            },
        }
    }

    pub fn tag_displays(&self) -> Vec<TagDisplay> {
        self.store.displays()
    }

    /// User clicked a tag row
    pub fn select(&mut self, tag: &str) -> Selection {
        let now = Utc::now();
        let ctx = ResolveContext {
            cache: &self.cache,
            requery_available: self.requery_available,
            now,
            today: now.with_timezone(&self.settings.display_offset).date_naive(),
            locale: self.settings.locale,
        };
        self.resolver.select(tag, self.store.current_value(tag), &ctx)
    }

    pub fn complete_requery(
        &mut self,
        ticket: &RequeryTicket,
        outcome: anyhow::Result<Vec<HistoricalSample>>,
    ) -> bool {
        self.resolver.complete_requery(ticket, outcome)
    }

    pub fn panel_view(&self, tag: &str) -> Option<PanelView> {
        let panel = self.resolver.panel(tag)?;
        let t = self.settings.locale.translations();
        let unit = self.store.unit_for(tag).to_string();

        let mut view = PanelView {
            tag: tag.to_string(),
            unit: unit.clone(),
            visible: panel.visible,
            phase: PanelPhase::Loading,
            loading_text: None,
            table: None,
            chart_title: None,
            source: None,
            chart: None,
        };

        match &panel.state {
            PanelState::Loading => {
                view.loading_text = Some(t.generating);
            }
            PanelState::Displayed { hourly, source } => {
                let suffix = match source {
                    SeriesSource::Real => "",
                    SeriesSource::Simulated => t.simulated_suffix,
                };
                view.phase = PanelPhase::Displayed;
                view.table = Some(DailyTable {
                    date_header: t.date_label.to_string(),
                    value_header: format!("{} {}", t.avg_label, unit),
                    rows: panel
                        .daily
                        .iter()
                        .map(|d| DailyRow {
                            day: d.date.to_string(),
                            date: d.label.clone(),
                            average: to_fixed1(d.average),
                        })
                        .collect(),
                });
                view.chart_title = Some(format!("{}{}", t.chart_title, suffix));
                view.source = Some(*source);
                view.chart = Some(prepare_chart(
                    hourly,
                    &unit,
                    &self.settings.layout,
                    &self.settings.display_offset,
                ));
            }
        }

        Some(view)
    }

    pub fn close_panel(&mut self, tag: &str) -> bool {
        self.resolver.close(tag)
    }

    /// Detach from the feeds and drop all cached state.
    pub fn teardown(&mut self) {
        self.attached = false;
        self.store.clear();
        self.cache.clear();
        self.resolver.clear();
        tracing::info!("Widget torn down");
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(locale: Locale) -> WidgetSettings {
        WidgetSettings {
            locale,
            expected_tags: 44,
            layout: ChartLayout::default(),
            display_offset: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn widget(locale: Locale, historical_feed: bool) -> BiogasWidget {
        let units = UnitRegistry::from_pairs([("T1".to_string(), "%".to_string())]);
        let sources = DataSources::new(LiveFeed::Historian, historical_feed, None);
        BiogasWidget::new(settings(locale), units, &sources)
    }

    #[test]
    fn test_status_before_any_batch() {
        let widget = widget(Locale::De, false);
        let status = widget.status();
        assert_eq!(status.tag_count, "0/44");
        assert!(!status.connected);
        assert_eq!(status.status_text, "Getrennt");
        assert!(status.last_updated.is_none());
    }

    #[test]
    fn test_live_batch_updates_status() {
        let mut widget = widget(Locale::Us, false);
        let view = widget
            .apply_live_batch(
                LiveFeed::Historian,
                &[json!({"Name": "T1", "Value": "12.34", "Quality": "Good"})],
            )
            .unwrap();

        assert_eq!(view.tags[0].text(), "12.3%");
        assert!(!view.tags[0].offline);
        assert_eq!(view.status.tag_count, "1/44");
        assert_eq!(view.status.status_text, "Connected");
        assert!(view.status.last_updated.is_some());
    }

    #[test]
    fn test_batch_from_other_feed_is_ignored() {
        let mut widget = widget(Locale::De, false);
        let result = widget.apply_live_batch(LiveFeed::OpcUa, &[json!({"Name": "T1", "Value": 1.0})]);
        assert!(matches!(result, Err(WidgetError::FeedNotSubscribed(LiveFeed::OpcUa))));
        assert!(widget.tag_displays().is_empty());
    }

    #[test]
    fn test_historical_batch_requires_feed() {
        let mut widget = widget(Locale::De, false);
        assert!(matches!(
            widget.rebuild_history(&[]),
            Err(WidgetError::HistoricalFeedDisabled)
        ));
    }

    #[test]
    fn test_select_unknown_tag_shows_nothing() {
        let mut widget = widget(Locale::De, true);
        assert_eq!(widget.select("T1"), Selection::Ignored);
        assert!(widget.panel_view("T1").is_none());
    }

    #[test]
    fn test_cached_history_panel() {
        let mut widget = widget(Locale::De, true);
        widget
            .apply_live_batch(LiveFeed::Historian, &[json!({"Name": "T1", "Value": 50.0})])
            .unwrap();
        widget
            .rebuild_history(&[
                json!({"Name": "T1", "Value": 48.0, "Timestamp": "2026-10-18T10:00:00Z"}),
                json!({"Name": "T1", "Value": 52.0, "Timestamp": "2026-10-18T11:30:00Z"}),
            ])
            .unwrap();

        assert_eq!(widget.select("T1"), Selection::Resolved(SeriesSource::Real));
        let view = widget.panel_view("T1").unwrap();
        assert!(view.visible);
        assert_eq!(view.phase, PanelPhase::Displayed);
        assert_eq!(view.chart_title.as_deref(), Some("Letzte 24 Stunden"));
        assert_eq!(view.source, Some(SeriesSource::Real));

        let table = view.table.unwrap();
        assert_eq!(table.date_header, "Datum");
        assert_eq!(table.value_header, "Ø %");
        assert_eq!(table.rows.len(), 7);

        match view.chart.unwrap() {
            PreparedChart::Plot(plot) => {
                assert_eq!(plot.dataset.labels, vec!["10:00".to_string(), "11:30".to_string()]);
            }
            PreparedChart::Placeholder { .. } => panic!("expected a plot"),
        }
    }

    #[test]
    fn test_simulated_panel_is_labelled() {
        let mut widget = widget(Locale::Uk, false);
        widget
            .apply_live_batch(LiveFeed::Historian, &[json!({"Name": "T1", "Value": 5.0})])
            .unwrap();

        assert_eq!(widget.select("T1"), Selection::Resolved(SeriesSource::Simulated));
        let view = widget.panel_view("T1").unwrap();
        assert_eq!(view.chart_title.as_deref(), Some("Last 24 Hours (Simulated)"));
        assert_eq!(view.source, Some(SeriesSource::Simulated));
    }

    #[test]
    fn test_teardown_detaches() {
        let mut widget = widget(Locale::De, true);
        widget
            .apply_live_batch(LiveFeed::Historian, &[json!({"Name": "T1", "Value": 5.0})])
            .unwrap();
        widget.select("T1");
        widget.teardown();

        assert!(!widget.is_attached());
        assert!(widget.panel_view("T1").is_none());
        assert!(matches!(
            widget.apply_live_batch(LiveFeed::Historian, &[]),
            Err(WidgetError::Detached)
        ));
        assert_eq!(widget.select("T1"), Selection::Ignored);
    }
}
