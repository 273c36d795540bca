// History resolver - per-tag history panels and data-source precedence
use crate::application::historical_cache::HistoricalCache;
use crate::application::synthetic;
use crate::domain::history::{DailyAverage, HistoricalSample, HistoricalSeries, SeriesSource};
use crate::domain::locale::Locale;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::collections::HashMap;

const REQUERY_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Loading,
    Displayed {
        hourly: HistoricalSeries,
        source: SeriesSource,
    },
}

/// Expanded history for one tag. A collapsed panel keeps its data.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPanel {
    pub generation: u64,
    pub visible: bool,
    pub daily: Vec<DailyAverage>,
    pub state: PanelState,
}

/// Pending live re-query for a panel in the loading state.
#[derive(Debug, Clone, PartialEq)]
pub struct RequeryTicket {
    pub tag: String,
    pub generation: u64,
    pub seed: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// No usable current value; nothing happens.
    Ignored,
    /// Existing panel shown or hidden without fetching again.
    Toggled { visible: bool },
    /// New panel resolved from the cache or from simulation.
    Resolved(SeriesSource),
    /// New panel is loading; the caller runs the re-query and completes it.
    NeedsRequery(RequeryTicket),
}

/// Inputs for resolving a newly expanded panel.
pub struct ResolveContext<'a> {
    pub cache: &'a HistoricalCache,
    pub requery_available: bool,
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
    pub locale: Locale,
}

#[derive(Debug, Default)]
pub struct HistoryResolver {
    panels: HashMap<String, HistoryPanel>,
    next_generation: u64,
}

impl HistoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on a tag row.
    ///
    /// Precedence for the 24-hour series: cached real samples, then a live
    /// re-query when available, then simulation. The daily table is always simulated.
    pub fn select(&mut self, tag: &str, current: Option<f64>, ctx: &ResolveContext<'_>) -> Selection {
        let Some(seed) = current.filter(|v| !v.is_nan()) else {
            tracing::debug!("No current value for {}, ignoring selection", tag);
            return Selection::Ignored;
        };

        if let Some(panel) = self.panels.get_mut(tag) {
            panel.visible = !panel.visible;
            return Selection::Toggled {
                visible: panel.visible,
            };
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let mut rng = rand::thread_rng();
        let daily = synthetic::daily_averages(seed, ctx.today, ctx.locale, &mut rng);

        let cached = ctx.cache.get_series(tag).filter(|series| !series.is_empty());
        let (state, selection) = if let Some(series) = cached {
            tracing::info!("Using cached historian data for {}: {} points", tag, series.len());
            (
                PanelState::Displayed {
                    hourly: series.to_vec(),
                    source: SeriesSource::Real,
                },
                Selection::Resolved(SeriesSource::Real),
            )
        } else if ctx.requery_available {
            let ticket = RequeryTicket {
                tag: tag.to_string(),
                generation,
                seed,
                start: ctx.now - TimeDelta::hours(REQUERY_WINDOW_HOURS),
                end: ctx.now,
            };
            (PanelState::Loading, Selection::NeedsRequery(ticket))
        } else {
            tracing::info!("No historical data for {}, using simulated data", tag);
            (
                PanelState::Displayed {
                    hourly: synthetic::intraday_series(seed, ctx.now, &mut rng),
                    source: SeriesSource::Simulated,
                },
                Selection::Resolved(SeriesSource::Simulated),
            )
        };

        self.panels.insert(
            tag.to_string(),
            HistoryPanel {
                generation,
                visible: true,
                daily,
                state,
            },
        );
        selection
    }

    /// Apply the outcome of a re-query. Errors and empty results fall back to
    /// simulation. Returns false when the panel was torn down in the meantime.
    pub fn complete_requery(
        &mut self,
        ticket: &RequeryTicket,
        outcome: anyhow::Result<Vec<HistoricalSample>>,
    ) -> bool {
        let Some(panel) = self
            .panels
            .get_mut(&ticket.tag)
            .filter(|p| p.generation == ticket.generation && p.state == PanelState::Loading)
        else {
            tracing::debug!("Discarding late re-query result for {}", ticket.tag);
            return false;
        };

        let samples = match outcome {
            Ok(mut samples) => {
                samples.retain(|s| s.value.is_finite());
                samples.sort_by(|a, b| a.time.cmp(&b.time));
                samples
            }
            Err(e) => {
                tracing::warn!("Re-query for {} failed: {:#}", ticket.tag, e);
                Vec::new()
            }
        };

        panel.state = if samples.is_empty() {
            tracing::info!("No re-queried data for {}, using simulated data", ticket.tag);
            PanelState::Displayed {
                hourly: synthetic::intraday_series(ticket.seed, ticket.end, &mut rand::thread_rng()),
                source: SeriesSource::Simulated,
            }
        } else {
            tracing::info!("Using re-queried data for {}: {} points", ticket.tag, samples.len());
            PanelState::Displayed {
                hourly: samples,
                source: SeriesSource::Real,
            }
        };
        true
    }

    pub fn panel(&self, tag: &str) -> Option<&HistoryPanel> {
        self.panels.get(tag)
    }

    /// Tear down a panel; the next selection resolves from scratch.
    pub fn close(&mut self, tag: &str) -> bool {
        self.panels.remove(tag).is_some()
    }

    pub fn clear(&mut self) {
        self.panels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn ctx(cache: &HistoricalCache, requery_available: bool) -> ResolveContext<'_> {
        ResolveContext {
            cache,
            requery_available,
            now: now(),
            today: now().date_naive(),
            locale: Locale::Us,
        }
    }

    fn cache_with_five_samples(tag: &str) -> HistoricalCache {
        let rows: Vec<_> = (0..5)
            .map(|h| json!({"Name": tag, "Value": 10.0 + h as f64, "Timestamp": format!("2026-10-18T0{}:00:00Z", h)}))
            .collect();
        let mut cache = HistoricalCache::new();
        cache.rebuild_from_batch(&rows);
        cache
    }

    #[test]
    fn test_missing_value_is_ignored() {
        let cache = HistoricalCache::new();
        let mut resolver = HistoryResolver::new();

        assert_eq!(resolver.select("X", None, &ctx(&cache, true)), Selection::Ignored);
        assert_eq!(resolver.select("X", Some(f64::NAN), &ctx(&cache, true)), Selection::Ignored);
        assert!(resolver.panel("X").is_none());
    }

    #[test]
    fn test_cached_series_wins_over_requery() {
        let cache = cache_with_five_samples("X");
        let mut resolver = HistoryResolver::new();

        let selection = resolver.select("X", Some(12.0), &ctx(&cache, true));
        assert_eq!(selection, Selection::Resolved(SeriesSource::Real));

        let panel = resolver.panel("X").unwrap();
        match &panel.state {
            PanelState::Displayed { hourly, source } => {
                assert_eq!(hourly.len(), 5);
                assert_eq!(*source, SeriesSource::Real);
            }
            PanelState::Loading => panic!("expected displayed panel"),
        }
        assert_eq!(panel.daily.len(), 7);
    }

    #[test]
    fn test_simulated_without_cache_or_requery() {
        let cache = HistoricalCache::new();
        let mut resolver = HistoryResolver::new();

        let selection = resolver.select("X", Some(40.0), &ctx(&cache, false));
        assert_eq!(selection, Selection::Resolved(SeriesSource::Simulated));
        match &resolver.panel("X").unwrap().state {
            PanelState::Displayed { hourly, source } => {
                assert_eq!(hourly.len(), 25);
                assert_eq!(*source, SeriesSource::Simulated);
            }
            PanelState::Loading => panic!("expected displayed panel"),
        }
    }

    #[test]
    fn test_requery_ticket_covers_last_day() {
        let cache = HistoricalCache::new();
        let mut resolver = HistoryResolver::new();

        let Selection::NeedsRequery(ticket) = resolver.select("X", Some(1.0), &ctx(&cache, true)) else {
            panic!("expected a re-query");
        };
        assert_eq!(ticket.end, now());
        assert_eq!(ticket.end - ticket.start, TimeDelta::hours(24));
        assert_eq!(resolver.panel("X").unwrap().state, PanelState::Loading);
    }

    #[test]
    fn test_second_select_toggles_without_refetch() {
        let cache = HistoricalCache::new();
        let mut resolver = HistoryResolver::new();
        resolver.select("X", Some(3.0), &ctx(&cache, false));
        let before = resolver.panel("X").unwrap().clone();

        assert_eq!(
            resolver.select("X", Some(3.0), &ctx(&cache, false)),
            Selection::Toggled { visible: false }
        );
        assert_eq!(
            resolver.select("X", Some(3.0), &ctx(&cache, false)),
            Selection::Toggled { visible: true }
        );
        assert_eq!(resolver.panel("X").unwrap(), &before);
    }

    #[test]
    fn test_requery_success_is_real() {
        let cache = HistoricalCache::new();
        let mut resolver = HistoryResolver::new();
        let Selection::NeedsRequery(ticket) = resolver.select("X", Some(1.0), &ctx(&cache, true)) else {
            panic!("expected a re-query");
        };

        let samples = vec![
            HistoricalSample::new(now(), 2.0),
            HistoricalSample::new(now() - TimeDelta::hours(1), 1.0),
            HistoricalSample::new(now() - TimeDelta::hours(2), f64::NAN),
        ];
        assert!(resolver.complete_requery(&ticket, Ok(samples)));

        match &resolver.panel("X").unwrap().state {
            PanelState::Displayed { hourly, source } => {
                assert_eq!(*source, SeriesSource::Real);
                assert_eq!(hourly.iter().map(|s| s.value).collect::<Vec<_>>(), vec![1.0, 2.0]);
            }
            PanelState::Loading => panic!("expected displayed panel"),
        }
    }

    #[test]
    fn test_requery_failure_or_empty_falls_back_to_simulation() {
        let cache = HistoricalCache::new();
        for outcome in [Err(anyhow::anyhow!("timeout")), Ok(Vec::new())] {
            let mut resolver = HistoryResolver::new();
            let Selection::NeedsRequery(ticket) = resolver.select("X", Some(1.0), &ctx(&cache, true)) else {
                panic!("expected a re-query");
            };
            assert!(resolver.complete_requery(&ticket, outcome));
            match &resolver.panel("X").unwrap().state {
                PanelState::Displayed { hourly, source } => {
                    assert_eq!(*source, SeriesSource::Simulated);
                    assert_eq!(hourly.len(), 25);
                }
                PanelState::Loading => panic!("expected displayed panel"),
            }
        }
    }

    #[test]
    fn test_collapse_while_loading_still_applies_result() {
        let cache = HistoricalCache::new();
        let mut resolver = HistoryResolver::new();
        let Selection::NeedsRequery(ticket) = resolver.select("X", Some(1.0), &ctx(&cache, true)) else {
            panic!("expected a re-query");
        };
        assert_eq!(
            resolver.select("X", Some(1.0), &ctx(&cache, true)),
            Selection::Toggled { visible: false }
        );

        assert!(resolver.complete_requery(&ticket, Ok(vec![HistoricalSample::new(now(), 5.0)])));
        let panel = resolver.panel("X").unwrap();
        assert!(!panel.visible);
        assert!(matches!(panel.state, PanelState::Displayed { source: SeriesSource::Real, .. }));
    }

    #[test]
    fn test_late_result_after_teardown_is_discarded() {
        let cache = HistoricalCache::new();
        let mut resolver = HistoryResolver::new();
        let Selection::NeedsRequery(stale) = resolver.select("X", Some(1.0), &ctx(&cache, true)) else {
            panic!("expected a re-query");
        };
        assert!(resolver.close("X"));
        assert!(!resolver.complete_requery(&stale, Ok(vec![HistoricalSample::new(now(), 5.0)])));
        assert!(resolver.panel("X").is_none());

        // a fresh panel does not accept the old ticket either
        let Selection::NeedsRequery(fresh) = resolver.select("X", Some(1.0), &ctx(&cache, true)) else {
            panic!("expected a re-query");
        };
        assert!(!resolver.complete_requery(&stale, Ok(vec![HistoricalSample::new(now(), 5.0)])));
        assert_eq!(resolver.panel("X").unwrap().state, PanelState::Loading);
        assert!(resolver.complete_requery(&fresh, Err(anyhow::anyhow!("down"))));
    }
}
