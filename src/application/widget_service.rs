// Widget service - Use cases driven by feed pushes and user clicks
use crate::application::data_sources::{DataSources, LiveFeed};
use crate::application::error::WidgetError;
use crate::application::history_repository::HistoryRepository;
use crate::application::history_resolver::{RequeryTicket, Selection};
use crate::application::widget::{BiogasWidget, LiveBatchView, PanelView, StatusView, WidgetSettings};
use crate::domain::history::HistoricalSample;
use crate::domain::tag::TagDisplay;
use crate::domain::units::UnitRegistry;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct WidgetService {
    widget: Arc<Mutex<BiogasWidget>>,
    requery: Option<Arc<dyn HistoryRepository>>,
    requery_timeout: Duration,
}

impl WidgetService {
    pub fn new(
        settings: WidgetSettings,
        units: UnitRegistry,
        sources: DataSources,
        requery_timeout: Duration,
    ) -> Self {
        let widget = BiogasWidget::new(settings, units, &sources);
        Self {
            widget: Arc::new(Mutex::new(widget)),
            requery: sources.requery,
            requery_timeout,
        }
    }

    pub async fn push_live(&self, feed: &str, rows: &[Value]) -> Result<LiveBatchView, WidgetError> {
        let feed: LiveFeed = feed.parse()?;
        self.widget.lock().await.apply_live_batch(feed, rows)
    }

    pub async fn push_historical(&self, rows: &[Value]) -> Result<usize, WidgetError> {
        self.widget.lock().await.rebuild_history(rows)
    }

    pub async fn status(&self) -> StatusView {
        self.widget.lock().await.status()
    }

    pub async fn tags(&self) -> Vec<TagDisplay> {
        self.widget.lock().await.tag_displays()
    }

    /// Select a tag row. Returns the panel as it stands afterwards, or None when
    /// the tag has no current value.
    pub async fn select_tag(&self, tag: &str) -> Option<PanelView> {
        // The lock is released while a re-query is outstanding
        let selection = self.widget.lock().await.select(tag);

        if let Selection::NeedsRequery(ticket) = selection {
            // The task finishes the panel even if this caller goes away
            if let Err(e) = self.spawn_requery(ticket).await {
                tracing::error!("Re-query task for {} failed: {}", tag, e);
            }
        }

        self.widget.lock().await.panel_view(tag)
    }

    pub async fn panel(&self, tag: &str) -> Option<PanelView> {
        self.widget.lock().await.panel_view(tag)
    }

    pub async fn close_panel(&self, tag: &str) -> bool {
        self.widget.lock().await.close_panel(tag)
    }

    pub async fn teardown(&self) {
        let mut widget = self.widget.lock().await;
        if widget.is_attached() {
            widget.teardown();
        }
    }

    fn spawn_requery(&self, ticket: RequeryTicket) -> JoinHandle<()> {
        let widget = Arc::clone(&self.widget);
        let repository = self.requery.clone();
        let timeout = self.requery_timeout;

        tokio::spawn(async move {
            let outcome = requery(repository.as_deref(), &ticket, timeout).await;
            widget.lock().await.complete_requery(&ticket, outcome);
        })
    }
}

async fn requery(
    repository: Option<&dyn HistoryRepository>,
    ticket: &RequeryTicket,
    timeout: Duration,
) -> anyhow::Result<Vec<HistoricalSample>> {
    let Some(repository) = repository else {
        anyhow::bail!("re-query capability is not available");
    };

    tracing::debug!(
        "Re-querying {} from {} to {}",
        ticket.tag,
        ticket.start,
        ticket.end
    );

    match tokio::time::timeout(
        timeout,
        repository.query_range(&ticket.tag, ticket.start, ticket.end),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => anyhow::bail!("re-query timed out after {:?}", timeout),
    }
}
