// Repository trait for re-querying tag history on demand
use crate::domain::history::HistoricalSample;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Samples recorded for `tag` between `start` and `end`
    async fn query_range(
        &self,
        tag: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<HistoricalSample>>;
}
