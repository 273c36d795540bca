// Errors surfaced to callers of the widget
use crate::application::data_sources::LiveFeed;

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("unknown live feed `{0}`")]
    UnknownFeed(String),
    #[error("live feed `{0}` is not subscribed")]
    FeedNotSubscribed(LiveFeed),
    #[error("no historical feed is configured")]
    HistoricalFeedDisabled,
    #[error("widget has been torn down")]
    Detached,
}
