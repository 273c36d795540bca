// Data-source strategy resolved once at startup
use crate::application::error::WidgetError;
use crate::application::history_repository::HistoryRepository;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveFeed {
    Historian,
    OpcUa,
    Unconfigured,
}

impl LiveFeed {
    /// Historian takes precedence over OPC UA when both are configured.
    pub fn select(historian: bool, opcua: bool) -> Self {
        if historian {
            LiveFeed::Historian
        } else if opcua {
            LiveFeed::OpcUa
        } else {
            LiveFeed::Unconfigured
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LiveFeed::Historian => "historian",
            LiveFeed::OpcUa => "opcua",
            LiveFeed::Unconfigured => "none",
        }
    }
}

impl fmt::Display for LiveFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LiveFeed {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "historian" => Ok(LiveFeed::Historian),
            "opcua" | "opc-ua" => Ok(LiveFeed::OpcUa),
            _ => Err(WidgetError::UnknownFeed(s.to_string())),
        }
    }
}

/// Which collaborators this widget instance is wired to
#[derive(Clone)]
pub struct DataSources {
    pub live: LiveFeed,
    pub historical_feed: bool,
    pub requery: Option<Arc<dyn HistoryRepository>>,
}

impl DataSources {
    pub fn new(
        live: LiveFeed,
        historical_feed: bool,
        requery: Option<Arc<dyn HistoryRepository>>,
    ) -> Self {
        match live {
            LiveFeed::Unconfigured => tracing::warn!("No live data source configured"),
            feed => tracing::info!("Using {} for live data", feed),
        }
        if !historical_feed {
            tracing::info!("No historical data feed configured");
        }
        if requery.is_none() {
            tracing::info!("No re-query capability, missing history will be simulated");
        }

        Self {
            live,
            historical_feed,
            requery,
        }
    }
}
