// Locale selection, translation bundles and date/time formatting
use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    De,
    Us,
    Uk,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown locale `{0}`")]
pub struct UnknownLocale(pub String);

/// Label strings shown by the display for one locale.
#[derive(Debug)]
pub struct Translations {
    pub date_label: &'static str,
    pub avg_label: &'static str,
    pub chart_title: &'static str,
    pub simulated_suffix: &'static str,
    pub status: &'static str,
    pub updated: &'static str,
    pub tags: &'static str,
    pub connected: &'static str,
    pub disconnected: &'static str,
    pub generating: &'static str,
}

static GERMAN: Translations = Translations {
    date_label: "Datum",
    avg_label: "Ø",
    chart_title: "Letzte 24 Stunden",
    simulated_suffix: " (Simuliert)",
    status: "Status",
    updated: "Aktualisiert",
    tags: "Tags",
    connected: "Verbunden",
    disconnected: "Getrennt",
    generating: "Historische Daten werden generiert...",
};

static ENGLISH: Translations = Translations {
    date_label: "Date",
    avg_label: "Avg",
    chart_title: "Last 24 Hours",
    simulated_suffix: " (Simulated)",
    status: "Status",
    updated: "Updated",
    tags: "Tags",
    connected: "Connected",
    disconnected: "Disconnected",
    generating: "Generating historical data...",
};

impl Locale {
    /// Parse a configured locale code, falling back to German for anything unrecognised.
    pub fn parse_or_default(code: &str) -> Self {
        match code.parse() {
            Ok(locale) => locale,
            Err(e) => {
                tracing::warn!("{}, falling back to {}", e, Locale::default());
                Locale::default()
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::De => "DE",
            Locale::Us => "US",
            Locale::Uk => "UK",
        }
    }

    pub fn translations(&self) -> &'static Translations {
        match self {
            Locale::De => &GERMAN,
            Locale::Us | Locale::Uk => &ENGLISH,
        }
    }

    /// Short date as the plant operators read it, e.g. "18.10.2026" or "10/18/2026".
    pub fn format_date(&self, date: NaiveDate) -> String {
        let pattern = match self {
            Locale::De => "%-d.%-m.%Y",
            Locale::Us => "%-m/%-d/%Y",
            Locale::Uk => "%d/%m/%Y",
        };
        date.format(pattern).to_string()
    }

    pub fn format_time(&self, time: NaiveTime) -> String {
        let pattern = match self {
            Locale::De | Locale::Uk => "%H:%M:%S",
            Locale::Us => "%-I:%M:%S %p",
        };
        time.format(pattern).to_string()
    }
}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DE" => Ok(Locale::De),
            "US" => Ok(Locale::Us),
            "UK" | "GB" => Ok(Locale::Uk),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
