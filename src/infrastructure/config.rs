use crate::application::data_sources::LiveFeed;
use crate::application::widget::WidgetSettings;
use crate::domain::chart::ChartLayout;
use crate::domain::locale::Locale;
use crate::domain::units::UnitRegistry;
use chrono::FixedOffset;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_REQUERY_QUERY: &str = "SELECT \"value\" FROM \"${measurement}\" WHERE \"name\" = '${tag}' AND time >= '${start}' AND time <= '${end}' ORDER BY time ASC";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_expected_tags")]
    pub expected_tags: usize,
    /// Offset used for time labels; the host's local offset when unset
    #[serde(default)]
    pub display_utc_offset_minutes: Option<i32>,
    #[serde(default)]
    pub live: LiveSettings,
    #[serde(default)]
    pub historical_feed: bool,
    #[serde(default)]
    pub requery: Option<RequerySettings>,
    #[serde(default)]
    pub chart: ChartSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub units: Vec<UnitOverride>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LiveSettings {
    #[serde(default)]
    pub historian: bool,
    #[serde(default)]
    pub opcua: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RequerySettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    #[serde(default = "default_requery_query")]
    pub query: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    #[serde(default = "default_chart_width")]
    pub width: f64,
    #[serde(default = "default_chart_height")]
    pub height: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UnitOverride {
    pub tag: String,
    pub unit: String,
}

fn default_locale() -> String {
    "DE".to_string()
}

fn default_expected_tags() -> usize {
    44
}

fn default_measurement() -> String {
    "tags".to_string()
}

fn default_requery_query() -> String {
    DEFAULT_REQUERY_QUERY.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_chart_width() -> f64 {
    1400.0
}

fn default_chart_height() -> f64 {
    400.0
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl AppConfig {
    pub fn widget_settings(&self) -> WidgetSettings {
        let display_offset = self
            .display_utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(|| *chrono::Local::now().offset());

        WidgetSettings {
            locale: Locale::parse_or_default(&self.locale),
            expected_tags: self.expected_tags,
            layout: ChartLayout::new(self.chart.width, self.chart.height),
            display_offset,
        }
    }

    pub fn unit_registry(&self) -> UnitRegistry {
        let mut registry = UnitRegistry::plant_default();
        registry.extend(self.units.iter().map(|u| (u.tag.clone(), u.unit.clone())));
        registry
    }

    pub fn live_feed(&self) -> LiveFeed {
        LiveFeed::select(self.live.historian, self.live.opcua)
    }

    pub fn requery_timeout(&self) -> Duration {
        Duration::from_secs(
            self.requery
                .as_ref()
                .map(|r| r.timeout_secs)
                .unwrap_or_else(default_timeout_secs),
        )
    }
}

/// Load `config/widget.toml` (optional) with `BIOGAS__` environment overrides
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/widget").required(false))
        .add_source(
            config::Environment::with_prefix("BIOGAS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
pub fn parse_app_config(toml: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${name}` template variables in a query string.
///
/// The template is scanned once, so substituted values are never expanded
/// again. Unknown placeholders are left as written.
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(query.len());
    let mut rest = query;

    while let Some(open) = rest.find("${") {
        result.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match vars.get(key) {
                    Some(value) => result.push_str(value),
                    None => result.push_str(&rest[open..open + 2 + close + 1]),
                }
                rest = &after[close + 1..];
            }
            None => {
                result.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("measurement".to_string(), "tags".to_string());
        vars.insert("tag".to_string(), "STAT6.141PME_C01_SCALE.F_CV".to_string());

        let query = "SELECT \"value\" FROM \"${measurement}\" WHERE \"name\" = '${tag}'";
        let result = prepare_query(query, &vars);

        assert_eq!(
            result,
            "SELECT \"value\" FROM \"tags\" WHERE \"name\" = 'STAT6.141PME_C01_SCALE.F_CV'"
        );
    }

    #[test]
    fn test_prepare_query_does_not_expand_substituted_values() {
        let mut vars = HashMap::new();
        vars.insert("tag".to_string(), "odd${end}name".to_string());
        vars.insert("end".to_string(), "2026-10-18T12:00:00Z".to_string());

        for _ in 0..16 {
            let result = prepare_query("'${tag}' <= '${end}' ${missing} ${", &vars);
            assert_eq!(result, "'odd${end}name' <= '2026-10-18T12:00:00Z' ${missing} ${");
        }
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let config = parse_app_config("").unwrap();
        assert_eq!(config.locale, "DE");
        assert_eq!(config.expected_tags, 44);
        assert_eq!(config.live_feed(), LiveFeed::Unconfigured);
        assert!(!config.historical_feed);
        assert!(config.requery.is_none());
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.requery_timeout(), Duration::from_secs(10));

        let settings = config.widget_settings();
        assert_eq!(settings.locale, Locale::De);
        assert_eq!(settings.layout, ChartLayout::default());
    }

    #[test]
    fn test_full_config() {
        let config = parse_app_config(
            r#"
            locale = "US"
            expected_tags = 40
            display_utc_offset_minutes = 120
            historical_feed = true

            [live]
            historian = false
            opcua = true

            [requery]
            host = "http://influx:8086/"
            token = "secret"
            database = "plant"
            retention_policy = "autogen"
            timeout_secs = 3

            [chart]
            width = 800.0
            height = 300.0

            [[units]]
            tag = "STAT6.111LME_A01_SCALE.F_CV"
            unit = "m"
            "#,
        )
        .unwrap();

        assert_eq!(config.live_feed(), LiveFeed::OpcUa);
        assert!(config.historical_feed);
        let requery = config.requery.as_ref().unwrap();
        assert_eq!(requery.measurement, "tags");
        assert_eq!(requery.query, DEFAULT_REQUERY_QUERY);
        assert_eq!(config.requery_timeout(), Duration::from_secs(3));

        let settings = config.widget_settings();
        assert_eq!(settings.locale, Locale::Us);
        assert_eq!(settings.expected_tags, 40);
        assert_eq!(settings.display_offset, FixedOffset::east_opt(7200).unwrap());
        assert_eq!(settings.layout.width, 800.0);

        assert_eq!(config.unit_registry().unit_for("STAT6.111LME_A01_SCALE.F_CV"), "m");
    }

    #[test]
    fn test_unknown_locale_falls_back() {
        let config = parse_app_config("locale = \"FR\"").unwrap();
        assert_eq!(config.widget_settings().locale, Locale::De);
    }
}
