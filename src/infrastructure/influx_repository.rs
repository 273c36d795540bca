// InfluxDB repository implementation for on-demand history
use crate::application::history_repository::HistoryRepository;
use crate::domain::history::HistoricalSample;
use crate::domain::rows::{parse_number, parse_timestamp};
use crate::infrastructure::config::{prepare_query, RequerySettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
    query_template: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(settings: &RequerySettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            database: settings.database.clone(),
            retention_policy: settings.retention_policy.clone(),
            measurement: settings.measurement.clone(),
            query_template: settings.query.clone(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn build_range_query(&self, tag: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        let mut vars = HashMap::new();
        vars.insert("measurement".to_string(), self.measurement.clone());
        vars.insert("tag".to_string(), escape_literal(tag));
        vars.insert(
            "start".to_string(),
            start.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        vars.insert("end".to_string(), end.to_rfc3339_opts(SecondsFormat::Secs, true));
        prepare_query(&self.query_template, &vars)
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        // Check for errors in the response
        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }
}

#[async_trait]
impl HistoryRepository for InfluxRepository {
    async fn query_range(
        &self,
        tag: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HistoricalSample>> {
        let query = self.build_range_query(tag, start, end);
        tracing::debug!("Executing history query: {}", query);

        let response = self.execute_query(&query).await?;
        let samples = samples_from_response(&response);

        tracing::debug!("Found {} samples for {}", samples.len(), tag);
        Ok(samples)
    }
}

/// Collect (time, value) rows from every series, dropping anything unparseable
fn samples_from_response(response: &InfluxQLResponse) -> Vec<HistoricalSample> {
    let mut samples = Vec::new();
    let Some(series) = response.results.first().and_then(|r| r.series.as_ref()) else {
        return samples;
    };

    for s in series {
        let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);
        let value_idx = s
            .columns
            .iter()
            .position(|c| c == "value" || c == "mean" || c == "last")
            .unwrap_or(1);

        for row in &s.values {
            let (Some(time), Some(value)) = (row.get(time_idx), row.get(value_idx)) else {
                continue;
            };
            let value = parse_number(value);
            if !value.is_finite() {
                continue;
            }
            if let Some(time) = parse_timestamp(time) {
                samples.push(HistoricalSample::new(time, value));
            }
        }
    }

    samples.sort_by(|a, b| a.time.cmp(&b.time));
    samples
}

/// Escape a value for use inside a single-quoted InfluxQL string
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
