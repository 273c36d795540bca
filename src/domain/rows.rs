// Inbound row parsing for live and historical query batches
//
// Rows come from the host dashboard's query results and use either
// PascalCase or lowercase field names.
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use super::history::HistoricalSample;
use super::tag::Quality;

#[derive(Debug, Clone, PartialEq)]
pub struct LiveRow {
    pub name: String,
    pub value: f64,
    pub quality: Quality,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRow {
    pub name: String,
    pub sample: HistoricalSample,
}

impl LiveRow {
    /// Rows without a name or value are skipped. A value that is not numeric
    /// is kept as NaN so the row still counts as loaded.
    pub fn from_json(row: &Value) -> Option<Self> {
        let name = tag_name(row)?;
        let value = field(row, "Value", "value")?;
        let quality = match field(row, "Quality", "quality") {
            Some(Value::String(marker)) => Quality::from_marker(Some(marker.as_str())),
            Some(Value::Bool(false)) => Quality::Good,
            // Numeric status codes: 0 is the OPC UA "Good" code
            Some(Value::Number(code)) if code.as_f64() == Some(0.0) => Quality::Good,
            Some(other) => Quality::from_marker(Some(other.to_string().as_str())),
            None => Quality::Good,
        };

        Some(Self {
            name,
            value: parse_number(value),
            quality,
        })
    }
}

impl HistoricalRow {
    /// Rows missing a name, value or timestamp, or with a non-finite value, are discarded.
    pub fn from_json(row: &Value) -> Option<Self> {
        let name = tag_name(row)?;
        let value = parse_number(field(row, "Value", "value")?);
        if !value.is_finite() {
            return None;
        }
        let time = parse_timestamp(field(row, "Timestamp", "timestamp")?)?;

        Some(Self {
            name,
            sample: HistoricalSample::new(time, value),
        })
    }
}

fn tag_name(row: &Value) -> Option<String> {
    match field(row, "Name", "name")? {
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        _ => None,
    }
}

/// First non-null of the two spellings of a field
fn field<'a>(row: &'a Value, pascal: &str, lower: &str) -> Option<&'a Value> {
    [pascal, lower]
        .iter()
        .filter_map(|key| row.get(key))
        .find(|v| !v.is_null())
}

/// Numbers pass through; strings parse by their longest numeric prefix; anything else is NaN.
pub fn parse_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_prefix(s),
        _ => f64::NAN,
    }
}

/// Longest leading decimal literal, e.g. "12.5 bar" or "1e3 m³". Textual
/// spellings such as "inf" or "NaN" are not numbers here.
fn parse_float_prefix(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .take_while(|(i, c)| {
            c.is_ascii_digit()
                || matches!(c, '.' | 'e' | 'E')
                || (matches!(c, '-' | '+') && (*i == 0 || trimmed[..*i].ends_with(['e', 'E'])))
        })
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    // Shrink until the candidate parses; "1e" or "2.5e-" fall back to the mantissa
    (1..=end)
        .rev()
        .map(|len| &trimmed[..len])
        .filter(|candidate| candidate.bytes().any(|b| b.is_ascii_digit()))
        .find_map(|candidate| candidate.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Timestamps arrive as RFC 3339 strings, naive "YYYY-MM-DD HH:MM:SS" (read as UTC)
/// or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let millis = n.as_f64()?;
            if !millis.is_finite() {
                return None;
            }
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(time) = DateTime::parse_from_rfc3339(s) {
                return Some(time.with_timezone(&Utc));
            }
            ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|pattern| NaiveDateTime::parse_from_str(s, pattern).ok())
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}
