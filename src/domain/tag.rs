// Tag domain model - current readings and their display form
use serde::Serialize;

/// Placeholder shown instead of a number when a reading is not finite.
pub const MISSING_VALUE: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quality {
    Good,
    Bad(String),
}

impl Quality {
    /// A missing or empty marker means the source did not flag the reading, so it is assumed good.
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            None | Some("") | Some("Good") | Some("good") => Quality::Good,
            Some(other) => Quality::Bad(other.to_string()),
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Quality::Bad(_))
    }

    /// The marker that flagged the reading offline, if any
    pub fn marker(&self) -> Option<&str> {
        match self {
            Quality::Good => None,
            Quality::Bad(marker) => Some(marker),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagState {
    pub value: f64,
    pub quality: Quality,
}

/// One row of the live table as handed to the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagDisplay {
    pub tag: String,
    pub value: String,
    pub unit: String,
    pub offline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

impl TagDisplay {
    pub fn new(tag: String, value: f64, unit: String, quality: &Quality) -> Self {
        Self {
            tag,
            value: format_value(value),
            unit,
            offline: quality.is_offline(),
            quality: quality.marker().map(str::to_string),
        }
    }

    /// Value and unit the way the cell renders them, e.g. "12.3%"
    pub fn text(&self) -> String {
        format!("{}{}", self.value, self.unit)
    }
}

/// Display form of a reading: one decimal place, or the placeholder when not finite.
pub fn format_value(value: f64) -> String {
    if value.is_finite() {
        to_fixed1(value)
    } else {
        MISSING_VALUE.to_string()
    }
}

/// Fixed one-decimal rendering. Exact halves round away from zero and negative zero prints as "0.0".
pub fn to_fixed1(value: f64) -> String {
    // Only odd multiples of 0.25 sit exactly between two one-decimal values.
    let quarters = value * 4.0;
    let rounded = if quarters.fract() == 0.0 && quarters.rem_euclid(2.0) == 1.0 {
        (value * 10.0).round() / 10.0
    } else {
        value
    };
    if rounded == 0.0 {
        return format!("{:.1}", 0.0);
    }
    format!("{:.1}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_rounds_to_one_decimal() {
        assert_eq!(format_value(12.34), "12.3");
        assert_eq!(format_value(12.36), "12.4");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(-3.0), "-3.0");
        assert_eq!(format_value(1013.0), "1013.0");
    }

    #[test]
    fn test_format_value_non_finite_is_placeholder() {
        assert_eq!(format_value(f64::NAN), "--");
        assert_eq!(format_value(f64::INFINITY), "--");
        assert_eq!(format_value(f64::NEG_INFINITY), "--");
    }

    #[test]
    fn test_exact_halves_round_away_from_zero() {
        assert_eq!(to_fixed1(0.25), "0.3");
        assert_eq!(to_fixed1(2.75), "2.8");
        assert_eq!(to_fixed1(-0.25), "-0.3");
        // 12.35 is stored just below the half, so it rounds down
        assert_eq!(to_fixed1(12.35), "12.3");
    }

    #[test]
    fn test_negative_zero_prints_unsigned() {
        assert_eq!(to_fixed1(-0.0), "0.0");
    }

    #[test]
    fn test_quality_markers() {
        assert_eq!(Quality::from_marker(None), Quality::Good);
        assert_eq!(Quality::from_marker(Some("")), Quality::Good);
        assert_eq!(Quality::from_marker(Some("Good")), Quality::Good);
        assert_eq!(Quality::from_marker(Some("good")), Quality::Good);
        assert!(Quality::from_marker(Some("Bad")).is_offline());
        assert!(Quality::from_marker(Some("Uncertain")).is_offline());
    }

    #[test]
    fn test_display_text_joins_value_and_unit() {
        let display = TagDisplay::new("T1".to_string(), 12.34, "%".to_string(), &Quality::Good);
        assert_eq!(display.text(), "12.3%");
        assert!(!display.offline);
        assert_eq!(display.quality, None);
    }

    #[test]
    fn test_offline_display_carries_marker() {
        let quality = Quality::from_marker(Some("Uncertain"));
        let display = TagDisplay::new("T1".to_string(), 1.0, "bar".to_string(), &quality);
        assert!(display.offline);
        assert_eq!(display.quality.as_deref(), Some("Uncertain"));
    }
}
