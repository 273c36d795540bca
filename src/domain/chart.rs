// Prepared chart data consumed by the charting primitive
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub padding_left: f64,
    pub padding_right: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
}

impl ChartLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn plot_width(&self) -> f64 {
        (self.width - self.padding_left - self.padding_right).max(0.0)
    }

    pub fn plot_height(&self) -> f64 {
        (self.height - self.padding_top - self.padding_bottom).max(0.0)
    }

    pub fn plot_bottom(&self) -> f64 {
        self.padding_top + self.plot_height()
    }
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 400.0,
            padding_left: 80.0,
            padding_right: 20.0,
            padding_top: 20.0,
            padding_bottom: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreparedChart {
    /// Nothing to plot; the message is drawn centred on the canvas.
    Placeholder { message: String, x: f64, y: f64 },
    Plot(ChartPlot),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPlot {
    pub domain: ValueDomain,
    pub y_ticks: Vec<AxisTick>,
    pub x_labels: Vec<AxisLabel>,
    pub points: Vec<PlotPoint>,
    pub dataset: ChartDataset,
}

/// Padded value range mapped onto the plot height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueDomain {
    pub min: f64,
    pub max: f64,
}

impl ValueDomain {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    pub index: usize,
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Line dataset in the shape charting libraries take directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub tooltips: Vec<String>,
}
