// Chart domain models: aligned series and the rendered chart description
use super::reading::Metric;
use serde::Serialize;

/// One sensor's values aligned to a timeline. `None` marks a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub sensor_id: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(sensor_id: String, values: Vec<Option<f64>>) -> Self {
        Self { sensor_id, values }
    }
}

/// Aligned data for one metric, rebuilt on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub metric: Metric,
    pub timeline: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSpec {
    pub fn new(metric: Metric, timeline: Vec<String>, series: Vec<Series>) -> Self {
        Self {
            metric,
            timeline,
            series,
        }
    }

    pub fn sensor_ids(&self) -> Vec<String> {
        self.series.iter().map(|s| s.sensor_id.clone()).collect()
    }
}

// Rendered, ECharts-shaped description. Field names follow the charting library.

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub title: String,
    pub background_color: String,
    pub color: Vec<String>,
    pub tooltip: Tooltip,
    pub legend: Legend,
    pub x_axis: Vec<Axis>,
    pub y_axis: Vec<Axis>,
    pub grid: Grid,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub trigger: String,
    pub formatter: String,
    pub axis_pointer: AxisPointer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisPointer {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub left: String,
    pub data: Vec<String>,
    pub text_style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLine {
    pub line_style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLabel {
    pub text_style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTick {
    pub align_with_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    #[serde(rename = "type")]
    pub kind: AxisKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_tick: Option<AxisTick>,
    pub axis_line: AxisLine,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_line: Option<AxisLine>,
    pub axis_label: AxisLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Category,
    Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub left: String,
    pub right: String,
    pub bottom: String,
    pub contain_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<Option<f64>>,
}
