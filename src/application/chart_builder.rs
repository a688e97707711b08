// Chart config builder - merges aligned series with theme style tokens
use crate::domain::chart::{
    Axis, AxisKind, AxisLabel, AxisLine, AxisPointer, AxisTick, ChartOptions, ChartSpec, Grid,
    Legend, LineSeries, LineStyle, TextStyle, Tooltip,
};
use crate::domain::theme::ThemeVariables;
use crate::infrastructure::config::MetricSettings;

pub fn build_chart_options(
    spec: &ChartSpec,
    theme: &ThemeVariables,
    settings: &MetricSettings,
) -> ChartOptions {
    let text_style = || TextStyle {
        color: theme.text_color.clone(),
    };
    let axis_line = || AxisLine {
        line_style: LineStyle {
            color: theme.axis_line_color.clone(),
        },
    };

    let formatter = if settings.unit.is_empty() {
        "{a} - {b} : {c}".to_string()
    } else {
        format!("{{a}} - {{b}} : {{c}} {}", settings.unit)
    };

    let x_axis = Axis {
        kind: AxisKind::Category,
        data: Some(spec.timeline.clone()),
        axis_tick: Some(AxisTick {
            align_with_label: false,
        }),
        axis_line: axis_line(),
        split_line: None,
        axis_label: AxisLabel {
            text_style: text_style(),
        },
    };

    let y_axis = Axis {
        kind: AxisKind::Value,
        data: None,
        axis_tick: None,
        axis_line: axis_line(),
        split_line: Some(AxisLine {
            line_style: LineStyle {
                color: theme.split_line_color.clone(),
            },
        }),
        axis_label: AxisLabel {
            text_style: text_style(),
        },
    };

    let series = spec
        .series
        .iter()
        .map(|s| LineSeries {
            name: s.sensor_id.clone(),
            kind: "line".to_string(),
            data: s.values.clone(),
        })
        .collect();

    ChartOptions {
        title: settings.title.clone(),
        background_color: theme.background.clone(),
        color: theme.palette.clone(),
        tooltip: Tooltip {
            trigger: "item".to_string(),
            formatter,
            axis_pointer: AxisPointer {
                kind: "cross".to_string(),
            },
        },
        legend: Legend {
            left: "left".to_string(),
            data: spec.sensor_ids(),
            text_style: text_style(),
        },
        x_axis: vec![x_axis],
        y_axis: vec![y_axis],
        grid: Grid {
            left: "3%".to_string(),
            right: "4%".to_string(),
            bottom: "3%".to_string(),
            contain_label: true,
        },
        series,
    }
}
