//! Text rendering of chart payloads.

use std::fmt::Write;

use convostat_core::{ChartData, Metric, Report, ViewKind};

/// Which axis labels stay visible on a crowded axis.
///
/// Hides every 2nd label, then every 3rd, then every 5th, counting from the
/// first one, so only indices coprime to 30 keep their label.
pub fn visible_ticks(len: usize) -> Vec<bool> {
    (0..len)
        .map(|i| i % 2 != 0 && i % 3 != 0 && i % 5 != 0)
        .collect()
}

/// Format one cell according to the view.
pub fn format_value(view: ViewKind, value: Option<f64>) -> String {
    match (view, value) {
        (_, None) => "—".to_string(),
        (ViewKind::Counts, Some(v)) => format!("{:.0}", v),
        (ViewKind::Share, Some(v)) => format!("{:.1}%", v * 100.0),
        (ViewKind::Difference, Some(v)) => format!("{:+.1}%", v),
    }
}

/// Chart heading, e.g. "Messages with Sam by week (share)".
pub fn chart_title(chart: &ChartData, name: Option<&str>) -> String {
    let metric = match chart.metric {
        Metric::Messages => "Messages",
        Metric::Words => "Words",
        Metric::Chars => "Characters",
    };
    let with = name.map(|n| format!(" with {}", n)).unwrap_or_default();
    format!(
        "{}{} by {} ({})",
        metric,
        with,
        chart.bucket.as_str(),
        chart.view.as_str()
    )
}

/// Render one chart as an aligned text table.
pub fn render_chart(chart: &ChartData, name: Option<&str>, thin_labels: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", chart_title(chart, name));
    let _ = writeln!(out, "{}", chart.metric.label());

    let label_width = chart
        .domain
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(chart.bucket.as_str().len()))
        .max()
        .unwrap_or(0);
    let column_widths: Vec<usize> = chart
        .series
        .iter()
        .map(|s| s.sender.chars().count().max(9))
        .collect();

    let _ = write!(out, "{:<width$}", chart.bucket.as_str(), width = label_width);
    for (series, width) in chart.series.iter().zip(&column_widths) {
        let _ = write!(out, "  {:>width$}", series.sender, width = *width);
    }
    out.push('\n');

    let visible = if thin_labels {
        visible_ticks(chart.domain.len())
    } else {
        vec![true; chart.domain.len()]
    };

    for (i, label) in chart.domain.iter().enumerate() {
        let shown = if visible[i] { label.as_str() } else { "" };
        let _ = write!(out, "{:<width$}", shown, width = label_width);
        for (series, width) in chart.series.iter().zip(&column_widths) {
            let cell = format_value(chart.view, series.values[i]);
            let _ = write!(out, "  {:>width$}", cell, width = *width);
        }
        out.push('\n');
    }

    out
}

/// Render the whole report: participants, skipped records, then each chart.
pub fn render_report(report: &Report, name: Option<&str>, thin_labels: bool) -> String {
    let mut out = String::new();
    let names: Vec<&str> = report.participants.iter().collect();
    let _ = writeln!(out, "People in this conversation: {}", names.join(", "));
    let _ = writeln!(
        out,
        "Messages analyzed: {} (time zone {})",
        report.record_count, report.timezone
    );
    if !report.issues.is_empty() {
        let _ = writeln!(out, "Skipped records: {}", report.issues.len());
    }

    for chart in &report.charts {
        out.push('\n');
        out.push_str(&render_chart(chart, name, thin_labels));
    }

    out
}
