// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Text and JSON rendering of tick reports.

use fatigue_core::{
    FatigueStatus, Metric, MetricReading, MetricStatus, MetricTrend, MetricsAssessment,
    MetricsSnapshot, SensorReadout, SessionClock, ThresholdCrossings,
};
use fatigue_sim::TickReport;
use serde::Serialize;

/// One line of `--json` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonLine<'a> {
    /// Session time as `MM:SS`.
    pub session_time: String,
    /// Session time in seconds.
    pub tick: u64,
    /// The raw snapshot.
    pub metrics: &'a MetricsSnapshot,
    /// Gauge band.
    pub status: FatigueStatus,
    /// Per-metric readings.
    pub readings: &'a [MetricReading],
    /// Header status lights.
    pub sensors: SensorReadout,
    /// Retained chart points past the fatigue lines.
    pub chart_crossings: ThresholdCrossings,
}

/// Serializes a tick as a single JSON object.
pub fn render_json(
    report: &TickReport,
    crossings: ThresholdCrossings,
) -> serde_json::Result<String> {
    let assessment = MetricsAssessment::of(&report.snapshot);
    let line = JsonLine {
        session_time: SessionClock::from(report.tick).to_string(),
        tick: report.tick,
        metrics: &report.snapshot,
        status: assessment.fatigue,
        readings: &assessment.readings,
        sensors: SensorReadout::for_session(true),
        chart_crossings: crossings,
    };
    serde_json::to_string(&line)
}

/// Renders a tick as one human-readable line.
pub fn render_text(report: &TickReport, crossings: ThresholdCrossings) -> String {
    let assessment = MetricsAssessment::of(&report.snapshot);
    let cards = assessment
        .readings
        .iter()
        .map(format_reading)
        .collect::<Vec<_>>()
        .join("  ");
    format!(
        "[{}] fatigue {:>3}% {:<9} | {} | over line: blink {}/{} ear {}/{}",
        SessionClock::from(report.tick),
        report.snapshot.fatigue_level,
        assessment.fatigue.label(),
        cards,
        crossings.blink_rate,
        crossings.window,
        crossings.ear,
        crossings.window
    )
}

/// Formats a metric value with its unit, showing fractions as percentages.
pub fn format_value(metric: Metric, value: f64) -> String {
    if metric.is_fraction() {
        format!("{:.0}{}", value * 100.0, metric.unit())
    } else {
        format!("{}{}", value, metric.unit())
    }
}

fn format_reading(reading: &MetricReading) -> String {
    let marker = match reading.status {
        MetricStatus::Normal => "",
        MetricStatus::Warning => "!",
        MetricStatus::Danger => "!!",
    };
    let arrow = match reading.trend {
        MetricTrend::Up => "↑",
        MetricTrend::Down => "↓",
        MetricTrend::Stable => "",
    };
    format!(
        "{} {}{}{}",
        reading.metric.label(),
        format_value(reading.metric, reading.value),
        arrow,
        marker
    )
}
