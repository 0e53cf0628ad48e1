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

//! Interpretation rules applied to a snapshot by the dashboard.
//!
//! These are pure functions of a single [`MetricsSnapshot`]: the overall
//! fatigue band shown on the gauge, a per-metric severity derived from
//! warning/danger thresholds, a coarse trend arrow, and the sensor status
//! lights in the header.

use crate::metrics::{Metric, MetricsSnapshot};
use serde::Serialize;
use std::fmt::{self, Display};

/// Highest fatigue level still considered fresh.
pub const FRESH_MAX: u8 = 33;
/// Highest fatigue level still considered moderate.
pub const MODERATE_MAX: u8 = 66;
/// Fatigue threshold line drawn on the blink rate chart (blinks/min).
pub const BLINK_RATE_CHART_THRESHOLD: f64 = 25.0;
/// Fatigue threshold line drawn on the EAR chart.
pub const EAR_CHART_THRESHOLD: f64 = 0.22;

/// Overall fatigue band shown on the gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FatigueStatus {
    /// Level 0 to 33.
    Fresh,
    /// Level 34 to 66.
    Moderate,
    /// Level 67 and above.
    Fatigued,
}

impl FatigueStatus {
    /// Classifies a fatigue level.
    pub fn from_level(level: u8) -> Self {
        if level <= FRESH_MAX {
            FatigueStatus::Fresh
        } else if level <= MODERATE_MAX {
            FatigueStatus::Moderate
        } else {
            FatigueStatus::Fatigued
        }
    }

    /// Gauge label.
    pub fn label(self) -> &'static str {
        match self {
            FatigueStatus::Fresh => "FRESH",
            FatigueStatus::Moderate => "MODERATE",
            FatigueStatus::Fatigued => "FATIGUED",
        }
    }

    /// Coaching advice shown under the gauge.
    pub fn advisory(self) -> &'static str {
        match self {
            FatigueStatus::Fresh => "Athlete is well-rested and ready for training",
            FatigueStatus::Moderate => "Moderate fatigue detected - monitor closely",
            FatigueStatus::Fatigued => "High fatigue level - consider rest or reduced intensity",
        }
    }
}

impl Display for FatigueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Severity of a single metric. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    /// Within the expected range.
    Normal,
    /// Past the warning threshold.
    Warning,
    /// Past the danger threshold.
    Danger,
}

impl Display for MetricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetricStatus::Normal => "normal",
            MetricStatus::Warning => "warning",
            MetricStatus::Danger => "danger",
        };
        f.write_str(s)
    }
}

/// Warning and danger limits for one metric.
///
/// | Metric | Warning | Danger | Worse when |
/// |---|---|---|---|
/// | Blink rate | 22 | 28 | higher |
/// | EAR | 0.25 | 0.20 | lower |
/// | Speech rate | 3.5 | 3.0 | lower |
/// | Pitch | 140 | 120 | lower |
/// | PERCLOS | 0.15 | 0.25 | higher |
/// | Head stability | 0.8 | 0.7 | lower |
/// | Voice energy | -25 | -30 | lower |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Limit at which the metric becomes a warning.
    pub warning: f64,
    /// Limit at which the metric becomes dangerous.
    pub danger: f64,
    /// `true` if lower values are worse.
    pub inverse: bool,
}

impl Thresholds {
    /// Limits for a metric that gets worse as it rises.
    pub const fn rising(warning: f64, danger: f64) -> Self {
        Self {
            warning,
            danger,
            inverse: false,
        }
    }

    /// Limits for a metric that gets worse as it falls.
    pub const fn falling(warning: f64, danger: f64) -> Self {
        Self {
            warning,
            danger,
            inverse: true,
        }
    }

    /// The dashboard limits for `metric`.
    pub fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::BlinkRate => Self::rising(22.0, 28.0),
            Metric::Ear => Self::falling(0.25, 0.20),
            Metric::SpeechRate => Self::falling(3.5, 3.0),
            Metric::Pitch => Self::falling(140.0, 120.0),
            Metric::Perclos => Self::rising(0.15, 0.25),
            Metric::HeadStability => Self::falling(0.8, 0.7),
            Metric::VoiceEnergy => Self::falling(-25.0, -30.0),
        }
    }

    /// Classifies a value. Limits are inclusive.
    pub fn classify(&self, value: f64) -> MetricStatus {
        if self.inverse {
            if value <= self.danger {
                MetricStatus::Danger
            } else if value <= self.warning {
                MetricStatus::Warning
            } else {
                MetricStatus::Normal
            }
        } else if value >= self.danger {
            MetricStatus::Danger
        } else if value >= self.warning {
            MetricStatus::Warning
        } else {
            MetricStatus::Normal
        }
    }
}

/// Trend arrow on a metric card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricTrend {
    /// Rising toward fatigue.
    Up,
    /// Falling toward fatigue.
    Down,
    /// No notable movement.
    Stable,
}

impl MetricTrend {
    /// Derives the trend arrow from the current value alone.
    pub fn for_value(metric: Metric, value: f64) -> Self {
        match metric {
            Metric::BlinkRate if value > 20.0 => MetricTrend::Up,
            Metric::Ear if value < 0.28 => MetricTrend::Down,
            Metric::SpeechRate if value < 4.0 => MetricTrend::Down,
            _ => MetricTrend::Stable,
        }
    }
}

/// Header status light for an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    /// Source is producing data.
    Online,
    /// Source is idle.
    Offline,
}

/// Status lights for camera, audio and model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorReadout {
    /// Webcam feed.
    pub camera: SensorStatus,
    /// Microphone feed.
    pub audio: SensorStatus,
    /// Inference model; always loaded.
    pub model: SensorStatus,
}

impl SensorReadout {
    /// Camera and audio follow the session state; the model is always online.
    pub fn for_session(running: bool) -> Self {
        let feed = if running {
            SensorStatus::Online
        } else {
            SensorStatus::Offline
        };
        Self {
            camera: feed,
            audio: feed,
            model: SensorStatus::Online,
        }
    }
}

/// One metric card: value, severity and trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricReading {
    /// Which metric.
    pub metric: Metric,
    /// Current value.
    pub value: f64,
    /// Severity against the dashboard thresholds.
    pub status: MetricStatus,
    /// Trend arrow.
    pub trend: MetricTrend,
}

/// Full interpretation of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsAssessment {
    /// Gauge band.
    pub fatigue: FatigueStatus,
    /// One reading per metric, in dashboard order.
    pub readings: [MetricReading; 7],
}

impl MetricsAssessment {
    /// Assesses every metric of `snapshot`.
    pub fn of(snapshot: &MetricsSnapshot) -> Self {
        let readings = Metric::ALL.map(|metric| {
            let value = snapshot.value(metric);
            MetricReading {
                metric,
                value,
                status: Thresholds::for_metric(metric).classify(value),
                trend: MetricTrend::for_value(metric, value),
            }
        });
        Self {
            fatigue: FatigueStatus::from_level(snapshot.fatigue_level),
            readings,
        }
    }

    /// Reading for a single metric.
    pub fn reading(&self, metric: Metric) -> &MetricReading {
        // `readings` follows `Metric::ALL`, so the position always exists.
        let index = Metric::ALL
            .iter()
            .position(|m| *m == metric)
            .unwrap_or_default();
        &self.readings[index]
    }

    /// The most severe metric status.
    pub fn worst_status(&self) -> MetricStatus {
        self.readings
            .iter()
            .map(|r| r.status)
            .max()
            .unwrap_or(MetricStatus::Normal)
    }

    /// One line per metric that is not normal.
    pub fn alerts(&self) -> Vec<String> {
        self.readings
            .iter()
            .filter(|r| r.status != MetricStatus::Normal)
            .map(|r| format!("{}: {} ({})", r.metric.label(), r.status, r.value))
            .collect()
    }
}
