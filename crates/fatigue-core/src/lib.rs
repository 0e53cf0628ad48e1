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

//! # Fatigue Core
//!
//! Foundational crate containing the data types and contracts shared by the
//! fatigue simulator and its display adapters: the per-tick metrics snapshot,
//! the bounded chart history, the session clock, the noise source contract
//! and the dashboard assessment rules.

#![warn(missing_docs)]

pub mod assessment;
pub mod clock;
pub mod history;
pub mod metrics;
pub mod noise;

pub use assessment::{
    FatigueStatus, MetricReading, MetricStatus, MetricTrend, MetricsAssessment, SensorReadout,
    SensorStatus, Thresholds,
};
pub use clock::SessionClock;
pub use history::{
    ChartHistory, HistoryPoint, HistorySeries, RingBuffer, ThresholdCrossings, HISTORY_CAPACITY,
};
pub use metrics::{Metric, MetricsSnapshot};
pub use noise::{FixedNoise, NoiseSource};
