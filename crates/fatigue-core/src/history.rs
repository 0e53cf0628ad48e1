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

//! Bounded rolling history for the charted metrics.

use crate::assessment::{BLINK_RATE_CHART_THRESHOLD, EAR_CHART_THRESHOLD};
use crate::metrics::{Metric, MetricsSnapshot};
use serde::ser::{Serialize, Serializer};
use serde::Deserialize;

/// Number of points kept per charted metric (one minute at one tick per second).
pub const HISTORY_CAPACITY: usize = 60;

/// A single charted sample: the tick it was produced on and its value.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Session tick (seconds since start) the value belongs to.
    #[serde(rename = "time")]
    pub tick: u64,
    /// The metric value at that tick.
    pub value: f64,
}

impl HistoryPoint {
    /// Creates a new point.
    pub fn new(tick: u64, value: f64) -> Self {
        Self { tick, value }
    }
}

/// A fixed-size circular buffer. Pushing into a full buffer evicts the oldest value.
///
/// `N` must be non-zero.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    data: [T; N],
    index: usize,
    count: usize,
}

impl<T: Default + Copy, const N: usize> RingBuffer<T, N> {
    /// Creates a new, empty ring buffer.
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            index: 0,
            count: 0,
        }
    }

    /// Pushes a new value, returning the evicted oldest value if the buffer was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = (self.count == N).then(|| self.data[self.index]);
        self.data[self.index] = value;
        self.index = (self.index + 1) % N;
        if self.count < N {
            self.count += 1;
        }
        evicted
    }

    /// Returns the number of elements currently in the buffer.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if nothing has been pushed since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum number of elements the buffer holds.
    pub fn capacity(&self) -> usize {
        N
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        self.index = 0;
        self.count = 0;
    }

    /// Returns the most recently pushed value.
    pub fn latest(&self) -> Option<&T> {
        if self.count == 0 {
            return None;
        }
        Some(&self.data[(self.index + N - 1) % N])
    }

    /// Returns an iterator over the values in chronological order (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        // Until the buffer wraps, the oldest value sits at slot 0.
        let start = if self.count < N { 0 } else { self.index };
        let (left, right) = self.data.split_at(start);
        right.iter().chain(left.iter()).take(self.count)
    }

    /// Copies the values into a `Vec`, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }
}

impl<T: Default + Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + Copy + Serialize, const N: usize> Serialize for RingBuffer<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<const N: usize> RingBuffer<HistoryPoint, N> {
    /// Appends `(tick, value)`, evicting the oldest point past capacity.
    pub fn record(&mut self, tick: u64, value: f64) {
        if let Some(evicted) = self.push(HistoryPoint::new(tick, value)) {
            log::trace!("History evicted point from tick {}", evicted.tick);
        }
    }

    /// Counts the points strictly above `threshold`.
    pub fn points_above(&self, threshold: f64) -> usize {
        self.iter().filter(|p| p.value > threshold).count()
    }

    /// Counts the points strictly below `threshold`.
    pub fn points_below(&self, threshold: f64) -> usize {
        self.iter().filter(|p| p.value < threshold).count()
    }
}

/// The rolling series backing one chart.
pub type HistorySeries = RingBuffer<HistoryPoint, HISTORY_CAPACITY>;

/// Points in the retained history that sit past a chart's fatigue line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdCrossings {
    /// Blink rate points above [`BLINK_RATE_CHART_THRESHOLD`].
    pub blink_rate: usize,
    /// EAR points below [`EAR_CHART_THRESHOLD`].
    pub ear: usize,
    /// Points currently retained per series.
    pub window: usize,
}

/// History of the three charted metrics: blink rate, EAR and pitch.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartHistory {
    /// Blink rate series.
    pub blink_rate: HistorySeries,
    /// Eye aspect ratio series.
    pub ear: HistorySeries,
    /// Voice pitch series.
    pub pitch: HistorySeries,
}

impl ChartHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the charted values of `snapshot` at `tick`.
    pub fn record(&mut self, tick: u64, snapshot: &MetricsSnapshot) {
        self.blink_rate.record(tick, snapshot.blink_rate);
        self.ear.record(tick, snapshot.ear);
        self.pitch.record(tick, snapshot.pitch);
    }

    /// Empties all three series.
    pub fn clear(&mut self) {
        self.blink_rate.clear();
        self.ear.clear();
        self.pitch.clear();
    }

    /// Returns the series for a charted metric, or `None` for metrics that are not charted.
    pub fn series(&self, metric: Metric) -> Option<&HistorySeries> {
        match metric {
            Metric::BlinkRate => Some(&self.blink_rate),
            Metric::Ear => Some(&self.ear),
            Metric::Pitch => Some(&self.pitch),
            _ => None,
        }
    }

    /// Returns `true` if no series holds any point.
    pub fn is_empty(&self) -> bool {
        self.blink_rate.is_empty() && self.ear.is_empty() && self.pitch.is_empty()
    }

    /// Counts the retained points past the blink rate and EAR fatigue lines.
    pub fn threshold_crossings(&self) -> ThresholdCrossings {
        ThresholdCrossings {
            blink_rate: self.blink_rate.points_above(BLINK_RATE_CHART_THRESHOLD),
            ear: self.ear.points_below(EAR_CHART_THRESHOLD),
            window: self.blink_rate.len(),
        }
    }
}
