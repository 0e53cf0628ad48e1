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

//! Per-tick fatigue metrics and the identifiers used to address them.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// One of the signals derived from the fatigue level on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    /// Blinks per minute.
    BlinkRate,
    /// Eye aspect ratio.
    Ear,
    /// Syllables per second.
    SpeechRate,
    /// Fundamental voice frequency in Hz.
    Pitch,
    /// Fraction of time the eyes are closed.
    Perclos,
    /// Fraction of frames with a steady head pose.
    HeadStability,
    /// Voice energy in dB.
    VoiceEnergy,
}

impl Metric {
    /// Every metric, in dashboard order.
    pub const ALL: [Metric; 7] = [
        Metric::BlinkRate,
        Metric::Ear,
        Metric::SpeechRate,
        Metric::Pitch,
        Metric::Perclos,
        Metric::HeadStability,
        Metric::VoiceEnergy,
    ];

    /// Machine-friendly name (e.g. "blink_rate").
    pub fn name(self) -> &'static str {
        match self {
            Metric::BlinkRate => "blink_rate",
            Metric::Ear => "ear",
            Metric::SpeechRate => "speech_rate",
            Metric::Pitch => "pitch",
            Metric::Perclos => "perclos",
            Metric::HeadStability => "head_stability",
            Metric::VoiceEnergy => "voice_energy",
        }
    }

    /// Human-readable label as shown on the metric cards.
    pub fn label(self) -> &'static str {
        match self {
            Metric::BlinkRate => "Blink Rate",
            Metric::Ear => "EAR",
            Metric::SpeechRate => "Speech Rate",
            Metric::Pitch => "Pitch",
            Metric::Perclos => "PERCLOS",
            Metric::HeadStability => "Head Stability",
            Metric::VoiceEnergy => "Voice Energy",
        }
    }

    /// Display unit. Fractions (PERCLOS, head stability) are shown as percentages.
    pub fn unit(self) -> &'static str {
        match self {
            Metric::BlinkRate => "/min",
            Metric::Ear => "",
            Metric::SpeechRate => "/sec",
            Metric::Pitch => "Hz",
            Metric::Perclos | Metric::HeadStability => "%",
            Metric::VoiceEnergy => "dB",
        }
    }

    /// Returns `true` if the raw value is a fraction displayed as a percentage.
    pub fn is_fraction(self) -> bool {
        matches!(self, Metric::Perclos | Metric::HeadStability)
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An immutable record of every metric, produced once per tick.
///
/// All values are already rounded to their display precision: the fatigue
/// level, pitch and voice energy to whole numbers, blink and speech rate to
/// one decimal, and the three ratios to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Overall fatigue level, 0 to 100.
    pub fatigue_level: u8,
    /// Blinks per minute, at least 10.
    pub blink_rate: f64,
    /// Eye aspect ratio, at least 0.15.
    pub ear: f64,
    /// Syllables per second, at least 2.5.
    pub speech_rate: f64,
    /// Voice pitch in Hz, at least 100.
    pub pitch: f64,
    /// Percentage of eye closure as a fraction, at most 0.5.
    pub perclos: f64,
    /// Head stability as a fraction, at least 0.5.
    pub head_stability: f64,
    /// Voice energy in dB, at least -35.
    pub voice_energy: f64,
}

impl MetricsSnapshot {
    /// The snapshot shown before the first tick and after every reset.
    pub const BASELINE: MetricsSnapshot = MetricsSnapshot {
        fatigue_level: 22,
        blink_rate: 15.0,
        ear: 0.32,
        speech_rate: 4.5,
        pitch: 165.0,
        perclos: 0.08,
        head_stability: 0.92,
        voice_energy: -18.0,
    };

    /// Returns the value of a single metric.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::BlinkRate => self.blink_rate,
            Metric::Ear => self.ear,
            Metric::SpeechRate => self.speech_rate,
            Metric::Pitch => self.pitch,
            Metric::Perclos => self.perclos,
            Metric::HeadStability => self.head_stability,
            Metric::VoiceEnergy => self.voice_energy,
        }
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self::BASELINE
    }
}
