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

//! The fatigue model: how every metric follows from elapsed session time.
//!
//! Fatigue accumulates linearly from 20 to 80 over the first
//! [`SATURATION_TICKS`] ticks and then plateaus. Every other metric is an
//! affine function of the (unrounded) fatigue fraction plus its own noise
//! draw, clamped to a physiological floor or ceiling:
//!
//! | Metric | Formula | Clamp | Noise scale |
//! |---|---|---|---|
//! | Blink rate | baseline + f * 20 | >= 10 | 5 |
//! | EAR | baseline - f * 0.15 | >= 0.15 | 0.02 |
//! | Speech rate | 4.5 - f * 2 | >= 2.5 | 0.5 |
//! | Pitch | baseline - f * 40 | >= 100 | 10 |
//! | PERCLOS | 0.05 + f * 0.35 | <= 0.5 | 0.05 |
//! | Head stability | 0.95 - f * 0.4 | >= 0.5 | 0.05 |
//! | Voice energy | -15 - f * 15 | >= -35 | 3 |

use fatigue_core::{MetricsSnapshot, NoiseSource};

/// Ticks after which fatigue stops accumulating (five minutes).
pub const SATURATION_TICKS: u64 = 300;
/// Base fatigue at tick zero.
pub const BASE_FATIGUE_START: f64 = 20.0;
/// Base fatigue gained over the saturation window.
pub const BASE_FATIGUE_SPAN: f64 = 60.0;
/// Scale of the noise term applied to the fatigue level.
const FATIGUE_NOISE_SCALE: f64 = 20.0;

/// Per-athlete resting values the model drifts away from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// Resting blink rate (blinks/min).
    pub blink_rate: f64,
    /// Resting eye aspect ratio.
    pub ear: f64,
    /// Resting voice pitch (Hz).
    pub pitch: f64,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            blink_rate: 15.0,
            ear: 0.32,
            pitch: 165.0,
        }
    }
}

/// Generates snapshots from the session tick and a noise source.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FatigueModel {
    baseline: Baseline,
}

impl FatigueModel {
    /// Creates a model around the given baseline. The baseline is fixed for the model's lifetime.
    pub fn new(baseline: Baseline) -> Self {
        Self { baseline }
    }

    /// The resting values this model was created with.
    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    /// Fraction of the saturation window elapsed, capped at 1.
    pub fn time_factor(tick: u64) -> f64 {
        (tick as f64 / SATURATION_TICKS as f64).min(1.0)
    }

    /// Noise-free fatigue level at `tick`: 20 at the start, 80 once saturated.
    pub fn base_fatigue(tick: u64) -> f64 {
        BASE_FATIGUE_START + Self::time_factor(tick) * BASE_FATIGUE_SPAN
    }

    /// Produces the snapshot for `tick`, drawing one noise value per metric.
    ///
    /// Draw order is fixed: fatigue, blink rate, EAR, speech rate, pitch,
    /// PERCLOS, head stability, voice energy.
    pub fn generate(&self, tick: u64, noise: &mut dyn NoiseSource) -> MetricsSnapshot {
        let fatigue = (Self::base_fatigue(tick) + noise.next_noise() * FATIGUE_NOISE_SCALE)
            .clamp(0.0, 100.0);
        let f = fatigue / 100.0;

        let blink_rate = (self.baseline.blink_rate + f * 20.0 + noise.next_noise() * 5.0).max(10.0);
        let ear = (self.baseline.ear - f * 0.15 + noise.next_noise() * 0.02).max(0.15);
        let speech_rate = (4.5 - f * 2.0 + noise.next_noise() * 0.5).max(2.5);
        let pitch = (self.baseline.pitch - f * 40.0 + noise.next_noise() * 10.0).max(100.0);
        let perclos = (0.05 + f * 0.35 + noise.next_noise() * 0.05).min(0.5);
        let head_stability = (0.95 - f * 0.4 + noise.next_noise() * 0.05).max(0.5);
        let voice_energy = (-15.0 - f * 15.0 + noise.next_noise() * 3.0).max(-35.0);

        MetricsSnapshot {
            fatigue_level: round_half_up(fatigue, 0) as u8,
            blink_rate: round_half_up(blink_rate, 1),
            ear: round_half_up(ear, 2),
            speech_rate: round_half_up(speech_rate, 1),
            pitch: round_half_up(pitch, 0),
            perclos: round_half_up(perclos, 2),
            head_stability: round_half_up(head_stability, 2),
            voice_energy: round_half_up(voice_energy, 0),
        }
    }
}

/// Rounds to `decimals` places with ties toward positive infinity (-18.5 becomes -18).
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale + 0.5).floor() / scale
}
