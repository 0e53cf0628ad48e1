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

//! Source of the uniform draws that perturb every metric.
//!
//! The simulator asks for one fresh draw per metric per tick. Production code
//! plugs in a seeded or OS-seeded RNG; tests plug in [`FixedNoise`] or a
//! closure to pin the noise term to exact values.

/// Peak-to-peak amplitude of the centred noise term.
pub const NOISE_AMPLITUDE: f64 = 0.1;

/// A provider of uniform random draws.
pub trait NoiseSource: Send {
    /// Returns a draw in `[0, 1]`.
    ///
    /// Random sources draw uniformly from `[0, 1)`. Fixed sources may pin
    /// either bound, so the noise term spans `[-0.05, 0.05]` inclusive.
    fn next_unit(&mut self) -> f64;

    /// Returns a centred noise term, `(U - 0.5) * 0.1`.
    fn next_noise(&mut self) -> f64 {
        (self.next_unit() - 0.5) * NOISE_AMPLITUDE
    }
}

impl<F> NoiseSource for F
where
    F: FnMut() -> f64 + Send,
{
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// A noise source that returns the same draw forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedNoise {
    unit: f64,
}

impl FixedNoise {
    /// Creates a source that always draws `unit`, clamped into `[0, 1]`.
    pub fn new(unit: f64) -> Self {
        Self {
            unit: unit.clamp(0.0, 1.0),
        }
    }

    /// A source whose centred noise term is exactly zero.
    pub fn neutral() -> Self {
        Self::new(0.5)
    }
}

impl NoiseSource for FixedNoise {
    fn next_unit(&mut self) -> f64 {
        self.unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_neutral_noise_is_zero() {
        let mut noise = FixedNoise::neutral();
        assert_eq!(noise.next_noise(), 0.0);
        assert_eq!(noise.next_noise(), 0.0);
    }

    #[test]
    fn test_noise_extremes() {
        assert_relative_eq!(FixedNoise::new(1.0).next_noise(), 0.05);
        assert_relative_eq!(FixedNoise::new(0.0).next_noise(), -0.05);
    }

    #[test]
    fn test_fixed_noise_clamps_input() {
        assert_eq!(FixedNoise::new(3.0).next_unit(), 1.0);
        assert_eq!(FixedNoise::new(-1.0).next_unit(), 0.0);
        assert_relative_eq!(FixedNoise::new(3.0).next_noise(), NOISE_AMPLITUDE / 2.0);
    }

    #[test]
    fn test_closure_as_noise_source() {
        let mut draws = [0.25, 0.75].into_iter().cycle();
        let mut source = move || draws.next().unwrap_or(0.5);
        assert_relative_eq!(source.next_noise(), -0.025);
        assert_relative_eq!(source.next_noise(), 0.025);
    }
}
