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

//! Random noise backed by a seedable RNG.

use fatigue_core::NoiseSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform noise from a `StdRng` (Send-compatible).
#[derive(Debug, Clone)]
pub struct RandomNoise {
    rng: StdRng,
}

impl RandomNoise {
    /// Seeds from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a reproducible source (for demos and testing).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, OS-seeded otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }
}

impl Default for RandomNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSource for RandomNoise {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_stay_in_unit_interval() {
        let mut noise = RandomNoise::with_seed(7);
        for _ in 0..1_000 {
            let u = noise.next_unit();
            assert!((0.0..1.0).contains(&u));
            let n = noise.next_noise();
            assert!((-0.05..0.05).contains(&n));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomNoise::with_seed(42);
        let mut b = RandomNoise::with_seed(42);
        for _ in 0..16 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }
}
