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

//! Elapsed session time, counted in ticks.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Number of one-second ticks since the session started or was last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionClock(u64);

impl SessionClock {
    /// A clock at zero.
    pub fn new() -> Self {
        Self(0)
    }

    /// Advances by exactly one tick and returns the new count.
    pub fn tick(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    /// Returns to zero.
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Elapsed ticks, i.e. session time in seconds.
    pub fn ticks(&self) -> u64 {
        self.0
    }

    /// Whole minutes elapsed.
    pub fn minutes(&self) -> u64 {
        self.0 / 60
    }

    /// Seconds past the last whole minute.
    pub fn seconds(&self) -> u64 {
        self.0 % 60
    }

    /// Short duration summary, e.g. `"2m 5s"`.
    pub fn summary(&self) -> String {
        format!("{}m {}s", self.minutes(), self.seconds())
    }
}

impl From<u64> for SessionClock {
    fn from(ticks: u64) -> Self {
        Self(ticks)
    }
}

/// Formats as `MM:SS`; minutes keep growing past 99.
impl Display for SessionClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}
