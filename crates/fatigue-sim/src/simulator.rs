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

//! The fatigue metrics simulator.
//!
//! A two-state machine (`Stopped`, `Running`) that owns the session clock,
//! the latest snapshot and the chart history. Each tick advances the clock by
//! one, regenerates the snapshot from the model and appends the charted
//! values to the history. Nothing here depends on wall-clock time: callers
//! either call [`FatigueSimulator::tick`] directly or feed elapsed time to
//! [`FatigueSimulator::advance`].

use crate::config::SimulatorConfig;
use crate::model::FatigueModel;
use crate::noise::RandomNoise;
use fatigue_core::{ChartHistory, MetricsAssessment, MetricsSnapshot, NoiseSource, SessionClock};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Whether the simulator is producing ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatorState {
    /// Initial state. Ticks are ignored.
    #[default]
    Stopped,
    /// Ticks produce new snapshots.
    Running,
}

/// The result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// Session time after the tick.
    pub tick: u64,
    /// Snapshot produced by the tick.
    pub snapshot: MetricsSnapshot,
}

/// The ticking generator behind the dashboard.
pub struct FatigueSimulator {
    model: FatigueModel,
    noise: Box<dyn NoiseSource>,
    clock: SessionClock,
    snapshot: MetricsSnapshot,
    history: ChartHistory,
    state: SimulatorState,
    tick_interval: Duration,
    // Virtual time accumulated toward the next tick.
    pending: Duration,
}

impl FatigueSimulator {
    /// Creates a stopped simulator with a one-second tick interval.
    pub fn new(noise: impl NoiseSource + 'static) -> Self {
        Self {
            model: FatigueModel::default(),
            noise: Box::new(noise),
            clock: SessionClock::new(),
            snapshot: MetricsSnapshot::BASELINE,
            history: ChartHistory::new(),
            state: SimulatorState::Stopped,
            tick_interval: Duration::from_secs(1),
            pending: Duration::ZERO,
        }
    }

    /// Creates a simulator with the configured noise seed and tick interval.
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(RandomNoise::from_seed(config.seed)).with_tick_interval(config.tick_interval())
    }

    /// Sets the virtual time per tick used by [`advance`](Self::advance).
    /// Intervals shorter than a millisecond are raised to one millisecond.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Transitions to `Running`. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        if self.state == SimulatorState::Running {
            return false;
        }
        self.state = SimulatorState::Running;
        log::info!("Fatigue simulator started at tick {}.", self.clock.ticks());
        true
    }

    /// Transitions to `Stopped`, keeping the clock, snapshot and history.
    /// Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == SimulatorState::Stopped {
            return false;
        }
        self.state = SimulatorState::Stopped;
        self.pending = Duration::ZERO;
        log::info!(
            "Fatigue simulator stopped. Session duration: {}",
            self.clock.summary()
        );
        true
    }

    /// Zeroes the clock, restores the baseline snapshot and clears the history.
    ///
    /// Allowed in either state; a running simulator keeps running from tick zero.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.snapshot = MetricsSnapshot::BASELINE;
        self.history.clear();
        self.pending = Duration::ZERO;
        log::info!("Fatigue simulator reset.");
    }

    /// Performs one tick if running.
    pub fn tick(&mut self) -> Option<TickReport> {
        if self.state != SimulatorState::Running {
            return None;
        }
        let tick = self.clock.tick();
        self.snapshot = self.model.generate(tick, self.noise.as_mut());
        self.history.record(tick, &self.snapshot);
        log::debug!(
            "Tick {}: fatigue={} blink={} ear={} pitch={}",
            tick,
            self.snapshot.fatigue_level,
            self.snapshot.blink_rate,
            self.snapshot.ear,
            self.snapshot.pitch
        );
        Some(TickReport {
            tick,
            snapshot: self.snapshot,
        })
    }

    /// Feeds virtual elapsed time, firing one tick per whole interval.
    ///
    /// Time that passes while stopped is discarded.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<TickReport> {
        let mut reports = Vec::new();
        if self.state != SimulatorState::Running {
            return reports;
        }
        self.pending += elapsed;
        while self.pending >= self.tick_interval {
            self.pending -= self.tick_interval;
            if let Some(report) = self.tick() {
                reports.push(report);
            }
        }
        reports
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot
    }

    /// Dashboard interpretation of the latest snapshot.
    pub fn assessment(&self) -> MetricsAssessment {
        MetricsAssessment::of(&self.snapshot)
    }

    /// The chart history.
    pub fn history(&self) -> &ChartHistory {
        &self.history
    }

    /// The session clock.
    pub fn clock(&self) -> SessionClock {
        self.clock
    }

    /// Session time in seconds.
    pub fn session_time(&self) -> u64 {
        self.clock.ticks()
    }

    /// Current state.
    pub fn state(&self) -> SimulatorState {
        self.state
    }

    /// Returns `true` while running.
    pub fn is_running(&self) -> bool {
        self.state == SimulatorState::Running
    }

    /// Virtual time per tick.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// The model generating snapshots.
    pub fn model(&self) -> &FatigueModel {
        &self.model
    }
}

impl Default for FatigueSimulator {
    fn default() -> Self {
        Self::new(RandomNoise::new())
    }
}

impl fmt::Debug for FatigueSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FatigueSimulator")
            .field("state", &self.state)
            .field("clock", &self.clock)
            .field("snapshot", &self.snapshot)
            .field("tick_interval", &self.tick_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatigue_core::{FixedNoise, HISTORY_CAPACITY};

    fn quiet_simulator() -> FatigueSimulator {
        FatigueSimulator::new(FixedNoise::neutral())
    }

    #[test]
    fn test_initial_state() {
        let sim = quiet_simulator();
        assert_eq!(sim.state(), SimulatorState::Stopped);
        assert_eq!(sim.session_time(), 0);
        assert_eq!(sim.snapshot(), MetricsSnapshot::BASELINE);
        assert!(sim.history().is_empty());
    }

    #[test]
    fn test_tick_is_ignored_while_stopped() {
        let mut sim = quiet_simulator();
        assert!(sim.tick().is_none());
        assert_eq!(sim.session_time(), 0);
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let mut sim = quiet_simulator();
        assert!(sim.start());
        assert!(!sim.start());
        assert!(sim.is_running());
        assert!(sim.stop());
        assert!(!sim.stop());
        assert!(!sim.is_running());
    }

    #[test]
    fn test_tick_increments_clock_by_one() {
        let mut sim = quiet_simulator();
        sim.start();
        let report = sim.tick().unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(sim.session_time(), 1);
        assert_eq!(sim.snapshot(), report.snapshot);
        assert_eq!(sim.history().blink_rate.len(), 1);
    }

    #[test]
    fn test_stop_preserves_state() {
        let mut sim = quiet_simulator();
        sim.start();
        sim.advance(Duration::from_secs(10));
        let snapshot = sim.snapshot();
        sim.stop();

        assert_eq!(sim.session_time(), 10);
        assert_eq!(sim.snapshot(), snapshot);
        assert_eq!(sim.history().pitch.len(), 10);
    }

    #[test]
    fn test_start_resumes_from_current_tick() {
        let mut sim = quiet_simulator();
        sim.start();
        sim.advance(Duration::from_secs(3));
        sim.stop();
        sim.start();
        let report = sim.tick().unwrap();
        assert_eq!(report.tick, 4);
    }

    #[test]
    fn test_advance_accumulates_partial_intervals() {
        let mut sim = quiet_simulator();
        sim.start();
        assert!(sim.advance(Duration::from_millis(600)).is_empty());
        let reports = sim.advance(Duration::from_millis(600));
        assert_eq!(reports.len(), 1);
        assert_eq!(sim.session_time(), 1);

        let reports = sim.advance(Duration::from_millis(2_400));
        let ticks: Vec<u64> = reports.iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![2, 3]);
    }

    #[test]
    fn test_advance_after_stop_produces_nothing() {
        let mut sim = quiet_simulator();
        sim.start();
        sim.advance(Duration::from_millis(2_500));
        sim.stop();
        let snapshot = sim.snapshot();

        assert!(sim.advance(Duration::from_secs(5)).is_empty());
        assert_eq!(sim.session_time(), 2);
        assert_eq!(sim.snapshot(), snapshot);

        // The half interval pending at stop time is dropped.
        sim.start();
        assert!(sim.advance(Duration::from_millis(600)).is_empty());
    }

    #[test]
    fn test_reset_restores_baseline_and_clears_history() {
        let mut sim = quiet_simulator();
        sim.start();
        sim.advance(Duration::from_secs(30));
        sim.stop();
        sim.reset();

        assert_eq!(sim.session_time(), 0);
        assert_eq!(sim.snapshot(), MetricsSnapshot::BASELINE);
        assert!(sim.history().blink_rate.is_empty());
        assert!(sim.history().ear.is_empty());
        assert!(sim.history().pitch.is_empty());
        assert_eq!(sim.state(), SimulatorState::Stopped);
    }

    #[test]
    fn test_reset_while_running_keeps_running_from_zero() {
        let mut sim = quiet_simulator();
        sim.start();
        sim.advance(Duration::from_secs(4));
        sim.reset();
        assert!(sim.is_running());
        assert_eq!(sim.tick().unwrap().tick, 1);
    }

    #[test]
    fn test_five_ticks_without_noise() {
        let mut sim = quiet_simulator();
        sim.start();
        let reports = sim.advance(Duration::from_secs(5));
        assert_eq!(reports.len(), 5);
        assert_eq!(sim.session_time(), 5);

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.fatigue_level, 21);
        assert_eq!(snapshot.blink_rate, 19.2);
        assert_eq!(snapshot.ear, 0.29);
        assert_eq!(snapshot.speech_rate, 4.1);
        assert_eq!(snapshot.pitch, 157.0);
        assert_eq!(snapshot.perclos, 0.12);
        assert_eq!(snapshot.head_stability, 0.87);
        assert_eq!(snapshot.voice_energy, -18.0);
    }

    #[test]
    fn test_history_is_capped_to_most_recent_points() {
        let mut sim = quiet_simulator();
        sim.start();
        sim.advance(Duration::from_secs(90));

        for series in [&sim.history().blink_rate, &sim.history().ear, &sim.history().pitch] {
            assert_eq!(series.len(), HISTORY_CAPACITY);
            let ticks: Vec<u64> = series.iter().map(|p| p.tick).collect();
            assert_eq!(ticks, (31..=90).collect::<Vec<u64>>());
        }
        assert_eq!(sim.history().pitch.latest().unwrap().value, sim.snapshot().pitch);
    }

    #[test]
    fn test_custom_tick_interval() {
        let mut sim = quiet_simulator().with_tick_interval(Duration::from_millis(100));
        sim.start();
        assert_eq!(sim.advance(Duration::from_secs(1)).len(), 10);
    }

    #[test]
    fn test_from_config_is_reproducible() {
        let config = SimulatorConfig {
            seed: Some(11),
            ..Default::default()
        };
        let mut a = FatigueSimulator::from_config(&config);
        let mut b = FatigueSimulator::from_config(&config);
        a.start();
        b.start();
        assert_eq!(
            a.advance(Duration::from_secs(20)),
            b.advance(Duration::from_secs(20))
        );
    }
}
