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

//! Real-time driver for the fatigue simulator.

use crate::config::SimulatorConfig;
use crate::simulator::{FatigueSimulator, SimulatorState, TickReport};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use fatigue_core::{ChartHistory, MetricsAssessment, MetricsSnapshot, SessionClock};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

/// Something that happened to the simulator, as seen by a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatorEvent {
    /// Ticking began (or resumed) at this session time.
    Started {
        /// Session time when started.
        tick: u64,
    },
    /// A tick produced a new snapshot.
    Tick(TickReport),
    /// Ticking halted at this session time.
    Stopped {
        /// Session time when stopped.
        tick: u64,
    },
    /// Clock, snapshot and history were cleared.
    Reset,
}

/// Errors raised by the simulator service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The OS refused to create the tick thread.
    #[error("failed to spawn simulator thread: {0}")]
    Spawn(#[from] std::io::Error),
}

type Subscribers = Arc<Mutex<Vec<Sender<SimulatorEvent>>>>;

/// Runs a [`FatigueSimulator`] on a background thread at a fixed cadence.
///
/// All simulator state lives behind one mutex, and the tick thread re-checks
/// the running state under that mutex before every tick. Once
/// [`stop`](Self::stop) returns, no further tick can be applied.
pub struct SimulatorService {
    config: SimulatorConfig,
    simulator: Arc<Mutex<FatigueSimulator>>,
    subscribers: Subscribers,
    shutdown_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SimulatorService {
    /// Creates a stopped service with a simulator built from `config`.
    pub fn new(config: SimulatorConfig) -> Self {
        let simulator = FatigueSimulator::from_config(&config);
        Self::with_simulator(config, simulator)
    }

    /// Creates a stopped service around an existing simulator (e.g. one with scripted noise).
    pub fn with_simulator(config: SimulatorConfig, simulator: FatigueSimulator) -> Self {
        Self {
            config,
            simulator: Arc::new(Mutex::new(simulator)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Registers a new subscriber and returns its event stream.
    pub fn subscribe(&self) -> Receiver<SimulatorEvent> {
        let (tx, rx) = crossbeam_channel::bounded(self.config.event_buffer_size.max(1));
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Starts the tick thread. Does nothing if already started.
    pub fn start(&mut self) -> Result<(), ServiceError> {
        if self.handle.is_some() {
            return Ok(());
        }

        {
            let mut sim = lock(&self.simulator);
            sim.start();
            publish(
                &self.subscribers,
                SimulatorEvent::Started {
                    tick: sim.session_time(),
                },
            );
        }

        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let ticker = crossbeam_channel::tick(self.config.tick_interval());
        let simulator = Arc::clone(&self.simulator);
        let subscribers = Arc::clone(&self.subscribers);

        let spawned = thread::Builder::new()
            .name("fatigue-sim".into())
            .spawn(move || run_tick_loop(simulator, subscribers, ticker, shutdown_rx));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                self.shutdown_tx = Some(shutdown_tx);
                Ok(())
            }
            Err(e) => {
                let mut sim = lock(&self.simulator);
                sim.stop();
                publish(
                    &self.subscribers,
                    SimulatorEvent::Stopped {
                        tick: sim.session_time(),
                    },
                );
                Err(ServiceError::Spawn(e))
            }
        }
    }

    /// Stops the tick thread and waits for it to exit. Does nothing if not started.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        let tick = {
            let mut sim = lock(&self.simulator);
            sim.stop();
            sim.session_time()
        };

        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            // The thread may already have exited after seeing the stopped state.
            let _ = shutdown_tx.send(());
        }
        if handle.join().is_err() {
            log::error!("Fatigue simulator thread panicked.");
        }

        publish(&self.subscribers, SimulatorEvent::Stopped { tick });
    }

    /// Zeroes the clock, restores the baseline snapshot and clears the history.
    pub fn reset(&self) {
        let mut sim = lock(&self.simulator);
        sim.reset();
        publish(&self.subscribers, SimulatorEvent::Reset);
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        lock(&self.simulator).snapshot()
    }

    /// Dashboard interpretation of the latest snapshot.
    pub fn assessment(&self) -> MetricsAssessment {
        lock(&self.simulator).assessment()
    }

    /// A copy of the chart history.
    pub fn history(&self) -> ChartHistory {
        lock(&self.simulator).history().clone()
    }

    /// The session clock.
    pub fn clock(&self) -> SessionClock {
        lock(&self.simulator).clock()
    }

    /// Session time in seconds.
    pub fn session_time(&self) -> u64 {
        lock(&self.simulator).session_time()
    }

    /// Current simulator state.
    pub fn state(&self) -> SimulatorState {
        lock(&self.simulator).state()
    }

    /// Returns `true` while the tick thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Wall-clock time between ticks.
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval()
    }
}

impl Drop for SimulatorService {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_tick_loop(
    simulator: Arc<Mutex<FatigueSimulator>>,
    subscribers: Subscribers,
    ticker: Receiver<std::time::Instant>,
    shutdown_rx: Receiver<()>,
) {
    log::info!("Fatigue simulator thread started.");
    loop {
        crossbeam_channel::select! {
            recv(shutdown_rx) -> _ => break,
            recv(ticker) -> _ => {
                let mut sim = lock(&simulator);
                match sim.tick() {
                    // Published under the simulator lock so a concurrent reset
                    // cannot overtake a tick in the event stream.
                    Some(report) => publish(&subscribers, SimulatorEvent::Tick(report)),
                    None => break,
                }
            }
        }
    }
    log::info!("Fatigue simulator thread stopped.");
}

fn publish(subscribers: &Subscribers, event: SimulatorEvent) {
    lock(subscribers).retain(|tx| match tx.try_send(event.clone()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            log::trace!("Subscriber lagging, dropped {:?}", event);
            true
        }
        Err(TrySendError::Disconnected(_)) => {
            log::trace!("Pruned disconnected subscriber.");
            false
        }
    });
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("Recovering poisoned simulator lock.");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatigue_core::FixedNoise;
    use std::time::Instant;

    fn fast_config() -> SimulatorConfig {
        SimulatorConfig {
            tick_interval_ms: 10,
            seed: Some(3),
            ..Default::default()
        }
    }

    fn quiet_service() -> SimulatorService {
        let config = fast_config();
        let sim = FatigueSimulator::new(FixedNoise::neutral()).with_tick_interval(config.tick_interval());
        SimulatorService::with_simulator(config, sim)
    }

    #[test]
    fn test_service_lifecycle() {
        let mut service = quiet_service();
        assert!(!service.is_running());
        service.start().unwrap();
        assert!(service.is_running());
        assert_eq!(service.state(), SimulatorState::Running);
        service.stop();
        assert!(!service.is_running());
        assert_eq!(service.state(), SimulatorState::Stopped);
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let mut service = quiet_service();
        let events = service.subscribe();
        service.start().unwrap();
        service.start().unwrap();
        service.stop();
        service.stop();

        let started = events
            .try_iter()
            .filter(|e| matches!(e, SimulatorEvent::Started { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_ticks_are_published_in_order() {
        let mut service = quiet_service();
        let events = service.subscribe();
        service.start().unwrap();

        assert_eq!(
            events.recv_timeout(Duration::from_secs(1)).unwrap(),
            SimulatorEvent::Started { tick: 0 }
        );
        let mut ticks = Vec::new();
        while ticks.len() < 3 {
            match events.recv_timeout(Duration::from_secs(1)).unwrap() {
                SimulatorEvent::Tick(report) => ticks.push(report.tick),
                other => panic!("unexpected event {other:?}"),
            }
        }
        service.stop();

        assert_eq!(ticks, vec![1, 2, 3]);
    }

    #[test]
    fn test_no_ticks_after_stop_returns() {
        let mut service = quiet_service();
        let events = service.subscribe();
        service.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while service.session_time() < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        service.stop();
        let stopped_at = service.session_time();
        let snapshot = service.snapshot();

        thread::sleep(Duration::from_millis(50));
        assert_eq!(service.session_time(), stopped_at);
        assert_eq!(service.snapshot(), snapshot);

        let last = events.try_iter().last();
        assert_eq!(last, Some(SimulatorEvent::Stopped { tick: stopped_at }));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut service = quiet_service();
        service.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        service.stop();
        service.reset();

        assert_eq!(service.session_time(), 0);
        assert_eq!(service.snapshot(), MetricsSnapshot::BASELINE);
        assert!(service.history().is_empty());
    }

    #[test]
    fn test_lagging_subscriber_does_not_block_ticks() {
        let config = SimulatorConfig {
            event_buffer_size: 1,
            ..fast_config()
        };
        let sim = FatigueSimulator::new(FixedNoise::neutral()).with_tick_interval(config.tick_interval());
        let mut service = SimulatorService::with_simulator(config, sim);
        let events = service.subscribe();
        service.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while service.session_time() < 5 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(service.session_time() >= 5);
        assert_eq!(events.len(), 1);

        service.stop();
        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received, vec![SimulatorEvent::Started { tick: 0 }]);
    }

    #[test]
    fn test_reset_while_running_restarts_from_one() {
        let mut service = quiet_service();
        let events = service.subscribe();
        service.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while service.session_time() < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        service.reset();
        assert_eq!(service.state(), SimulatorState::Running);

        let deadline = Instant::now() + Duration::from_secs(2);
        while service.session_time() < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        service.stop();

        let received: Vec<_> = events.try_iter().collect();
        let reset_at = received
            .iter()
            .position(|e| *e == SimulatorEvent::Reset)
            .expect("reset event delivered");
        assert!(reset_at >= 4, "expected ticks before reset, got {received:?}");

        let after: Vec<u64> = received[reset_at + 1..]
            .iter()
            .filter_map(|e| match e {
                SimulatorEvent::Tick(report) => Some(report.tick),
                _ => None,
            })
            .collect();
        assert_eq!(after[..2], [1, 2]);
        assert_eq!(
            received.last(),
            Some(&SimulatorEvent::Stopped {
                tick: *after.last().unwrap()
            })
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let service = quiet_service();
        let dropped = service.subscribe();
        let kept = service.subscribe();
        drop(dropped);

        service.reset();
        assert_eq!(lock(&service.subscribers).len(), 1);
        assert_eq!(kept.try_recv().unwrap(), SimulatorEvent::Reset);
    }

    #[test]
    fn test_drop_stops_thread() {
        let mut service = quiet_service();
        let events = service.subscribe();
        service.start().unwrap();
        drop(service);

        let last = events.try_iter().last();
        assert!(matches!(last, Some(SimulatorEvent::Stopped { .. })));
    }
}
