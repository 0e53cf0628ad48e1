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

//! Headless fatigue monitor.
//!
//! Drives the simulator in real time and prints one line per tick, either as
//! human-readable text or as JSON.

mod display;

use anyhow::{Context, Result};
use clap::Parser;
use fatigue_core::ChartHistory;
use fatigue_sim::{SimulatorConfig, SimulatorEvent, SimulatorService, TickReport};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Simulated athlete fatigue monitor")]
struct Cli {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session seconds to run before stopping (0 runs until killed).
    #[arg(long, default_value_t = 30)]
    duration: u64,

    /// Seed for reproducible noise.
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between ticks.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Print one JSON object per tick instead of text.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<SimulatorConfig> {
        let mut config = match &self.config {
            Some(path) => SimulatorConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => SimulatorConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }
        config.validate().context("validating config")?;
        Ok(config)
    }
}

/// Records `report` into the mirrored history and renders its output line.
fn render_tick(report: &TickReport, history: &mut ChartHistory, json: bool) -> Result<String> {
    history.record(report.tick, &report.snapshot);
    let crossings = history.threshold_crossings();
    if json {
        display::render_json(report, crossings).context("encoding tick as JSON")
    } else {
        Ok(display::render_text(report, crossings))
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    log::info!(
        "Starting fatigue monitor: tick interval {:?}, duration {}s",
        config.tick_interval(),
        cli.duration
    );

    let mut service = SimulatorService::new(config);
    let events = service.subscribe();
    service.start().context("starting simulator")?;

    // Mirrors the simulator's chart history from the event stream so every
    // line reports crossings for exactly the ticks printed so far.
    let mut history = ChartHistory::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in events.iter() {
        let report = match event {
            SimulatorEvent::Tick(report) => report,
            SimulatorEvent::Reset => {
                history.clear();
                continue;
            }
            _ => continue,
        };

        let line = render_tick(&report, &mut history, cli.json)?;
        writeln!(out, "{line}").context("writing to stdout")?;

        for alert in fatigue_core::MetricsAssessment::of(&report.snapshot).alerts() {
            log::debug!("Alert: {alert}");
        }

        if cli.duration > 0 && report.tick >= cli.duration {
            break;
        }
    }

    service.stop();
    let clock = service.clock();
    log::info!("Session duration: {}", clock.summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["fatigue-monitor"]);
        assert_eq!(cli.duration, 30);
        assert!(!cli.json);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config, SimulatorConfig::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["fatigue-monitor", "--seed", "4", "--tick-ms", "250", "--json"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.tick_interval_ms, 250);
        assert!(cli.json);
    }

    #[test]
    fn test_mirrored_history_matches_simulator() {
        use fatigue_core::FixedNoise;
        use fatigue_sim::FatigueSimulator;
        use std::time::Duration;

        let mut sim = FatigueSimulator::new(FixedNoise::new(1.0));
        sim.start();
        let mut history = ChartHistory::new();
        let mut last = String::new();
        for report in sim.advance(Duration::from_secs(300)) {
            last = render_tick(&report, &mut history, false).unwrap();
        }

        let crossings = history.threshold_crossings();
        assert_eq!(crossings, sim.history().threshold_crossings());
        assert_eq!(crossings.window, 60);
        assert_eq!(crossings.blink_rate, 60);
        // EAR drops below the line from tick 249 onward.
        assert_eq!(crossings.ear, 52);
        assert!(last.starts_with("[05:00] fatigue  81%"));
        assert!(last.ends_with("over line: blink 60/60 ear 52/60"), "{last}");

        let json = render_tick(&sim.tick().unwrap(), &mut history, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["chartCrossings"]["blinkRate"], 60);
    }

    #[test]
    fn test_cli_rejects_zero_tick() {
        let cli = Cli::parse_from(["fatigue-monitor", "--tick-ms", "0"]);
        assert!(cli.resolve_config().is_err());
    }
}
