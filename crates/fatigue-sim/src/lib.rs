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

//! # Fatigue Sim
//!
//! The ticking generator behind the fatigue dashboard. [`FatigueSimulator`]
//! is a synchronous state machine that can be driven tick by tick or by
//! virtual elapsed time; [`SimulatorService`] runs it on a background thread
//! at a fixed cadence and publishes every tick to subscribers.

#![warn(missing_docs)]

pub mod config;
pub mod model;
pub mod noise;
pub mod service;
pub mod simulator;

pub use config::{ConfigError, SimulatorConfig};
pub use model::{Baseline, FatigueModel};
pub use noise::RandomNoise;
pub use service::{ServiceError, SimulatorEvent, SimulatorService};
pub use simulator::{FatigueSimulator, SimulatorState, TickReport};
