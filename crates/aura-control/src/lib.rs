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

//! The adaptive rendering performance governor.
//!
//! [`PerformanceGovernor`] watches frame rate, memory and GPU load across all
//! registered 3D scenes and moves the shared [`aura_core::QualitySettings`]
//! one step at a time to keep rendering inside its frame budget.
//!
//! The governor owns no timers and no threads. The embedding scheduler calls
//! [`PerformanceGovernor::on_tick`] and the governor runs whichever of its
//! three periodic passes (sampling, quality check, resource cleanup) are due.

pub mod analysis;
pub mod capability;
pub mod config;
pub mod metrics;
pub mod quality;
pub mod registry;
pub mod resources;
pub mod schedule;
pub mod service;

pub use config::{ConfigError, GovernorConfig};
pub use service::{PerformanceGovernor, SharedGovernor};
