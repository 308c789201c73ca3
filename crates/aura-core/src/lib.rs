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

//! Foundational vocabulary shared by every Aura crate.
//!
//! `aura-core` holds the plain data types the governor reasons about (scenes,
//! quality settings, device capability, metrics samples, alerts, resource
//! counters) together with the traits through which the embedding application
//! plugs in its collaborators: a [`platform::CapabilityProbe`], an optional
//! [`resource::ResourceManager`] and a [`time::Clock`].
//!
//! Nothing in this crate makes decisions. The control loop lives in
//! `aura-control`.

#![warn(missing_docs)]

pub mod event;
pub mod platform;
pub mod quality;
pub mod resource;
pub mod scene;
pub mod telemetry;
pub mod time;

pub use event::{EventHub, Subscription, SubscriptionId};
pub use platform::{
    CapabilityProbe, DeviceCapability, DeviceTier, GpuFeatures, ProbeError, ProbeReport,
};
pub use quality::{
    AnimationQuality, QualityDirection, QualitySettings, ShadowQuality, TextureQuality,
};
pub use resource::{ResourceKind, ResourceManager, ResourcePool};
pub use scene::{Scene, SceneId, ScenePriority, SceneType};
pub use telemetry::{
    AlertAction, AlertKind, AlertSeverity, EventKind, GovernorEvent, PerformanceAlert,
    PerformanceMetrics,
};
pub use time::{Clock, ManualClock, SystemClock, Timestamp};
