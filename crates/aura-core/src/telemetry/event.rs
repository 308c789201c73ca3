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

//! Events published by the governor.

use crate::quality::QualitySettings;
use crate::resource::ResourcePool;
use crate::scene::SceneId;
use crate::telemetry::alert::PerformanceAlert;
use crate::telemetry::metrics::PerformanceMetrics;
use serde::{Deserialize, Serialize};

/// Every notification a governor subscriber can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum GovernorEvent {
    /// A sample was appended to the history.
    PerformanceUpdated(PerformanceMetrics),
    /// Quality was lowered by one step; carries the new settings.
    QualityReduced(QualitySettings),
    /// Quality was raised by one step; carries the new settings.
    QualityImproved(QualitySettings),
    /// An alert was raised.
    PerformanceAlert(PerformanceAlert),
    /// A scene entered the registry.
    SceneRegistered(SceneId),
    /// A scene left the registry.
    SceneUnregistered(SceneId),
    /// The resource estimate was decayed; carries the new pool snapshot.
    ResourcesCleaned(ResourcePool),
}

/// Discriminant of a [`GovernorEvent`], used for filtered subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// See [`GovernorEvent::PerformanceUpdated`].
    PerformanceUpdated,
    /// See [`GovernorEvent::QualityReduced`].
    QualityReduced,
    /// See [`GovernorEvent::QualityImproved`].
    QualityImproved,
    /// See [`GovernorEvent::PerformanceAlert`].
    PerformanceAlert,
    /// See [`GovernorEvent::SceneRegistered`].
    SceneRegistered,
    /// See [`GovernorEvent::SceneUnregistered`].
    SceneUnregistered,
    /// See [`GovernorEvent::ResourcesCleaned`].
    ResourcesCleaned,
}

impl GovernorEvent {
    /// Returns the discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PerformanceUpdated(_) => EventKind::PerformanceUpdated,
            Self::QualityReduced(_) => EventKind::QualityReduced,
            Self::QualityImproved(_) => EventKind::QualityImproved,
            Self::PerformanceAlert(_) => EventKind::PerformanceAlert,
            Self::SceneRegistered(_) => EventKind::SceneRegistered,
            Self::SceneUnregistered(_) => EventKind::SceneUnregistered,
            Self::ResourcesCleaned(_) => EventKind::ResourcesCleaned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let event = GovernorEvent::SceneRegistered(SceneId::new("hero"));
        assert_eq!(event.kind(), EventKind::SceneRegistered);
    }
}
