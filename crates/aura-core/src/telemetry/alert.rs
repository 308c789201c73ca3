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

//! Advisory alerts describing a detected performance condition.

use crate::scene::SceneId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    /// Frame rate below the minimum.
    FpsDrop,
    /// Memory estimate above the threshold.
    MemoryHigh,
    /// GPU utilisation estimate above the threshold.
    GpuOverload,
    /// A single scene took too long to render.
    RenderSlow,
    /// Quality was lowered.
    QualityReduced,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FpsDrop => "fps-drop",
            Self::MemoryHigh => "memory-high",
            Self::GpuOverload => "gpu-overload",
            Self::RenderSlow => "render-slow",
            Self::QualityReduced => "quality-reduced",
        };
        f.write_str(name)
    }
}

/// How urgent an alert is. Only `Critical` triggers automatic remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational.
    Low,
    /// Worth a look.
    Medium,
    /// User-visible degradation.
    High,
    /// Remediated automatically.
    Critical,
}

/// Suggested remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertAction {
    /// Apply one quality reduction step.
    ReduceQuality,
    /// Deactivate the named scene if it is low priority.
    DisableScene,
    /// Decay the resource estimate and ask the resource manager to release memory.
    CleanupMemory,
    /// Let the notification reporter tell the user.
    NotifyUser,
}

/// An emitted, immutable alert record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAlert {
    /// What was detected.
    pub kind: AlertKind,
    /// How urgent it is.
    pub severity: AlertSeverity,
    /// Human-readable description.
    pub message: String,
    /// Scene the alert concerns, if any.
    pub scene_id: Option<SceneId>,
    /// When the condition was detected.
    pub timestamp: Timestamp,
    /// Suggested remediation, if any.
    pub action: Option<AlertAction>,
}

impl PerformanceAlert {
    /// Creates an alert with no scene and no action.
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        message: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            scene_id: None,
            timestamp,
            action: None,
        }
    }

    /// Attaches the scene the alert concerns.
    pub fn for_scene(mut self, scene_id: SceneId) -> Self {
        self.scene_id = Some(scene_id);
        self
    }

    /// Attaches a suggested remediation.
    pub fn with_action(mut self, action: AlertAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Returns `true` for alerts that are remediated automatically.
    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

impl fmt::Display for PerformanceAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.kind, self.message)?;
        if let Some(scene) = &self.scene_id {
            write!(f, " (scene {scene})")?;
        }
        Ok(())
    }
}
