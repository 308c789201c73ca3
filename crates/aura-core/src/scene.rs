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

//! Scenes: the independently trackable 3D rendering units the governor arbitrates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Memory estimate (MB) charged per complexity point when a scene reports none.
pub const MEMORY_MB_PER_COMPLEXITY: f32 = 10.0;

/// Opaque, caller-supplied scene identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneId(String);

impl SceneId {
    /// Wraps a caller identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SceneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The kind of visual a scene renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneType {
    /// A card visualising a single skill.
    SkillCard,
    /// A scrolling career timeline.
    Timeline,
    /// A technology-stack visualisation.
    TechnologyViz,
    /// A project preview.
    ProjectPreview,
    /// A system architecture diagram.
    Architecture,
    /// Decorative scroll-driven effects.
    ScrollEffects,
}

/// How important a scene is to keep alive under pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenePriority {
    /// May be force-disabled by a critical alert.
    Low,
    /// Regular content.
    Medium,
    /// Primary content, never force-disabled.
    High,
}

/// A registered 3D scene as the governor sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique identifier among registered scenes.
    pub id: SceneId,
    /// What the scene renders.
    pub scene_type: SceneType,
    /// Importance under pressure.
    pub priority: ScenePriority,
    /// Caller estimate of rendering cost, 1 to 10.
    pub complexity: u8,
    /// Whether the scene is currently rendering.
    pub is_active: bool,
    /// Whether the scene is on screen.
    pub is_visible: bool,
    /// Most recent render time sample, in milliseconds.
    pub last_render_time: f32,
    /// Estimated memory footprint in MB, if the scene knows it.
    pub memory_usage: Option<f32>,
}

impl Scene {
    /// Creates an active, visible scene. `complexity` is clamped to 1..=10.
    pub fn new(
        id: impl Into<SceneId>,
        scene_type: SceneType,
        priority: ScenePriority,
        complexity: u8,
    ) -> Self {
        Self {
            id: id.into(),
            scene_type,
            priority,
            complexity: complexity.clamp(1, 10),
            is_active: true,
            is_visible: true,
            last_render_time: 0.0,
            memory_usage: None,
        }
    }

    /// Sets the memory estimate in MB.
    pub fn with_memory_usage(mut self, memory_mb: f32) -> Self {
        self.memory_usage = Some(memory_mb.max(0.0));
        self
    }

    /// Sets the initial activity and visibility flags.
    pub fn with_status(mut self, is_active: bool, is_visible: bool) -> Self {
        self.is_active = is_active;
        self.is_visible = is_visible;
        self
    }

    /// Memory charged to this scene, falling back to a complexity-based guess.
    pub fn estimated_memory_mb(&self) -> f32 {
        self.memory_usage
            .unwrap_or(self.complexity as f32 * MEMORY_MB_PER_COMPLEXITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_is_clamped() {
        let s = Scene::new("a", SceneType::Timeline, ScenePriority::Low, 42);
        assert_eq!(s.complexity, 10);
        let s = Scene::new("b", SceneType::Timeline, ScenePriority::Low, 0);
        assert_eq!(s.complexity, 1);
    }

    #[test]
    fn test_memory_estimate_fallback() {
        let s = Scene::new("a", SceneType::SkillCard, ScenePriority::High, 4);
        assert_eq!(s.estimated_memory_mb(), 40.0);
        let s = s.with_memory_usage(12.5);
        assert_eq!(s.estimated_memory_mb(), 12.5);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(ScenePriority::Low < ScenePriority::Medium);
        assert!(ScenePriority::Medium < ScenePriority::High);
    }
}
