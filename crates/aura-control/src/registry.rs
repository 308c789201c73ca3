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

//! Scene registry with per-scene render-time tracking.

use crate::metrics::{RingBuffer, RENDER_SAMPLES_PER_SCENE};
use aura_core::{Scene, SceneId};

/// Entry in the scene registry: the scene and its recent render times.
struct SceneEntry {
    scene: Scene,
    render_times: RingBuffer<f32, RENDER_SAMPLES_PER_SCENE>,
}

/// Registry of every mounted scene, in registration order.
///
/// Lookups are linear; a page mounts a handful of scenes at most.
#[derive(Default)]
pub struct SceneRegistry {
    entries: Vec<SceneEntry>,
}

impl SceneRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `scene`, replacing (in place) any scene with the same id.
    ///
    /// The render-time buffer always starts empty. Returns the replaced scene.
    pub fn register(&mut self, scene: Scene) -> Option<Scene> {
        let entry = SceneEntry {
            scene,
            render_times: RingBuffer::new(),
        };
        match self.position(&entry.scene.id) {
            Some(index) => {
                let previous = std::mem::replace(&mut self.entries[index], entry);
                Some(previous.scene)
            }
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    /// Removes a scene and its render history.
    pub fn unregister(&mut self, id: &SceneId) -> Option<Scene> {
        let index = self.position(id)?;
        Some(self.entries.remove(index).scene)
    }

    /// Sets the activity and visibility flags. Returns `false` for unknown ids.
    pub fn update_status(&mut self, id: &SceneId, is_active: bool, is_visible: bool) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.scene.is_active = is_active;
                entry.scene.is_visible = is_visible;
                true
            }
            None => false,
        }
    }

    /// Records a render-time sample.
    ///
    /// Returns `false` for unknown ids and for non-finite or negative times.
    pub fn record_render_time(&mut self, id: &SceneId, render_time_ms: f32) -> bool {
        if !render_time_ms.is_finite() || render_time_ms < 0.0 {
            return false;
        }
        match self.entry_mut(id) {
            Some(entry) => {
                entry.render_times.push(render_time_ms);
                entry.scene.last_render_time = render_time_ms;
                true
            }
            None => false,
        }
    }

    /// Returns the scene registered under `id`.
    pub fn get(&self, id: &SceneId) -> Option<&Scene> {
        self.entries
            .iter()
            .find(|e| &e.scene.id == id)
            .map(|e| &e.scene)
    }

    /// Iterates over every scene in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.entries.iter().map(|e| &e.scene)
    }

    /// Iterates over the active scenes.
    pub fn active(&self) -> impl Iterator<Item = &Scene> {
        self.iter().filter(|s| s.is_active)
    }

    /// Number of active scenes.
    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Sum of the complexity of active scenes.
    pub fn active_complexity(&self) -> u32 {
        self.active().map(|s| s.complexity as u32).sum()
    }

    /// Sum of the memory estimate of active scenes, in MB.
    pub fn active_memory_mb(&self) -> f32 {
        self.active().map(Scene::estimated_memory_mb).sum()
    }

    /// Mean of every buffered render-time sample across all scenes, or 0.
    pub fn mean_render_time(&self) -> f32 {
        let (sum, count) = self.entries.iter().fold((0.0f32, 0usize), |(sum, n), e| {
            (sum + e.render_times.sum(), n + e.render_times.count())
        });
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    /// Number of buffered render-time samples for `id`.
    pub fn render_sample_count(&self, id: &SceneId) -> usize {
        self.entries
            .iter()
            .find(|e| &e.scene.id == id)
            .map(|e| e.render_times.count())
            .unwrap_or(0)
    }

    /// Returns the number of registered scenes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no scenes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every scene.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, id: &SceneId) -> Option<usize> {
        self.entries.iter().position(|e| &e.scene.id == id)
    }

    fn entry_mut(&mut self, id: &SceneId) -> Option<&mut SceneEntry> {
        self.entries.iter_mut().find(|e| &e.scene.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{ScenePriority, SceneType};

    fn scene(id: &str, complexity: u8) -> Scene {
        Scene::new(id, SceneType::Architecture, ScenePriority::Medium, complexity)
    }

    #[test]
    fn test_reregister_replaces_in_place() {
        let mut registry = SceneRegistry::new();
        registry.register(scene("a", 2));
        registry.register(scene("b", 3));
        registry.record_render_time(&SceneId::new("a"), 5.0);

        let previous = registry.register(scene("a", 9));

        assert_eq!(previous.map(|s| s.complexity), Some(2));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.iter().next().map(|s| s.complexity), Some(9));
        assert_eq!(registry.render_sample_count(&SceneId::new("a")), 0);
    }

    #[test]
    fn test_unknown_ids_are_tolerated() {
        let mut registry = SceneRegistry::new();
        let ghost = SceneId::new("ghost");
        assert!(!registry.update_status(&ghost, false, false));
        assert!(!registry.record_render_time(&ghost, 10.0));
        assert!(registry.unregister(&ghost).is_none());
    }

    #[test]
    fn test_non_finite_and_negative_render_times_rejected() {
        let mut registry = SceneRegistry::new();
        registry.register(scene("a", 1));
        let id = SceneId::new("a");

        assert!(!registry.record_render_time(&id, f32::NAN));
        assert!(!registry.record_render_time(&id, f32::INFINITY));
        assert!(!registry.record_render_time(&id, -50.0));
        assert!(registry.record_render_time(&id, 10.0));

        assert_eq!(registry.render_sample_count(&id), 1);
        assert_eq!(registry.mean_render_time(), 10.0);
    }

    #[test]
    fn test_render_buffer_keeps_last_thirty() {
        let mut registry = SceneRegistry::new();
        registry.register(scene("a", 1));
        let id = SceneId::new("a");
        for i in 0..40 {
            registry.record_render_time(&id, i as f32);
        }
        assert_eq!(registry.render_sample_count(&id), RENDER_SAMPLES_PER_SCENE);
        assert_eq!(registry.get(&id).map(|s| s.last_render_time), Some(39.0));
        // Samples 10..=39 remain.
        assert_eq!(registry.mean_render_time(), 24.5);
    }

    #[test]
    fn test_active_aggregates_skip_inactive() {
        let mut registry = SceneRegistry::new();
        registry.register(scene("a", 5));
        registry.register(scene("b", 3).with_memory_usage(12.0));
        registry.register(scene("c", 7).with_status(false, true));

        assert_eq!(registry.active_count(), 2);
        assert_eq!(registry.active_complexity(), 8);
        assert_eq!(registry.active_memory_mb(), 62.0);
    }

    #[test]
    fn test_mean_render_time_pools_all_scenes() {
        let mut registry = SceneRegistry::new();
        registry.register(scene("a", 1));
        registry.register(scene("b", 1));
        registry.record_render_time(&SceneId::new("a"), 10.0);
        registry.record_render_time(&SceneId::new("a"), 20.0);
        registry.record_render_time(&SceneId::new("b"), 30.0);
        assert_eq!(registry.mean_render_time(), 20.0);
    }
}
