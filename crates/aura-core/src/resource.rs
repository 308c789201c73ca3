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

//! Graphics-resource accounting.
//!
//! The governor never owns GPU handles. It only keeps counts and an aggregate
//! memory estimate in a [`ResourcePool`]. Whoever does own the handles may
//! implement [`ResourceManager`] so that critical memory alerts can ask it to
//! release what it can.

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Category of a tracked graphics resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Vertex/index data.
    Geometry,
    /// Material parameter blocks.
    Material,
    /// Images uploaded to the GPU.
    Texture,
    /// Compiled shader programs.
    Shader,
}

/// Counts and memory estimate of live graphics resources.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourcePool {
    /// Live geometries.
    pub geometries: u32,
    /// Live materials.
    pub materials: u32,
    /// Live textures.
    pub textures: u32,
    /// Live shader programs.
    pub shaders: u32,
    /// Aggregate memory estimate in MB.
    pub memory_usage_mb: f32,
    /// When the estimate was last decayed.
    pub last_cleanup: Timestamp,
}

impl ResourcePool {
    /// Creates an empty pool whose cleanup clock starts at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            last_cleanup: now,
            ..Self::default()
        }
    }

    /// Total number of tracked resources.
    pub fn total_count(&self) -> u32 {
        self.geometries + self.materials + self.textures + self.shaders
    }

    /// Mutable access to the counter for `kind`.
    pub fn counter_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Geometry => &mut self.geometries,
            ResourceKind::Material => &mut self.materials,
            ResourceKind::Texture => &mut self.textures,
            ResourceKind::Shader => &mut self.shaders,
        }
    }
}

/// The collaborator that owns real graphics-resource handles.
pub trait ResourceManager {
    /// Releases every resource that is not strictly needed right now.
    fn force_cleanup(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_mut_targets_kind() {
        let mut pool = ResourcePool::new(Timestamp::ZERO);
        *pool.counter_mut(ResourceKind::Texture) += 3;
        *pool.counter_mut(ResourceKind::Shader) += 1;
        assert_eq!(pool.textures, 3);
        assert_eq!(pool.shaders, 1);
        assert_eq!(pool.total_count(), 4);
    }
}
