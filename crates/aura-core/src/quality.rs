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

//! The shared rendering-quality control surface.

use crate::platform::DeviceTier;
use serde::{Deserialize, Serialize};

/// Lowest particle density the governor will ever apply.
pub const MIN_PARTICLE_DENSITY: f32 = 0.2;
/// Highest particle density any tier allows.
pub const MAX_PARTICLE_DENSITY: f32 = 1.0;

/// Shadow rendering level, ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowQuality {
    /// No shadows.
    Disabled,
    /// Low resolution shadow maps.
    Low,
    /// Medium resolution shadow maps.
    Medium,
    /// Full resolution, soft shadows.
    High,
}

impl ShadowQuality {
    /// The next cheaper level, or `None` when shadows are already disabled.
    pub fn step_down(self) -> Option<Self> {
        match self {
            Self::High => Some(Self::Medium),
            Self::Medium => Some(Self::Low),
            Self::Low => Some(Self::Disabled),
            Self::Disabled => None,
        }
    }

    /// The next more expensive level, or `None` at the top.
    pub fn step_up(self) -> Option<Self> {
        match self {
            Self::Disabled => Some(Self::Low),
            Self::Low => Some(Self::Medium),
            Self::Medium => Some(Self::High),
            Self::High => None,
        }
    }
}

/// Texture resolution class. Set once from the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureQuality {
    /// Quarter resolution.
    Low,
    /// Half resolution.
    Medium,
    /// Full resolution.
    High,
}

/// Animation fidelity. Set once from the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationQuality {
    /// Static frames only.
    Minimal,
    /// Fewer animated elements at a lower update rate.
    Reduced,
    /// Every animation at full rate.
    Full,
}

/// Direction of a manual quality adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityDirection {
    /// Towards cheaper rendering.
    Reduce,
    /// Towards the tier defaults.
    Improve,
}

/// The rendering-cost knobs shared by every scene.
///
/// Only `particle_density`, `shadow_quality`, `post_processing`,
/// `anti_aliasing` and `max_concurrent_scenes` move at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualitySettings {
    /// Tier the settings were derived from. Never changes.
    pub device_tier: DeviceTier,
    /// How many scenes may be active at once. Always at least 1.
    pub max_concurrent_scenes: u32,
    /// Fraction of particles emitted, within `[0.2, 1.0]`.
    pub particle_density: f32,
    /// Shadow level.
    pub shadow_quality: ShadowQuality,
    /// Bloom, tone mapping and similar passes.
    pub post_processing: bool,
    /// Multisample anti-aliasing.
    pub anti_aliasing: bool,
    /// Texture resolution class.
    pub texture_quality: TextureQuality,
    /// Animation fidelity.
    pub animation_quality: AnimationQuality,
}

impl QualitySettings {
    /// Optimal settings for a device tier.
    ///
    /// | Tier | Scenes | Particles | Shadows | Post | AA | Textures | Animation |
    /// |---|---|---|---|---|---|---|---|
    /// | High | 6 | 1.0 | High | on | on | High | Full |
    /// | Medium | 3 | 0.7 | Medium | on | on | Medium | Full |
    /// | Low | 2 | 0.4 | Low | off | off | Low | Reduced |
    pub fn for_tier(tier: DeviceTier) -> Self {
        match tier {
            DeviceTier::High => Self {
                device_tier: tier,
                max_concurrent_scenes: 6,
                particle_density: 1.0,
                shadow_quality: ShadowQuality::High,
                post_processing: true,
                anti_aliasing: true,
                texture_quality: TextureQuality::High,
                animation_quality: AnimationQuality::Full,
            },
            DeviceTier::Medium => Self {
                device_tier: tier,
                max_concurrent_scenes: 3,
                particle_density: 0.7,
                shadow_quality: ShadowQuality::Medium,
                post_processing: true,
                anti_aliasing: true,
                texture_quality: TextureQuality::Medium,
                animation_quality: AnimationQuality::Full,
            },
            DeviceTier::Low => Self {
                device_tier: tier,
                max_concurrent_scenes: 2,
                particle_density: 0.4,
                shadow_quality: ShadowQuality::Low,
                post_processing: false,
                anti_aliasing: false,
                texture_quality: TextureQuality::Low,
                animation_quality: AnimationQuality::Reduced,
            },
        }
    }

    /// Brings the adjustable fields back inside their legal ranges.
    pub fn sanitized(mut self) -> Self {
        self.particle_density = if self.particle_density.is_finite() {
            self.particle_density
                .clamp(MIN_PARTICLE_DENSITY, MAX_PARTICLE_DENSITY)
        } else {
            MIN_PARTICLE_DENSITY
        };
        self.max_concurrent_scenes = self.max_concurrent_scenes.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_ladder() {
        assert_eq!(ShadowQuality::High.step_down(), Some(ShadowQuality::Medium));
        assert_eq!(ShadowQuality::Disabled.step_down(), None);
        assert_eq!(ShadowQuality::Disabled.step_up(), Some(ShadowQuality::Low));
        assert_eq!(ShadowQuality::High.step_up(), None);
        assert!(ShadowQuality::Disabled < ShadowQuality::Low);
    }

    #[test]
    fn test_tier_defaults_are_ordered() {
        let high = QualitySettings::for_tier(DeviceTier::High);
        let low = QualitySettings::for_tier(DeviceTier::Low);
        assert!(high.particle_density > low.particle_density);
        assert!(high.max_concurrent_scenes > low.max_concurrent_scenes);
        assert_eq!(QualitySettings::for_tier(DeviceTier::Medium).max_concurrent_scenes, 3);
    }

    #[test]
    fn test_sanitized_clamps() {
        let mut s = QualitySettings::for_tier(DeviceTier::High);
        s.particle_density = 3.0;
        s.max_concurrent_scenes = 0;
        let s = s.sanitized();
        assert_eq!(s.particle_density, 1.0);
        assert_eq!(s.max_concurrent_scenes, 1);

        let mut s = QualitySettings::for_tier(DeviceTier::Low);
        s.particle_density = f32::NAN;
        assert_eq!(s.sanitized().particle_density, MIN_PARTICLE_DENSITY);
    }
}
