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

//! Single-step quality reduction and improvement.
//!
//! Each call changes at most one field, walking a fixed ladder so degradation
//! is gradual and observable:
//!
//! 1. particle density
//! 2. shadow quality
//! 3. post-processing
//! 4. anti-aliasing
//! 5. concurrent scene cap
//!
//! Improvement walks the same ladder back towards the tier defaults and never
//! goes past them.

use aura_core::quality::MIN_PARTICLE_DENSITY;
use aura_core::{QualitySettings, ShadowQuality};
use std::fmt;

/// Tolerance for comparing particle densities after repeated stepping.
const DENSITY_EPSILON: f32 = 1e-4;

/// The single change applied by one quality step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityStep {
    /// Particle density moved.
    ParticleDensity {
        /// Previous value.
        from: f32,
        /// New value.
        to: f32,
    },
    /// Shadow level moved.
    ShadowQuality {
        /// Previous level.
        from: ShadowQuality,
        /// New level.
        to: ShadowQuality,
    },
    /// Post-processing toggled to the carried value.
    PostProcessing(bool),
    /// Anti-aliasing toggled to the carried value.
    AntiAliasing(bool),
    /// Concurrent scene cap moved.
    MaxConcurrentScenes {
        /// Previous cap.
        from: u32,
        /// New cap.
        to: u32,
    },
}

impl fmt::Display for QualityStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParticleDensity { from, to } => {
                write!(f, "particle density {from:.1} -> {to:.1}")
            }
            Self::ShadowQuality { from, to } => write!(f, "shadows {from:?} -> {to:?}"),
            Self::PostProcessing(on) => write!(f, "post-processing {}", on_off(*on)),
            Self::AntiAliasing(on) => write!(f, "anti-aliasing {}", on_off(*on)),
            Self::MaxConcurrentScenes { from, to } => {
                write!(f, "max concurrent scenes {from} -> {to}")
            }
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

/// Rounds to one decimal so repeated 0.1 steps do not drift.
fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Moves [`QualitySettings`] along the quality ladder.
#[derive(Debug, Clone)]
pub struct QualityController {
    ceiling: QualitySettings,
    particle_step: f32,
}

impl QualityController {
    /// Creates a controller that never improves past `ceiling`.
    pub fn new(ceiling: QualitySettings, particle_step: f32) -> Self {
        Self {
            ceiling,
            particle_step,
        }
    }

    /// The tier defaults improvement aims for.
    pub fn ceiling(&self) -> &QualitySettings {
        &self.ceiling
    }

    /// Applies the first applicable reduction. `None` when everything is at its floor.
    pub fn reduce(&self, settings: &mut QualitySettings) -> Option<QualityStep> {
        if settings.particle_density > MIN_PARTICLE_DENSITY + DENSITY_EPSILON {
            let from = settings.particle_density;
            let to = round_tenth(from - self.particle_step).max(MIN_PARTICLE_DENSITY);
            settings.particle_density = to;
            return Some(QualityStep::ParticleDensity { from, to });
        }

        if let Some(to) = settings.shadow_quality.step_down() {
            let from = settings.shadow_quality;
            settings.shadow_quality = to;
            return Some(QualityStep::ShadowQuality { from, to });
        }

        if settings.post_processing {
            settings.post_processing = false;
            return Some(QualityStep::PostProcessing(false));
        }

        if settings.anti_aliasing {
            settings.anti_aliasing = false;
            return Some(QualityStep::AntiAliasing(false));
        }

        if settings.max_concurrent_scenes > 1 {
            let from = settings.max_concurrent_scenes;
            settings.max_concurrent_scenes = from - 1;
            return Some(QualityStep::MaxConcurrentScenes { from, to: from - 1 });
        }

        None
    }

    /// Applies the first applicable improvement. `None` when at the ceiling.
    pub fn improve(&self, settings: &mut QualitySettings) -> Option<QualityStep> {
        let ceiling = &self.ceiling;

        if settings.particle_density < ceiling.particle_density - DENSITY_EPSILON {
            let from = settings.particle_density;
            let to = round_tenth(from + self.particle_step).min(ceiling.particle_density);
            settings.particle_density = to;
            return Some(QualityStep::ParticleDensity { from, to });
        }

        if settings.shadow_quality < ceiling.shadow_quality {
            if let Some(to) = settings.shadow_quality.step_up() {
                let from = settings.shadow_quality;
                settings.shadow_quality = to;
                return Some(QualityStep::ShadowQuality { from, to });
            }
        }

        if !settings.post_processing && ceiling.post_processing {
            settings.post_processing = true;
            return Some(QualityStep::PostProcessing(true));
        }

        if !settings.anti_aliasing && ceiling.anti_aliasing {
            settings.anti_aliasing = true;
            return Some(QualityStep::AntiAliasing(true));
        }

        if settings.max_concurrent_scenes < ceiling.max_concurrent_scenes {
            let from = settings.max_concurrent_scenes;
            settings.max_concurrent_scenes = from + 1;
            return Some(QualityStep::MaxConcurrentScenes { from, to: from + 1 });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use aura_core::DeviceTier;

    fn controller(tier: DeviceTier) -> (QualityController, QualitySettings) {
        let settings = QualitySettings::for_tier(tier);
        (QualityController::new(settings, 0.1), settings)
    }

    /// Number of fields that differ between two snapshots.
    fn changed_fields(a: &QualitySettings, b: &QualitySettings) -> usize {
        [
            (a.particle_density - b.particle_density).abs() > DENSITY_EPSILON,
            a.shadow_quality != b.shadow_quality,
            a.post_processing != b.post_processing,
            a.anti_aliasing != b.anti_aliasing,
            a.max_concurrent_scenes != b.max_concurrent_scenes,
        ]
        .iter()
        .filter(|changed| **changed)
        .count()
    }

    #[test]
    fn test_reduction_changes_one_field_in_order() {
        let (ctl, mut settings) = controller(DeviceTier::High);
        let mut steps = Vec::new();

        loop {
            let before = settings;
            match ctl.reduce(&mut settings) {
                Some(step) => {
                    assert_eq!(changed_fields(&before, &settings), 1, "step {step}");
                    steps.push(step);
                }
                None => break,
            }
        }

        // 1.0 -> 0.2 is eight particle steps, then 3 shadow steps, post, AA, 5 scene steps.
        assert_eq!(steps.len(), 8 + 3 + 1 + 1 + 5);
        assert!(matches!(steps[0], QualityStep::ParticleDensity { .. }));
        assert!(matches!(steps[7], QualityStep::ParticleDensity { .. }));
        assert!(matches!(steps[8], QualityStep::ShadowQuality { .. }));
        assert_eq!(steps[11], QualityStep::PostProcessing(false));
        assert_eq!(steps[12], QualityStep::AntiAliasing(false));
        assert!(matches!(steps[13], QualityStep::MaxConcurrentScenes { .. }));

        assert_relative_eq!(settings.particle_density, MIN_PARTICLE_DENSITY);
        assert_eq!(settings.shadow_quality, ShadowQuality::Disabled);
        assert_eq!(settings.max_concurrent_scenes, 1);
    }

    #[test]
    fn test_reduction_at_floor_is_noop() {
        let (ctl, mut settings) = controller(DeviceTier::Low);
        while ctl.reduce(&mut settings).is_some() {}
        let floor = settings;

        for _ in 0..5 {
            assert_eq!(ctl.reduce(&mut settings), None);
        }
        assert_eq!(settings, floor);
    }

    #[test]
    fn test_particle_steps_do_not_drift() {
        let (ctl, mut settings) = controller(DeviceTier::Medium);
        ctl.reduce(&mut settings);
        ctl.reduce(&mut settings);
        ctl.reduce(&mut settings);
        assert_eq!(settings.particle_density, 0.4);
    }

    #[test]
    fn test_improvement_restores_tier_defaults_exactly() {
        let (ctl, mut settings) = controller(DeviceTier::Medium);
        let defaults = settings;
        while ctl.reduce(&mut settings).is_some() {}

        let mut steps = 0;
        loop {
            let before = settings;
            match ctl.improve(&mut settings) {
                Some(_) => {
                    assert_eq!(changed_fields(&before, &settings), 1);
                    steps += 1;
                }
                None => break,
            }
        }

        assert!(steps > 0);
        assert_relative_eq!(settings.particle_density, defaults.particle_density);
        assert_eq!(settings.shadow_quality, defaults.shadow_quality);
        assert_eq!(settings.post_processing, defaults.post_processing);
        assert_eq!(settings.anti_aliasing, defaults.anti_aliasing);
        assert_eq!(settings.max_concurrent_scenes, defaults.max_concurrent_scenes);
    }

    #[test]
    fn test_improvement_follows_reduction_order() {
        let (ctl, mut settings) = controller(DeviceTier::Low);
        ctl.reduce(&mut settings); // particles 0.4 -> 0.3
        settings.shadow_quality = ShadowQuality::Disabled;

        assert_eq!(
            ctl.improve(&mut settings),
            Some(QualityStep::ParticleDensity { from: 0.3, to: 0.4 })
        );
        assert_eq!(
            ctl.improve(&mut settings),
            Some(QualityStep::ShadowQuality {
                from: ShadowQuality::Disabled,
                to: ShadowQuality::Low
            })
        );
        // Low tier has post-processing and AA off by default: nothing left.
        assert_eq!(ctl.improve(&mut settings), None);
    }

    #[test]
    fn test_improvement_never_overshoots_ceiling() {
        let (ctl, mut settings) = controller(DeviceTier::Medium);
        settings.particle_density = 0.65;
        assert_eq!(
            ctl.improve(&mut settings),
            Some(QualityStep::ParticleDensity { from: 0.65, to: 0.7 })
        );
        assert_eq!(ctl.improve(&mut settings), None);
    }

    #[test]
    fn test_improvement_leaves_overrides_above_ceiling() {
        let (ctl, mut settings) = controller(DeviceTier::Low);
        settings.post_processing = true;
        settings.max_concurrent_scenes = 5;
        assert_eq!(ctl.improve(&mut settings), None);
        assert!(settings.post_processing);
        assert_eq!(settings.max_concurrent_scenes, 5);
    }
}
