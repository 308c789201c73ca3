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

//! Point-in-time summary of a governor, rendered as JSON.

use aura_control::PerformanceGovernor;
use aura_core::{DeviceTier, PerformanceMetrics, QualitySettings, ResourcePool};
use serde::Serialize;

/// Frame rate statistics over the stored history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FpsSummary {
    /// Lowest sampled frame rate.
    pub min: f32,
    /// Mean sampled frame rate.
    pub avg: f32,
    /// Highest sampled frame rate.
    pub max: f32,
}

/// Frame time statistics over the stored history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrameTimeSummary {
    /// Mean frame time in milliseconds.
    pub avg_ms: f32,
    /// 95th percentile frame time (nearest rank) in milliseconds.
    pub p95_ms: f32,
}

/// Registered scene counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SceneCounts {
    /// Every registered scene.
    pub registered: usize,
    /// Scenes currently rendering.
    pub active: usize,
    /// Scenes currently in the viewport.
    pub visible: usize,
}

/// A serializable snapshot of governor state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    /// Tier the device was classified into.
    pub device_tier: DeviceTier,
    /// Number of samples the statistics were computed from.
    pub samples: usize,
    /// Frame rate statistics.
    pub fps: FpsSummary,
    /// Frame time statistics.
    pub frame_time: FrameTimeSummary,
    /// Highest sampled memory estimate in MB.
    pub peak_memory_mb: f32,
    /// Quality settings at capture time.
    pub quality: QualitySettings,
    /// Scene counts at capture time.
    pub scenes: SceneCounts,
    /// Resource pool at capture time.
    pub resources: ResourcePool,
}

impl PerformanceReport {
    /// Captures the governor's current state and history.
    pub fn capture(governor: &PerformanceGovernor) -> Self {
        let history = governor.metrics_history();
        let scenes = governor.scenes();

        Self {
            device_tier: governor.device_capability().tier,
            samples: history.len(),
            fps: fps_summary(&history),
            frame_time: frame_time_summary(&history),
            peak_memory_mb: history
                .iter()
                .map(|m| m.memory_usage_mb)
                .fold(0.0, f32::max),
            quality: governor.quality_settings(),
            scenes: SceneCounts {
                registered: scenes.len(),
                active: scenes.iter().filter(|s| s.is_active).count(),
                visible: scenes.iter().filter(|s| s.is_visible).count(),
            },
            resources: governor.resource_usage(),
        }
    }

    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn fps_summary(history: &[PerformanceMetrics]) -> FpsSummary {
    if history.is_empty() {
        return FpsSummary::default();
    }
    let (min, max, sum) = history.iter().fold(
        (f32::INFINITY, f32::NEG_INFINITY, 0.0),
        |(min, max, sum), m| (min.min(m.fps), max.max(m.fps), sum + m.fps),
    );
    FpsSummary {
        min,
        avg: sum / history.len() as f32,
        max,
    }
}

fn frame_time_summary(history: &[PerformanceMetrics]) -> FrameTimeSummary {
    if history.is_empty() {
        return FrameTimeSummary::default();
    }
    let mut times: Vec<f32> = history.iter().map(|m| m.frame_time_ms).collect();
    times.sort_by(f32::total_cmp);
    let rank = ((times.len() as f32 * 0.95).ceil() as usize).clamp(1, times.len());

    FrameTimeSummary {
        avg_ms: times.iter().sum::<f32>() / times.len() as f32,
        p95_ms: times[rank - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use aura_control::GovernorConfig;
    use aura_core::{
        ManualClock, ProbeError, ProbeReport, ResourceKind, Scene, ScenePriority, SceneType,
        Timestamp,
    };
    use std::sync::Arc;

    fn governor() -> PerformanceGovernor {
        let probe = || -> Result<ProbeReport, ProbeError> { Ok(ProbeReport::default()) };
        PerformanceGovernor::new(
            GovernorConfig::default(),
            &probe,
            Arc::new(ManualClock::default()),
        )
    }

    fn metrics(frame_time_ms: f32, memory_mb: f32) -> PerformanceMetrics {
        PerformanceMetrics {
            memory_usage_mb: memory_mb,
            ..PerformanceMetrics::from_frame_time(frame_time_ms, Timestamp::ZERO)
        }
    }

    #[test]
    fn test_empty_history_reports_zeros() {
        let report = PerformanceReport::capture(&governor());
        assert_eq!(report.samples, 0);
        assert_eq!(report.fps, FpsSummary::default());
        assert_eq!(report.peak_memory_mb, 0.0);
        assert_eq!(report.device_tier, DeviceTier::Medium);
    }

    #[test]
    fn test_statistics_over_history() {
        let mut gov = governor();
        // 20 samples: 19 at 16 ms and one 25 ms spike.
        for i in 0..20 {
            let frame = if i == 7 { 25.0 } else { 16.0 };
            gov.record_metrics(metrics(frame, 40.0 + i as f32));
        }

        let report = PerformanceReport::capture(&gov);
        assert_eq!(report.samples, 20);
        assert_eq!(report.fps.min, 40.0);
        assert_eq!(report.fps.max, 63.0);
        assert_relative_eq!(report.frame_time.avg_ms, 16.45, epsilon = 1e-4);
        assert_eq!(report.frame_time.p95_ms, 16.0);
        assert_eq!(report.peak_memory_mb, 59.0);
    }

    #[test]
    fn test_scene_counts_and_json() {
        let mut gov = governor();
        gov.register_scene(Scene::new("a", SceneType::Timeline, ScenePriority::High, 2));
        gov.register_scene(
            Scene::new("b", SceneType::SkillCard, ScenePriority::Low, 2).with_status(false, true),
        );
        gov.track_resource(ResourceKind::Texture, 12.5);

        let report = PerformanceReport::capture(&gov);
        assert_eq!(
            report.scenes,
            SceneCounts {
                registered: 2,
                active: 1,
                visible: 2
            }
        );

        let json = report.to_json().expect("report serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["scenes"]["active"], 1);
        assert_eq!(value["resources"]["textures"], 1);
        assert_eq!(value["device_tier"], "medium");
    }
}
