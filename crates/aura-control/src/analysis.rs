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

//! Heuristic analysis for the governor.
//!
//! The `HeuristicEngine` turns samples into advisory [`PerformanceAlert`]s and
//! decides, from the trailing window of the history, whether quality should
//! move down, move up, or hold.

use crate::config::GovernorConfig;
use crate::metrics::{window_averages, MetricsHistory, WindowAverages};
use aura_core::{
    AlertAction, AlertKind, AlertSeverity, PerformanceAlert, PerformanceMetrics, SceneId,
    Timestamp,
};

/// Outcome of a quality check over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityVerdict {
    /// Too few samples to judge.
    InsufficientData,
    /// Frame rate or memory is out of budget.
    Reduce,
    /// Comfortably inside budget with headroom.
    Improve,
    /// Inside budget but without enough headroom to improve.
    Hold,
}

/// Verdict plus the averages it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendReport {
    /// What to do.
    pub verdict: QualityVerdict,
    /// The averages over the window.
    pub averages: WindowAverages,
}

/// Evaluates samples against the configured thresholds.
#[derive(Debug, Clone)]
pub struct HeuristicEngine {
    config: GovernorConfig,
}

impl HeuristicEngine {
    /// Creates an engine using the thresholds of `config`.
    pub fn new(config: &GovernorConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Evaluates the three sample-level alert conditions.
    ///
    /// The conditions are independent; all three may fire for one sample.
    pub fn evaluate_sample(&self, sample: &PerformanceMetrics) -> Vec<PerformanceAlert> {
        let mut alerts = Vec::new();
        let at = sample.timestamp;

        if sample.fps < self.config.min_fps {
            let severity = if sample.fps < self.config.critical_fps {
                AlertSeverity::Critical
            } else {
                AlertSeverity::High
            };
            alerts.push(
                PerformanceAlert::new(
                    AlertKind::FpsDrop,
                    severity,
                    format!(
                        "Frame rate dropped to {:.0} fps (minimum {:.0})",
                        sample.fps, self.config.min_fps
                    ),
                    at,
                )
                .with_action(AlertAction::ReduceQuality),
            );
        }

        if sample.memory_usage_mb > self.config.memory_threshold_mb {
            alerts.push(
                PerformanceAlert::new(
                    AlertKind::MemoryHigh,
                    AlertSeverity::High,
                    format!(
                        "Memory estimate at {:.1} MB exceeds {:.0} MB",
                        sample.memory_usage_mb, self.config.memory_threshold_mb
                    ),
                    at,
                )
                .with_action(AlertAction::CleanupMemory),
            );
        }

        if sample.gpu_utilization_pct > self.config.gpu_threshold_pct {
            alerts.push(
                PerformanceAlert::new(
                    AlertKind::GpuOverload,
                    AlertSeverity::Medium,
                    format!(
                        "GPU utilisation at {:.0}% exceeds {:.0}%",
                        sample.gpu_utilization_pct, self.config.gpu_threshold_pct
                    ),
                    at,
                )
                .with_action(AlertAction::ReduceQuality),
            );
        }

        alerts
    }

    /// Checks one scene render time against the render-slow threshold.
    pub fn evaluate_render_time(
        &self,
        scene_id: &SceneId,
        render_time_ms: f32,
        at: Timestamp,
    ) -> Option<PerformanceAlert> {
        if render_time_ms <= self.config.render_slow_threshold_ms {
            return None;
        }
        Some(
            PerformanceAlert::new(
                AlertKind::RenderSlow,
                AlertSeverity::Medium,
                format!(
                    "Render took {:.2} ms (threshold {:.2} ms)",
                    render_time_ms, self.config.render_slow_threshold_ms
                ),
                at,
            )
            .for_scene(scene_id.clone())
            .with_action(AlertAction::ReduceQuality),
        )
    }

    /// Judges the trailing window of `history`.
    ///
    /// Reduction takes priority over improvement.
    pub fn assess_trend(&self, history: &MetricsHistory) -> TrendReport {
        if history.count() < self.config.min_trend_samples {
            return TrendReport {
                verdict: QualityVerdict::InsufficientData,
                averages: WindowAverages::default(),
            };
        }

        let averages = window_averages(history, self.config.trend_window);
        let verdict = if averages.fps < self.config.min_fps
            || averages.memory_mb > self.config.memory_threshold_mb
        {
            QualityVerdict::Reduce
        } else if averages.fps > self.improve_fps_floor()
            && averages.memory_mb < self.improve_memory_ceiling()
        {
            QualityVerdict::Improve
        } else {
            QualityVerdict::Hold
        };

        TrendReport { verdict, averages }
    }

    /// Whether the latest sample leaves room for the post-unregistration improvement.
    pub fn recheck_allows_improvement(&self, latest: Option<&PerformanceMetrics>) -> bool {
        latest.is_some_and(|m| m.fps >= self.improve_fps_floor())
    }

    fn improve_fps_floor(&self) -> f32 {
        self.config.target_fps * self.config.improve_fps_ratio
    }

    fn improve_memory_ceiling(&self) -> f32 {
        self.config.memory_threshold_mb * self.config.improve_memory_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HeuristicEngine {
        HeuristicEngine::new(&GovernorConfig::default())
    }

    fn sample(fps: f32, memory_mb: f32, gpu: f32) -> PerformanceMetrics {
        PerformanceMetrics {
            fps,
            frame_time_ms: if fps > 0.0 { 1000.0 / fps } else { 0.0 },
            memory_usage_mb: memory_mb,
            gpu_utilization_pct: gpu,
            ..Default::default()
        }
    }

    fn history_of(fps: &[f32], memory_mb: f32) -> MetricsHistory {
        let mut history = MetricsHistory::new();
        for &f in fps {
            history.push(sample(f, memory_mb, 10.0));
        }
        history
    }

    #[test]
    fn test_fps_severity_boundaries() {
        let e = engine();

        let alerts = e.evaluate_sample(&sample(14.0, 0.0, 0.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::FpsDrop);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].action, Some(AlertAction::ReduceQuality));

        let alerts = e.evaluate_sample(&sample(25.0, 0.0, 0.0));
        assert_eq!(alerts[0].severity, AlertSeverity::High);

        assert!(e.evaluate_sample(&sample(31.0, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_all_conditions_fire_together() {
        let alerts = engine().evaluate_sample(&sample(20.0, 250.0, 95.0));
        let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::FpsDrop, AlertKind::MemoryHigh, AlertKind::GpuOverload]
        );
        assert_eq!(alerts[1].action, Some(AlertAction::CleanupMemory));
        assert_eq!(alerts[2].severity, AlertSeverity::Medium);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert!(engine().evaluate_sample(&sample(30.0, 200.0, 90.0)).is_empty());
    }

    #[test]
    fn test_render_slow_threshold() {
        let e = engine();
        let id = SceneId::new("timeline");
        assert!(e.evaluate_render_time(&id, 33.34, Timestamp::ZERO).is_none());

        let alert = e
            .evaluate_render_time(&id, 40.0, Timestamp::ZERO)
            .expect("40ms is over budget");
        assert_eq!(alert.kind, AlertKind::RenderSlow);
        assert_eq!(alert.severity, AlertSeverity::Medium);
        assert_eq!(alert.scene_id, Some(id));
    }

    #[test]
    fn test_trend_needs_three_samples() {
        let report = engine().assess_trend(&history_of(&[10.0, 10.0], 50.0));
        assert_eq!(report.verdict, QualityVerdict::InsufficientData);
    }

    #[test]
    fn test_trend_reduce_on_low_fps_or_memory() {
        let e = engine();
        assert_eq!(
            e.assess_trend(&history_of(&[25.0, 28.0, 29.0], 50.0)).verdict,
            QualityVerdict::Reduce
        );
        assert_eq!(
            e.assess_trend(&history_of(&[60.0, 60.0, 60.0], 210.0)).verdict,
            QualityVerdict::Reduce
        );
    }

    #[test]
    fn test_trend_improve_needs_headroom() {
        let e = engine();
        let report = e.assess_trend(&history_of(&[58.0, 59.0, 61.0, 60.0, 62.0], 50.0));
        assert_eq!(report.verdict, QualityVerdict::Improve);
        assert_eq!(report.averages.fps, 60.0);

        // Memory at 150 MB is above 70% of the threshold.
        assert_eq!(
            e.assess_trend(&history_of(&[60.0, 60.0, 60.0], 150.0)).verdict,
            QualityVerdict::Hold
        );
        // 50 fps is below 90% of target.
        assert_eq!(
            e.assess_trend(&history_of(&[50.0, 50.0, 50.0], 50.0)).verdict,
            QualityVerdict::Hold
        );
    }

    #[test]
    fn test_trend_only_reads_window() {
        // Five old bad samples followed by five good ones.
        let report = engine().assess_trend(&history_of(
            &[5.0, 5.0, 5.0, 5.0, 5.0, 60.0, 60.0, 60.0, 60.0, 60.0],
            50.0,
        ));
        assert_eq!(report.verdict, QualityVerdict::Improve);
    }

    #[test]
    fn test_recheck_gate() {
        let e = engine();
        assert!(!e.recheck_allows_improvement(None));
        assert!(e.recheck_allows_improvement(Some(&sample(54.0, 0.0, 0.0))));
        assert!(!e.recheck_allows_improvement(Some(&sample(53.0, 0.0, 0.0))));
    }
}
