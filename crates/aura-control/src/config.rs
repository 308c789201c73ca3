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

//! Tunable thresholds and intervals for the governor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while loading or validating a [`GovernorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid RON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// A value is out of its legal range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the performance governor.
///
/// Every field has a default, so a RON file only needs to list what it
/// overrides:
///
/// ```ron
/// (
///     target_fps: 60.0,
///     memory_threshold_mb: 256.0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Frame rate the governor aims for.
    pub target_fps: f32,
    /// Frame rate below which an `fps-drop` alert is raised.
    pub min_fps: f32,
    /// Frame rate below which the `fps-drop` alert becomes critical.
    pub critical_fps: f32,
    /// Memory estimate (MB) above which a `memory-high` alert is raised.
    pub memory_threshold_mb: f32,
    /// GPU utilisation (%) above which a `gpu-overload` alert is raised.
    pub gpu_threshold_pct: f32,
    /// Per-scene render time (ms) above which a `render-slow` alert is raised.
    /// Twice the 60 fps frame budget.
    pub render_slow_threshold_ms: f32,
    /// Period of the sampling pass.
    pub sampling_interval_ms: u64,
    /// Period of the quality-check pass.
    pub quality_check_interval_ms: u64,
    /// Period of the resource-cleanup pass.
    pub cleanup_interval_ms: u64,
    /// Minimum time between two decays of the resource estimate.
    pub cleanup_min_age_ms: u64,
    /// Factor applied to the resource estimate on each decay.
    pub cleanup_decay_factor: f32,
    /// Delay before the improvement re-check that follows an unregistration.
    pub recheck_delay_ms: u64,
    /// Number of trailing samples averaged by the quality check.
    pub trend_window: usize,
    /// Minimum history length before the quality check acts.
    pub min_trend_samples: usize,
    /// Fraction of `target_fps` the average must exceed before improving.
    pub improve_fps_ratio: f32,
    /// Fraction of `memory_threshold_mb` the average must stay under before improving.
    pub improve_memory_ratio: f32,
    /// Particle density change per quality step.
    pub particle_step: f32,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            min_fps: 30.0,
            critical_fps: 15.0,
            memory_threshold_mb: 200.0,
            gpu_threshold_pct: 90.0,
            render_slow_threshold_ms: 33.34,
            sampling_interval_ms: 1_000,
            quality_check_interval_ms: 5_000,
            cleanup_interval_ms: 30_000,
            cleanup_min_age_ms: 60_000,
            cleanup_decay_factor: 0.9,
            recheck_delay_ms: 2_000,
            trend_window: 5,
            min_trend_samples: 3,
            improve_fps_ratio: 0.9,
            improve_memory_ratio: 0.7,
            particle_step: 0.1,
        }
    }
}

impl GovernorConfig {
    /// Parses a RON document and validates it.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loading governor config from {}", path.display());
        Self::from_ron_str(&source)
    }

    /// Checks that every value is inside its legal range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )))
            }
        }
        fn ratio(name: &str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{name} must be within (0, 1], got {value}"
                )))
            }
        }

        positive("target_fps", self.target_fps)?;
        positive("min_fps", self.min_fps)?;
        positive("critical_fps", self.critical_fps)?;
        positive("memory_threshold_mb", self.memory_threshold_mb)?;
        positive("gpu_threshold_pct", self.gpu_threshold_pct)?;
        positive("render_slow_threshold_ms", self.render_slow_threshold_ms)?;
        positive("particle_step", self.particle_step)?;
        ratio("cleanup_decay_factor", self.cleanup_decay_factor)?;
        ratio("improve_fps_ratio", self.improve_fps_ratio)?;
        ratio("improve_memory_ratio", self.improve_memory_ratio)?;

        if self.critical_fps > self.min_fps || self.min_fps > self.target_fps {
            return Err(ConfigError::Invalid(format!(
                "expected critical_fps <= min_fps <= target_fps, got {} / {} / {}",
                self.critical_fps, self.min_fps, self.target_fps
            )));
        }
        if self.sampling_interval_ms == 0
            || self.quality_check_interval_ms == 0
            || self.cleanup_interval_ms == 0
        {
            return Err(ConfigError::Invalid(
                "timer intervals must be non-zero".to_string(),
            ));
        }
        if self.trend_window == 0 || self.min_trend_samples == 0 {
            return Err(ConfigError::Invalid(
                "trend_window and min_trend_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Period of the sampling pass.
    pub fn sampling_interval(&self) -> Duration {
        Duration::from_millis(self.sampling_interval_ms)
    }

    /// Period of the quality-check pass.
    pub fn quality_check_interval(&self) -> Duration {
        Duration::from_millis(self.quality_check_interval_ms)
    }

    /// Period of the resource-cleanup pass.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Minimum time between two decays of the resource estimate.
    pub fn cleanup_min_age(&self) -> Duration {
        Duration::from_millis(self.cleanup_min_age_ms)
    }

    /// Delay of the post-unregistration improvement re-check.
    pub fn recheck_delay(&self) -> Duration {
        Duration::from_millis(self.recheck_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = GovernorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.render_slow_threshold_ms, 33.34);
        assert_eq!(config.sampling_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config =
            GovernorConfig::from_ron_str("(target_fps: 120.0, memory_threshold_mb: 512.0)")
                .expect("partial config should parse");
        assert_eq!(config.target_fps, 120.0);
        assert_eq!(config.memory_threshold_mb, 512.0);
        assert_eq!(config.min_fps, 30.0);
        assert_eq!(config.trend_window, 5);
    }

    #[test]
    fn test_inverted_fps_thresholds_rejected() {
        let err = GovernorConfig::from_ron_str("(min_fps: 10.0, critical_fps: 20.0)")
            .expect_err("critical above min must be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = GovernorConfig {
            sampling_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        let err = GovernorConfig::from_ron_str("(target_fps: )").expect_err("must not parse");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "(cleanup_decay_factor: 0.5)").expect("write config");

        let config = GovernorConfig::load(file.path()).expect("config should load");
        assert_eq!(config.cleanup_decay_factor, 0.5);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = GovernorConfig::load(dir.path().join("missing.ron")).expect_err("no file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
