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

//! Point-in-time performance samples.

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// One aggregate performance sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Frames per second, rounded to a whole number.
    pub fps: f32,
    /// Duration of a frame in milliseconds.
    pub frame_time_ms: f32,
    /// Estimated memory in use, in MB.
    pub memory_usage_mb: f32,
    /// Estimated GPU utilisation, 0 to 100.
    pub gpu_utilization_pct: f32,
    /// Mean recent per-scene render time, in milliseconds.
    pub render_time_ms: f32,
    /// When the sample was taken.
    pub timestamp: Timestamp,
}

impl PerformanceMetrics {
    /// Builds a sample from a frame time, deriving the rounded frame rate.
    ///
    /// A zero (or negative) frame time yields `fps == 0`.
    pub fn from_frame_time(frame_time_ms: f32, timestamp: Timestamp) -> Self {
        let fps = if frame_time_ms > 0.0 {
            (1000.0 / frame_time_ms).round()
        } else {
            0.0
        };
        Self {
            fps,
            frame_time_ms,
            timestamp,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_is_rounded() {
        let m = PerformanceMetrics::from_frame_time(16.0, Timestamp::ZERO);
        assert_eq!(m.fps, 63.0);
    }

    #[test]
    fn test_zero_frame_time_is_zero_fps() {
        let m = PerformanceMetrics::from_frame_time(0.0, Timestamp::ZERO);
        assert_eq!(m.fps, 0.0);
    }
}
