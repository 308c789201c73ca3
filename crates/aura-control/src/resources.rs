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

//! Resource-pool accounting and the periodic estimate decay.
//!
//! The decay multiplies a memory *estimate*. It frees nothing. Consumers use
//! the decayed figure for display only, so the curve is kept exactly as is.

use aura_core::{ResourceKind, ResourcePool, Timestamp};
use std::time::Duration;

/// Owns the [`ResourcePool`] counters and applies the cleanup decay.
#[derive(Debug, Clone)]
pub struct ResourceTracker {
    pool: ResourcePool,
    min_age: Duration,
    decay_factor: f32,
}

impl ResourceTracker {
    /// Creates an empty tracker whose cleanup clock starts at `now`.
    pub fn new(now: Timestamp, min_age: Duration, decay_factor: f32) -> Self {
        Self {
            pool: ResourcePool::new(now),
            min_age,
            decay_factor,
        }
    }

    /// A copy of the current pool.
    pub fn snapshot(&self) -> ResourcePool {
        self.pool
    }

    /// Current memory estimate in MB.
    pub fn memory_usage_mb(&self) -> f32 {
        self.pool.memory_usage_mb
    }

    /// Counts one more resource of `kind` costing `memory_mb`.
    pub fn track(&mut self, kind: ResourceKind, memory_mb: f32) {
        *self.pool.counter_mut(kind) += 1;
        self.pool.memory_usage_mb += memory_mb.max(0.0);
    }

    /// Counts one fewer resource of `kind`, saturating at zero.
    pub fn release(&mut self, kind: ResourceKind, memory_mb: f32) {
        let counter = self.pool.counter_mut(kind);
        *counter = counter.saturating_sub(1);
        self.pool.memory_usage_mb = (self.pool.memory_usage_mb - memory_mb.max(0.0)).max(0.0);
    }

    /// Decays the estimate if more than the minimum age has passed since the last decay.
    ///
    /// Returns the new pool snapshot when a decay happened.
    pub fn cleanup(&mut self, now: Timestamp) -> Option<ResourcePool> {
        let elapsed = now.saturating_duration_since(self.pool.last_cleanup);
        if elapsed <= self.min_age {
            log::trace!(
                "Resource cleanup skipped: {:.1}s since last cleanup.",
                elapsed.as_secs_f32()
            );
            return None;
        }
        Some(self.force_cleanup(now))
    }

    /// Decays the estimate unconditionally.
    pub fn force_cleanup(&mut self, now: Timestamp) -> ResourcePool {
        let before = self.pool.memory_usage_mb;
        self.pool.memory_usage_mb = before * self.decay_factor;
        self.pool.last_cleanup = now;
        log::debug!(
            "Resource estimate decayed {:.1} MB -> {:.1} MB",
            before,
            self.pool.memory_usage_mb
        );
        self.pool
    }

    /// Empties the pool and restarts the cleanup clock.
    pub fn reset(&mut self, now: Timestamp) {
        self.pool = ResourcePool::new(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tracker() -> ResourceTracker {
        ResourceTracker::new(Timestamp::ZERO, Duration::from_secs(60), 0.9)
    }

    #[test]
    fn test_decay_after_min_age() {
        let mut t = tracker();
        t.track(ResourceKind::Texture, 100.0);

        let pool = t
            .cleanup(Timestamp::from_secs(61))
            .expect("61s is past the gate");
        assert_relative_eq!(pool.memory_usage_mb, 90.0);
        assert_eq!(pool.last_cleanup, Timestamp::from_secs(61));

        assert!(t.cleanup(Timestamp::from_secs(62)).is_none());
        assert_relative_eq!(t.memory_usage_mb(), 90.0);
    }

    #[test]
    fn test_no_decay_before_min_age() {
        let mut t = tracker();
        t.track(ResourceKind::Geometry, 50.0);
        assert!(t.cleanup(Timestamp::from_secs(30)).is_none());
        assert!(t.cleanup(Timestamp::from_secs(60)).is_none());
        assert_relative_eq!(t.memory_usage_mb(), 50.0);
    }

    #[test]
    fn test_force_cleanup_ignores_gate() {
        let mut t = tracker();
        t.track(ResourceKind::Shader, 10.0);
        let pool = t.force_cleanup(Timestamp::from_secs(1));
        assert_relative_eq!(pool.memory_usage_mb, 9.0);
    }

    #[test]
    fn test_release_saturates() {
        let mut t = tracker();
        t.track(ResourceKind::Material, 5.0);
        t.release(ResourceKind::Material, 8.0);
        t.release(ResourceKind::Material, 1.0);
        let pool = t.snapshot();
        assert_eq!(pool.materials, 0);
        assert_eq!(pool.memory_usage_mb, 0.0);
    }
}
