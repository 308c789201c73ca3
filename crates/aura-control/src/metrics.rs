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

//! Bounded storage for rolling performance samples.

use aura_core::PerformanceMetrics;

/// Number of samples kept in the metrics history.
pub const HISTORY_CAPACITY: usize = 100;
/// Number of render-time samples kept per scene.
pub const RENDER_SAMPLES_PER_SCENE: usize = 30;

/// Rolling history of aggregate samples, oldest evicted first.
pub type MetricsHistory = RingBuffer<PerformanceMetrics, HISTORY_CAPACITY>;

/// A fixed-size circular buffer.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    data: [T; N],
    /// Slot the next push writes to.
    head: usize,
    count: usize,
}

impl<T: Default + Copy, const N: usize> RingBuffer<T, N> {
    /// Creates a new, empty ring buffer.
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            head: 0,
            count: 0,
        }
    }

    /// Pushes a new value, overwriting the oldest if full.
    pub fn push(&mut self, value: T) {
        self.data[self.head] = value;
        self.head = (self.head + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    /// Returns the number of elements currently in the buffer.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns `true` if nothing was pushed since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the most recently pushed value.
    pub fn latest(&self) -> Option<&T> {
        if self.count == 0 {
            return None;
        }
        Some(&self.data[(self.head + N - 1) % N])
    }

    /// Returns an iterator over the values in chronological order (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let start = (self.head + N - self.count) % N;
        (0..self.count).map(move |i| &self.data[(start + i) % N])
    }

    /// Returns the newest `n` values in chronological order.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> + '_ {
        self.iter().skip(self.count.saturating_sub(n))
    }

    /// Copies the values out in chronological order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }

    /// Forgets every value.
    pub fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
    }
}

impl<T: Default + Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<f32, N> {
    /// Calculates the arithmetic mean of the values in the buffer.
    pub fn average(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum() / self.count as f32
    }

    /// Sum of every value in the buffer.
    pub fn sum(&self) -> f32 {
        self.iter().sum()
    }
}

/// Mean of `fps` and `memory_usage_mb` over a window of samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowAverages {
    /// Number of samples averaged.
    pub samples: usize,
    /// Mean frame rate.
    pub fps: f32,
    /// Mean memory estimate in MB.
    pub memory_mb: f32,
}

/// Averages the newest `window` samples of `history`.
pub fn window_averages(history: &MetricsHistory, window: usize) -> WindowAverages {
    let (samples, fps, memory_mb) = history
        .recent(window)
        .fold((0usize, 0.0f32, 0.0f32), |(n, fps, mem), m| {
            (n + 1, fps + m.fps, mem + m.memory_usage_mb)
        });
    if samples == 0 {
        return WindowAverages::default();
    }
    WindowAverages {
        samples,
        fps: fps / samples as f32,
        memory_mb: memory_mb / samples as f32,
    }
}
