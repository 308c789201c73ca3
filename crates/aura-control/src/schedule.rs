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

//! Tick-driven timers.
//!
//! The governor owns no OS timers. The embedding scheduler reports the time
//! and these types decide which periodic passes and deferred tasks are due.

use aura_core::Timestamp;
use std::time::Duration;

/// A periodic timer polled with the current time.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<Timestamp>,
}

impl IntervalTimer {
    /// Creates a disarmed timer.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arms the timer so that it first fires one period after `now`.
    pub fn arm(&mut self, now: Timestamp) {
        self.next_due = Some(now + self.period);
    }

    /// Cancels the timer.
    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    /// Returns `true` while the timer is armed.
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// When the timer fires next, if armed.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.next_due
    }

    /// Returns `true` if the timer is due at `now`, and reschedules it.
    ///
    /// A timer that fell several periods behind fires once and is
    /// rescheduled relative to `now`.
    pub fn poll(&mut self, now: Timestamp) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                let next = due + self.period;
                self.next_due = Some(if next <= now { now + self.period } else { next });
                true
            }
            _ => false,
        }
    }
}

/// Which periodic passes are due on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DuePasses {
    /// Metrics sampling.
    pub sample: bool,
    /// Quality check.
    pub quality_check: bool,
    /// Resource cleanup.
    pub cleanup: bool,
}

/// The three monitoring timers of the governor.
#[derive(Debug, Clone)]
pub struct MonitoringSchedule {
    sampling: IntervalTimer,
    quality_check: IntervalTimer,
    cleanup: IntervalTimer,
}

impl MonitoringSchedule {
    /// Creates a disarmed schedule.
    pub fn new(sampling: Duration, quality_check: Duration, cleanup: Duration) -> Self {
        Self {
            sampling: IntervalTimer::new(sampling),
            quality_check: IntervalTimer::new(quality_check),
            cleanup: IntervalTimer::new(cleanup),
        }
    }

    /// Arms all three timers. Already-armed timers keep their phase.
    pub fn start(&mut self, now: Timestamp) {
        for timer in self.timers_mut() {
            if !timer.is_armed() {
                timer.arm(now);
            }
        }
    }

    /// Disarms all three timers.
    pub fn stop(&mut self) {
        for timer in self.timers_mut() {
            timer.disarm();
        }
    }

    /// Returns `true` while the schedule is running.
    pub fn is_running(&self) -> bool {
        self.sampling.is_armed()
    }

    /// Polls every timer at `now`.
    pub fn poll(&mut self, now: Timestamp) -> DuePasses {
        DuePasses {
            sample: self.sampling.poll(now),
            quality_check: self.quality_check.poll(now),
            cleanup: self.cleanup.poll(now),
        }
    }

    fn timers_mut(&mut self) -> [&mut IntervalTimer; 3] {
        [
            &mut self.sampling,
            &mut self.quality_check,
            &mut self.cleanup,
        ]
    }
}

/// Work scheduled to run once at a later time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Improve quality by one step if the latest sample has headroom.
    ImprovementRecheck,
}

/// One-shot tasks ordered by due time.
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    pending: Vec<(Timestamp, DeferredTask)>,
}

impl DeferredQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` at `due`.
    pub fn schedule(&mut self, due: Timestamp, task: DeferredTask) {
        self.pending.push((due, task));
    }

    /// Removes and returns every task due at `now`, earliest first.
    pub fn take_due(&mut self, now: Timestamp) -> Vec<DeferredTask> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(at, _)| *at <= now);
        self.pending = pending;
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, task)| task).collect()
    }

    /// Number of tasks not yet run.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_each_period() {
        let mut timer = IntervalTimer::new(Duration::from_secs(1));
        timer.arm(Timestamp::ZERO);

        assert!(!timer.poll(Timestamp::from_millis(999)));
        assert!(timer.poll(Timestamp::from_secs(1)));
        assert!(!timer.poll(Timestamp::from_millis(1500)));
        assert!(timer.poll(Timestamp::from_secs(2)));
    }

    #[test]
    fn test_late_timer_fires_once() {
        let mut timer = IntervalTimer::new(Duration::from_secs(1));
        timer.arm(Timestamp::ZERO);

        assert!(timer.poll(Timestamp::from_secs(10)));
        assert!(!timer.poll(Timestamp::from_secs(10)));
        assert_eq!(timer.next_due(), Some(Timestamp::from_secs(11)));
    }

    #[test]
    fn test_disarmed_timer_never_fires() {
        let mut timer = IntervalTimer::new(Duration::from_secs(1));
        assert!(!timer.poll(Timestamp::from_secs(100)));
    }

    #[test]
    fn test_schedule_start_is_idempotent() {
        let mut schedule = MonitoringSchedule::new(
            Duration::from_secs(1),
            Duration::from_secs(5),
            Duration::from_secs(30),
        );
        schedule.start(Timestamp::ZERO);
        schedule.start(Timestamp::from_millis(900));

        let due = schedule.poll(Timestamp::from_secs(1));
        assert!(due.sample);
        assert!(!due.quality_check);

        let due = schedule.poll(Timestamp::from_secs(5));
        assert!(due.sample && due.quality_check && !due.cleanup);

        schedule.stop();
        assert!(!schedule.is_running());
        assert_eq!(schedule.poll(Timestamp::from_secs(60)), DuePasses::default());
    }

    #[test]
    fn test_deferred_queue_releases_due_tasks_only() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Timestamp::from_secs(2), DeferredTask::ImprovementRecheck);
        queue.schedule(Timestamp::from_secs(5), DeferredTask::ImprovementRecheck);

        assert!(queue.take_due(Timestamp::from_secs(1)).is_empty());
        assert_eq!(queue.take_due(Timestamp::from_secs(3)).len(), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.take_due(Timestamp::from_secs(5)).len(), 1);
        assert!(queue.is_empty());
    }
}
