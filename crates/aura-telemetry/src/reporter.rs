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

//! Turns governor alerts into log lines and user-facing notifications.

use aura_control::PerformanceGovernor;
use aura_core::{
    AlertSeverity, EventKind, GovernorEvent, PerformanceAlert, QualitySettings, SceneId,
    Subscription, Timestamp,
};
use serde::Serialize;
use std::collections::VecDeque;

/// A message a UI may show to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// How prominent the message should be.
    pub severity: AlertSeverity,
    /// One-line message.
    pub message: String,
    /// Scene the message is about, if any.
    pub scene_id: Option<SceneId>,
    /// When the underlying alert was raised. Quality changes carry no time.
    pub timestamp: Option<Timestamp>,
}

/// Subscribes to a governor's alerts and quality changes.
///
/// Call [`pump`](Self::pump) once per frame (or per tick) after the governor
/// has run. Notifications are kept in a bounded queue; when it is full the
/// oldest one is dropped.
#[derive(Debug)]
pub struct AlertReporter {
    subscription: Subscription<GovernorEvent>,
    notifications: VecDeque<Notification>,
    capacity: usize,
    dropped: u64,
}

impl AlertReporter {
    /// Default notification queue length.
    pub const DEFAULT_CAPACITY: usize = 32;

    /// Subscribes to `governor` with the default queue length.
    pub fn attach(governor: &mut PerformanceGovernor) -> Self {
        Self::with_capacity(governor, Self::DEFAULT_CAPACITY)
    }

    /// Subscribes to `governor`, keeping at most `capacity` notifications.
    pub fn with_capacity(governor: &mut PerformanceGovernor, capacity: usize) -> Self {
        let subscription = governor.subscribe_to(&[
            EventKind::PerformanceAlert,
            EventKind::QualityReduced,
            EventKind::QualityImproved,
        ]);
        Self {
            subscription,
            notifications: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Processes every pending event. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let events = self.subscription.drain();
        let handled = events.len();
        for event in events {
            match event {
                GovernorEvent::PerformanceAlert(alert) => self.on_alert(alert),
                GovernorEvent::QualityReduced(settings) => {
                    log::debug!("Quality reduced to {}", describe(&settings));
                }
                GovernorEvent::QualityImproved(settings) => {
                    log::info!("Quality improved to {}", describe(&settings));
                    self.push(Notification {
                        severity: AlertSeverity::Low,
                        message: "Rendering quality improved".to_owned(),
                        scene_id: None,
                        timestamp: None,
                    });
                }
                _ => {}
            }
        }
        handled
    }

    fn on_alert(&mut self, alert: PerformanceAlert) {
        match alert.severity {
            AlertSeverity::Critical => log::error!("{alert}"),
            AlertSeverity::High => log::warn!("{alert}"),
            AlertSeverity::Medium => log::info!("{alert}"),
            AlertSeverity::Low => log::debug!("{alert}"),
        }
        self.push(Notification {
            severity: alert.severity,
            message: alert.message,
            scene_id: alert.scene_id,
            timestamp: Some(alert.timestamp),
        });
    }

    fn push(&mut self, notification: Notification) {
        if self.notifications.len() == self.capacity {
            self.notifications.pop_front();
            self.dropped += 1;
        }
        self.notifications.push_back(notification);
    }

    /// Removes and returns every queued notification, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    /// Number of queued notifications.
    pub fn pending(&self) -> usize {
        self.notifications.len()
    }

    /// Notifications evicted because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Cancels the subscription.
    pub fn detach(self, governor: &mut PerformanceGovernor) {
        governor.unsubscribe(self.subscription.id());
    }
}

fn describe(settings: &QualitySettings) -> String {
    format!(
        "particles {:.1}, shadows {:?}, post {}, aa {}, {} scenes",
        settings.particle_density,
        settings.shadow_quality,
        if settings.post_processing { "on" } else { "off" },
        if settings.anti_aliasing { "on" } else { "off" },
        settings.max_concurrent_scenes
    )
}
