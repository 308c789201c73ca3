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

//! The performance governor service.
//!
//! One [`PerformanceGovernor`] is built by the application's composition root
//! and shared as a [`SharedGovernor`]. Scene wrappers report into it, the
//! embedding scheduler calls [`PerformanceGovernor::on_tick`], and everyone
//! reads decisions back as copy-out snapshots or as [`GovernorEvent`]s.

use crate::analysis::{HeuristicEngine, QualityVerdict};
use crate::capability::assess_device;
use crate::config::GovernorConfig;
use crate::metrics::MetricsHistory;
use crate::quality::QualityController;
use crate::registry::SceneRegistry;
use crate::resources::ResourceTracker;
use crate::schedule::{DeferredQueue, DeferredTask, MonitoringSchedule};
use aura_core::{
    AlertAction, AlertKind, AlertSeverity, CapabilityProbe, Clock, DeviceCapability, EventHub,
    EventKind, GovernorEvent, PerformanceAlert, PerformanceMetrics, QualityDirection,
    QualitySettings, ResourceKind, ResourceManager, ResourcePool, Scene, SceneId, ScenePriority,
    Subscription, SubscriptionId, Timestamp,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Single-threaded shared handle to a governor.
pub type SharedGovernor = Rc<RefCell<PerformanceGovernor>>;

/// Running mean of frame times reported between two samples.
#[derive(Debug, Default, Clone, Copy)]
struct FrameAccumulator {
    total_ms: f64,
    frames: u32,
}

impl FrameAccumulator {
    fn push(&mut self, frame_time_ms: f32) {
        self.total_ms += frame_time_ms as f64;
        self.frames += 1;
    }

    fn take_mean(&mut self) -> Option<f32> {
        let taken = std::mem::take(self);
        (taken.frames > 0).then(|| (taken.total_ms / taken.frames as f64) as f32)
    }
}

/// Coordinates rendering quality across every registered scene.
pub struct PerformanceGovernor {
    config: GovernorConfig,
    clock: Arc<dyn Clock>,
    capability: DeviceCapability,
    quality: QualitySettings,
    controller: QualityController,
    heuristics: HeuristicEngine,
    registry: SceneRegistry,
    history: MetricsHistory,
    frames: FrameAccumulator,
    last_sample_at: Timestamp,
    resources: ResourceTracker,
    resource_manager: Option<Box<dyn ResourceManager>>,
    schedule: MonitoringSchedule,
    deferred: DeferredQueue,
    events: EventHub<GovernorEvent>,
    destroyed: bool,
}

impl PerformanceGovernor {
    /// Creates a governor, probing the device once to pick the initial quality.
    ///
    /// Never fails: an invalid `config` is replaced by defaults and a failed
    /// probe yields the low tier.
    pub fn new<P>(config: GovernorConfig, probe: &P, clock: Arc<dyn Clock>) -> Self
    where
        P: CapabilityProbe + ?Sized,
    {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("Governor: {e}. Using the default configuration.");
                GovernorConfig::default()
            }
        };

        let now = clock.now();
        let capability = assess_device(probe);
        let quality = QualitySettings::for_tier(capability.tier);

        log::info!(
            "Governor: initial quality for {:?} tier: {} scenes, particles {:.1}, shadows {:?}",
            capability.tier,
            quality.max_concurrent_scenes,
            quality.particle_density,
            quality.shadow_quality
        );

        Self {
            controller: QualityController::new(quality, config.particle_step),
            heuristics: HeuristicEngine::new(&config),
            resources: ResourceTracker::new(
                now,
                config.cleanup_min_age(),
                config.cleanup_decay_factor,
            ),
            schedule: MonitoringSchedule::new(
                config.sampling_interval(),
                config.quality_check_interval(),
                config.cleanup_interval(),
            ),
            config,
            clock,
            capability,
            quality,
            registry: SceneRegistry::new(),
            history: MetricsHistory::new(),
            frames: FrameAccumulator::default(),
            last_sample_at: now,
            resource_manager: None,
            deferred: DeferredQueue::new(),
            events: EventHub::new(),
            destroyed: false,
        }
    }

    /// Attaches the collaborator that owns real graphics resources.
    pub fn with_resource_manager(mut self, manager: Box<dyn ResourceManager>) -> Self {
        self.resource_manager = Some(manager);
        self
    }

    /// Wraps the governor in a [`SharedGovernor`] handle.
    pub fn into_shared(self) -> SharedGovernor {
        Rc::new(RefCell::new(self))
    }

    // ── Monitoring lifecycle ────────────────────────────────────────────

    /// Arms the sampling, quality-check and cleanup timers. Idempotent.
    pub fn start_monitoring(&mut self) {
        if self.destroyed || self.schedule.is_running() {
            return;
        }
        let now = self.clock.now();
        self.schedule.start(now);
        self.last_sample_at = now;
        self.frames = FrameAccumulator::default();
        log::info!("Governor: monitoring started.");
    }

    /// Cancels the three timers. State is kept for inspection. Idempotent.
    pub fn stop_monitoring(&mut self) {
        if !self.schedule.is_running() {
            return;
        }
        self.schedule.stop();
        log::info!("Governor: monitoring stopped.");
    }

    /// Returns `true` while the timers are armed.
    pub fn is_monitoring(&self) -> bool {
        self.schedule.is_running()
    }

    /// Runs every pass that is due at `now`.
    ///
    /// Order within a tick: sampling, quality check, cleanup, then deferred
    /// re-checks. Deferred re-checks run even while monitoring is stopped.
    pub fn on_tick(&mut self, now: Timestamp) {
        if self.destroyed {
            return;
        }

        let due = self.schedule.poll(now);
        if due.sample {
            self.sample(now);
        }
        if due.quality_check {
            self.check_quality();
        }
        if due.cleanup {
            self.cleanup_resources(now);
        }

        for task in self.deferred.take_due(now) {
            match task {
                DeferredTask::ImprovementRecheck => {
                    if self
                        .heuristics
                        .recheck_allows_improvement(self.history.latest())
                    {
                        self.improve_step("post-unregister re-check");
                    }
                }
            }
        }
    }

    /// Calls [`on_tick`](Self::on_tick) with the injected clock's time.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.on_tick(now);
    }

    // ── Sampling ────────────────────────────────────────────────────────

    /// Reports the duration of one presented frame.
    ///
    /// When frames are reported, the next sample uses their mean frame time
    /// instead of the time elapsed between sampling ticks.
    pub fn record_frame(&mut self, frame_time_ms: f32) {
        if self.destroyed || !frame_time_ms.is_finite() || frame_time_ms < 0.0 {
            return;
        }
        self.frames.push(frame_time_ms);
    }

    /// Computes an aggregate sample at `now`, stores it and evaluates alerts.
    pub fn sample(&mut self, now: Timestamp) -> PerformanceMetrics {
        let frame_time_ms = self.frames.take_mean().unwrap_or_else(|| {
            now.saturating_duration_since(self.last_sample_at)
                .as_secs_f32()
                * 1000.0
        });
        self.last_sample_at = now;

        let mut sample = PerformanceMetrics::from_frame_time(frame_time_ms, now);
        sample.memory_usage_mb =
            self.resources.memory_usage_mb() + self.registry.active_memory_mb();
        let capacity = (self.capability.estimated_performance.max(1) as f32) * 2.0;
        sample.gpu_utilization_pct =
            (100.0 * self.registry.active_complexity() as f32 / capacity).clamp(0.0, 100.0);
        sample.render_time_ms = self.registry.mean_render_time();

        if !self.destroyed {
            self.ingest(sample);
        }
        sample
    }

    /// Appends an externally measured sample and runs the alert pipeline on it.
    pub fn record_metrics(&mut self, sample: PerformanceMetrics) {
        if self.destroyed {
            return;
        }
        self.ingest(sample);
    }

    fn ingest(&mut self, sample: PerformanceMetrics) {
        self.history.push(sample);
        log::trace!(
            "Governor sample: fps={:.0}, frame={:.2}ms, mem={:.1}MB, gpu={:.0}%, render={:.2}ms",
            sample.fps,
            sample.frame_time_ms,
            sample.memory_usage_mb,
            sample.gpu_utilization_pct,
            sample.render_time_ms
        );
        self.events.publish(GovernorEvent::PerformanceUpdated(sample));

        for alert in self.heuristics.evaluate_sample(&sample) {
            self.raise_alert(alert);
        }
    }

    // ── Quality control ─────────────────────────────────────────────────

    /// Runs one quality check over the trailing window.
    ///
    /// Returns the direction of the change applied, if any.
    pub fn check_quality(&mut self) -> Option<QualityDirection> {
        if self.destroyed {
            return None;
        }
        let report = self.heuristics.assess_trend(&self.history);
        log::debug!(
            "Governor quality check: {:?} (avg fps={:.1}, avg mem={:.1}MB over {} samples)",
            report.verdict,
            report.averages.fps,
            report.averages.memory_mb,
            report.averages.samples
        );
        match report.verdict {
            QualityVerdict::Reduce => self
                .reduce_step("sustained pressure")
                .then_some(QualityDirection::Reduce),
            QualityVerdict::Improve => self
                .improve_step("sustained headroom")
                .then_some(QualityDirection::Improve),
            QualityVerdict::InsufficientData | QualityVerdict::Hold => None,
        }
    }

    /// Manually moves quality one step. Returns `false` at a floor or ceiling.
    pub fn adjust_quality(&mut self, direction: QualityDirection) -> bool {
        if self.destroyed {
            return false;
        }
        match direction {
            QualityDirection::Reduce => self.reduce_step("manual adjustment"),
            QualityDirection::Improve => self.improve_step("manual adjustment"),
        }
    }

    /// Replaces the adjustable quality fields. The device tier is kept.
    pub fn set_quality(&mut self, settings: QualitySettings) {
        if self.destroyed {
            return;
        }
        let mut settings = settings.sanitized();
        settings.device_tier = self.quality.device_tier;
        self.quality = settings;
        log::info!("Governor: quality overridden to {:?}", self.quality);
    }

    fn reduce_step(&mut self, reason: &str) -> bool {
        let Some(step) = self.controller.reduce(&mut self.quality) else {
            log::debug!("Governor: reduction requested ({reason}) but quality is at its floor.");
            return false;
        };
        log::info!("Governor: quality reduced ({reason}): {step}");
        self.events
            .publish(GovernorEvent::QualityReduced(self.quality));

        let notice = PerformanceAlert::new(
            AlertKind::QualityReduced,
            AlertSeverity::Low,
            format!("Rendering quality reduced: {step}"),
            self.clock.now(),
        )
        .with_action(AlertAction::NotifyUser);
        self.raise_alert(notice);
        true
    }

    fn improve_step(&mut self, reason: &str) -> bool {
        let Some(step) = self.controller.improve(&mut self.quality) else {
            log::debug!("Governor: improvement requested ({reason}) but quality is at its max.");
            return false;
        };
        log::info!("Governor: quality improved ({reason}): {step}");
        self.events
            .publish(GovernorEvent::QualityImproved(self.quality));
        true
    }

    // ── Alerts ──────────────────────────────────────────────────────────

    /// Publishes `alert`, executing its action immediately when it is critical.
    pub fn raise_alert(&mut self, alert: PerformanceAlert) {
        if self.destroyed {
            return;
        }
        log::debug!("Governor alert: {alert}");

        let action = alert.is_critical().then_some(alert.action).flatten();
        let scene_id = alert.scene_id.clone();
        self.events.publish(GovernorEvent::PerformanceAlert(alert));

        if let Some(action) = action {
            self.execute_action(action, scene_id.as_ref());
        }
    }

    fn execute_action(&mut self, action: AlertAction, scene_id: Option<&SceneId>) {
        match action {
            AlertAction::ReduceQuality => {
                self.reduce_step("critical alert");
            }
            AlertAction::CleanupMemory => self.force_cleanup(),
            AlertAction::DisableScene => {
                let Some(id) = scene_id else {
                    log::warn!("Governor: disable-scene alert without a scene id ignored.");
                    return;
                };
                match self.registry.get(id).map(|s| s.priority) {
                    Some(ScenePriority::Low) => {
                        self.registry.update_status(id, false, false);
                        log::warn!("Governor: low-priority scene '{id}' disabled.");
                    }
                    Some(priority) => {
                        log::info!("Governor: {priority:?}-priority scene '{id}' stays enabled.")
                    }
                    None => log::debug!("Governor: disable-scene for unknown scene '{id}'."),
                }
            }
            AlertAction::NotifyUser => {}
        }
    }

    // ── Scene registry ──────────────────────────────────────────────────

    /// Registers (or replaces) a scene.
    ///
    /// If the number of active scenes now exceeds the concurrent scene cap,
    /// one reduction step is applied before this returns.
    pub fn register_scene(&mut self, scene: Scene) {
        if self.destroyed {
            return;
        }
        let id = scene.id.clone();
        if self.registry.register(scene).is_some() {
            log::debug!("Governor: scene '{id}' re-registered, previous entry replaced.");
        } else {
            log::debug!("Governor: scene '{id}' registered.");
        }
        self.events.publish(GovernorEvent::SceneRegistered(id));

        let active = self.registry.active_count();
        if active > self.quality.max_concurrent_scenes as usize {
            log::info!(
                "Governor: {active} active scenes exceed the cap of {}.",
                self.quality.max_concurrent_scenes
            );
            self.reduce_step("scene cap exceeded");
        }
    }

    /// Removes a scene and schedules an improvement re-check.
    ///
    /// Returns `false` if the id was unknown.
    pub fn unregister_scene(&mut self, id: &SceneId) -> bool {
        if self.destroyed || self.registry.unregister(id).is_none() {
            return false;
        }
        log::debug!("Governor: scene '{id}' unregistered.");
        self.events
            .publish(GovernorEvent::SceneUnregistered(id.clone()));

        let due = self.clock.now() + self.config.recheck_delay();
        self.deferred
            .schedule(due, DeferredTask::ImprovementRecheck);
        true
    }

    /// Updates a scene's flags. Unknown ids are ignored.
    pub fn update_scene_status(&mut self, id: &SceneId, is_active: bool, is_visible: bool) {
        if self.destroyed {
            return;
        }
        if !self.registry.update_status(id, is_active, is_visible) {
            log::trace!("Governor: status update for unknown scene '{id}' ignored.");
        }
    }

    /// Records one render-time sample for a scene.
    ///
    /// Unknown ids and non-finite or negative times are ignored.
    pub fn record_scene_render_time(&mut self, id: &SceneId, render_time_ms: f32) {
        if self.destroyed {
            return;
        }
        if !render_time_ms.is_finite() || render_time_ms < 0.0 {
            log::trace!("Governor: invalid render time {render_time_ms} for '{id}' ignored.");
            return;
        }
        if !self.registry.record_render_time(id, render_time_ms) {
            log::trace!("Governor: render time for unknown scene '{id}' ignored.");
            return;
        }
        let now = self.clock.now();
        if let Some(alert) = self
            .heuristics
            .evaluate_render_time(id, render_time_ms, now)
        {
            self.raise_alert(alert);
        }
    }

    // ── Resources ───────────────────────────────────────────────────────

    /// Counts a new graphics resource in the pool estimate.
    pub fn track_resource(&mut self, kind: ResourceKind, memory_mb: f32) {
        if !self.destroyed {
            self.resources.track(kind, memory_mb);
        }
    }

    /// Removes a graphics resource from the pool estimate.
    pub fn release_resource(&mut self, kind: ResourceKind, memory_mb: f32) {
        if !self.destroyed {
            self.resources.release(kind, memory_mb);
        }
    }

    /// Runs the periodic cleanup pass. Returns `true` if the estimate decayed.
    pub fn cleanup_resources(&mut self, now: Timestamp) -> bool {
        if self.destroyed {
            return false;
        }
        match self.resources.cleanup(now) {
            Some(pool) => {
                self.events.publish(GovernorEvent::ResourcesCleaned(pool));
                true
            }
            None => false,
        }
    }

    /// Decays the estimate now and asks the resource manager to release memory.
    pub fn force_cleanup(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(manager) = self.resource_manager.as_mut() {
            manager.force_cleanup();
        }
        let pool = self.resources.force_cleanup(self.clock.now());
        self.events.publish(GovernorEvent::ResourcesCleaned(pool));
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    /// The most recent sample.
    pub fn current_metrics(&self) -> Option<PerformanceMetrics> {
        self.history.latest().copied()
    }

    /// Every stored sample, oldest first.
    pub fn metrics_history(&self) -> Vec<PerformanceMetrics> {
        self.history.to_vec()
    }

    /// The current quality settings.
    pub fn quality_settings(&self) -> QualitySettings {
        self.quality
    }

    /// The tier defaults improvement aims for.
    pub fn optimal_quality(&self) -> QualitySettings {
        *self.controller.ceiling()
    }

    /// Every active scene, in registration order.
    pub fn active_scenes(&self) -> Vec<Scene> {
        self.registry.active().cloned().collect()
    }

    /// Every registered scene, in registration order.
    pub fn scenes(&self) -> Vec<Scene> {
        self.registry.iter().cloned().collect()
    }

    /// The scene registered under `id`.
    pub fn scene(&self, id: &SceneId) -> Option<Scene> {
        self.registry.get(id).cloned()
    }

    /// The device classification made at construction.
    pub fn device_capability(&self) -> DeviceCapability {
        self.capability
    }

    /// The resource pool counters and estimate.
    pub fn resource_usage(&self) -> ResourcePool {
        self.resources.snapshot()
    }

    /// The active configuration.
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Subscribes to every event.
    pub fn subscribe(&mut self) -> Subscription<GovernorEvent> {
        self.events.subscribe()
    }

    /// Subscribes to every event, holding at most `capacity` undrained events.
    pub fn subscribe_bounded(&mut self, capacity: usize) -> Subscription<GovernorEvent> {
        self.events.subscribe_bounded(capacity)
    }

    /// Subscribes to the listed event kinds only.
    pub fn subscribe_to(&mut self, kinds: &[EventKind]) -> Subscription<GovernorEvent> {
        let kinds = kinds.to_vec();
        self.events
            .subscribe_filtered(move |event| kinds.contains(&event.kind()))
    }

    /// Cancels a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }

    // ── Teardown ────────────────────────────────────────────────────────

    /// Stops monitoring, clears all state and closes every subscription.
    ///
    /// Every later call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop_monitoring();
        self.registry.clear();
        self.history.clear();
        self.deferred.clear();
        self.frames = FrameAccumulator::default();
        self.resources.reset(self.clock.now());
        self.resource_manager = None;
        self.events.clear();
        self.destroyed = true;
        log::info!("Governor: destroyed.");
    }

    /// Returns `true` once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
