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

//! Drives a governor through two simulated minutes of a scrolling portfolio
//! page and prints the final performance report as JSON.
//!
//! Usage: `sandbox [config.ron]`

use anyhow::{Context, Result};
use aura_control::{GovernorConfig, PerformanceGovernor, SharedGovernor};
use aura_core::{
    Clock, ManualClock, Scene, SceneId, ScenePriority, SceneType, ShadowQuality,
};
use aura_infra::SysinfoProbe;
use aura_telemetry::{init_logging, AlertReporter, PerformanceReport};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

const SIMULATED_SECONDS: u64 = 120;

/// What a 3D section of the page would hold on to.
struct SceneHandle {
    governor: SharedGovernor,
    id: SceneId,
    complexity: u8,
}

impl SceneHandle {
    fn mount(governor: &SharedGovernor, scene: Scene) -> Self {
        let handle = Self {
            governor: Rc::clone(governor),
            id: scene.id.clone(),
            complexity: scene.complexity,
        };
        governor.borrow_mut().register_scene(scene);
        handle
    }

    fn render(&self, cost_factor: f32) {
        let render_ms = self.complexity as f32 * 1.5 * cost_factor;
        self.governor
            .borrow_mut()
            .record_scene_render_time(&self.id, render_ms);
    }

    fn set_on_screen(&self, on_screen: bool) {
        self.governor
            .borrow_mut()
            .update_scene_status(&self.id, on_screen, on_screen);
    }

    fn is_rendering(&self) -> bool {
        self.governor
            .borrow()
            .scene(&self.id)
            .is_some_and(|s| s.is_active)
    }

    fn unmount(self) {
        self.governor.borrow_mut().unregister_scene(&self.id);
    }
}

/// Relative cost of one frame under the current quality settings.
fn cost_factor(governor: &PerformanceGovernor) -> f32 {
    let q = governor.quality_settings();
    let shadows = match q.shadow_quality {
        ShadowQuality::High => 0.3,
        ShadowQuality::Medium => 0.2,
        ShadowQuality::Low => 0.1,
        ShadowQuality::Disabled => 0.0,
    };
    let post = if q.post_processing { 0.15 } else { 0.0 };
    let aa = if q.anti_aliasing { 0.1 } else { 0.0 };
    0.4 + 0.6 * q.particle_density + shadows + post + aa
}

fn load_config() -> Result<GovernorConfig> {
    match std::env::args().nth(1) {
        Some(path) => GovernorConfig::load(&path)
            .with_context(|| format!("failed to load governor config from '{path}'")),
        None => Ok(GovernorConfig::default()),
    }
}

fn main() -> Result<()> {
    init_logging();

    let config = load_config()?;
    let clock = Arc::new(ManualClock::default());
    let probe = SysinfoProbe::new();
    let governor = PerformanceGovernor::new(config, &probe, clock.clone()).into_shared();
    let mut reporter = AlertReporter::attach(&mut governor.borrow_mut());

    let mut scenes = vec![
        SceneHandle::mount(
            &governor,
            Scene::new("hero-architecture", SceneType::Architecture, ScenePriority::High, 7),
        ),
        SceneHandle::mount(
            &governor,
            Scene::new("skills", SceneType::SkillCard, ScenePriority::Medium, 4),
        ),
        SceneHandle::mount(
            &governor,
            Scene::new("scroll-particles", SceneType::ScrollEffects, ScenePriority::Low, 3),
        ),
    ];
    governor.borrow_mut().start_monitoring();

    for second in 0..SIMULATED_SECONDS {
        match second {
            20 => {
                log::info!("Sandbox: user scrolls into the timeline and project sections.");
                scenes.push(SceneHandle::mount(
                    &governor,
                    Scene::new("timeline", SceneType::Timeline, ScenePriority::Medium, 6),
                ));
                scenes.push(SceneHandle::mount(
                    &governor,
                    Scene::new("projects", SceneType::ProjectPreview, ScenePriority::Medium, 8),
                ));
            }
            60 => {
                log::info!("Sandbox: hero and skills scroll out of view.");
                scenes[0].set_on_screen(false);
                scenes[1].set_on_screen(false);
            }
            90 => {
                log::info!("Sandbox: project previews are closed.");
                if let Some(pos) = scenes.iter().position(|s| s.id.as_str() == "projects") {
                    scenes.remove(pos).unmount();
                }
            }
            _ => {}
        }

        let factor = cost_factor(&governor.borrow());
        let load: f32 = scenes
            .iter()
            .filter(|s| s.is_rendering())
            .map(|s| s.complexity as f32)
            .sum();
        let frame_ms = 4.0 + load * 1.1 * factor;
        let frames = (1000.0 / frame_ms).floor() as u32;

        for scene in scenes.iter().filter(|s| s.is_rendering()) {
            scene.render(factor);
        }
        {
            let mut gov = governor.borrow_mut();
            for _ in 0..frames {
                gov.record_frame(frame_ms);
            }
        }

        clock.advance(Duration::from_secs(1));
        governor.borrow_mut().on_tick(clock.now());
        reporter.pump();
    }

    for notification in reporter.drain_notifications() {
        log::info!(
            "Notification [{:?}]: {}",
            notification.severity,
            notification.message
        );
    }

    let report = PerformanceReport::capture(&governor.borrow());
    println!("{}", report.to_json()?);

    governor.borrow_mut().destroy();
    Ok(())
}
