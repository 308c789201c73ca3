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

//! sysinfo-based implementation of the [`CapabilityProbe`] trait.
//!
//! sysinfo sees the CPU and the operating system but not the GPU, so the
//! graphics limits come from the embedding renderer through
//! [`SysinfoProbe::with_gpu_limits`]. Without them the probe reports the
//! conservative 2048 px limits of a mid-range device.

use aura_core::{CapabilityProbe, GpuFeatures, ProbeError, ProbeReport};
use sysinfo::System;

const MOBILE_SYSTEMS: [&str; 2] = ["android", "ios"];

/// GPU limits supplied by whoever owns the rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GpuLimits {
    max_texture_size: u32,
    max_renderbuffer_size: u32,
    features: GpuFeatures,
}

impl Default for GpuLimits {
    fn default() -> Self {
        let fallback = ProbeReport::default();
        Self {
            max_texture_size: fallback.max_texture_size,
            max_renderbuffer_size: fallback.max_renderbuffer_size,
            features: fallback.features,
        }
    }
}

/// A capability probe that uses the `sysinfo` crate.
pub struct SysinfoProbe {
    system: System,
    gpu: GpuLimits,
}

impl SysinfoProbe {
    /// Creates a new SysinfoProbe.
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self {
            system,
            gpu: GpuLimits::default(),
        }
    }

    /// Uses the limits reported by the rendering context.
    pub fn with_gpu_limits(
        mut self,
        max_texture_size: u32,
        max_renderbuffer_size: u32,
        features: GpuFeatures,
    ) -> Self {
        self.gpu = GpuLimits {
            max_texture_size,
            max_renderbuffer_size,
            features,
        };
        self
    }

    fn cpu_cores(&self) -> Result<u32, ProbeError> {
        match self.system.cpus().len() {
            0 => Err(ProbeError::Unavailable(
                "sysinfo reported no logical CPUs".to_owned(),
            )),
            n => Ok(u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }
}

/// Whether an operating system name denotes a handheld platform.
fn is_mobile_system(name: &str) -> bool {
    let name = name.to_lowercase();
    MOBILE_SYSTEMS.iter().any(|m| name.contains(m))
}

fn is_tablet_system(name: &str) -> bool {
    name.to_lowercase().contains("ipad")
}

impl SysinfoProbe {
    fn report_for(
        &self,
        cpu_cores: u32,
        os_name: &str,
        os_version: &str,
        distro: &str,
    ) -> ProbeReport {
        ProbeReport {
            max_texture_size: self.gpu.max_texture_size,
            max_renderbuffer_size: self.gpu.max_renderbuffer_size,
            cpu_cores,
            is_mobile: is_mobile_system(os_name) || is_mobile_system(distro),
            is_tablet: is_tablet_system(os_version),
            features: self.gpu.features,
        }
    }
}

impl CapabilityProbe for SysinfoProbe {
    fn probe(&self) -> Result<ProbeReport, ProbeError> {
        let cpu_cores = self.cpu_cores()?;
        let os_name = System::name().unwrap_or_default();
        let os_version = System::long_os_version().unwrap_or_default();
        let report = self.report_for(
            cpu_cores,
            &os_name,
            &os_version,
            &System::distribution_id(),
        );

        log::debug!(
            "SysinfoProbe: {cpu_cores} cores on '{os_name}' ({os_version}), mobile={}, tablet={}",
            report.is_mobile,
            report.is_tablet
        );
        Ok(report)
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_reports_host_cores() {
        let report = SysinfoProbe::new().probe().expect("host has CPUs");
        assert!(report.cpu_cores >= 1);
        assert_eq!(report.max_texture_size, 2048);
    }

    #[test]
    fn test_injected_gpu_limits_are_reported() {
        let features = GpuFeatures {
            instancing: true,
            float_textures: true,
            depth_textures: false,
            anisotropic_filtering: true,
        };
        let report = SysinfoProbe::new()
            .with_gpu_limits(8192, 4096, features)
            .probe()
            .expect("host has CPUs");

        assert_eq!(report.max_texture_size, 8192);
        assert_eq!(report.max_renderbuffer_size, 4096);
        assert_eq!(report.features, features);
    }

    #[test]
    fn test_mobile_system_names() {
        assert!(is_mobile_system("Android"));
        assert!(is_mobile_system("iOS"));
        assert!(!is_mobile_system("Ubuntu"));
        assert!(!is_mobile_system("Darwin"));
        assert!(is_tablet_system("iPadOS 17.2"));
    }

    #[test]
    fn test_tablet_flag_does_not_imply_mobile() {
        let probe = SysinfoProbe::new().with_gpu_limits(4096, 4096, GpuFeatures::default());

        let tablet = probe.report_for(8, "Darwin", "iPadOS 17.2", "ipados");
        assert!(tablet.is_tablet);
        assert!(!tablet.is_mobile);

        let phone = probe.report_for(8, "Android", "Android 14", "android");
        assert!(phone.is_mobile);
        assert!(!phone.is_tablet);
    }
}
