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

//! One-shot classification of the host device.

use aura_core::{CapabilityProbe, DeviceCapability, DeviceTier, ProbeReport};

/// Runs `probe` and classifies its report.
///
/// A probe that fails outright yields the `Low` tier. This never fails.
pub fn assess_device<P: CapabilityProbe + ?Sized>(probe: &P) -> DeviceCapability {
    match probe.probe() {
        Ok(report) => classify(report),
        Err(e) => {
            log::warn!("Capability probe failed ({e}). Falling back to the low tier.");
            low_tier(ProbeReport::default())
        }
    }
}

/// Applies the tier decision table to a probe report.
///
/// | Tier | Condition | Performance | GPU memory |
/// |---|---|---|---|
/// | High | texture >= 4096, cores >= 8, not mobile | 8 | 1024 MB |
/// | Medium | texture >= 2048, cores >= 4 | 6 | 512 MB |
/// | Low | otherwise | 3 | 256 MB |
pub fn classify(report: ProbeReport) -> DeviceCapability {
    let capability = if report.max_texture_size >= 4096
        && report.cpu_cores >= 8
        && !report.is_mobile
    {
        DeviceCapability {
            tier: DeviceTier::High,
            estimated_performance: 8,
            gpu_memory_mb: 1024,
            report,
        }
    } else if report.max_texture_size >= 2048 && report.cpu_cores >= 4 {
        DeviceCapability {
            tier: DeviceTier::Medium,
            estimated_performance: 6,
            gpu_memory_mb: 512,
            report,
        }
    } else {
        low_tier(report)
    };

    log::info!(
        "Device assessed as {:?} tier (performance={}, textures={}, cores={}, mobile={})",
        capability.tier,
        capability.estimated_performance,
        report.max_texture_size,
        report.cpu_cores,
        report.is_mobile
    );
    capability
}

fn low_tier(report: ProbeReport) -> DeviceCapability {
    DeviceCapability {
        tier: DeviceTier::Low,
        estimated_performance: 3,
        gpu_memory_mb: 256,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::ProbeError;

    fn report(texture: u32, cores: u32, mobile: bool) -> ProbeReport {
        ProbeReport {
            max_texture_size: texture,
            cpu_cores: cores,
            is_mobile: mobile,
            ..ProbeReport::default()
        }
    }

    #[test]
    fn test_high_tier() {
        let cap = classify(report(8192, 16, false));
        assert_eq!(cap.tier, DeviceTier::High);
        assert_eq!(cap.estimated_performance, 8);
        assert_eq!(cap.gpu_memory_mb, 1024);
    }

    #[test]
    fn test_mobile_caps_at_medium() {
        let cap = classify(report(8192, 16, true));
        assert_eq!(cap.tier, DeviceTier::Medium);
        assert_eq!(cap.estimated_performance, 6);
    }

    #[test]
    fn test_few_cores_is_low() {
        assert_eq!(classify(report(4096, 2, false)).tier, DeviceTier::Low);
        assert_eq!(classify(report(1024, 8, false)).tier, DeviceTier::Low);
    }

    #[test]
    fn test_default_report_is_medium() {
        assert_eq!(classify(ProbeReport::default()).tier, DeviceTier::Medium);
    }

    #[test]
    fn test_failed_probe_is_low() {
        let probe = || -> Result<ProbeReport, ProbeError> {
            Err(ProbeError::ContextCreation("no adapter".into()))
        };
        let cap = assess_device(&probe);
        assert_eq!(cap.tier, DeviceTier::Low);
        assert_eq!(cap.estimated_performance, 3);
    }
}
