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

//! Abstractions over the host device.
//!
//! The governor learns about the hardware exactly once, at construction, by
//! asking a [`CapabilityProbe`] for a [`ProbeReport`]. The report is then
//! classified into a [`DeviceCapability`] by `aura-control`.

use serde::{Deserialize, Serialize};

/// Device classification fixing the ceiling for auto-adjusted quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    /// Weak or mobile hardware.
    Low,
    /// Mainstream hardware.
    Medium,
    /// Desktop-class hardware.
    High,
}

/// Optional GPU features reported by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GpuFeatures {
    /// Hardware instanced drawing.
    pub instancing: bool,
    /// Floating point render targets.
    pub float_textures: bool,
    /// Sampleable depth textures.
    pub depth_textures: bool,
    /// Anisotropic texture filtering.
    pub anisotropic_filtering: bool,
}

/// Raw inputs gathered by a [`CapabilityProbe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Largest supported texture dimension, in texels.
    pub max_texture_size: u32,
    /// Largest supported render buffer dimension, in texels.
    pub max_renderbuffer_size: u32,
    /// Logical CPU cores.
    pub cpu_cores: u32,
    /// Running on a phone.
    pub is_mobile: bool,
    /// Running on a tablet.
    pub is_tablet: bool,
    /// GPU feature support.
    pub features: GpuFeatures,
}

/// Medium-equivalent values, used wherever a probe cannot determine a field.
impl Default for ProbeReport {
    fn default() -> Self {
        Self {
            max_texture_size: 2048,
            max_renderbuffer_size: 2048,
            cpu_cores: 4,
            is_mobile: false,
            is_tablet: false,
            features: GpuFeatures::default(),
        }
    }
}

/// Raised by a probe that could not inspect the device at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The platform exposes no usable information.
    #[error("device information unavailable: {0}")]
    Unavailable(String),
    /// The graphics context could not be created for inspection.
    #[error("graphics context could not be created: {0}")]
    ContextCreation(String),
}

/// Supplies device information to the governor.
///
/// Implementations must be fast (a few milliseconds at most) and must not
/// perform network I/O. Any closure returning `Result<ProbeReport, ProbeError>`
/// is a probe.
pub trait CapabilityProbe {
    /// Inspects the device.
    fn probe(&self) -> Result<ProbeReport, ProbeError>;
}

impl<F> CapabilityProbe for F
where
    F: Fn() -> Result<ProbeReport, ProbeError>,
{
    fn probe(&self) -> Result<ProbeReport, ProbeError> {
        self()
    }
}

/// Immutable classification of the device, computed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapability {
    /// Quality tier.
    pub tier: DeviceTier,
    /// Relative rendering throughput on a 1 to 10 scale.
    pub estimated_performance: u8,
    /// Estimated GPU memory in MB.
    pub gpu_memory_mb: u32,
    /// The probe inputs the classification was derived from.
    pub report: ProbeReport,
}
