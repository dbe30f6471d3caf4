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

//! Provides abstractions over the host environment the scene is loaded into.
//!
//! The host exposes a handful of ambient signals (an identifier string, touch
//! capability, memory and core hints, visibility changes). This module defines the
//! raw signal snapshot, the classified [`CapabilityProfile`] derived from it, and
//! the [`EnvironmentProbe`] trait implemented by concrete signal sources.

use serde::{Deserialize, Serialize};

/// A raw snapshot of the ambient signals exposed by the host environment.
///
/// Every field is optional or defaulted: hosts routinely withhold hints, and the
/// classifier must cope with any subset of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSignals {
    /// The platform/user-agent identifier string.
    pub user_agent: String,
    /// The coarse platform name reported by the host (e.g. `MacIntel`), if any.
    pub platform: Option<String>,
    /// Number of simultaneous touch points supported. Zero means no touch input.
    pub max_touch_points: u32,
    /// Hardware memory hint, in host-defined units (roughly GiB), if exposed.
    pub device_memory: Option<f32>,
    /// Logical core count hint, if exposed.
    pub hardware_concurrency: Option<u32>,
}

/// An immutable classification of the runtime's memory, CPU, and sandboxing
/// constraints.
///
/// Computed once per session start and never recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    /// Mobile/tablet-class OS historically associated with tight memory ceilings.
    pub is_constrained_platform: bool,
    /// The host is a social/chat application's embedded browsing surface.
    pub is_embedded_host: bool,
    /// The host lacks a full browser engine, or is embedded without the
    /// platform's primary engine.
    pub is_sandboxed_host: bool,
    /// OS version range known for weak graphics-driver support.
    pub is_legacy_os: bool,
    /// Memory is known or inferred to be scarce.
    pub low_memory: bool,
    /// Logical core count is known to be low.
    pub low_cpu: bool,
    /// The raw memory hint the classification was based on, if one was exposed.
    pub device_memory_hint: Option<f32>,
}

impl CapabilityProfile {
    /// Returns `true` when the runtime should receive the more patient retry budget.
    pub fn is_constrained(&self) -> bool {
        self.low_memory || self.low_cpu || self.is_legacy_os
    }
}

/// Whether the host surface is currently in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// The surface is visible and the host runs timers normally.
    #[default]
    Foreground,
    /// The surface is hidden; the host may suspend timers and network.
    Background,
}

/// Trait for sources able to snapshot the ambient host signals.
///
/// A browser host reads them from its navigator object; a native host can use
/// `stagelight-telemetry`'s `SysinfoProbe`.
pub trait EnvironmentProbe: Send + Sync {
    /// Returns the current signal snapshot.
    fn signals(&self) -> EnvironmentSignals;
}

impl EnvironmentProbe for EnvironmentSignals {
    fn signals(&self) -> EnvironmentSignals {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_by_default() {
        assert!(!CapabilityProfile::default().is_constrained());
    }

    #[test]
    fn any_pressure_flag_constrains() {
        let low_memory = CapabilityProfile {
            low_memory: true,
            ..Default::default()
        };
        let low_cpu = CapabilityProfile {
            low_cpu: true,
            ..Default::default()
        };
        let legacy = CapabilityProfile {
            is_legacy_os: true,
            ..Default::default()
        };
        assert!(low_memory.is_constrained());
        assert!(low_cpu.is_constrained());
        assert!(legacy.is_constrained());
    }

    #[test]
    fn host_flags_alone_do_not_constrain() {
        let profile = CapabilityProfile {
            is_constrained_platform: true,
            is_embedded_host: true,
            is_sandboxed_host: true,
            ..Default::default()
        };
        assert!(!profile.is_constrained());
    }

    #[test]
    fn static_signals_probe_returns_itself() {
        let signals = EnvironmentSignals {
            user_agent: "Mozilla/5.0".to_string(),
            hardware_concurrency: Some(8),
            ..Default::default()
        };
        assert_eq!(signals.signals(), signals);
    }
}
