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

//! sysinfo-based implementation of the EnvironmentProbe trait.
//!
//! Browser hosts read their hints from the navigator object. Native hosts have no
//! such object, so this probe reconstructs equivalent hints from the machine.

use std::sync::Mutex;

use stagelight_core::platform::{EnvironmentProbe, EnvironmentSignals};
use sysinfo::System;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// An environment probe that uses the `sysinfo` crate for hardware hints.
pub struct SysinfoProbe {
    user_agent: String,
    system: Mutex<System>,
}

impl SysinfoProbe {
    /// Creates a probe reporting `user_agent` as the host identifier.
    pub fn new(user_agent: impl Into<String>) -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu_all();
        Self {
            user_agent: user_agent.into(),
            system: Mutex::new(system),
        }
    }
}

impl EnvironmentProbe for SysinfoProbe {
    fn signals(&self) -> EnvironmentSignals {
        let (device_memory, hardware_concurrency) = match self.system.lock() {
            Ok(mut system) => {
                system.refresh_memory();
                let cores = system.cpus().len();
                (
                    Some(bucket_memory_gib(system.total_memory())),
                    (cores > 0).then_some(cores as u32),
                )
            }
            Err(_) => {
                log::warn!("SysinfoProbe: system lock poisoned, reporting no hardware hints.");
                (None, None)
            }
        };

        EnvironmentSignals {
            user_agent: self.user_agent.clone(),
            platform: System::name(),
            max_touch_points: 0,
            device_memory,
            hardware_concurrency,
        }
    }
}

/// Rounds a byte count down to the coarse power-of-two GiB buckets browsers
/// expose (0.25 up to 8), so native and browser hints compare alike.
pub fn bucket_memory_gib(total_bytes: u64) -> f32 {
    let gib = total_bytes as f64 / BYTES_PER_GIB;
    let mut bucket = 8.0_f64;
    while bucket > 0.25 && gib < bucket {
        bucket /= 2.0;
    }
    bucket as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn memory_buckets_round_down_to_powers_of_two() {
        assert_eq!(bucket_memory_gib(3 * GIB), 2.0);
        assert_eq!(bucket_memory_gib(4 * GIB), 4.0);
        assert_eq!(bucket_memory_gib(6 * GIB), 4.0);
        assert_eq!(bucket_memory_gib(GIB / 2), 0.5);
    }

    #[test]
    fn memory_buckets_are_clamped() {
        assert_eq!(bucket_memory_gib(64 * GIB), 8.0);
        assert_eq!(bucket_memory_gib(0), 0.25);
    }

    #[test]
    fn probe_reports_its_identifier_and_hints() {
        let probe = SysinfoProbe::new("stagelight-native/0.1");
        let signals = probe.signals();
        assert_eq!(signals.user_agent, "stagelight-native/0.1");
        assert_eq!(signals.max_touch_points, 0);
        assert!(signals.device_memory.is_some());
    }
}
