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

//! Derivation of the retry budget from the capability profile.
//!
//! Constrained runtimes get more patience: a longer timeout and one extra retry,
//! since failures there are more often transient (memory pressure, thermal
//! throttling, driver hiccups) than permanent.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stagelight_core::platform::CapabilityProfile;

/// Concrete timing constants for one session. Immutable once derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retry budget units available over the session's lifetime.
    pub max_retries: u32,
    /// Delay between a failure and the retry it schedules, in milliseconds.
    pub retry_delay_ms: u64,
    /// How long an attempt may stay silent before it is timed out, in milliseconds.
    pub load_timeout_ms: u64,
}

impl RetryPolicy {
    /// The budget for constrained runtimes.
    pub const CONSTRAINED: RetryPolicy = RetryPolicy {
        max_retries: 5,
        retry_delay_ms: 700,
        load_timeout_ms: 12_000,
    };

    /// The budget for everything else.
    pub const STANDARD: RetryPolicy = RetryPolicy {
        max_retries: 4,
        retry_delay_ms: 450,
        load_timeout_ms: 9_000,
    };

    /// Derives the policy for `profile` with the default tuning.
    pub fn derive(profile: &CapabilityProfile) -> Self {
        RetryTuning::default().derive(profile)
    }

    /// The retry delay as a [`Duration`].
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// The load timeout as a [`Duration`].
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

/// The pair of policies the deriver chooses between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryTuning {
    /// Used when the profile is constrained.
    pub constrained: RetryPolicy,
    /// Used otherwise.
    pub standard: RetryPolicy,
}

impl Default for RetryTuning {
    fn default() -> Self {
        Self {
            constrained: RetryPolicy::CONSTRAINED,
            standard: RetryPolicy::STANDARD,
        }
    }
}

impl RetryTuning {
    /// Picks the policy for `profile`. Pure and deterministic.
    pub fn derive(&self, profile: &CapabilityProfile) -> RetryPolicy {
        let policy = if profile.is_constrained() {
            self.constrained
        } else {
            self.standard
        };
        log::debug!(
            "RetryPolicy: constrained={} -> {:?}",
            profile.is_constrained(),
            policy
        );
        policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every combination of the six boolean profile flags.
    fn all_profiles() -> Vec<CapabilityProfile> {
        (0..64u8)
            .map(|bits| CapabilityProfile {
                is_constrained_platform: bits & 1 != 0,
                is_embedded_host: bits & 2 != 0,
                is_sandboxed_host: bits & 4 != 0,
                is_legacy_os: bits & 8 != 0,
                low_memory: bits & 16 != 0,
                low_cpu: bits & 32 != 0,
                device_memory_hint: None,
            })
            .collect()
    }

    #[test]
    fn low_memory_profile_gets_the_patient_budget() {
        let profile = CapabilityProfile {
            low_memory: true,
            ..Default::default()
        };
        let policy = RetryPolicy::derive(&profile);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.retry_delay_ms, 700);
        assert_eq!(policy.load_timeout_ms, 12_000);
    }

    #[test]
    fn unconstrained_profile_gets_the_standard_budget() {
        let policy = RetryPolicy::derive(&CapabilityProfile::default());
        assert_eq!(policy, RetryPolicy::STANDARD);
        assert_eq!(policy.retry_delay(), Duration::from_millis(450));
        assert_eq!(policy.load_timeout(), Duration::from_secs(9));
    }

    #[test]
    fn every_profile_maps_onto_one_of_the_two_budgets() {
        for profile in all_profiles() {
            let policy = RetryPolicy::derive(&profile);
            assert!(matches!(policy.max_retries, 4 | 5));
            assert!(matches!(policy.retry_delay_ms, 450 | 700));
            assert!(matches!(policy.load_timeout_ms, 9_000 | 12_000));

            let constrained = profile.low_memory || profile.low_cpu || profile.is_legacy_os;
            let expected = if constrained {
                RetryPolicy::CONSTRAINED
            } else {
                RetryPolicy::STANDARD
            };
            assert_eq!(policy, expected, "profile {profile:?}");
        }
    }

    #[test]
    fn custom_tuning_is_used() {
        let tuning = RetryTuning {
            constrained: RetryPolicy {
                max_retries: 9,
                retry_delay_ms: 10,
                load_timeout_ms: 20,
            },
            ..Default::default()
        };
        let profile = CapabilityProfile {
            low_cpu: true,
            ..Default::default()
        };
        assert_eq!(tuning.derive(&profile).max_retries, 9);
        assert_eq!(tuning.derive(&CapabilityProfile::default()), RetryPolicy::STANDARD);
    }

    #[test]
    fn tuning_deserializes_partial_json() -> anyhow::Result<()> {
        let tuning: RetryTuning = serde_json::from_str(
            r#"{ "standard": { "max_retries": 2, "retry_delay_ms": 100, "load_timeout_ms": 1000 } }"#,
        )?;
        assert_eq!(tuning.standard.max_retries, 2);
        assert_eq!(tuning.constrained, RetryPolicy::CONSTRAINED);
        Ok(())
    }
}
