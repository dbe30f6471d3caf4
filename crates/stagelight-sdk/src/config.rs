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

//! Loader configuration.

use serde::{Deserialize, Serialize};
use stagelight_control::{FallbackStyle, RetryTuning};
use stagelight_core::renderer::VariantId;
use stagelight_core::session::VariantList;
use stagelight_telemetry::ProfilerThresholds;

use crate::error::MountError;

/// Everything a [`SceneMount`](crate::SceneMount) needs besides the host.
///
/// Only the variant list is required; every tuning knob defaults to the
/// documented values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Scene variants, tried in rotation after failures.
    pub variants: Vec<VariantId>,
    /// Retry budgets for constrained and standard runtimes.
    pub retry: RetryTuning,
    /// Runtime classification thresholds.
    pub profiler: ProfilerThresholds,
    /// Placeholder styling.
    pub fallback: FallbackStyle,
    /// Whether to send preload hints to the host.
    pub preload: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            variants: Vec::new(),
            retry: RetryTuning::default(),
            profiler: ProfilerThresholds::default(),
            fallback: FallbackStyle::default(),
            preload: true,
        }
    }
}

impl LoaderConfig {
    /// A default configuration for the given variants.
    pub fn new<I, V>(variants: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VariantId>,
    {
        Self {
            variants: variants.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, MountError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The validated variant rotation.
    pub fn variant_list(&self) -> Result<VariantList, MountError> {
        Ok(VariantList::new(self.variants.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagelight_control::RetryPolicy;

    #[test]
    fn new_only_needs_variants() {
        let config = LoaderConfig::new(["a.splinecode", "b.splinecode"]);
        assert_eq!(config.variants.len(), 2);
        assert_eq!(config.retry, RetryTuning::default());
        assert!(config.preload);
        assert_eq!(config.variant_list().unwrap().len(), 2);
    }

    #[test]
    fn empty_variant_list_is_rejected() {
        let config = LoaderConfig::new(Vec::<String>::new());
        assert!(matches!(config.variant_list(), Err(MountError::NoVariants(_))));
    }

    #[test]
    fn json_fills_in_defaults() {
        let config = LoaderConfig::from_json(
            r#"{
                "variants": ["scenes/hero.splinecode"],
                "retry": { "standard": { "max_retries": 2, "retry_delay_ms": 100, "load_timeout_ms": 500 } },
                "preload": false
            }"#,
        )
        .unwrap();

        assert_eq!(config.variants, vec![VariantId::from("scenes/hero.splinecode")]);
        assert_eq!(config.retry.standard.max_retries, 2);
        assert_eq!(config.retry.constrained, RetryPolicy::CONSTRAINED);
        assert_eq!(config.profiler, ProfilerThresholds::default());
        assert_eq!(config.fallback.fade_duration_ms, 700);
        assert!(!config.preload);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = LoaderConfig::from_json("{ variants: ").unwrap_err();
        assert!(matches!(err, MountError::Config(_)));
        assert!(err.to_string().starts_with("invalid loader configuration"));
    }
}
