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

//! One-time classification of the runtime from ambient host signals.
//!
//! Classification is heuristic: identifier matching and hint thresholds are
//! best-effort, so every threshold is carried in [`ProfilerThresholds`] rather
//! than hard-coded. The profiler itself is a pure function of its input: no
//! network, no side effects, identical output for identical signals.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use stagelight_core::platform::{CapabilityProfile, EnvironmentProbe, EnvironmentSignals};

static IOS_DEVICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)iphone|ipad|ipod").unwrap());

static IOS_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"OS (\d+)_").unwrap());

/// Social/chat applications' embedded browsing surfaces.
static EMBEDDED_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Instagram|FBAN|FBAV|FB_IAB|TikTok|musical_ly|Line/|GSA|Twitter|Snapchat|LinkedInApp|wv\)",
    )
    .unwrap()
});

/// Android system WebView marker.
static ANDROID_WEBVIEW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i);\s*wv\)").unwrap());

/// Full third-party browsers on iOS. They ship WebKit but are not bare webviews.
static IOS_FULL_BROWSER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CriOS|FxiOS|EdgiOS|OPiOS").unwrap());

/// Tunable thresholds used by the [`RuntimeProfiler`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerThresholds {
    /// A memory hint at or below this value marks the runtime as low-memory.
    pub low_memory_max: f32,
    /// A logical core hint strictly below this value marks the runtime as low-CPU.
    pub low_cpu_below: u32,
    /// Mobile OS major versions strictly below this value count as legacy.
    pub legacy_os_below: u32,
}

impl Default for ProfilerThresholds {
    fn default() -> Self {
        Self {
            low_memory_max: 4.0,
            low_cpu_below: 4,
            legacy_os_below: 16,
        }
    }
}

/// Turns an [`EnvironmentSignals`] snapshot into a [`CapabilityProfile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeProfiler {
    thresholds: ProfilerThresholds,
}

impl RuntimeProfiler {
    /// Creates a profiler with the given thresholds.
    pub fn new(thresholds: ProfilerThresholds) -> Self {
        Self { thresholds }
    }

    /// Snapshots `probe` and classifies the result.
    pub fn profile_probe(&self, probe: &dyn EnvironmentProbe) -> CapabilityProfile {
        self.profile(&probe.signals())
    }

    /// Classifies a signal snapshot.
    pub fn profile(&self, signals: &EnvironmentSignals) -> CapabilityProfile {
        let ua = signals.user_agent.as_str();

        let is_ios_device = IOS_DEVICE.is_match(ua);
        // iPadOS in desktop mode reports a Mac platform but keeps its touch screen.
        let is_ipad_desktop_mode =
            signals.platform.as_deref() == Some("MacIntel") && signals.max_touch_points > 1;
        let is_constrained_platform = is_ios_device || is_ipad_desktop_mode;

        let is_embedded_host = EMBEDDED_HOST.is_match(ua);
        let is_sandboxed_host = self.lacks_full_engine(ua, is_ios_device)
            || (is_embedded_host && !self.runs_primary_engine(ua, is_constrained_platform));

        let is_legacy_os = is_ios_device
            && Self::ios_major_version(ua)
                .is_some_and(|major| major > 0 && major < self.thresholds.legacy_os_below);

        let low_memory = match signals.device_memory {
            Some(memory) => memory <= self.thresholds.low_memory_max,
            None => is_constrained_platform,
        };
        let low_cpu = signals
            .hardware_concurrency
            .is_some_and(|cores| cores < self.thresholds.low_cpu_below);

        let profile = CapabilityProfile {
            is_constrained_platform,
            is_embedded_host,
            is_sandboxed_host,
            is_legacy_os,
            low_memory,
            low_cpu,
            device_memory_hint: signals.device_memory,
        };
        log::debug!("RuntimeProfiler: classified runtime as {profile:?}");
        profile
    }

    /// A bare webview: Android's system WebView, or an iOS WebKit view that does
    /// not identify as Safari or a full third-party browser.
    fn lacks_full_engine(&self, ua: &str, is_ios_device: bool) -> bool {
        if ANDROID_WEBVIEW.is_match(ua) {
            return true;
        }
        is_ios_device
            && ua.contains("AppleWebKit")
            && !ua.contains("Safari/")
            && !IOS_FULL_BROWSER.is_match(ua)
    }

    fn runs_primary_engine(&self, ua: &str, is_apple_mobile: bool) -> bool {
        if is_apple_mobile {
            ua.contains("Safari/")
        } else {
            ua.contains("Chrome/")
        }
    }

    fn ios_major_version(ua: &str) -> Option<u32> {
        IOS_VERSION
            .captures(ua)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
    const IPHONE_SAFARI_17: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";
    const IPHONE_SAFARI_15: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_7 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.6 Mobile/15E148 Safari/604.1";
    const IPHONE_INSTAGRAM: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/21B80 Instagram 307.0.0.34.111";
    const IPHONE_CHROME: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/124.0.6367.88 Mobile/15E148";
    const ANDROID_FACEBOOK: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7 Build/TQ3A; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/120.0.0.0 Mobile Safari/537.36 [FB_IAB/FB4A;FBAV/445.0.0.34.118;]";
    const MAC_SAFARI: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";

    fn signals(ua: &str) -> EnvironmentSignals {
        EnvironmentSignals {
            user_agent: ua.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn desktop_browser_without_hints_is_unconstrained() {
        let profile = RuntimeProfiler::default().profile(&signals(DESKTOP_CHROME));
        assert_eq!(profile, CapabilityProfile::default());
        assert!(!profile.is_constrained());
    }

    #[test]
    fn iphone_without_memory_hint_is_inferred_low_memory() {
        let profile = RuntimeProfiler::default().profile(&signals(IPHONE_SAFARI_17));
        assert!(profile.is_constrained_platform);
        assert!(profile.low_memory);
        assert!(!profile.is_legacy_os);
        assert!(!profile.is_sandboxed_host);
        assert_eq!(profile.device_memory_hint, None);
    }

    #[test]
    fn memory_hint_overrides_platform_inference() {
        let mut s = signals(IPHONE_SAFARI_17);
        s.device_memory = Some(8.0);
        let profile = RuntimeProfiler::default().profile(&s);
        assert!(profile.is_constrained_platform);
        assert!(!profile.low_memory);
        assert_eq!(profile.device_memory_hint, Some(8.0));
    }

    #[test]
    fn memory_threshold_is_inclusive() {
        let profiler = RuntimeProfiler::default();
        let mut s = signals(DESKTOP_CHROME);
        s.device_memory = Some(4.0);
        assert!(profiler.profile(&s).low_memory);
        s.device_memory = Some(4.5);
        assert!(!profiler.profile(&s).low_memory);
    }

    #[test]
    fn core_threshold_is_exclusive() {
        let profiler = RuntimeProfiler::default();
        let mut s = signals(DESKTOP_CHROME);
        s.hardware_concurrency = Some(3);
        assert!(profiler.profile(&s).low_cpu);
        s.hardware_concurrency = Some(4);
        assert!(!profiler.profile(&s).low_cpu);
    }

    #[test]
    fn old_ios_is_legacy() {
        let profile = RuntimeProfiler::default().profile(&signals(IPHONE_SAFARI_15));
        assert!(profile.is_legacy_os);
        assert!(profile.is_constrained());
    }

    #[test]
    fn mac_os_version_token_is_not_mistaken_for_ios() {
        let profile = RuntimeProfiler::default().profile(&signals(MAC_SAFARI));
        assert!(!profile.is_legacy_os);
        assert!(!profile.is_constrained_platform);
    }

    #[test]
    fn ipad_desktop_mode_is_a_constrained_platform() {
        let mut s = signals(MAC_SAFARI);
        s.platform = Some("MacIntel".to_string());
        s.max_touch_points = 5;
        let profile = RuntimeProfiler::default().profile(&s);
        assert!(profile.is_constrained_platform);
        assert!(profile.low_memory);
    }

    #[test]
    fn instagram_on_ios_is_embedded_and_sandboxed() {
        let profile = RuntimeProfiler::default().profile(&signals(IPHONE_INSTAGRAM));
        assert!(profile.is_embedded_host);
        assert!(profile.is_sandboxed_host);
    }

    #[test]
    fn third_party_ios_browser_is_not_sandboxed() {
        let profile = RuntimeProfiler::default().profile(&signals(IPHONE_CHROME));
        assert!(!profile.is_embedded_host);
        assert!(!profile.is_sandboxed_host);
    }

    #[test]
    fn android_in_app_webview_is_sandboxed() {
        let profile = RuntimeProfiler::default().profile(&signals(ANDROID_FACEBOOK));
        assert!(profile.is_embedded_host);
        assert!(profile.is_sandboxed_host);
        assert!(!profile.is_constrained_platform);
    }

    #[test]
    fn profiling_is_deterministic() {
        let profiler = RuntimeProfiler::default();
        let mut s = signals(IPHONE_INSTAGRAM);
        s.hardware_concurrency = Some(2);
        assert_eq!(profiler.profile(&s), profiler.profile(&s));
        assert_eq!(profiler.profile_probe(&s), profiler.profile(&s));
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let profiler = RuntimeProfiler::new(ProfilerThresholds {
            low_memory_max: 8.0,
            low_cpu_below: 8,
            legacy_os_below: 18,
        });
        let mut s = signals(IPHONE_SAFARI_17);
        s.device_memory = Some(6.0);
        s.hardware_concurrency = Some(6);
        let profile = profiler.profile(&s);
        assert!(profile.low_memory);
        assert!(profile.low_cpu);
        assert!(profile.is_legacy_os);
    }

    #[test]
    fn thresholds_deserialize_with_defaults() {
        let thresholds: ProfilerThresholds =
            serde_json::from_str(r#"{ "low_cpu_below": 2 }"#).unwrap();
        assert_eq!(thresholds.low_cpu_below, 2);
        assert_eq!(thresholds.low_memory_max, 4.0);
        assert_eq!(thresholds.legacy_os_below, 16);
    }
}
