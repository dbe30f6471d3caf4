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

//! Mounts a scene against a simulated renderer that fails a few times before
//! succeeding, then walks it through a background/foreground cycle and a
//! rendering context loss.
//!
//! Usage: `sandbox [config.json]`

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use stagelight_sdk::prelude::*;

/// A renderer that answers each attempt from a background thread after a
/// fixed latency, failing the first `failures` attempts.
struct SimulatedHost {
    latency: Duration,
    failures: u32,
    next: u64,
    destroyed: Arc<Mutex<HashSet<u64>>>,
}

impl SimulatedHost {
    fn new(latency: Duration, failures: u32) -> Self {
        Self {
            latency,
            failures,
            next: 0,
            destroyed: Arc::default(),
        }
    }
}

impl RendererHost for SimulatedHost {
    fn create(&mut self, variant: &VariantId, reporter: LoadReporter) -> HostHandle {
        self.next += 1;
        let raw = self.next;
        let fail = self.failures > 0;
        self.failures = self.failures.saturating_sub(1);
        log::info!("SimulatedHost: creating instance {raw} for '{variant}'.");

        let latency = self.latency;
        let destroyed = Arc::clone(&self.destroyed);
        thread::spawn(move || {
            thread::sleep(latency);
            let gone = destroyed.lock().map(|d| d.contains(&raw)).unwrap_or(true);
            if gone {
                return;
            }
            if fail {
                reporter.failed(LoadError::new("simulated decoder crash"));
            } else {
                reporter.loaded();
            }
        });
        HostHandle::new(raw)
    }

    fn destroy(&mut self, handle: HostHandle) {
        log::info!("SimulatedHost: destroying instance {}.", handle.raw());
        if let Ok(mut destroyed) = self.destroyed.lock() {
            destroyed.insert(handle.raw());
        }
    }

    fn warm(&mut self, variant: &VariantId) {
        log::debug!("SimulatedHost: warming '{variant}'.");
    }
}

fn load_config() -> Result<LoaderConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            Ok(LoaderConfig::from_json(&json)?)
        }
        None => Ok(LoaderConfig::new([
            "scenes/welcome.splinecode",
            "scenes/welcome-lite.splinecode",
        ])),
    }
}

fn watch(mount: &SceneMount, label: &str, duration: Duration) {
    let step = Duration::from_millis(250);
    let mut waited = Duration::ZERO;
    while waited < duration {
        let snapshot = mount.snapshot();
        let frame = mount.fallback_frame();
        log::info!(
            "[{label}] {} on '{}' (retries {}), placeholder opacity {:.2}, pulse {:.2}, caption {:?}",
            snapshot.state.status,
            snapshot.variant,
            snapshot.state.retry_count,
            frame.opacity,
            frame.pulse,
            frame.caption
        );
        thread::sleep(step);
        waited += step;
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let probe = SysinfoProbe::new("stagelight-sandbox/0.1");
    let reporter = LogFailureReporter::new();
    let host = SimulatedHost::new(Duration::from_millis(400), 2);

    let mut mount =
        SceneMount::mount_with_reporter(host, config, &probe, Box::new(reporter.clone()))?;
    log::info!(
        "Profile: {:?}; policy: {:?}; preview: {:?}",
        mount.profile(),
        mount.policy(),
        mount.preview()
    );

    watch(&mount, "initial load", Duration::from_secs(3));

    let signals = mount.signals();
    signals.background();
    signals.foreground();
    watch(&mount, "after foreground", Duration::from_secs(1));

    signals.context_lost();
    watch(&mount, "after context loss", Duration::from_secs(2));

    mount.unmount();
    log::info!("Failure counts: {:?}", reporter.counts());
    Ok(())
}
