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

//! The mount/unmount lifecycle.
//!
//! Mounting profiles the runtime once, derives the retry policy, and hands a
//! [`LoadSession`] to a dedicated driver thread. The thread sleeps until either
//! an event arrives or the session's next timer is due, so it costs nothing
//! while the scene is displayed. The host reads status snapshots and placeholder
//! frames without ever blocking on the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use stagelight_control::{FallbackFrame, FallbackPresenter, LoadSession, RetryPolicy};
use stagelight_core::event::SessionEvent;
use stagelight_core::platform::{CapabilityProfile, EnvironmentProbe, Visibility};
use stagelight_core::renderer::{FailureReporter, RendererHost, VariantId};
use stagelight_core::session::{AttemptState, LoadStatus};
use stagelight_telemetry::{LogFailureReporter, RuntimeProfiler};

use crate::config::LoaderConfig;
use crate::error::MountError;

/// A point-in-time view of the session, for host UI and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// The attempt state.
    pub state: AttemptState,
    /// The variant selected for the current attempt.
    pub variant: VariantId,
    /// Time since mount at which the current status was entered.
    pub status_since: Duration,
    /// Whether the session has been torn down.
    pub stopped: bool,
}

/// Forwards host environment notifications to a mounted session.
///
/// Cheap to clone. Notifications sent after unmount are dropped.
#[derive(Debug, Clone)]
pub struct HostSignals {
    sender: flume::Sender<SessionEvent>,
}

impl HostSignals {
    /// The host surface became visible again.
    pub fn foreground(&self) {
        self.visibility(Visibility::Foreground);
    }

    /// The host surface was hidden.
    pub fn background(&self) {
        self.visibility(Visibility::Background);
    }

    /// Reports a visibility change.
    pub fn visibility(&self, visibility: Visibility) {
        self.send(SessionEvent::Visibility(visibility));
    }

    /// The rendering context of the current instance was lost.
    pub fn context_lost(&self) {
        self.send(SessionEvent::ContextLost { generation: None });
    }

    fn send(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            log::trace!("HostSignals: scene is unmounted, dropping notification.");
        }
    }
}

/// A mounted scene: one load session driven on its own thread.
///
/// Dropping the mount unmounts it.
pub struct SceneMount {
    epoch: Instant,
    profile: CapabilityProfile,
    policy: RetryPolicy,
    presenter: FallbackPresenter,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    running: Arc<AtomicBool>,
    signals: HostSignals,
    handle: Option<thread::JoinHandle<()>>,
}

impl SceneMount {
    /// Mounts a scene, reporting failures through a [`LogFailureReporter`].
    pub fn mount<H>(
        host: H,
        config: LoaderConfig,
        probe: &dyn EnvironmentProbe,
    ) -> Result<Self, MountError>
    where
        H: RendererHost + 'static,
    {
        Self::mount_with_reporter(host, config, probe, Box::new(LogFailureReporter::new()))
    }

    /// Mounts a scene, reporting failures to `reporter`.
    /// ## Arguments
    /// * `host` - The renderer the session drives.
    /// * `config` - Variants and tuning; the variant list must not be empty.
    /// * `probe` - Source of the environment signals used to pick a retry policy.
    /// * `reporter` - Receives every load failure and the final give-up.
    /// ## Returns
    /// * The running mount, or a [`MountError`] if the configuration is invalid
    ///   or the driver thread cannot be spawned.
    pub fn mount_with_reporter<H>(
        host: H,
        config: LoaderConfig,
        probe: &dyn EnvironmentProbe,
        reporter: Box<dyn FailureReporter>,
    ) -> Result<Self, MountError>
    where
        H: RendererHost + 'static,
    {
        let variants = config.variant_list()?;
        let profile = RuntimeProfiler::new(config.profiler).profile_probe(probe);
        let policy = config.retry.derive(&profile);
        log::info!(
            "SceneMount: mounting {} variant(s), constrained={}, policy {:?}.",
            variants.len(),
            profile.is_constrained(),
            policy
        );

        let mut session =
            LoadSession::new(host, variants, policy, reporter).with_preload(config.preload);
        let epoch = Instant::now();
        let snapshot = Arc::new(RwLock::new(snapshot_of(&session)));
        let running = Arc::new(AtomicBool::new(true));
        let signals = HostSignals {
            sender: session.sender(),
        };

        let thread_snapshot = Arc::clone(&snapshot);
        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("stagelight-session".into())
            .spawn(move || {
                log::info!("SceneMount: session thread started.");
                session.start(epoch.elapsed());
                publish(&thread_snapshot, &session);

                while thread_running.load(Ordering::Relaxed) && !session.is_stopped() {
                    let timeout = session
                        .next_deadline()
                        .map(|deadline| deadline.saturating_sub(epoch.elapsed()));
                    if let Some(event) = session.wait_event(timeout) {
                        session.handle(event, epoch.elapsed());
                    }
                    session.pump(epoch.elapsed());
                    publish(&thread_snapshot, &session);
                }

                session.stop();
                publish(&thread_snapshot, &session);
                log::info!("SceneMount: session thread stopped.");
            })
            .map_err(MountError::Spawn)?;

        Ok(Self {
            epoch,
            profile,
            policy,
            presenter: FallbackPresenter::new(config.fallback),
            snapshot,
            running,
            signals,
            handle: Some(handle),
        })
    }

    /// Tears the scene down and waits for the driver thread to finish.
    ///
    /// The current renderer instance is destroyed before this returns. Idempotent.
    pub fn unmount(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.running.store(false, Ordering::SeqCst);
        self.signals.send(SessionEvent::Stop);
        if handle.join().is_err() {
            log::warn!("SceneMount: session thread panicked.");
        }
        log::info!("SceneMount: unmounted.");
    }

    /// Returns whether the driver thread is still running.
    pub fn is_mounted(&self) -> bool {
        self.handle.is_some()
    }

    /// The current load status.
    pub fn status(&self) -> LoadStatus {
        self.snapshot().state.status
    }

    /// The latest published session snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        match self.snapshot.read() {
            Ok(snapshot) => snapshot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The placeholder frame to draw right now.
    pub fn fallback_frame(&self) -> FallbackFrame {
        let snapshot = self.snapshot();
        let elapsed = self.epoch.elapsed().saturating_sub(snapshot.status_since);
        self.presenter.present(snapshot.state.status, elapsed)
    }

    /// A static preview image for the current variant, if one can be derived.
    pub fn preview(&self) -> Option<String> {
        FallbackPresenter::preview_for(&self.snapshot().variant)
    }

    /// A handle for forwarding host environment notifications.
    pub fn signals(&self) -> HostSignals {
        self.signals.clone()
    }

    /// The capability profile computed at mount.
    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    /// The retry policy derived at mount.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl Drop for SceneMount {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn snapshot_of<H: RendererHost>(session: &LoadSession<H>) -> SessionSnapshot {
    SessionSnapshot {
        state: session.state(),
        variant: session.current_variant().clone(),
        status_since: session.status_since(),
        stopped: session.is_stopped(),
    }
}

fn publish<H: RendererHost>(target: &RwLock<SessionSnapshot>, session: &LoadSession<H>) {
    match target.write() {
        Ok(mut snapshot) => *snapshot = snapshot_of(session),
        Err(_) => log::warn!("SceneMount: snapshot lock poisoned, status not published."),
    }
}
