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

//! The load-session state machine.
//!
//! A [`LoadSession`] owns the attempt state, its two timers, both watchers, and
//! the renderer instance that is currently on the surface. It is driven from the
//! outside with a monotonically increasing clock (`now`, measured from any fixed
//! epoch): events are fed through [`LoadSession::handle`] and due timers fire in
//! [`LoadSession::advance`]. Nothing in here sleeps or spawns, so the same code
//! runs under the SDK's driver thread and under a virtual clock in tests.

use std::time::Duration;

use stagelight_core::event::{EventBus, SessionEvent};
use stagelight_core::platform::Visibility;
use stagelight_core::renderer::{
    FailureKind, FailureReport, FailureReporter, HostHandle, LoadError, LoadReporter,
    NullReporter, RendererHost, VariantId,
};
use stagelight_core::session::{AttemptState, Generation, LoadStatus, VariantList};

use crate::policy::RetryPolicy;
use crate::scheduler::{TimerKind, TimerSlots};
use crate::watcher::{ContextLossWatcher, VisibilityWatcher};

/// One mount's worth of load attempts against a [`RendererHost`].
///
/// At most one renderer instance is current at any time: every entry into
/// `Loading` destroys the previous instance before creating the next, and every
/// callback is checked against the current [`Generation`] before it is acted on.
pub struct LoadSession<H: RendererHost> {
    host: H,
    variants: VariantList,
    policy: RetryPolicy,
    reporter: Box<dyn FailureReporter>,
    bus: EventBus<SessionEvent>,
    state: AttemptState,
    current: Option<HostHandle>,
    timers: TimerSlots,
    visibility: VisibilityWatcher,
    context_loss: ContextLossWatcher,
    preload: bool,
    status_since: Duration,
    history: Vec<LoadStatus>,
    stopped: bool,
}

impl<H: RendererHost> LoadSession<H> {
    /// Creates an idle session. Failures are passed to `reporter`.
    /// ## Arguments
    /// * `host` - The renderer that creates and destroys scene instances.
    /// * `variants` - The scene variants, tried in rotation after failures.
    /// * `policy` - The retry budget and timings for every attempt.
    /// * `reporter` - Receives every failure and the final give-up.
    /// ## Returns
    /// * A session in `Idle` that loads nothing until it is started.
    pub fn new(
        host: H,
        variants: VariantList,
        policy: RetryPolicy,
        reporter: Box<dyn FailureReporter>,
    ) -> Self {
        Self {
            host,
            variants,
            policy,
            reporter,
            bus: EventBus::new(),
            state: AttemptState::default(),
            current: None,
            timers: TimerSlots::new(),
            visibility: VisibilityWatcher::new(),
            context_loss: ContextLossWatcher::new(),
            preload: true,
            status_since: Duration::ZERO,
            history: Vec::new(),
            stopped: false,
        }
    }

    /// Creates an idle session that does not report failures anywhere.
    pub fn unreported(host: H, variants: VariantList, policy: RetryPolicy) -> Self {
        Self::new(host, variants, policy, Box::new(NullReporter))
    }

    /// Enables or disables preload hints. Enabled by default.
    pub fn with_preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    /// A sender for events from outside the renderer (visibility, environment
    /// context loss, stop).
    pub fn sender(&self) -> flume::Sender<SessionEvent> {
        self.bus.sender()
    }

    /// Blocks for the next queued event, up to `timeout` (`None` waits forever).
    pub fn wait_event(&self, timeout: Option<Duration>) -> Option<SessionEvent> {
        self.bus.wait(timeout)
    }

    /// Handles every queued event, then fires due timers.
    pub fn pump(&mut self, now: Duration) {
        for event in self.bus.drain() {
            self.handle(event, now);
        }
        self.advance(now);
    }

    /// Leaves `Idle`: attaches the watchers and creates the first instance.
    pub fn start(&mut self, now: Duration) {
        if self.stopped || self.state.status != LoadStatus::Idle {
            log::warn!(
                "LoadSession: start ignored while {} (stopped: {}).",
                self.state.status,
                self.stopped
            );
            return;
        }

        self.visibility.attach();
        self.context_loss.attach();
        log::info!(
            "LoadSession: starting with {} variant(s), policy {:?}.",
            self.variants.len(),
            self.policy
        );
        if self.preload {
            let initial = self.current_variant().clone();
            self.host.warm(&initial);
        }
        self.enter_loading(now);
    }

    /// Applies one event at time `now`. Ignored once the session is stopped.
    pub fn handle(&mut self, event: SessionEvent, now: Duration) {
        if self.stopped {
            log::trace!("LoadSession: stopped, ignoring {event:?}.");
            return;
        }

        match event {
            SessionEvent::Start => self.start(now),
            SessionEvent::Loaded { generation } => self.on_loaded(generation, now),
            SessionEvent::Failed { generation, error } => self.on_failed(generation, error, now),
            SessionEvent::Visibility(visibility) => self.on_visibility(visibility, now),
            SessionEvent::ContextLost { generation } => self.on_context_lost(generation, now),
            SessionEvent::Stop => self.stop(),
        }
    }

    /// Fires every timer due at or before `now`, in deadline order.
    ///
    /// Follow-up timers are measured from the deadline that fired, so advancing
    /// the clock in one large step yields the same timeline as many small ones.
    pub fn advance(&mut self, now: Duration) {
        if self.stopped {
            return;
        }

        while let Some(fired) = self.timers.pop_due(now) {
            if fired.generation != self.state.generation {
                log::trace!(
                    "LoadSession: dropping {:?} timer of superseded {}.",
                    fired.kind,
                    fired.generation
                );
                continue;
            }
            match fired.kind {
                TimerKind::LoadTimeout => self.on_timeout(fired.deadline),
                TimerKind::Retry => self.on_retry_due(fired.deadline),
            }
        }
    }

    /// The earliest pending timer deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.stopped {
            return None;
        }
        self.timers.next_deadline()
    }

    /// Tears the session down: cancels timers, detaches the watchers, and
    /// destroys the current instance. Idempotent.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.timers.cancel_all();
        self.visibility.detach();
        self.context_loss.detach();
        if let Some(handle) = self.current.take() {
            self.host.destroy(handle);
        }
        log::info!(
            "LoadSession: stopped in {} after {} retries.",
            self.state.status,
            self.state.retry_count
        );
    }

    /// The current status.
    pub fn status(&self) -> LoadStatus {
        self.state.status
    }

    /// A copy of the attempt state.
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// The variant selected for the current (or next) attempt.
    pub fn current_variant(&self) -> &VariantId {
        self.variants.get(self.state.variant_index)
    }

    /// The policy this session was created with.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The clock value at which the current status was entered.
    pub fn status_since(&self) -> Duration {
        self.status_since
    }

    /// Every status entered so far, in order.
    pub fn history(&self) -> &[LoadStatus] {
        &self.history
    }

    /// Returns whether [`LoadSession::stop`] has run.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn transition(&mut self, status: LoadStatus, now: Duration) {
        log::debug!(
            "LoadSession: {} -> {} ({}, variant '{}', retries {}/{}).",
            self.state.status,
            status,
            self.state.generation,
            self.current_variant(),
            self.state.retry_count,
            self.policy.max_retries
        );
        self.state.status = status;
        self.status_since = now;
        self.history.push(status);
    }

    fn is_current_attempt(&self, generation: Generation) -> bool {
        if generation != self.state.generation || self.state.status != LoadStatus::Loading {
            log::trace!(
                "LoadSession: discarding callback of {generation} (current {}, {}).",
                self.state.generation,
                self.state.status
            );
            return false;
        }
        true
    }

    /// Destroy-then-create under a fresh generation, with the timeout armed.
    fn enter_loading(&mut self, now: Duration) {
        if let Some(handle) = self.current.take() {
            self.host.destroy(handle);
        }
        self.timers.cancel_all();
        self.state.generation = self.state.generation.next();
        self.transition(LoadStatus::Loading, now);

        let generation = self.state.generation;
        let variant = self.current_variant().clone();
        self.timers
            .arm(TimerKind::LoadTimeout, now + self.policy.load_timeout(), generation);
        let reporter = LoadReporter::new(generation, self.bus.sender());
        self.current = Some(self.host.create(&variant, reporter));
    }

    fn retry_with_next_variant(&mut self, now: Duration) {
        self.state.variant_index = self.variants.next_index(self.state.variant_index);
        self.enter_loading(now);
    }

    fn on_loaded(&mut self, generation: Generation, now: Duration) {
        if !self.is_current_attempt(generation) {
            return;
        }
        self.timers.cancel(TimerKind::LoadTimeout);
        self.transition(LoadStatus::Loaded, now);
        log::info!(
            "LoadSession: scene '{}' loaded after {} retries.",
            self.current_variant(),
            self.state.retry_count
        );
    }

    fn on_failed(&mut self, generation: Generation, error: LoadError, now: Duration) {
        if !self.is_current_attempt(generation) {
            return;
        }
        self.timers.cancel(TimerKind::LoadTimeout);
        self.transition(LoadStatus::Errored, now);
        self.charge_failure(FailureKind::LoadFailure, Some(error.message().to_owned()), now);
    }

    fn on_timeout(&mut self, at: Duration) {
        if self.state.status != LoadStatus::Loading {
            return;
        }
        self.transition(LoadStatus::TimedOut, at);
        self.charge_failure(FailureKind::Timeout, None, at);
    }

    fn on_retry_due(&mut self, at: Duration) {
        if self.state.status.awaits_retry() {
            self.retry_with_next_variant(at);
        }
    }

    /// Consumes a budget unit for a failed attempt, then either schedules the
    /// retry or gives up.
    fn charge_failure(&mut self, kind: FailureKind, detail: Option<String>, now: Duration) {
        if self.state.retry_count < self.policy.max_retries {
            self.state.retry_count += 1;
        }
        let report = self.failure_report(kind, detail);
        self.reporter.report(&report);

        if self.state.retry_count >= self.policy.max_retries {
            self.give_up(report, now);
            return;
        }

        self.timers.arm(
            TimerKind::Retry,
            now + self.policy.retry_delay(),
            self.state.generation,
        );
        if self.preload {
            let next = self
                .variants
                .get(self.variants.next_index(self.state.variant_index))
                .clone();
            self.host.warm(&next);
        }
    }

    fn on_visibility(&mut self, visibility: Visibility, now: Duration) {
        if !self.visibility.observe(visibility) || self.state.status.is_terminal() {
            return;
        }

        match self.state.status {
            LoadStatus::Errored | LoadStatus::TimedOut => {
                log::debug!("LoadSession: back in foreground, retrying without delay.");
                self.timers.cancel(TimerKind::Retry);
                self.retry_with_next_variant(now);
            }
            LoadStatus::Loading if self.state.retry_count < self.policy.max_retries => {
                log::debug!("LoadSession: back in foreground with a stalled attempt, restarting.");
                self.state.retry_count += 1;
                self.retry_with_next_variant(now);
            }
            LoadStatus::Loading => {
                log::debug!("LoadSession: back in foreground, budget too low to restart.");
            }
            LoadStatus::Idle | LoadStatus::Loaded | LoadStatus::GaveUp => {}
        }
    }

    fn on_context_lost(&mut self, generation: Option<Generation>, now: Duration) {
        if !self.context_loss.observe(generation, self.state.generation) {
            log::trace!("LoadSession: context loss of another instance ignored.");
            return;
        }
        if !matches!(self.state.status, LoadStatus::Loaded | LoadStatus::GaveUp) {
            log::trace!(
                "LoadSession: context loss while {} ignored.",
                self.state.status
            );
            return;
        }

        if self.state.retry_count < self.policy.max_retries {
            self.state.retry_count += 1;
            let report = self.failure_report(FailureKind::ContextLost, None);
            self.reporter.report(&report);
            self.retry_with_next_variant(now);
        } else if !self.state.status.is_terminal() {
            let report = self.failure_report(FailureKind::ContextLost, None);
            self.reporter.report(&report);
            self.give_up(report, now);
        }
    }

    fn give_up(&mut self, last: FailureReport, now: Duration) {
        self.timers.cancel_all();
        self.transition(LoadStatus::GaveUp, now);
        self.reporter.gave_up(&last);
    }

    fn failure_report(&self, kind: FailureKind, detail: Option<String>) -> FailureReport {
        FailureReport {
            kind,
            variant: self.current_variant().clone(),
            generation: self.state.generation,
            retry_count: self.state.retry_count,
            detail,
        }
    }
}

impl<H: RendererHost> Drop for LoadSession<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(String, u64),
        Destroy(u64),
        Warm(String),
    }

    /// Records every host call; reports nothing on its own.
    #[derive(Default, Clone)]
    struct Recorder {
        calls: Arc<Mutex<Vec<Call>>>,
        reporters: Arc<Mutex<Vec<LoadReporter>>>,
        next: u64,
    }

    impl Recorder {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn last_reporter(&self) -> LoadReporter {
            self.reporters.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl RendererHost for Recorder {
        fn create(&mut self, variant: &VariantId, reporter: LoadReporter) -> HostHandle {
            self.next += 1;
            self.calls
                .lock()
                .unwrap()
                .push(Call::Create(variant.to_string(), self.next));
            self.reporters.lock().unwrap().push(reporter);
            HostHandle::new(self.next)
        }

        fn destroy(&mut self, handle: HostHandle) {
            self.calls.lock().unwrap().push(Call::Destroy(handle.raw()));
        }

        fn warm(&mut self, variant: &VariantId) {
            self.calls.lock().unwrap().push(Call::Warm(variant.to_string()));
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn session(recorder: &Recorder) -> LoadSession<Recorder> {
        let variants = VariantList::new(vec!["a".into(), "b".into()]).unwrap();
        LoadSession::unreported(recorder.clone(), variants, RetryPolicy::STANDARD)
    }

    #[test]
    fn start_warms_then_creates_the_first_variant() {
        let recorder = Recorder::default();
        let mut session = session(&recorder);
        session.start(ms(0));

        assert_eq!(session.status(), LoadStatus::Loading);
        assert_eq!(session.state().generation, Generation::new(1));
        assert_eq!(
            recorder.calls(),
            vec![Call::Warm("a".into()), Call::Create("a".into(), 1)]
        );
        assert_eq!(session.next_deadline(), Some(ms(9_000)));
    }

    #[test]
    fn second_start_is_ignored() {
        let recorder = Recorder::default();
        let mut session = session(&recorder);
        session.start(ms(0));
        session.handle(SessionEvent::Start, ms(10));
        assert_eq!(session.state().generation, Generation::new(1));
    }

    #[test]
    fn success_cancels_the_timeout() {
        let recorder = Recorder::default();
        let mut session = session(&recorder);
        session.start(ms(0));
        recorder.last_reporter().loaded();
        session.pump(ms(50));

        assert_eq!(session.status(), LoadStatus::Loaded);
        assert_eq!(session.status_since(), ms(50));
        assert_eq!(session.next_deadline(), None);
        session.advance(ms(60_000));
        assert_eq!(session.status(), LoadStatus::Loaded);
    }

    #[test]
    fn failure_schedules_a_retry_and_warms_the_next_variant() {
        let recorder = Recorder::default();
        let mut session = session(&recorder);
        session.start(ms(0));
        recorder.last_reporter().failed(LoadError::new("boom"));
        session.pump(ms(100));

        assert_eq!(session.status(), LoadStatus::Errored);
        assert_eq!(session.state().retry_count, 1);
        assert_eq!(session.next_deadline(), Some(ms(550)));
        assert_eq!(recorder.calls().last(), Some(&Call::Warm("b".into())));

        session.advance(ms(550));
        assert_eq!(session.status(), LoadStatus::Loading);
        assert_eq!(session.current_variant().as_str(), "b");
        assert_eq!(
            &recorder.calls()[recorder.calls().len() - 2..],
            &[Call::Destroy(1), Call::Create("b".into(), 2)]
        );
    }

    #[test]
    fn silent_attempt_times_out() {
        let recorder = Recorder::default();
        let mut session = session(&recorder);
        session.start(ms(0));
        session.advance(ms(8_999));
        assert_eq!(session.status(), LoadStatus::Loading);
        session.advance(ms(9_000));
        assert_eq!(session.status(), LoadStatus::TimedOut);
        assert_eq!(session.next_deadline(), Some(ms(9_450)));
    }

    #[test]
    fn late_success_after_timeout_is_discarded() {
        let recorder = Recorder::default();
        let mut session = session(&recorder);
        session.start(ms(0));
        session.advance(ms(9_000));
        recorder.last_reporter().loaded();
        session.pump(ms(9_100));
        assert_eq!(session.status(), LoadStatus::TimedOut);
    }

    #[test]
    fn stop_destroys_the_instance_once_and_goes_quiet() {
        let recorder = Recorder::default();
        let mut session = session(&recorder);
        session.start(ms(0));
        session.stop();
        session.stop();
        recorder.last_reporter().loaded();
        session.pump(ms(100));

        assert!(session.is_stopped());
        assert_eq!(session.next_deadline(), None);
        let destroys = recorder
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Destroy(_)))
            .count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn dropping_a_running_session_tears_it_down() {
        let recorder = Recorder::default();
        {
            let mut session = session(&recorder);
            session.start(ms(0));
        }
        assert_eq!(recorder.calls().last(), Some(&Call::Destroy(1)));
    }

    #[test]
    fn foreground_restarts_a_stalled_attempt() {
        let recorder = Recorder::default();
        let mut session = session(&recorder);
        session.start(ms(0));
        session.handle(SessionEvent::Visibility(Visibility::Background), ms(100));
        session.handle(SessionEvent::Visibility(Visibility::Foreground), ms(200));

        assert_eq!(session.status(), LoadStatus::Loading);
        assert_eq!(session.state().retry_count, 1);
        assert_eq!(session.current_variant().as_str(), "b");
        assert_eq!(session.next_deadline(), Some(ms(9_200)));
    }
}
