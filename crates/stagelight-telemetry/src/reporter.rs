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

//! Log-backed failure reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use stagelight_core::renderer::{FailureKind, FailureReport, FailureReporter};

/// A snapshot of how many failures of each kind were reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureCounts {
    /// Renderer error callbacks.
    pub load_failures: u64,
    /// Attempts that produced no callback in time.
    pub timeouts: u64,
    /// Rendering contexts lost after a successful load.
    pub context_losses: u64,
    /// Sessions that exhausted their budget.
    pub give_ups: u64,
}

impl FailureCounts {
    /// Total failures of every kind, excluding give-ups.
    pub fn total(&self) -> u64 {
        self.load_failures + self.timeouts + self.context_losses
    }
}

#[derive(Debug, Default)]
struct Counters {
    load_failures: AtomicU64,
    timeouts: AtomicU64,
    context_losses: AtomicU64,
    give_ups: AtomicU64,
}

/// Reports failures through the `log` facade and keeps per-kind counters.
///
/// Clones share the same counters, so one clone can be handed to a session while
/// another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct LogFailureReporter {
    counters: Arc<Counters>,
}

impl LogFailureReporter {
    /// Creates a reporter with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counter values.
    pub fn counts(&self) -> FailureCounts {
        FailureCounts {
            load_failures: self.counters.load_failures.load(Ordering::Relaxed),
            timeouts: self.counters.timeouts.load(Ordering::Relaxed),
            context_losses: self.counters.context_losses.load(Ordering::Relaxed),
            give_ups: self.counters.give_ups.load(Ordering::Relaxed),
        }
    }
}

impl FailureReporter for LogFailureReporter {
    fn report(&self, report: &FailureReport) {
        let counter = match report.kind {
            FailureKind::LoadFailure => &self.counters.load_failures,
            FailureKind::Timeout => &self.counters.timeouts,
            FailureKind::ContextLost => &self.counters.context_losses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        log::warn!("Scene load: {report}");
    }

    fn gave_up(&self, last: &FailureReport) {
        self.counters.give_ups.fetch_add(1, Ordering::Relaxed);
        log::warn!(
            "Scene load: retry budget exhausted after {} retries (last: {}). Showing fallback.",
            last.retry_count,
            last.kind
        );
    }
}
