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

//! Timer slots for the two suspension points a session owns.
//!
//! A session never needs more than one timer of each kind, so instead of a
//! general timer wheel it keeps one optional slot per [`TimerKind`]. Deadlines
//! are offsets from the session clock's epoch, which keeps the slots usable
//! under both a real and a virtual clock.

use std::time::Duration;

use stagelight_core::session::Generation;

/// What an armed timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// The current attempt produced no callback in time.
    LoadTimeout,
    /// The delay after a failure has elapsed.
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    deadline: Duration,
    generation: Generation,
}

/// A timer that has reached its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    /// Which slot fired.
    pub kind: TimerKind,
    /// When it was due. Follow-up timers are measured from here, not from the
    /// (possibly later) moment the clock was advanced.
    pub deadline: Duration,
    /// Generation of the attempt that armed it.
    pub generation: Generation,
}

/// One optional timer per [`TimerKind`].
#[derive(Debug, Clone, Default)]
pub struct TimerSlots {
    load_timeout: Option<Armed>,
    retry: Option<Armed>,
}

impl TimerSlots {
    /// Creates empty slots.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<Armed> {
        match kind {
            TimerKind::LoadTimeout => &mut self.load_timeout,
            TimerKind::Retry => &mut self.retry,
        }
    }

    /// Arms `kind`, replacing any timer already in that slot.
    pub fn arm(&mut self, kind: TimerKind, deadline: Duration, generation: Generation) {
        *self.slot(kind) = Some(Armed {
            deadline,
            generation,
        });
    }

    /// Cancels `kind`. Returns whether a timer was armed.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.slot(kind).take().is_some()
    }

    /// Cancels every timer.
    pub fn cancel_all(&mut self) {
        self.load_timeout = None;
        self.retry = None;
    }

    /// Returns whether `kind` is armed.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::LoadTimeout => self.load_timeout.is_some(),
            TimerKind::Retry => self.retry.is_some(),
        }
    }

    /// The earliest armed deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        [self.load_timeout, self.retry]
            .into_iter()
            .flatten()
            .map(|armed| armed.deadline)
            .min()
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<FiredTimer> {
        let candidates = [
            (TimerKind::LoadTimeout, self.load_timeout),
            (TimerKind::Retry, self.retry),
        ];
        let (kind, armed) = candidates
            .into_iter()
            .filter_map(|(kind, armed)| armed.map(|a| (kind, a)))
            .filter(|(_, armed)| armed.deadline <= now)
            .min_by_key(|(_, armed)| armed.deadline)?;

        self.slot(kind).take();
        Some(FiredTimer {
            kind,
            deadline: armed.deadline,
            generation: armed.generation,
        })
    }
}
