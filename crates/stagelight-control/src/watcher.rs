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

//! Environment watchers that turn host notifications into retry triggers.
//!
//! Both watchers are attached when a session starts and detached when it is torn
//! down. They only filter notifications; the session decides what a retry costs.

use stagelight_core::platform::Visibility;
use stagelight_core::session::Generation;

/// Tracks the host surface's visibility and reports returns to the foreground.
///
/// Hosts commonly suspend timers and network while backgrounded, so a pending
/// retry may never fire on its own. The session reacts to a reported return by
/// retrying immediately.
#[derive(Debug, Clone, Default)]
pub struct VisibilityWatcher {
    attached: bool,
    visibility: Visibility,
}

impl VisibilityWatcher {
    /// Creates a detached watcher assuming the surface is in the foreground.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts reporting transitions.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stops reporting transitions. Safe to call repeatedly.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Returns whether the watcher is attached.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The last observed visibility.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Records `visibility`. Returns `true` only for a background-to-foreground
    /// transition observed while attached.
    pub fn observe(&mut self, visibility: Visibility) -> bool {
        let previous = std::mem::replace(&mut self.visibility, visibility);
        self.attached && previous == Visibility::Background && visibility == Visibility::Foreground
    }
}

/// Filters rendering-context-loss notifications down to the current instance.
#[derive(Debug, Clone, Default)]
pub struct ContextLossWatcher {
    attached: bool,
}

impl ContextLossWatcher {
    /// Creates a detached watcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts reporting losses.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stops reporting losses. Safe to call repeatedly.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Returns whether the watcher is attached.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns `true` when a loss tagged with `reported` concerns the `current`
    /// instance. Untagged losses come from the environment and always concern it.
    pub fn observe(&self, reported: Option<Generation>, current: Generation) -> bool {
        self.attached && reported.map_or(true, |generation| generation == current)
    }
}
