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

//! # Stagelight Control
//!
//! The decision-making half of the loader: the retry budget derived from the
//! capability profile, the timers it arms, the environment watchers that force
//! early retries, the [`LoadSession`] state machine that ties them together, and
//! the presenter that turns the session status into a placeholder frame.

#![warn(missing_docs)]

pub mod fallback;
pub mod policy;
pub mod scheduler;
pub mod session;
pub mod watcher;

pub use fallback::{FallbackFrame, FallbackPresenter, FallbackStyle};
pub use policy::{RetryPolicy, RetryTuning};
pub use scheduler::{FiredTimer, TimerKind, TimerSlots};
pub use session::LoadSession;
pub use watcher::{ContextLossWatcher, VisibilityWatcher};
