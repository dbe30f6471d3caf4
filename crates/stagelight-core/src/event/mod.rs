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

//! Event plumbing between the renderer host, the environment, and a load session.

pub mod bus;

pub use self::bus::EventBus;

use crate::platform::Visibility;
use crate::renderer::LoadError;
use crate::session::Generation;

/// An input to a load session's state machine.
///
/// Timer expiries (load timeout, retry delay) are not events: the session owns
/// its timers and fires them itself when advanced past their deadlines.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Drive the session out of `Idle`.
    Start,
    /// The renderer finished constructing the instance of `generation`.
    Loaded {
        /// Generation of the reporting attempt.
        generation: Generation,
    },
    /// The renderer failed to construct the instance of `generation`.
    Failed {
        /// Generation of the reporting attempt.
        generation: Generation,
        /// Renderer-provided failure information.
        error: LoadError,
    },
    /// The host surface moved to the foreground or background.
    Visibility(Visibility),
    /// The rendering context was lost.
    ///
    /// `None` means the notification came from the environment rather than from a
    /// specific instance and applies to whichever instance is current.
    ContextLost {
        /// Generation of the instance whose context was lost, if known.
        generation: Option<Generation>,
    },
    /// Tear the session down.
    Stop,
}
