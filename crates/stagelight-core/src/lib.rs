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

//! # Stagelight Core
//!
//! Foundational crate containing the contracts and shared types used to load a
//! heavy interactive scene into a host surface without ever leaving that surface
//! blank.
//!
//! This crate defines the abstract "what": the capability snapshot of the runtime,
//! the renderer host contract, the attempt state shared by every component, and the
//! event plumbing that carries asynchronous callbacks back to the session.
//! `stagelight-telemetry` classifies the runtime, `stagelight-control` holds the
//! decision logic, and `stagelight-sdk` exposes the mount lifecycle.

#![warn(missing_docs)]

pub mod event;
pub mod platform;
pub mod renderer;
pub mod session;

pub use event::{EventBus, SessionEvent};
pub use platform::{CapabilityProfile, EnvironmentProbe, EnvironmentSignals, Visibility};
pub use renderer::{
    FailureKind, FailureReport, FailureReporter, HostHandle, LoadError, LoadReporter,
    NullReporter, RendererHost, VariantId,
};
pub use session::{AttemptState, Generation, LoadStatus, VariantList, VariantListError};
