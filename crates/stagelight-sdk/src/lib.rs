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

//! The public-facing SDK for Stagelight.
//!
//! A host application implements [`RendererHost`](prelude::RendererHost) for its
//! renderer, describes the scene variants in a [`LoaderConfig`], and mounts it.
//! From then on the scene either appears or the placeholder stays up; no load
//! failure ever reaches the host as an error.
//!
//! ```no_run
//! use stagelight_sdk::prelude::*;
//!
//! struct NoopHost;
//!
//! impl RendererHost for NoopHost {
//!     fn create(&mut self, _variant: &VariantId, reporter: LoadReporter) -> HostHandle {
//!         reporter.loaded();
//!         HostHandle::new(1)
//!     }
//!
//!     fn destroy(&mut self, _handle: HostHandle) {}
//! }
//!
//! # fn main() -> Result<(), MountError> {
//! let config = LoaderConfig::new(["scenes/hero.splinecode"]);
//! let mut mount = SceneMount::mount(NoopHost, config, &EnvironmentSignals::default())?;
//! let _frame = mount.fallback_frame();
//! mount.unmount();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod mount;

pub use config::LoaderConfig;
pub use error::MountError;
pub use mount::{HostSignals, SceneMount, SessionSnapshot};

/// Everything a host application needs to implement a renderer and mount it.
pub mod prelude {
    pub use crate::{HostSignals, LoaderConfig, MountError, SceneMount, SessionSnapshot};
    pub use stagelight_control::{FallbackFrame, FallbackStyle, RetryPolicy, RetryTuning};
    pub use stagelight_core::{
        CapabilityProfile, EnvironmentProbe, EnvironmentSignals, FailureReport, FailureReporter,
        HostHandle, LoadError, LoadReporter, LoadStatus, RendererHost, VariantId, Visibility,
    };
    pub use stagelight_telemetry::{LogFailureReporter, ProfilerThresholds, SysinfoProbe};
}
