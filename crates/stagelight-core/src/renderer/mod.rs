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

//! Contract with the external renderer that decodes and displays the scene.
//!
//! The renderer itself is opaque. The session only asks it to create an instance
//! for a variant, to destroy an instance, and optionally to warm a variant's bytes.
//! Results come back asynchronously through a [`LoadReporter`] tagged with the
//! attempt's [`Generation`].

pub mod error;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::event::SessionEvent;
use crate::session::Generation;

pub use self::error::{FailureKind, FailureReport, FailureReporter, LoadError, NullReporter};

/// Identifier of one interchangeable scene variant (typically a URL or path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(Arc<str>);

impl VariantId {
    /// Creates a variant identifier.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VariantId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// An opaque handle to one renderer instance, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostHandle(u64);

impl HostHandle {
    /// Wraps a host-assigned raw handle value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The callback half handed to the renderer for a single attempt.
///
/// Every report is tagged with the generation the reporter was created for, so
/// reports from a superseded instance are recognised and discarded by the session.
/// Reporting after the session has been torn down is a silent no-op.
#[derive(Debug, Clone)]
pub struct LoadReporter {
    generation: Generation,
    sender: flume::Sender<SessionEvent>,
}

impl LoadReporter {
    /// Creates a reporter for the given attempt generation.
    /// ## Arguments
    /// * `generation` - The attempt the reporter speaks for.
    /// * `sender` - The session's event channel.
    /// ## Returns
    /// * A reporter that tags every event with `generation`.
    pub fn new(generation: Generation, sender: flume::Sender<SessionEvent>) -> Self {
        Self { generation, sender }
    }

    /// Returns the generation this reporter is bound to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Reports that the scene is constructed and displayed.
    pub fn loaded(&self) {
        self.send(SessionEvent::Loaded {
            generation: self.generation,
        });
    }

    /// Reports that the instance failed to load.
    pub fn failed(&self, error: LoadError) {
        self.send(SessionEvent::Failed {
            generation: self.generation,
            error,
        });
    }

    /// Reports that the instance lost its rendering context after loading.
    pub fn context_lost(&self) {
        self.send(SessionEvent::ContextLost {
            generation: Some(self.generation),
        });
    }

    fn send(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            log::trace!(
                "LoadReporter: session for {} is gone, dropping report.",
                self.generation
            );
        }
    }
}

/// The external subsystem that turns a variant identifier into a visible scene.
///
/// Implementations live with the host application. The session guarantees that it
/// destroys the current instance before creating the next one, so at most one
/// instance owns the display surface at any time.
pub trait RendererHost: Send {
    /// Starts constructing a renderer instance for `variant`.
    ///
    /// The outcome is reported asynchronously through `reporter`, possibly before
    /// this call returns.
    fn create(&mut self, variant: &VariantId, reporter: LoadReporter) -> HostHandle;

    /// Tears an instance down. Must be a safe no-op on an already destroyed handle.
    fn destroy(&mut self, handle: HostHandle);

    /// Best-effort prefetch of a variant's bytes without constructing a renderer.
    ///
    /// Failures must be swallowed by the implementation. The default does nothing.
    fn warm(&mut self, _variant: &VariantId) {}
}

impl<H: RendererHost + ?Sized> RendererHost for Box<H> {
    fn create(&mut self, variant: &VariantId, reporter: LoadReporter) -> HostHandle {
        (**self).create(variant, reporter)
    }

    fn destroy(&mut self, handle: HostHandle) {
        (**self).destroy(handle)
    }

    fn warm(&mut self, variant: &VariantId) {
        (**self).warm(variant)
    }
}
