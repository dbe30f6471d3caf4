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

//! Defines the failure taxonomy of the loading subsystem.
//!
//! None of these types ever propagates to the host application as an `Err`. They
//! feed the retry budget and are handed to a [`FailureReporter`] for logging.

use std::fmt;

use crate::renderer::VariantId;
use crate::session::Generation;

/// Information passed by the renderer host when an attempt fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    message: String,
}

impl LoadError {
    /// Creates a load error from a renderer-provided description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the renderer-provided description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Renderer failed to load the scene: {}", self.message)
    }
}

impl std::error::Error for LoadError {}

/// The kinds of failure that consume retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The renderer invoked its error callback.
    LoadFailure,
    /// No callback arrived within the load timeout.
    Timeout,
    /// The rendering surface was evicted after a successful load.
    ContextLost,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::LoadFailure => write!(f, "load failure"),
            FailureKind::Timeout => write!(f, "load timeout"),
            FailureKind::ContextLost => write!(f, "rendering context lost"),
        }
    }
}

/// A single failure, as handed to the external logging collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureReport {
    /// What went wrong.
    pub kind: FailureKind,
    /// The variant the failed attempt was loading.
    pub variant: VariantId,
    /// The generation of the failed attempt.
    pub generation: Generation,
    /// Retry budget units consumed after accounting for this failure.
    pub retry_count: u32,
    /// Renderer-provided details, for [`FailureKind::LoadFailure`].
    pub detail: Option<String>,
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on '{}' ({}, retries used: {})",
            self.kind, self.variant, self.generation, self.retry_count
        )?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Sink for failures observed by a load session.
///
/// Reporting is fire-and-forget: implementations must not block or panic.
pub trait FailureReporter: Send {
    /// Called for every failure, including the one that exhausts the budget.
    fn report(&self, report: &FailureReport);

    /// Called once when the session enters its terminal fallback state.
    fn gave_up(&self, _last: &FailureReport) {}
}

/// A reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl FailureReporter for NullReporter {
    fn report(&self, _report: &FailureReport) {}
}
