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

//! Errors surfaced by the mount lifecycle.
//!
//! Only setup can fail. Once mounted, load failures are retried and finally
//! shown as a fallback; they never reach the host application as errors.

use stagelight_core::session::VariantListError;

/// Why a scene could not be mounted.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    /// The configuration names no scene variant to load.
    #[error("no scene variant configured")]
    NoVariants(#[from] VariantListError),
    /// The configuration document could not be parsed.
    #[error("invalid loader configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The session driver thread could not be started.
    #[error("failed to spawn the session driver thread: {0}")]
    Spawn(#[source] std::io::Error),
}
