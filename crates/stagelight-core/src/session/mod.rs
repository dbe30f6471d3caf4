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

//! Shared state of a load session: status, attempt counters, and the variant
//! rotation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::renderer::VariantId;

/// The status of the current load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoadStatus {
    /// The session has been created but not started.
    #[default]
    Idle,
    /// A renderer instance is being constructed.
    Loading,
    /// The scene is displayed. Stable until the rendering context is lost.
    Loaded,
    /// The renderer reported a failure; a retry is pending.
    Errored,
    /// No callback arrived within the load timeout; a retry is pending.
    TimedOut,
    /// The retry budget is exhausted. Terminal for this session.
    GaveUp,
}

impl LoadStatus {
    /// Returns `true` for the terminal [`LoadStatus::GaveUp`] state.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadStatus::GaveUp)
    }

    /// Returns `true` when a retry timer is expected to be pending.
    pub fn awaits_retry(self) -> bool {
        matches!(self, LoadStatus::Errored | LoadStatus::TimedOut)
    }

    /// Returns `true` when the placeholder must be fully shown.
    pub fn shows_fallback(self) -> bool {
        !matches!(self, LoadStatus::Loaded)
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStatus::Idle => "Idle",
            LoadStatus::Loading => "Loading",
            LoadStatus::Loaded => "Loaded",
            LoadStatus::Errored => "Errored",
            LoadStatus::TimedOut => "TimedOut",
            LoadStatus::GaveUp => "GaveUp",
        };
        f.write_str(name)
    }
}

/// A monotonically increasing tag identifying one load attempt.
///
/// Callbacks carry the generation they were issued for; anything older than the
/// session's current generation is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// Creates a generation from its raw counter value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the generation following this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// The mutable attempt state owned by a load session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttemptState {
    /// Current status.
    pub status: LoadStatus,
    /// Index into the variant list of the variant currently selected.
    pub variant_index: usize,
    /// Retry budget units consumed so far.
    pub retry_count: u32,
    /// Generation of the most recent entry into `Loading`.
    pub generation: Generation,
}

/// An error produced when building a [`VariantList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantListError {
    /// At least one variant identifier is required.
    Empty,
}

impl fmt::Display for VariantListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantListError::Empty => write!(f, "A variant list needs at least one entry."),
        }
    }
}

impl std::error::Error for VariantListError {}

/// An ordered, cyclic, non-empty sequence of interchangeable asset identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VariantId>", into = "Vec<VariantId>")]
pub struct VariantList {
    ids: Vec<VariantId>,
}

impl VariantList {
    /// Builds a list from the given identifiers, rejecting an empty sequence.
    pub fn new(ids: Vec<VariantId>) -> Result<Self, VariantListError> {
        if ids.is_empty() {
            return Err(VariantListError::Empty);
        }
        Ok(Self { ids })
    }

    /// Returns the number of variants. Never zero.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the variant at `index`, wrapping around the end of the list.
    pub fn get(&self, index: usize) -> &VariantId {
        &self.ids[index % self.ids.len()]
    }

    /// Returns the index that follows `index` in the rotation.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.ids.len()
    }

    /// Iterates over the variants in rotation order.
    pub fn iter(&self) -> impl Iterator<Item = &VariantId> {
        self.ids.iter()
    }
}

impl TryFrom<Vec<VariantId>> for VariantList {
    type Error = VariantListError;

    fn try_from(ids: Vec<VariantId>) -> Result<Self, Self::Error> {
        Self::new(ids)
    }
}

impl From<VariantList> for Vec<VariantId> {
    fn from(list: VariantList) -> Self {
        list.ids
    }
}
