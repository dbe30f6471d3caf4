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

//! # Stagelight Telemetry
//!
//! Observes the runtime the scene is loaded into: a one-time capability profile
//! built from ambient host signals, a native signal probe backed by `sysinfo`, and
//! the logging sink that receives every load failure.

#![warn(missing_docs)]

pub mod probe;
pub mod profiler;
pub mod reporter;

pub use probe::SysinfoProbe;
pub use profiler::{ProfilerThresholds, RuntimeProfiler};
pub use reporter::{FailureCounts, LogFailureReporter};
