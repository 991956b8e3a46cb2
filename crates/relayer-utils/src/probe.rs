// Copyright 2022 Compute Oracle Developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use derive_more::Display;
/// Target for logger
pub const TARGET: &str = "compute_oracle_probe";

/// The Kind of the Probe.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// When the Lifecycle of the Oracle changes, like starting or shutting down.
    #[display(fmt = "lifecycle")]
    Lifecycle,
    /// Oracle sync state on the watched contract.
    #[display(fmt = "sync")]
    Sync,
    /// An event got handed to the registered handlers.
    #[display(fmt = "dispatch")]
    Dispatch,
    /// A call into the compute platform settled.
    #[display(fmt = "compute")]
    Compute,
    /// A result transaction was submitted to the contract.
    #[display(fmt = "submission")]
    Submission,
}
