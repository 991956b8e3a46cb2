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

use super::*;

/// EventsWatcherConfig is the configuration for watching the oracle contract events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventsWatcherConfig {
    /// if it is enabled for this chain or not.
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
    /// Polling interval in milliseconds
    #[serde(
        rename(serialize = "pollingInterval"),
        default = "defaults::polling_interval"
    )]
    pub polling_interval: u64,
    /// The maximum number of blocks to fetch the events of in one request.
    #[serde(skip_serializing, default = "defaults::max_blocks_per_step")]
    pub max_blocks_per_step: u64,
    /// print sync progress frequency in milliseconds
    /// if it is zero, means no progress will be printed.
    #[serde(skip_serializing, default = "defaults::print_progress_interval")]
    pub print_progress_interval: u64,
}

impl Default for EventsWatcherConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            polling_interval: defaults::polling_interval(),
            max_blocks_per_step: defaults::max_blocks_per_step(),
            print_progress_interval: defaults::print_progress_interval(),
        }
    }
}
