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

/// The default port the oracle will listen on. Defaults to 9955.
pub const fn port() -> u16 {
    9955
}
/// Event watchers are enabled by default.
pub const fn enabled() -> bool {
    true
}
/// The polling interval is set to `7_000` by default.
pub const fn polling_interval() -> u64 {
    7_000
}
/// The maximum blocks per step is set to `100` by default.
pub const fn max_blocks_per_step() -> u64 {
    100
}
/// The print progress interval is set to `7_000` by default.
pub const fn print_progress_interval() -> u64 {
    7_000
}
/// The deployer function is named `deployer` by default.
pub fn deployer_function() -> String {
    String::from("deployer")
}
