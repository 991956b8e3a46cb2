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

/// The compute platforms the oracle can run functions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComputePlatformKind {
    /// AWS Lambda, configured from the standard AWS environment.
    #[default]
    AwsLambda,
    /// An in-memory platform where every function returns an empty object,
    /// useful for running the oracle locally.
    Mocked,
}

/// ComputeConfig is the configuration of the compute platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComputeConfig {
    /// Which platform the functions run on.
    #[serde(default)]
    pub platform: ComputePlatformKind,
    /// Overrides the region of the platform, when it has regions.
    #[serde(default)]
    pub region: Option<String>,
    /// The function that creates and updates other functions.
    #[serde(
        rename(serialize = "deployerFunction"),
        default = "defaults::deployer_function"
    )]
    pub deployer_function: String,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            platform: ComputePlatformKind::default(),
            region: None,
            deployer_function: defaults::deployer_function(),
        }
    }
}
