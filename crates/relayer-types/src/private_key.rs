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

use std::str::FromStr;

use ethers::types::H256;
use serde::Deserialize;

use crate::resolve_env_reference;

/// The secret key used to sign the result transactions.
///
/// Accepts a `0x` prefixed, 32 bytes hex string, or a `$VAR` reference to an
/// environment variable holding one.
#[derive(Clone)]
pub struct PrivateKey(H256);

impl PrivateKey {
    /// The raw big-endian bytes of the key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PrivateKey").finish()
    }
}

impl From<H256> for PrivateKey {
    fn from(secret: H256) -> Self {
        PrivateKey(secret)
    }
}

impl FromStr for PrivateKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hex = resolve_env_reference(value)?;
        if !hex.starts_with("0x") {
            return Err(String::from(
                "expected a hex string starting with 0x",
            ));
        }
        H256::from_str(&hex).map(Self).map_err(|e| {
            format!(
                "{e}\n got {} chars but expected a 66 chars string (including the 0x prefix)",
                hex.len()
            )
        })
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
