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

#![warn(missing_docs)]
//! Value types of the oracle configuration that may be read from the
//! environment instead of being written in the config files.
//!
//! A string value that starts with `$` names an environment variable that
//! holds the actual value, e.g. `$ORACLE_PRIVATE_KEY`.

/// Private key of the oracle account.
pub mod private_key;
/// RPC endpoint URL.
pub mod rpc_url;

/// Resolves a config string that may reference an environment variable.
pub(crate) fn resolve_env_reference(value: &str) -> Result<String, String> {
    match value.strip_prefix('$') {
        Some(var) => {
            tracing::trace!("Reading {} from env", var);
            std::env::var(var).map_err(|e| {
                format!("error while loading this env {var}: {e}")
            })
        }
        None => Ok(value.to_owned()),
    }
}
