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

//! # Compute Oracle Configuration Module 🕸️
//!
//! A module for configuring the compute oracle.
//!
//! ## Overview
//!
//! The configuration is read from every `.toml` and `.json` file of a config
//! directory, merged with the `ORACLE_` prefixed environment variables.
//! Possible configuration include:
//! * `port`: The port the oracle http service will listen on. Defaults to 9955
//! * `evm`: The chain the oracle contract lives on, the contract and how to
//!   watch its events.
//! * `compute`: The compute platform the functions run on.

/// CLI configuration
#[cfg(feature = "cli")]
pub mod cli;
/// Compute platform configuration
pub mod compute;
/// Default values of the configuration
pub mod defaults;
/// Event watcher configuration
pub mod event_watcher;
/// EVM configuration
pub mod evm;
/// Utils for processing configuration
pub mod utils;

use compute::ComputeConfig;
use evm::EvmChainConfig;
use serde::{Deserialize, Serialize};

/// OracleConfig is the configuration for the compute oracle.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OracleConfig {
    /// Http Server Port number
    ///
    /// default to 9955
    #[serde(default = "defaults::port", skip_serializing)]
    pub port: u16,
    /// The EVM chain the oracle contract is deployed on.
    pub evm: EvmChainConfig,
    /// The compute platform the requested functions run on.
    #[serde(default)]
    pub compute: ComputeConfig,
}

impl OracleConfig {
    /// Makes sure that the config is valid, by going
    /// through the whole config and doing some basic checks.
    ///
    /// The oracle always answers on-chain, so it always needs a key to sign
    /// the result transactions with.
    pub fn verify(&self) -> compute_oracle_utils::Result<()> {
        self.evm
            .private_key
            .as_ref()
            .map(|_| ())
            .ok_or(compute_oracle_utils::Error::MissingSecrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn example_dir() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("example")
    }

    #[test]
    fn example_config_is_correct() {
        let dir = example_dir();
        dotenv::from_path(dir.join(".env.example"))
            .expect("Failed to load the example env file");
        let config = utils::load(&dir).unwrap_or_else(|e| {
            panic!("Failed to parse config file in directory: {dir:?} with error: {e}")
        });
        config.verify().expect("example config has a private key");
        assert_eq!(config.evm.chain_id, 31337);
        assert!(config.evm.contract.events_watcher.enabled);
        assert_eq!(config.compute.deployer_function, "deployer");
    }

    #[test]
    fn missing_private_key_fails_verification() {
        let config: OracleConfig = serde_json::from_value(serde_json::json!({
            "evm": {
                "name": "local",
                "chain-id": 1,
                "http-endpoint": "http://localhost:8545",
                "contract": {
                    "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                    "deployed-at": 1,
                },
            },
        }))
        .unwrap();
        assert_eq!(config.port, 9955);
        assert!(matches!(
            config.verify(),
            Err(compute_oracle_utils::Error::MissingSecrets)
        ));
    }

    #[test]
    fn serialized_config_hides_secrets() {
        let config: OracleConfig = serde_json::from_value(serde_json::json!({
            "evm": {
                "name": "local",
                "chain-id": 1,
                "http-endpoint": "http://localhost:8545",
                "private-key": "0x8917174396171783496173419137618235192359106130478137647163400318",
                "contract": {
                    "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                    "deployed-at": 1,
                },
            },
        }))
        .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("8917174396"));
        assert!(!json.contains("localhost"));
        assert!(json.contains("chainId"));
    }
}
