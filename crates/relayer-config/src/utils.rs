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

use config::{Config, File};
use std::path::{Path, PathBuf};

use super::*;

/// A helper function that will search for all config files in the given directory and return them as a vec
/// of the paths.
///
/// Supported file extensions are:
/// - `.toml`.
/// - `.json`.
pub fn search_config_files<P: AsRef<Path>>(
    base_dir: P,
) -> compute_oracle_utils::Result<Vec<PathBuf>> {
    // A pattern that covers all toml or json files in the config directory and subdirectories.
    let toml_pattern = format!("{}/**/*.toml", base_dir.as_ref().display());
    let json_pattern = format!("{}/**/*.json", base_dir.as_ref().display());
    tracing::trace!(
        "Loading config files from {} and {}",
        toml_pattern,
        json_pattern
    );
    let toml_files = glob::glob(&toml_pattern)?;
    let json_files = glob::glob(&json_pattern)?;
    toml_files
        .chain(json_files)
        .map(|v| v.map_err(compute_oracle_utils::Error::from))
        .collect()
}

/// Try to parse the [`OracleConfig`] from the given config file(s).
pub fn parse_from_files(
    files: &[PathBuf],
) -> compute_oracle_utils::Result<OracleConfig> {
    let mut builder = Config::builder();
    for config_file in files {
        tracing::trace!("Loading config file: {}", config_file.display());
        let ext = config_file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let format = match ext {
            "toml" => config::FileFormat::Toml,
            "json" => config::FileFormat::Json,
            _ => {
                tracing::warn!("Unknown file extension: {}", ext);
                continue;
            }
        };
        builder = builder
            .add_source(File::from(config_file.as_path()).format(format));
    }

    // also merge in the environment (with a prefix of ORACLE).
    let builder = builder
        .add_source(config::Environment::with_prefix("ORACLE").separator("_"));
    let cfg = builder.build()?;
    // and finally deserialize the config and post-process it
    let config: Result<
        OracleConfig,
        serde_path_to_error::Error<config::ConfigError>,
    > = serde_path_to_error::deserialize(cfg);
    match config {
        Ok(c) => postloading_process(c),
        Err(e) => {
            tracing::error!("{}", e);
            Err(e.into())
        }
    }
}

/// Load the configuration files and
///
/// Returns `Ok(OracleConfig)` on success, or `Err(Error)` on failure.
///
/// # Arguments
///
/// * `path` - The path to the configuration directory
///
/// # Example
///
/// ```no_run
/// use compute_oracle_config::utils::load;
///
/// let path = "/path/to/config";
/// load(path);
/// ```
///
/// it is the same as using the [`search_config_files`] and [`parse_from_files`] functions combined.
pub fn load<P: AsRef<Path>>(
    path: P,
) -> compute_oracle_utils::Result<OracleConfig> {
    parse_from_files(&search_config_files(path)?)
}

/// The postloading_process exists to validate configuration and standardize
/// the format of the configuration
pub fn postloading_process(
    mut config: OracleConfig,
) -> compute_oracle_utils::Result<OracleConfig> {
    tracing::trace!("Checking configration sanity ...");

    config.evm.name = config.evm.name.to_lowercase();

    let watcher = &mut config.evm.contract.events_watcher;
    if !watcher.enabled {
        tracing::warn!(
            "!!WARNING!!: events watcher is disabled for ({}),
            no compute request will be served",
            config.evm.contract.address
        );
    }
    if watcher.max_blocks_per_step == 0 {
        tracing::warn!(
            "max-blocks-per-step cannot be zero, falling back to {}",
            defaults::max_blocks_per_step()
        );
        watcher.max_blocks_per_step = defaults::max_blocks_per_step();
    }
    if watcher.polling_interval == 0 {
        tracing::warn!(
            "polling-interval cannot be zero, falling back to {}ms",
            defaults::polling_interval()
        );
        watcher.polling_interval = defaults::polling_interval();
    }
    if config.compute.deployer_function.trim().is_empty() {
        return Err(compute_oracle_utils::Error::Generic(
            "compute.deployer-function cannot be empty",
        ));
    }

    tracing::trace!(
        "postloaded config: {}",
        serde_json::to_string_pretty(&config)?
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> OracleConfig {
        serde_json::from_value(serde_json::json!({
            "evm": {
                "name": "Hermes",
                "chain-id": 5001,
                "http-endpoint": "http://localhost:5001",
                "contract": {
                    "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                    "deployed-at": 1,
                    "events-watcher": {
                        "max-blocks-per-step": 0,
                        "polling-interval": 0,
                    },
                },
            },
        }))
        .unwrap()
    }

    #[test]
    fn postloading_normalizes_the_watcher() {
        let config = postloading_process(base()).unwrap();
        assert_eq!(config.evm.name, "hermes");
        let watcher = config.evm.contract.events_watcher;
        assert_eq!(watcher.max_blocks_per_step, defaults::max_blocks_per_step());
        assert_eq!(watcher.polling_interval, defaults::polling_interval());
        assert!(watcher.enabled);
    }

    #[test]
    fn empty_deployer_function_is_rejected() {
        let mut config = base();
        config.compute.deployer_function = String::from("  ");
        assert!(postloading_process(config).is_err());
    }

    #[test]
    fn unknown_extensions_are_skipped() {
        let result = parse_from_files(&[PathBuf::from("/tmp/oracle.yaml")]);
        // nothing was loaded, so the required `evm` section is missing.
        assert!(matches!(
            result,
            Err(compute_oracle_utils::Error::ParseConfig(_))
        ));
    }
}
