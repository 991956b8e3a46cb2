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
//! # Compute Oracle Context Module 🕸️
//!
//! A module for managing the context of the compute oracle.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use compute_oracle_compute::{ComputePlatform, MockedPlatform};
use compute_oracle_config::compute::ComputePlatformKind;
use compute_oracle_config::OracleConfig;
use compute_oracle_utils::metric::Metrics;
use ethers::core::k256::SecretKey;
use ethers::prelude::*;

/// A compute platform picked at runtime from the configuration.
pub type DynComputePlatform = Box<dyn ComputePlatform>;

/// OracleContext contains the oracle's configuration and shutdown signal.
#[derive(Clone)]
pub struct OracleContext {
    /// The configuration of the oracle.
    pub config: OracleConfig,
    /// Broadcasts a shutdown signal to all active tasks.
    ///
    /// When a graceful shutdown is initiated, a `()` value is sent via
    /// the broadcast::Sender. Each task receives it, reaches a safe terminal
    /// state, and completes.
    notify_shutdown: broadcast::Sender<()>,
    /// Represents the metrics for the oracle
    pub metrics: Arc<Metrics>,
}

impl OracleContext {
    /// Creates a new OracleContext.
    pub fn new(config: OracleConfig) -> compute_oracle_utils::Result<Self> {
        let (notify_shutdown, _) = broadcast::channel(2);
        let metrics = Arc::new(Metrics::new()?);
        Ok(Self {
            config,
            notify_shutdown,
            metrics,
        })
    }

    /// Returns a broadcast receiver handle for the shutdown signal.
    pub fn shutdown_signal(&self) -> Shutdown {
        Shutdown::new(self.notify_shutdown.subscribe())
    }

    /// Sends a shutdown signal to all subscribed tasks.
    pub fn shutdown(&self) {
        let _ = self.notify_shutdown.send(());
    }

    /// Returns a new http provider for the configured chain.
    pub fn evm_provider(&self) -> compute_oracle_utils::Result<Provider<Http>> {
        let provider =
            Provider::try_from(self.config.evm.http_endpoint.as_str())?
                .interval(Duration::from_millis(5u64));
        Ok(provider)
    }

    /// Sets up and returns the wallet the oracle signs result transactions
    /// with.
    pub fn evm_wallet(&self) -> compute_oracle_utils::Result<LocalWallet> {
        let chain_config = &self.config.evm;
        let private_key = chain_config
            .private_key
            .as_ref()
            .ok_or(compute_oracle_utils::Error::MissingSecrets)?;
        let key = SecretKey::from_slice(private_key.as_bytes())?;
        let wallet =
            LocalWallet::from(key).with_chain_id(chain_config.chain_id);
        Ok(wallet)
    }

    /// Connects to the configured compute platform.
    pub async fn compute_platform(
        &self,
    ) -> compute_oracle_utils::Result<DynComputePlatform> {
        let compute = &self.config.compute;
        match compute.platform {
            ComputePlatformKind::Mocked => {
                tracing::warn!(
                    "Using the mocked compute platform, \
                    no function will really run"
                );
                Ok(Box::new(MockedPlatform::new()))
            }
            #[cfg(feature = "aws")]
            ComputePlatformKind::AwsLambda => {
                use compute_oracle_compute::AwsLambdaPlatform;
                let region = compute.region.clone();
                let platform = AwsLambdaPlatform::from_env(region).await;
                Ok(Box::new(platform))
            }
            #[cfg(not(feature = "aws"))]
            ComputePlatformKind::AwsLambda => {
                Err(compute_oracle_utils::Error::PlatformUnavailable(
                    String::from("aws-lambda"),
                ))
            }
        }
    }
}

/// Listens for the shutdown signal.
///
/// Shutdown is signalled using a `broadcast::Receiver`. Only a single value is
/// ever sent. Once a value has been sent via the broadcast channel, the task
/// should stop.
#[derive(Debug)]
pub struct Shutdown {
    /// `true` if the shutdown signal has been received
    shutdown: bool,

    /// The receive half of the channel used to listen for shutdown.
    notify: broadcast::Receiver<()>,
}

impl Shutdown {
    /// Create a new `Shutdown` backed by the given `broadcast::Receiver`.
    pub fn new(notify: broadcast::Receiver<()>) -> Shutdown {
        Shutdown {
            shutdown: false,
            notify,
        }
    }

    /// Returns `true` if the shutdown signal has been received.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Receive the shutdown notice, waiting if necessary.
    pub async fn recv(&mut self) {
        // If the shutdown signal has already been received, then return
        // immediately.
        if self.shutdown {
            return;
        }

        // Cannot receive a "lag error" as only one value is ever sent.
        let _ = self.notify.recv().await;

        // Remember that the signal has been received.
        self.shutdown = true;
    }
}
