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

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use compute_oracle_config::evm::OracleContractConfig;
use compute_oracle_utils::metric::Metrics;
use compute_oracle_utils::probe;
use ethers::contract::{ContractError, LogMeta};
use ethers::providers::Middleware;

use crate::contract::{
    ComputeOracleContractEvents, OracleContract, ResultContract,
};
use crate::dispatcher::EventDispatcher;
use crate::events::OracleEvent;

/// Polls the oracle contract for events and feeds them to an
/// [`EventDispatcher`].
///
/// Events are fetched in windows of at most `max-blocks-per-step` blocks and
/// dispatched one at a time, in chain order. An event whose handlers fail is
/// logged and skipped. The last processed block only lives in memory, so a
/// restarted watcher starts again from the deployment block.
pub struct ContractWatcher<M> {
    contract: OracleContract<M>,
    deployed_at: u64,
    block_confirmations: u64,
    polling_interval: Duration,
    max_blocks_per_step: u64,
    print_progress_interval: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl<M> ContractWatcher<M>
where
    M: Middleware + 'static,
{
    /// Creates a watcher for `contract`, configured by `config`.
    pub fn new(
        contract: OracleContract<M>,
        config: &OracleContractConfig,
        block_confirmations: u8,
    ) -> Self {
        let watcher = &config.events_watcher;
        Self {
            contract,
            deployed_at: config.deployed_at,
            block_confirmations: u64::from(block_confirmations),
            polling_interval: Duration::from_millis(watcher.polling_interval),
            max_blocks_per_step: watcher.max_blocks_per_step.max(1),
            print_progress_interval: Duration::from_millis(
                watcher.print_progress_interval,
            ),
            metrics: None,
        }
    }

    /// Counts failed polls in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Watches the contract until `shutdown` resolves.
    #[tracing::instrument(
        skip_all,
        fields(address = %self.contract.address()),
    )]
    pub async fn run<C, S>(&self, dispatcher: &EventDispatcher<C>, shutdown: S)
    where
        C: ResultContract,
        S: Future<Output = ()>,
    {
        tokio::select! {
            _ = self.watch(dispatcher) => {},
            _ = shutdown => {
                tracing::info!("Stopping the events watcher");
            }
        }
    }

    async fn watch<C>(&self, dispatcher: &EventDispatcher<C>)
    where
        C: ResultContract,
    {
        let mut last_block = self.deployed_at.saturating_sub(1);
        // saves the last time we printed sync progress.
        let mut instant = Instant::now();
        // refreshed every time we are fully synced.
        let mut target_block = match self.target_block().await {
            Ok(block) => block,
            Err(e) => {
                self.back_off(&e);
                last_block
            }
        };
        loop {
            match next_window(last_block, self.max_blocks_per_step, target_block)
            {
                Some((from, to)) => match self.query(from, to).await {
                    Ok(found_events) => {
                        tracing::trace!("Found #{} events", found_events.len());
                        self.handle_window(dispatcher, found_events).await;
                        last_block = to;
                    }
                    Err(e) => {
                        self.back_off(&e);
                        tokio::time::sleep(self.polling_interval).await;
                    }
                },
                None => {
                    tracing::trace!(
                        "Cooldown a bit for {}ms",
                        self.polling_interval.as_millis()
                    );
                    tokio::time::sleep(self.polling_interval).await;
                    match self.target_block().await {
                        Ok(block) => target_block = block,
                        Err(e) => self.back_off(&e),
                    }
                }
            }

            if !self.print_progress_interval.is_zero()
                && instant.elapsed() > self.print_progress_interval
            {
                let progress = sync_progress(last_block, target_block);
                let is_syncing = progress < 99.99;
                tracing::info!(
                    target_block,
                    currently_at = last_block,
                    is_syncing,
                    progress,
                );
                tracing::event!(
                    target: probe::TARGET,
                    tracing::Level::TRACE,
                    kind = %probe::Kind::Sync,
                    currently_at = last_block,
                    target_block,
                );
                instant = Instant::now();
            }
        }
    }

    async fn target_block(&self) -> Result<u64, M::Error> {
        let latest = self
            .contract
            .client()
            .get_block_number()
            .await?
            .as_u64();
        Ok(latest.saturating_sub(self.block_confirmations))
    }

    async fn query(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<(ComputeOracleContractEvents, LogMeta)>, ContractError<M>>
    {
        self.contract
            .binding()
            .events()
            .from_block(from)
            .to_block(to)
            .query_with_meta()
            .await
    }

    /// Handles the events of one window in order. A failing event never
    /// stops the ones after it.
    async fn handle_window<C>(
        &self,
        dispatcher: &EventDispatcher<C>,
        found_events: Vec<(ComputeOracleContractEvents, LogMeta)>,
    ) where
        C: ResultContract,
    {
        for (event, log) in found_events {
            self.handle(dispatcher, event, log).await;
        }
    }

    async fn handle<C>(
        &self,
        dispatcher: &EventDispatcher<C>,
        event: ComputeOracleContractEvents,
        log: LogMeta,
    ) where
        C: ResultContract,
    {
        let block = log.block_number.as_u64();
        let event = match OracleEvent::try_from(event) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(%e, block, "Skipping malformed event");
                return;
            }
        };
        let family = event.family();
        tracing::debug!(
            %family,
            function = %event.request_id(),
            block,
            tx = ?log.transaction_hash,
            "Dispatching event",
        );
        if let Err(e) = dispatcher.dispatch(&event).await {
            tracing::error!(
                %e,
                %family,
                block,
                "Error while handling the event, skipping it",
            );
        }
    }

    fn back_off(&self, e: &dyn std::fmt::Display) {
        tracing::warn!(%e, "Failed to poll the chain, trying again later");
        if let Some(metrics) = &self.metrics {
            metrics.event_watcher_back_off.inc();
        }
    }
}

/// The next block window to query, both ends included, or `None` when
/// `last_block` already reached `target_block`.
fn next_window(
    last_block: u64,
    step: u64,
    target_block: u64,
) -> Option<(u64, u64)> {
    if last_block >= target_block {
        return None;
    }
    let from = last_block + 1;
    let to = core::cmp::min(last_block.saturating_add(step), target_block);
    Some((from, to))
}

fn sync_progress(currently_at: u64, target_block: u64) -> f64 {
    if target_block == 0 {
        return 100.0;
    }
    currently_at as f64 / target_block as f64 * 100.0
}
