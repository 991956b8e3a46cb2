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

//! # Compute Oracle Service Module 🕸️
//!
//! A module for starting the long-running tasks of the oracle.
//!
//! ## Overview
//!
//! Services are tasks which the oracle constantly runs throughout its
//! lifetime: the events watcher of the oracle contract and the http server
//! exposing the oracle information and metrics.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::LocalWallet;

use compute_oracle_compute::{ComputePlatform, LifecycleManager};
use compute_oracle_context::OracleContext;
use compute_oracle_dispatcher::{
    ContractWatcher, EventDispatcher, OracleContract, ResultContract,
};
use compute_oracle_utils::metric::Metrics;

use crate::handlers::{DeleteHandler, DeployHandler, EditHandler, RunHandler};
use crate::routes::{handle_metric_info, handle_oracle_info};

/// Type alias for the client results are signed and submitted with.
pub type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Builds the routes of the http server.
pub fn build_router(ctx: Arc<OracleContext>) -> Router {
    let api = Router::new()
        .route("/info", get(handle_oracle_info))
        .route("/metrics", get(handle_metric_info))
        .with_state(ctx);
    Router::new().nest("/api/v1", api)
}

/// Serves the http api until the oracle shuts down.
pub async fn build_axum_services(
    ctx: OracleContext,
) -> compute_oracle_utils::Result<()> {
    let socket_addr =
        SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), ctx.config.port);
    let mut shutdown = ctx.shutdown_signal();
    let app = build_router(Arc::new(ctx));
    tracing::info!("Starting the server on {}", socket_addr);
    axum::Server::try_bind(&socket_addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(async move { shutdown.recv().await })
        .await?;
    Ok(())
}

/// Creates a dispatcher with the default handler of every event family.
pub fn build_dispatcher<P, C>(
    contract: Arc<C>,
    manager: Arc<LifecycleManager<P>>,
    metrics: Arc<Metrics>,
) -> EventDispatcher<C>
where
    P: ComputePlatform + 'static,
    C: ResultContract + 'static,
{
    let mut dispatcher = EventDispatcher::new(contract).with_metrics(metrics);
    let reporter = dispatcher.reporter();
    dispatcher.on_run(RunHandler::new(manager.clone(), reporter.clone()));
    dispatcher
        .on_deploy(DeployHandler::new(manager.clone(), reporter.clone()));
    dispatcher.on_edit(EditHandler::new(manager.clone(), reporter.clone()));
    dispatcher.on_delete(DeleteHandler::new(manager, reporter));
    dispatcher
}

/// Starts the events watcher of the oracle contract.
///
/// This does not block, the watcher runs on a background task until the
/// oracle shuts down.
pub async fn ignite(ctx: &OracleContext) -> compute_oracle_utils::Result<()> {
    let evm = &ctx.config.evm;
    let contract_config = &evm.contract;
    if !contract_config.events_watcher.enabled {
        tracing::warn!(
            "Events watcher is disabled for ({}), not starting it",
            contract_config.address,
        );
        return Ok(());
    }

    let provider = ctx.evm_provider()?;
    let wallet = ctx.evm_wallet()?;
    let client = Arc::new(Client::new(provider, wallet));
    let contract = OracleContract::new(contract_config.address, client);

    let platform = ctx.compute_platform().await?;
    let manager = LifecycleManager::builder()
        .platform(platform)
        .deployer_function(ctx.config.compute.deployer_function.clone())
        .metrics(ctx.metrics.clone())
        .build();

    let dispatcher = build_dispatcher(
        Arc::new(contract.clone()),
        Arc::new(manager),
        ctx.metrics.clone(),
    );
    let watcher =
        ContractWatcher::new(contract, contract_config, evm.block_confirmations)
            .with_metrics(ctx.metrics.clone());

    tracing::debug!(
        chain = %evm.name,
        chain_id = evm.chain_id,
        address = %contract_config.address,
        "Starting the oracle events watcher",
    );
    let mut shutdown = ctx.shutdown_signal();
    tokio::spawn(async move {
        watcher
            .run(&dispatcher, async move { shutdown.recv().await })
            .await;
    });
    Ok(())
}
