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

//! The default request handlers.
//!
//! Every handler performs its request through the [`LifecycleManager`] and
//! reports the outcome on-chain, a failed request is reported with
//! `success = false`. Handlers never fail themselves.

use std::sync::Arc;

use compute_oracle_compute::{ComputeError, ComputePlatform, LifecycleManager};
use compute_oracle_dispatcher::{
    DeleteEventData, DeployEventData, EditEventData, EventHandler,
    ResultContract, ResultReporter, RunEventData,
};

/// The message and success flag to report for `result`.
fn settle(result: Result<String, ComputeError>) -> (String, bool) {
    match result {
        Ok(message) => (message, true),
        Err(e) => (e.to_string(), false),
    }
}

/// Runs the requested function and reports its result.
pub struct RunHandler<P, C> {
    manager: Arc<LifecycleManager<P>>,
    reporter: ResultReporter<C>,
}

impl<P, C> RunHandler<P, C> {
    /// Creates a new handler.
    pub fn new(
        manager: Arc<LifecycleManager<P>>,
        reporter: ResultReporter<C>,
    ) -> Self {
        Self { manager, reporter }
    }
}

#[async_trait::async_trait]
impl<P, C> EventHandler<RunEventData> for RunHandler<P, C>
where
    P: ComputePlatform,
    C: ResultContract,
{
    #[tracing::instrument(
        skip_all,
        fields(function = %event.request_id(), id = %event.value()),
    )]
    async fn handle_event(
        &self,
        event: &RunEventData,
    ) -> compute_oracle_utils::Result<()> {
        let result =
            self.manager.invoke(event.request_id(), event.args()).await;
        let (message, success) = settle(result);
        self.reporter
            .send_run_result(&message, event.value(), success)
            .await;
        Ok(())
    }
}

/// Deploys the requested function and reports the outcome.
pub struct DeployHandler<P, C> {
    manager: Arc<LifecycleManager<P>>,
    reporter: ResultReporter<C>,
}

impl<P, C> DeployHandler<P, C> {
    /// Creates a new handler.
    pub fn new(
        manager: Arc<LifecycleManager<P>>,
        reporter: ResultReporter<C>,
    ) -> Self {
        Self { manager, reporter }
    }
}

#[async_trait::async_trait]
impl<P, C> EventHandler<DeployEventData> for DeployHandler<P, C>
where
    P: ComputePlatform,
    C: ResultContract,
{
    #[tracing::instrument(
        skip_all,
        fields(function = %event.request_id(), id = %event.value()),
    )]
    async fn handle_event(
        &self,
        event: &DeployEventData,
    ) -> compute_oracle_utils::Result<()> {
        let name = event.request_id();
        let result = self
            .manager
            .deploy(name, event.memory_size(), event.code())
            .await;
        let (message, success) = settle(result);
        self.reporter
            .send_deploy_result(&message, name, event.value(), success)
            .await;
        Ok(())
    }
}

/// Replaces the code of the requested function and reports the outcome.
pub struct EditHandler<P, C> {
    manager: Arc<LifecycleManager<P>>,
    reporter: ResultReporter<C>,
}

impl<P, C> EditHandler<P, C> {
    /// Creates a new handler.
    pub fn new(
        manager: Arc<LifecycleManager<P>>,
        reporter: ResultReporter<C>,
    ) -> Self {
        Self { manager, reporter }
    }
}

#[async_trait::async_trait]
impl<P, C> EventHandler<EditEventData> for EditHandler<P, C>
where
    P: ComputePlatform,
    C: ResultContract,
{
    #[tracing::instrument(
        skip_all,
        fields(function = %event.request_id(), id = %event.value()),
    )]
    async fn handle_event(
        &self,
        event: &EditEventData,
    ) -> compute_oracle_utils::Result<()> {
        let name = event.request_id();
        let result = self
            .manager
            .edit(name, event.memory_size(), event.code())
            .await;
        let (message, success) = settle(result);
        self.reporter
            .send_deploy_result(&message, name, event.value(), success)
            .await;
        Ok(())
    }
}

/// Deletes the requested function and reports the outcome.
pub struct DeleteHandler<P, C> {
    manager: Arc<LifecycleManager<P>>,
    reporter: ResultReporter<C>,
}

impl<P, C> DeleteHandler<P, C> {
    /// Creates a new handler.
    pub fn new(
        manager: Arc<LifecycleManager<P>>,
        reporter: ResultReporter<C>,
    ) -> Self {
        Self { manager, reporter }
    }
}

#[async_trait::async_trait]
impl<P, C> EventHandler<DeleteEventData> for DeleteHandler<P, C>
where
    P: ComputePlatform,
    C: ResultContract,
{
    #[tracing::instrument(
        skip_all,
        fields(function = %event.request_id(), id = %event.value()),
    )]
    async fn handle_event(
        &self,
        event: &DeleteEventData,
    ) -> compute_oracle_utils::Result<()> {
        let name = event.request_id();
        let result = self.manager.delete(name).await;
        let (message, success) = settle(result);
        self.reporter
            .send_deploy_result(&message, name, event.value(), success)
            .await;
        Ok(())
    }
}
