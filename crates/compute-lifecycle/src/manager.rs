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

use std::sync::Arc;

use compute_oracle_utils::metric::Metrics;
use compute_oracle_utils::probe;
use serde::Serialize;

use crate::outcome::{classify, InvocationMode, Outcome};
use crate::{ComputeError, ComputePlatform};

/// The name of the deployer function, unless configured otherwise.
pub const DEFAULT_DEPLOYER_FUNCTION: &str = "deployer";

/// What the deployer should do with the function code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum DeployerAction {
    /// Create the function and its infrastructure.
    Create,
    /// Replace the code of an existing function.
    Update,
}

/// The input of the deployer function.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployerRequest<'a> {
    action: DeployerAction,
    name: &'a str,
    memory_size: u32,
    code: &'a str,
}

/// Translates oracle requests into compute platform calls.
///
/// Every operation resolves with a user-visible message, or fails with a
/// [`ComputeError`] whose `Display` is the user-visible message.
///
/// Nothing is rolled back when an operation fails: the deployer may already
/// have created the function when it reports an error from a later step.
#[derive(typed_builder::TypedBuilder)]
pub struct LifecycleManager<P> {
    /// The compute platform connection.
    platform: P,
    /// The function that creates and updates other functions.
    #[builder(default = String::from(DEFAULT_DEPLOYER_FUNCTION), setter(into))]
    deployer_function: String,
    #[builder(default, setter(strip_option))]
    metrics: Option<Arc<Metrics>>,
}

impl<P> LifecycleManager<P>
where
    P: ComputePlatform,
{
    /// The name of the deployer function used by [`Self::deploy`] and [`Self::edit`].
    pub fn deployer_function(&self) -> &str {
        &self.deployer_function
    }

    /// Runs `function_name` with `args` as its input.
    ///
    /// Resolves with the `message` the function returned.
    #[tracing::instrument(skip(self, args), fields(function = %function_name))]
    pub async fn invoke(
        &self,
        function_name: &str,
        args: &[String],
    ) -> Result<String, ComputeError> {
        let payload = serde_json::to_vec(args)?;
        let response = self.platform.invoke(function_name, payload).await;
        match self.settle("invoke", function_name, InvocationMode::Run, response)
        {
            Outcome::Success(message) => Ok(message),
            Outcome::Failure(message) => Err(ComputeError::Invocation(message)),
        }
    }

    /// Asks the deployer to create `name` with the given memory size and code.
    #[tracing::instrument(skip(self, code))]
    pub async fn deploy(
        &self,
        name: &str,
        memory_size: u32,
        code: &str,
    ) -> Result<String, ComputeError> {
        self.call_deployer(DeployerAction::Create, name, memory_size, code)
            .await?;
        Ok(format!("{name} successfully deployed"))
    }

    /// Asks the deployer to replace the code of the existing function `name`.
    #[tracing::instrument(skip(self, code))]
    pub async fn edit(
        &self,
        name: &str,
        memory_size: u32,
        code: &str,
    ) -> Result<String, ComputeError> {
        self.call_deployer(DeployerAction::Update, name, memory_size, code)
            .await?;
        Ok(format!("{name} successfully edited"))
    }

    /// Deletes `name` from the platform, without going through the deployer.
    ///
    /// Any failure is reported as [`ComputeError::NotDeleted`]; the cause is
    /// only logged.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<String, ComputeError> {
        let result = self.platform.delete(name).await;
        self.record("delete", name, result.is_ok());
        match result {
            Ok(()) => Ok(format!("{name} deleted successfully")),
            Err(e) => {
                tracing::warn!(%e, "Failed to delete function");
                Err(ComputeError::NotDeleted {
                    name: name.to_owned(),
                })
            }
        }
    }

    async fn call_deployer(
        &self,
        action: DeployerAction,
        name: &str,
        memory_size: u32,
        code: &str,
    ) -> Result<(), ComputeError> {
        let request = DeployerRequest {
            action,
            name,
            memory_size,
            code,
        };
        let payload = serde_json::to_vec(&request)?;
        let response = self
            .platform
            .invoke(&self.deployer_function, payload)
            .await;
        let operation = match action {
            DeployerAction::Create => "deploy",
            DeployerAction::Update => "edit",
        };
        match self.settle(operation, name, InvocationMode::Lifecycle, response)
        {
            Outcome::Success(_) => Ok(()),
            Outcome::Failure(message) => Err(ComputeError::Invocation(message)),
        }
    }

    fn settle(
        &self,
        operation: &'static str,
        function: &str,
        mode: InvocationMode,
        response: Result<crate::InvocationResponse, crate::PlatformError>,
    ) -> Outcome {
        let outcome = classify(mode, response);
        self.record(operation, function, outcome.is_success());
        if let Outcome::Failure(message) = &outcome {
            tracing::debug!(operation, %message, "Compute operation failed");
        }
        outcome
    }

    fn record(&self, operation: &'static str, function: &str, success: bool) {
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Compute,
            operation,
            function,
            success,
        );
        let Some(metrics) = &self.metrics else {
            return;
        };
        let counter = if success {
            &metrics.compute_successes
        } else {
            &metrics.compute_failures
        };
        counter.with_label_values(&[operation]).inc();
    }
}
