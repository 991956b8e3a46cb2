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

use aws_sdk_lambda::error::{DisplayErrorContext, SdkError};
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;

use crate::{ComputePlatform, InvocationResponse, PlatformError};

/// The AWS Lambda compute platform.
#[derive(Debug, Clone)]
pub struct AwsLambdaPlatform {
    client: aws_sdk_lambda::Client,
}

impl AwsLambdaPlatform {
    /// Wraps an already configured Lambda client.
    #[must_use]
    pub fn new(client: aws_sdk_lambda::Client) -> Self {
        Self { client }
    }

    /// Creates a client from the standard AWS environment (env vars, profile,
    /// instance metadata...), optionally overriding the region.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader =
            aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(aws_sdk_lambda::Client::new(&sdk_config))
    }
}

/// Keeps the service message when there is one, the full error chain otherwise.
fn rejection<E, R>(err: SdkError<E, R>) -> PlatformError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = match err.as_service_error() {
        Some(service_error) => service_error.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    PlatformError::Transport(message)
}

#[async_trait::async_trait]
impl ComputePlatform for AwsLambdaPlatform {
    #[tracing::instrument(skip(self, payload))]
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvocationResponse, PlatformError> {
        let output = self
            .client
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(rejection)?;
        tracing::trace!(
            status = output.status_code(),
            function_error = ?output.function_error(),
            "Lambda invocation settled"
        );
        Ok(InvocationResponse {
            function_error: output.function_error().map(ToOwned::to_owned),
            payload: output
                .payload()
                .map(|blob| blob.as_ref().to_vec())
                .unwrap_or_default(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, function_name: &str) -> Result<(), PlatformError> {
        self.client
            .delete_function()
            .function_name(function_name)
            .send()
            .await
            .map_err(rejection)?;
        Ok(())
    }
}
