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

//! # Compute Lifecycle 🕸️
//!
//! Runs, deploys, edits and deletes serverless functions on a compute
//! platform, and settles every platform response into a single outcome.
//!
//! ## Overview
//!
//! A [`ComputePlatform`] is the raw connection to the platform: it can invoke a
//! function with some argument bytes and delete a function. The
//! [`LifecycleManager`] composes those two primitives with the
//! [`outcome`] classifier into the four operations the oracle exposes.
//!
//! Deploying and editing never talk to the platform management API directly,
//! they invoke a *deployer* function that does the actual work and reports
//! back through its payload.
//!
//! As of now, the following platforms are supported:
//! - [AWS Lambda](https://aws.amazon.com/lambda/) (feature `aws`)
//! - A scripted in-memory platform, see [`MockedPlatform`].
//!
//! ## Usage
//! ```rust,no_run
//! use compute_oracle_compute::{LifecycleManager, MockedPlatform};
//! # async fn run() -> Result<(), compute_oracle_compute::ComputeError> {
//! let manager = LifecycleManager::builder()
//!     .platform(MockedPlatform::new())
//!     .build();
//! let args = [String::from("2"), String::from("3")];
//! let _result = manager.invoke("multiply", &args).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

/// AWS Lambda platform.
#[cfg(feature = "aws")]
mod lambda;
/// The lifecycle manager.
mod manager;
/// A scripted platform.
mod mocked;
/// Classification of platform responses.
pub mod outcome;

#[cfg(feature = "aws")]
pub use lambda::AwsLambdaPlatform;
pub use manager::{LifecycleManager, DEFAULT_DEPLOYER_FUNCTION};
pub use mocked::{MockedPlatform, RecordedInvocation};
pub use outcome::{classify, InvocationMode, Outcome};

/// The raw response of a settled function invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResponse {
    /// Set when the function ran but raised an error. The value is the
    /// platform's own label for the error kind (e.g. `Unhandled`).
    pub function_error: Option<String>,
    /// The serialized (JSON) payload returned by the function.
    pub payload: Vec<u8>,
}

impl InvocationResponse {
    /// A response of a function that returned `payload` normally.
    pub fn ok(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            function_error: None,
            payload: payload.into(),
        }
    }

    /// A response of a function that raised, with `payload` describing the error.
    pub fn function_error(
        kind: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            function_error: Some(kind.into()),
            payload: payload.into(),
        }
    }
}

/// The platform call itself failed before the function ran
/// (network, permissions, throttling, unknown function...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The platform rejected the call, the message is kept verbatim.
    #[error("{0}")]
    Transport(String),
}

/// Errors returned by the [`LifecycleManager`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    /// The operation settled as a failure, the message is exactly the one
    /// extracted by the classifier.
    #[error("{0}")]
    Invocation(String),
    /// The function could not be deleted, for whatever reason.
    #[error("{name} could not be deleted")]
    NotDeleted {
        /// The function name.
        name: String,
    },
    /// The request for the platform could not be encoded.
    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}

/// A connection to a compute platform.
#[async_trait::async_trait]
pub trait ComputePlatform: Send + Sync {
    /// Invokes `function_name` with `payload` as its input and waits for it to
    /// settle.
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvocationResponse, PlatformError>;

    /// Deletes `function_name` from the platform.
    async fn delete(&self, function_name: &str) -> Result<(), PlatformError>;
}

#[async_trait::async_trait]
impl<P> ComputePlatform for Box<P>
where
    P: ComputePlatform + ?Sized,
{
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvocationResponse, PlatformError> {
        (**self).invoke(function_name, payload).await
    }

    async fn delete(&self, function_name: &str) -> Result<(), PlatformError> {
        (**self).delete(function_name).await
    }
}

#[async_trait::async_trait]
impl<P> ComputePlatform for Arc<P>
where
    P: ComputePlatform + ?Sized,
{
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvocationResponse, PlatformError> {
        (**self).invoke(function_name, payload).await
    }

    async fn delete(&self, function_name: &str) -> Result<(), PlatformError> {
        (**self).delete(function_name).await
    }
}
