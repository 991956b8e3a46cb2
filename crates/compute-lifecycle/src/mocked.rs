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

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::{ComputePlatform, InvocationResponse, PlatformError};

/// An invocation received by the [`MockedPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInvocation {
    /// The invoked function.
    pub function_name: String,
    /// The input it got invoked with.
    pub payload: Vec<u8>,
}

/// A Mocked Compute Platform
///
/// Answers invocations and deletions with scripted results, in the order they
/// got pushed, and records every call it receives. When nothing is scripted,
/// an invocation answers with an empty object and a deletion succeeds, which
/// makes it usable for local runs of the oracle without any platform.
#[derive(Debug, Default)]
pub struct MockedPlatform {
    invoke_results: Mutex<VecDeque<Result<InvocationResponse, PlatformError>>>,
    delete_results: Mutex<VecDeque<Result<(), PlatformError>>>,
    invocations: Mutex<Vec<RecordedInvocation>>,
    deletions: Mutex<Vec<String>>,
}

impl MockedPlatform {
    /// Creates a platform with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response of the next invocation.
    pub fn push_invoke_response(&self, response: InvocationResponse) {
        self.invoke_results.lock().push_back(Ok(response));
    }

    /// Scripts the next invocation to be rejected with `message`.
    pub fn push_invoke_rejection(&self, message: impl Into<String>) {
        self.invoke_results
            .lock()
            .push_back(Err(PlatformError::Transport(message.into())));
    }

    /// Scripts the result of the next deletion.
    pub fn push_delete_result(&self, result: Result<(), PlatformError>) {
        self.delete_results.lock().push_back(result);
    }

    /// Every invocation received so far.
    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.lock().clone()
    }

    /// Every function deletion requested so far.
    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().clone()
    }
}

#[async_trait::async_trait]
impl ComputePlatform for MockedPlatform {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvocationResponse, PlatformError> {
        tracing::debug!(function_name, "Mocked platform invocation");
        self.invocations.lock().push(RecordedInvocation {
            function_name: function_name.to_owned(),
            payload,
        });
        self.invoke_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(InvocationResponse::ok("{}")))
    }

    async fn delete(&self, function_name: &str) -> Result<(), PlatformError> {
        tracing::debug!(function_name, "Mocked platform deletion");
        self.deletions.lock().push(function_name.to_owned());
        self.delete_results.lock().pop_front().unwrap_or(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_in_push_order_then_falls_back() {
        let platform = MockedPlatform::new();
        platform.push_invoke_response(InvocationResponse::ok("1"));
        platform.push_invoke_rejection("nope");

        let first = platform.invoke("f", vec![]).await.unwrap();
        assert_eq!(first.payload, b"1");
        let second = platform.invoke("f", vec![]).await.unwrap_err();
        assert_eq!(second.to_string(), "nope");
        let third = platform.invoke("g", vec![1]).await.unwrap();
        assert_eq!(third, InvocationResponse::ok("{}"));

        assert_eq!(platform.invocations().len(), 3);
        assert_eq!(platform.invocations()[2].payload, vec![1]);
    }

    #[tokio::test]
    async fn records_deletions() {
        let platform = MockedPlatform::new();
        platform.push_delete_result(Err(PlatformError::Transport(
            "ResourceNotFound".into(),
        )));
        assert!(platform.delete("a").await.is_err());
        assert!(platform.delete("b").await.is_ok());
        assert_eq!(platform.deletions(), vec!["a", "b"]);
    }
}
