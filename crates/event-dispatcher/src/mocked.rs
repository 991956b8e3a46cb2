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

use ethers::types::U256;
use parking_lot::Mutex;

use crate::contract::{ResultContract, SubmissionError};

/// A result transaction as seen by [`MockedResultContract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A `runResult` call.
    Run {
        /// The reported message.
        message: String,
        /// The on-chain id of the request.
        value: U256,
        /// Whether the request succeeded.
        success: bool,
    },
    /// A `deployResult` call.
    Deploy {
        /// The reported message.
        message: String,
        /// The function name.
        name: String,
        /// The on-chain id of the request.
        value: U256,
        /// Whether the request succeeded.
        success: bool,
    },
}

/// An in-memory [`ResultContract`] that records every submission.
///
/// Failures can be scripted with [`MockedResultContract::fail_next`], each
/// one consumed by the next submission, which is still recorded.
#[derive(Debug, Default)]
pub struct MockedResultContract {
    submissions: Mutex<Vec<Submission>>,
    failures: Mutex<VecDeque<String>>,
}

impl MockedResultContract {
    /// Creates a contract that accepts every submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next submission fail with `reason`.
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.failures.lock().push_back(reason.into());
    }

    /// Every submission received so far, in order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }

    fn record(&self, submission: Submission) -> Result<(), SubmissionError> {
        self.submissions.lock().push(submission);
        match self.failures.lock().pop_front() {
            Some(reason) => Err(SubmissionError::Contract(reason)),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ResultContract for MockedResultContract {
    async fn run_result(
        &self,
        message: &str,
        value: U256,
        success: bool,
    ) -> Result<(), SubmissionError> {
        self.record(Submission::Run {
            message: message.to_owned(),
            value,
            success,
        })
    }

    async fn deploy_result(
        &self,
        message: &str,
        name: &str,
        value: U256,
        success: bool,
    ) -> Result<(), SubmissionError> {
        self.record(Submission::Deploy {
            message: message.to_owned(),
            name: name.to_owned(),
            value,
            success,
        })
    }
}
