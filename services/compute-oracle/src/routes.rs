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

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use ethers::signers::Signer;
use ethers::types::Address;
use serde::Serialize;

use compute_oracle_config::OracleConfig;
use compute_oracle_context::OracleContext;
use compute_oracle_utils::HandlerError;

/// The information the oracle shares about itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleInformationResponse {
    #[serde(flatten)]
    config: OracleConfig,
    /// The account the oracle submits results from.
    account: Option<Address>,
}

/// Handles oracle configuration requests
///
/// Returns the non-secret parts of the configuration, and the account
/// results are submitted from.
pub async fn handle_oracle_info(
    State(ctx): State<Arc<OracleContext>>,
) -> Json<OracleInformationResponse> {
    let account = ctx.evm_wallet().ok().map(|wallet| wallet.address());
    Json(OracleInformationResponse {
        config: ctx.config.clone(),
        account,
    })
}

/// Handles metrics requests
///
/// Returns the oracle metrics in the prometheus text format.
pub async fn handle_metric_info(
    State(ctx): State<Arc<OracleContext>>,
) -> Result<String, HandlerError> {
    ctx.metrics.gather_metrics().map_err(|e| {
        HandlerError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}
