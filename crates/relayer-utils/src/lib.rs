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
//! # Compute Oracle Utilities 🕸️
//!
//! Errors, probes and metrics shared by every crate of the compute oracle.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Metrics functionality
pub mod metric;
/// A module used for debugging oracle lifecycle, sync state, or other oracle state.
pub mod probe;

/// An enum of all possible errors that could be encountered during the execution of the
/// Compute Oracle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An Io error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON Error occurred.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Config loading error.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Error while iterating over a glob pattern.
    #[error(transparent)]
    GlobPattern(#[from] glob::PatternError),
    /// Error from Glob Iterator.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
    /// Error while parsing a URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// HTTP Error
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
    /// Error in Http Provider (ethers client).
    #[error(transparent)]
    EthersProvider(#[from] ethers::providers::ProviderError),
    /// Ether wallet errors.
    #[error(transparent)]
    EtherWalletError(#[from] ethers::signers::WalletError),
    /// Elliptic Curve error.
    #[error(transparent)]
    EllipticCurve(#[from] ethers::core::k256::elliptic_curve::Error),
    /// Prometheus registry error.
    #[error(transparent)]
    PrometheusError(#[from] prometheus::Error),
    /// Generic error.
    #[error("{}", _0)]
    Generic(&'static str),
    /// Error while parsing the config files.
    #[error("Config parse error: {}", _0)]
    ParseConfig(#[from] serde_path_to_error::Error<config::ConfigError>),
    /// Missing Secrets in the config, the private key of the oracle account.
    #[error("Missing required private-key in the config")]
    MissingSecrets,
    /// The configured compute platform is not compiled in.
    #[error("Compute platform `{}` is not available in this build", _0)]
    PlatformUnavailable(String),
    /// A raw contract event could not be normalized into a typed record.
    #[error("Malformed `{}` event: {}", family, reason)]
    MalformedEvent {
        /// The event family.
        family: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// A registered event handler failed.
    ///
    /// The default handlers report their failures on chain instead; this is
    /// what custom handlers registered on the dispatcher return.
    #[error("Handler failed: {}", _0)]
    Handler(String),
}

/// A type alias for the result for the compute oracle, that uses the `Error` enum.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for HandlerError {
    fn from(value: Error) -> Self {
        HandlerError(StatusCode::INTERNAL_SERVER_ERROR, value.to_string())
    }
}

/// Error type for HTTP handlers
pub struct HandlerError(
    /// HTTP status code for response
    pub StatusCode,
    /// Response message
    pub String,
);

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}
