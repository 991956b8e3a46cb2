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

//! Settles a platform response into an [`Outcome`].
//!
//! A response is first decoded into a [`Decoded`] value, one variant per
//! shape the platform can answer with, and only then classified. The two
//! payload families read the same `message` field in opposite ways:
//!
//! * a **run** payload carries the computed result in `message`, so it is
//!   always a success.
//! * a **lifecycle** payload comes from the deployer, which only fills
//!   `message` when its own platform call failed, so a `message` there is
//!   always a failure.
//!
//! Both rules live in [`classify`] and nowhere else.

use serde_json::{Map, Value};

use crate::{InvocationResponse, PlatformError};

/// Message used when a function raised without telling us why.
pub const UNHANDLED_FUNCTION_ERROR: &str =
    "function raised an error without an error message";

/// Which kind of invocation produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// A user function got executed with the request arguments.
    Run,
    /// The deployer function got asked to create or update a function.
    Lifecycle,
}

/// The classified result of one platform invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The call succeeded, with the user-visible message.
    Success(String),
    /// The call failed, with the user-visible message.
    Failure(String),
}

impl Outcome {
    /// Whether this is a [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The message, whatever the variant.
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Failure(m) => m,
        }
    }
}

/// A settled response, decoded by shape.
#[derive(Debug)]
pub enum Decoded {
    /// The function raised; `errorMessage` of its payload, if any.
    FunctionError(Option<String>),
    /// A user function returned; its `message`, if any.
    RunResult(Option<String>),
    /// The deployer returned; the `message` it reported, if any.
    DeployerReport(Option<String>),
}

/// Decodes a settled response according to the invocation mode.
///
/// Only a JSON object carries fields. An empty payload, or any other valid
/// JSON value, decodes as if the field was missing.
pub fn decode(
    mode: InvocationMode,
    response: &InvocationResponse,
) -> Result<Decoded, serde_json::Error> {
    let mut fields = parse_payload(&response.payload)?;
    if response.function_error.is_some() {
        return Ok(Decoded::FunctionError(take_text(
            &mut fields,
            "errorMessage",
        )));
    }
    let message = take_text(&mut fields, "message");
    match mode {
        InvocationMode::Run => Ok(Decoded::RunResult(message)),
        InvocationMode::Lifecycle => Ok(Decoded::DeployerReport(message)),
    }
}

/// Classifies the result of a platform invocation.
///
/// * a transport rejection fails with its message, verbatim.
/// * an application error fails with the payload `errorMessage`, or
///   [`UNHANDLED_FUNCTION_ERROR`] when it has none. This takes precedence
///   over any `message` in the same payload.
/// * a run result succeeds with its `message` (empty when missing).
/// * a deployer report fails with its `message`, and succeeds without one.
/// * a payload that is not valid JSON fails with the parse error.
pub fn classify(
    mode: InvocationMode,
    response: Result<InvocationResponse, PlatformError>,
) -> Outcome {
    let response = match response {
        Ok(response) => response,
        Err(PlatformError::Transport(message)) => {
            return Outcome::Failure(message)
        }
    };
    match decode(mode, &response) {
        Ok(Decoded::FunctionError(error_message)) => Outcome::Failure(
            error_message
                .unwrap_or_else(|| UNHANDLED_FUNCTION_ERROR.to_owned()),
        ),
        Ok(Decoded::RunResult(message)) => {
            Outcome::Success(message.unwrap_or_default())
        }
        Ok(Decoded::DeployerReport(Some(message))) => {
            Outcome::Failure(message)
        }
        Ok(Decoded::DeployerReport(None)) => Outcome::Success(String::new()),
        Err(e) => {
            tracing::debug!(%e, "Failed to parse the function payload");
            Outcome::Failure(e.to_string())
        }
    }
}

fn parse_payload(
    payload: &[u8],
) -> Result<Map<String, Value>, serde_json::Error> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice(payload)? {
        Value::Object(fields) => Ok(fields),
        _ => Ok(Map::new()),
    }
}

fn take_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::Null => None,
        value => Some(into_text(value)),
    }
}

/// Strings are taken as they are, anything else as its JSON text.
fn into_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
