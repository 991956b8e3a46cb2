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

#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # Compute Oracle Crate 🕸️
//!
//! A crate used to serve on-chain compute requests with serverless functions.
//!
//! ## Overview
//!
//! The oracle contract emits an event for every request it gets:
//!
//!   1. `Run`: execute a deployed function with some arguments.
//!   2. `Deploy`: create a new function from its code.
//!   3. `Edit`: replace the code of a deployed function.
//!   4. `Delete`: remove a deployed function.
//!
//! The oracle watches these events, performs the request against the
//! configured compute platform, and answers with a `runResult` or
//! `deployResult` transaction carrying the outcome. A failed request is
//! answered too, with `success = false` and the error message.

/// Handlers of the oracle events.
pub mod handlers;
/// HTTP routes of the oracle.
pub mod routes;
/// Long running services of the oracle.
pub mod service;
