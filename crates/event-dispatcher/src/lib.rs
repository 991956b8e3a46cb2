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

//! # Compute Oracle Event Dispatcher 🕸️
//!
//! Turns oracle contract events into typed requests, hands them to the
//! registered handlers and reports results back to the contract.
//!
//! ## Overview
//!
//! * [`ContractWatcher`] polls the chain and decodes the raw events.
//! * [`EventDispatcher`] keeps the handlers of every event family and runs
//!   them for each event, in registration order.
//! * [`ResultReporter`] submits `runResult` / `deployResult` transactions.
//!   A submission that fails is logged and dropped, it never reaches the
//!   handler that asked for it.

/// The oracle contract binding and the result submission seam.
pub mod contract;
mod dispatcher;
/// Typed event records.
pub mod events;
mod handler;
mod mocked;
mod watcher;

pub use contract::{OracleContract, ResultContract, SubmissionError};
pub use dispatcher::{BoxedEventHandler, EventDispatcher, ResultReporter};
pub use events::{
    DeleteEventData, DeployEventData, EditEventData, EventFamily,
    OracleEvent, RunEventData,
};
pub use handler::{handler_fn, EventHandler, HandlerFn};
pub use mocked::{MockedResultContract, Submission};
pub use watcher::ContractWatcher;
