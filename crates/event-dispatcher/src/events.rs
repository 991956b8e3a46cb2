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

//! Typed records of the oracle contract events.
//!
//! Records are only built from complete raw events, a raw event that cannot be
//! normalized is rejected as a whole.

use ethers::types::U256;

use crate::contract::{
    ComputeOracleContractEvents, DeleteFilter, DeployFilter, EditFilter,
    RunFilter,
};

/// The event families the oracle contract emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EventFamily {
    /// Execution of a function.
    #[display(fmt = "run")]
    Run,
    /// Creation of a function.
    #[display(fmt = "deploy")]
    Deploy,
    /// Update of the code of a function.
    #[display(fmt = "edit")]
    Edit,
    /// Removal of a function.
    #[display(fmt = "delete")]
    Delete,
}

impl EventFamily {
    /// The family name, as used in metric labels and logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventFamily::Run => "run",
            EventFamily::Deploy => "deploy",
            EventFamily::Edit => "edit",
            EventFamily::Delete => "delete",
        }
    }
}

/// A request to run the function `request_id` with `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEventData {
    request_id: String,
    args: Vec<String>,
    value: U256,
}

impl RunEventData {
    /// Creates a new run request.
    pub fn new(
        request_id: impl Into<String>,
        args: Vec<String>,
        value: U256,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            args,
            value,
        }
    }

    /// The name of the function to run.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The arguments, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The on-chain id of the request, echoed back with the result.
    pub fn value(&self) -> U256 {
        self.value
    }
}

/// A request to deploy the function `request_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployEventData {
    request_id: String,
    memory_size: u32,
    code: String,
    value: U256,
}

impl DeployEventData {
    /// Creates a new deploy request.
    pub fn new(
        request_id: impl Into<String>,
        memory_size: u32,
        code: impl Into<String>,
        value: U256,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            memory_size,
            code: code.into(),
            value,
        }
    }

    /// The name of the function to deploy.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Memory of the function in MB.
    pub fn memory_size(&self) -> u32 {
        self.memory_size
    }

    /// The encoded function code, or a reference to it.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The on-chain id of the request, echoed back with the result.
    pub fn value(&self) -> U256 {
        self.value
    }
}

/// A request to replace the code of the function `request_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEventData {
    request_id: String,
    memory_size: u32,
    code: String,
    value: U256,
}

impl EditEventData {
    /// Creates a new edit request.
    pub fn new(
        request_id: impl Into<String>,
        memory_size: u32,
        code: impl Into<String>,
        value: U256,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            memory_size,
            code: code.into(),
            value,
        }
    }

    /// The name of the function to edit.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Memory of the function in MB.
    pub fn memory_size(&self) -> u32 {
        self.memory_size
    }

    /// The encoded function code, or a reference to it.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The on-chain id of the request, echoed back with the result.
    pub fn value(&self) -> U256 {
        self.value
    }
}

/// A request to delete the function `request_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEventData {
    request_id: String,
    value: U256,
}

impl DeleteEventData {
    /// Creates a new delete request.
    pub fn new(request_id: impl Into<String>, value: U256) -> Self {
        Self {
            request_id: request_id.into(),
            value,
        }
    }

    /// The name of the function to delete.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The on-chain id of the request, echoed back with the result.
    pub fn value(&self) -> U256 {
        self.value
    }
}

/// Any event of the oracle contract, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleEvent {
    /// See [`RunEventData`].
    Run(RunEventData),
    /// See [`DeployEventData`].
    Deploy(DeployEventData),
    /// See [`EditEventData`].
    Edit(EditEventData),
    /// See [`DeleteEventData`].
    Delete(DeleteEventData),
}

impl OracleEvent {
    /// The family of this event.
    pub fn family(&self) -> EventFamily {
        match self {
            OracleEvent::Run(_) => EventFamily::Run,
            OracleEvent::Deploy(_) => EventFamily::Deploy,
            OracleEvent::Edit(_) => EventFamily::Edit,
            OracleEvent::Delete(_) => EventFamily::Delete,
        }
    }

    /// The name of the function the event is about.
    pub fn request_id(&self) -> &str {
        match self {
            OracleEvent::Run(e) => e.request_id(),
            OracleEvent::Deploy(e) => e.request_id(),
            OracleEvent::Edit(e) => e.request_id(),
            OracleEvent::Delete(e) => e.request_id(),
        }
    }
}

fn memory_size(
    family: EventFamily,
    raw: U256,
) -> compute_oracle_utils::Result<u32> {
    u32::try_from(raw).map_err(|_| {
        compute_oracle_utils::Error::MalformedEvent {
            family: family.as_str(),
            reason: format!("memory size {raw} does not fit in 32 bits"),
        }
    })
}

impl From<RunFilter> for RunEventData {
    fn from(raw: RunFilter) -> Self {
        Self::new(raw.name, raw.args, raw.id)
    }
}

impl TryFrom<DeployFilter> for DeployEventData {
    type Error = compute_oracle_utils::Error;

    fn try_from(raw: DeployFilter) -> Result<Self, Self::Error> {
        let memory_size = memory_size(EventFamily::Deploy, raw.memory_size)?;
        Ok(Self::new(raw.name, memory_size, raw.code, raw.id))
    }
}

impl TryFrom<EditFilter> for EditEventData {
    type Error = compute_oracle_utils::Error;

    fn try_from(raw: EditFilter) -> Result<Self, Self::Error> {
        let memory_size = memory_size(EventFamily::Edit, raw.memory_size)?;
        Ok(Self::new(raw.name, memory_size, raw.code, raw.id))
    }
}

impl From<DeleteFilter> for DeleteEventData {
    fn from(raw: DeleteFilter) -> Self {
        Self::new(raw.name, raw.id)
    }
}

impl TryFrom<ComputeOracleContractEvents> for OracleEvent {
    type Error = compute_oracle_utils::Error;

    fn try_from(raw: ComputeOracleContractEvents) -> Result<Self, Self::Error> {
        let event = match raw {
            ComputeOracleContractEvents::RunFilter(e) => Self::Run(e.into()),
            ComputeOracleContractEvents::DeployFilter(e) => {
                Self::Deploy(e.try_into()?)
            }
            ComputeOracleContractEvents::EditFilter(e) => {
                Self::Edit(e.try_into()?)
            }
            ComputeOracleContractEvents::DeleteFilter(e) => {
                Self::Delete(e.into())
            }
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_filter_keeps_the_argument_order() {
        let raw = RunFilter {
            name: String::from("sum"),
            args: vec![String::from("2"), String::from("3")],
            id: U256::from(7),
        };
        let event = OracleEvent::try_from(
            ComputeOracleContractEvents::RunFilter(raw),
        )
        .unwrap();
        let expected = RunEventData::new(
            "sum",
            vec!["2".into(), "3".into()],
            U256::from(7u64),
        );
        assert_eq!(event, OracleEvent::Run(expected));
        assert_eq!(event.family(), EventFamily::Run);
        assert_eq!(event.request_id(), "sum");
    }

    #[test]
    fn deploy_filter_is_normalized() {
        let raw = DeployFilter {
            name: String::from("foo"),
            memory_size: U256::from(128),
            code: String::from("UEsDBA=="),
            id: U256::from(1),
        };
        let event = DeployEventData::try_from(raw).unwrap();
        assert_eq!(event.memory_size(), 128);
        assert_eq!(event.code(), "UEsDBA==");
        assert_eq!(event.value(), U256::one());
    }

    #[test]
    fn oversized_memory_is_rejected() {
        let raw = EditFilter {
            name: String::from("foo"),
            memory_size: U256::from(u64::from(u32::MAX) + 1),
            code: String::new(),
            id: U256::from(1),
        };
        let err = OracleEvent::try_from(ComputeOracleContractEvents::EditFilter(
            raw,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            compute_oracle_utils::Error::MalformedEvent { family: "edit", .. }
        ));
    }

    #[test]
    fn family_display_matches_labels() {
        for family in [
            EventFamily::Run,
            EventFamily::Deploy,
            EventFamily::Edit,
            EventFamily::Delete,
        ] {
            assert_eq!(family.to_string(), family.as_str());
        }
    }
}
