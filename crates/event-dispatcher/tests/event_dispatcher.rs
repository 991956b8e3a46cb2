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

use compute_oracle_dispatcher::{
    handler_fn, DeployEventData, EventDispatcher, EventFamily,
    MockedResultContract, RunEventData, Submission,
};
use ethers::types::U256;
use parking_lot::Mutex;
use tracing_test::traced_test;

fn setup(
) -> (Arc<MockedResultContract>, EventDispatcher<MockedResultContract>) {
    let contract = Arc::new(MockedResultContract::new());
    let dispatcher = EventDispatcher::new(contract.clone());
    (contract, dispatcher)
}

#[traced_test]
#[tokio::test]
async fn send_run_result_absorbs_submission_failures() {
    let (contract, dispatcher) = setup();
    contract.fail_next("Blockchain Error");
    dispatcher
        .send_run_result(
            "ok response with blockchain exception",
            U256::one(),
            true,
        )
        .await;
    assert!(logs_contain("Failed to submit the result"));
    assert!(logs_contain("Blockchain Error"));
    assert_eq!(
        contract.submissions(),
        vec![Submission::Run {
            message: String::from("ok response with blockchain exception"),
            value: U256::one(),
            success: true,
        }]
    );
}

#[traced_test]
#[tokio::test]
async fn send_deploy_result_absorbs_submission_failures() {
    let (contract, dispatcher) = setup();
    contract.fail_next("Blockchain Error");
    dispatcher
        .send_deploy_result(
            "ok response with blockchain exception",
            "someName",
            U256::one(),
            true,
        )
        .await;
    assert!(logs_contain("Failed to submit the result"));
    // the next submission goes through.
    dispatcher
        .send_deploy_result(
            "someName deleted successfully",
            "someName",
            U256::from(2u64),
            true,
        )
        .await;
    assert_eq!(contract.submissions().len(), 2);
}

#[tokio::test]
async fn adds_run_callback() {
    let (_, mut dispatcher) = setup();
    assert!(dispatcher.on_run(handler_fn(|_: RunEventData| async { Ok(()) })));
    assert!(dispatcher.on_run(handler_fn(|_: RunEventData| async { Ok(()) })));
    assert_eq!(dispatcher.handler_count(EventFamily::Run), 2);
    assert_eq!(dispatcher.handler_count(EventFamily::Deploy), 0);
}

#[tokio::test]
async fn adds_deploy_callback() {
    let (_, mut dispatcher) = setup();
    let registered = dispatcher
        .on_deploy(handler_fn(|_: DeployEventData| async { Ok(()) }));
    assert!(registered);
    assert_eq!(dispatcher.handler_count(EventFamily::Deploy), 1);
}

#[tokio::test]
async fn dispatches_run_event_exactly_once_with_the_same_record() {
    let (_, mut dispatcher) = setup();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    dispatcher.on_run(handler_fn(move |event: RunEventData| {
        let sink = sink.clone();
        async move {
            sink.lock().push(event);
            Ok(())
        }
    }));
    let event = RunEventData::new("", vec![], U256::one());
    dispatcher.dispatch_run_event(&event).await.unwrap();
    assert_eq!(*seen.lock(), vec![event]);
}

#[tokio::test]
async fn dispatches_deploy_event_exactly_once_with_the_same_record() {
    let (_, mut dispatcher) = setup();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    dispatcher.on_deploy(handler_fn(move |event: DeployEventData| {
        let sink = sink.clone();
        async move {
            sink.lock().push(event);
            Ok(())
        }
    }));
    let event = DeployEventData::new("", 2, "", U256::one());
    dispatcher.dispatch_deploy_event(&event).await.unwrap();
    assert_eq!(*seen.lock(), vec![event]);
}

#[tokio::test]
async fn dispatching_without_handlers_is_a_no_op() {
    let (contract, dispatcher) = setup();
    dispatcher
        .dispatch_run_event(&RunEventData::new("", vec![], U256::one()))
        .await
        .unwrap();
    dispatcher
        .dispatch_deploy_event(&DeployEventData::new("", 2, "", U256::one()))
        .await
        .unwrap();
    assert!(contract.submissions().is_empty());
}

#[tokio::test]
async fn handlers_report_through_the_reporter() {
    let (contract, mut dispatcher) = setup();
    let reporter = dispatcher.reporter();
    dispatcher.on_run(handler_fn(move |event: RunEventData| {
        let reporter = reporter.clone();
        async move {
            let message = event.args().join("+");
            reporter.send_run_result(&message, event.value(), true).await;
            Ok(())
        }
    }));
    let event = RunEventData::new(
        "sum",
        vec![String::from("2"), String::from("3")],
        U256::from(42u64),
    );
    dispatcher.dispatch_run_event(&event).await.unwrap();
    assert_eq!(
        contract.submissions(),
        vec![Submission::Run {
            message: String::from("2+3"),
            value: U256::from(42u64),
            success: true,
        }]
    );
}
