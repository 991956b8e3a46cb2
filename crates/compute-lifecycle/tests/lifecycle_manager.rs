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

use compute_oracle_compute::{
    ComputeError, InvocationResponse, LifecycleManager, MockedPlatform,
    PlatformError,
};

fn manager() -> (Arc<MockedPlatform>, LifecycleManager<Arc<MockedPlatform>>) {
    let platform = Arc::new(MockedPlatform::new());
    let manager = LifecycleManager::builder()
        .platform(platform.clone())
        .build();
    (platform, manager)
}

fn args() -> Vec<String> {
    vec![String::from("2"), String::from("3")]
}

#[tokio::test]
async fn returns_valid_run_responses() {
    let (platform, manager) = manager();
    platform.push_invoke_response(InvocationResponse::ok(r#"{"message":"15"}"#));
    let result = manager.invoke("existingFunction", &args()).await.unwrap();
    assert_eq!(result, "15");
}

#[tokio::test]
async fn handles_a_runtime_function_error_during_run() {
    let (platform, manager) = manager();
    platform.push_invoke_response(InvocationResponse::function_error(
        "Unhandled",
        r#"{"errorMessage":"object of type string could not be converted to int"}"#,
    ));
    let err = manager
        .invoke("existingFunctionWithBug", &args())
        .await
        .unwrap_err();
    assert!(matches!(err, ComputeError::Invocation(_)));
    assert_eq!(
        err.to_string(),
        "object of type string could not be converted to int"
    );
}

#[tokio::test]
async fn forwards_a_transport_rejection_during_run() {
    let (platform, manager) = manager();
    platform
        .push_invoke_rejection("Generic Error without ErrorFunction attribute");
    let err = manager
        .invoke("existingFunctionButPlatformError", &args())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Generic Error without ErrorFunction attribute"
    );
}

#[tokio::test]
async fn returns_valid_deploy_responses() {
    let (platform, manager) = manager();
    platform.push_invoke_response(InvocationResponse::ok("{}"));
    let result = manager.deploy("foo", 2, "code example").await.unwrap();
    assert_eq!(result, "foo successfully deployed");
}

#[tokio::test]
async fn handles_a_deployer_invocation_error_during_deploy() {
    let (platform, manager) = manager();
    platform.push_invoke_response(InvocationResponse::function_error(
        "UnhandledError",
        r#"{"errorMessage":"FunctionNotFound"}"#,
    ));
    let err = manager.deploy("foo", 2, "code example").await.unwrap_err();
    assert_eq!(err.to_string(), "FunctionNotFound");
}

#[tokio::test]
async fn handles_a_create_error_reported_by_the_deployer() {
    let (platform, manager) = manager();
    platform.push_invoke_response(InvocationResponse::ok(
        r#"{"message":"Error in createFunction in Deployer"}"#,
    ));
    let err = manager.deploy("foo", 2, "code example").await.unwrap_err();
    assert_eq!(err.to_string(), "Error in createFunction in Deployer");
}

#[tokio::test]
async fn forwards_a_transport_rejection_during_deploy() {
    let (platform, manager) = manager();
    platform.push_invoke_rejection("AccessDeniedException: not allowed");
    let err = manager.deploy("foo", 2, "code").await.unwrap_err();
    assert_eq!(err.to_string(), "AccessDeniedException: not allowed");
}

#[tokio::test]
async fn returns_valid_edit_responses() {
    let (platform, manager) = manager();
    platform.push_invoke_response(InvocationResponse::ok("{}"));
    let result = manager.edit("foo", 2, "code example").await.unwrap();
    assert_eq!(result, "foo successfully edited");
}

#[tokio::test]
async fn handles_a_deployer_invocation_error_during_edit() {
    let (platform, manager) = manager();
    platform.push_invoke_response(InvocationResponse::function_error(
        "UnhandledError",
        r#"{"errorMessage":"FunctionNotFound"}"#,
    ));
    let err = manager.edit("foo", 2, "code example").await.unwrap_err();
    assert_eq!(err.to_string(), "FunctionNotFound");
}

#[tokio::test]
async fn handles_an_update_error_reported_by_the_deployer() {
    let (platform, manager) = manager();
    platform.push_invoke_response(InvocationResponse::ok(
        r#"{"message":"Error in updateFunctionCode in Deployer"}"#,
    ));
    let err = manager.edit("foo", 2, "code example").await.unwrap_err();
    assert_eq!(err.to_string(), "Error in updateFunctionCode in Deployer");
}

#[tokio::test]
async fn returns_valid_delete_responses() {
    let (platform, manager) = manager();
    platform.push_delete_result(Ok(()));
    let result = manager.delete("someFunctionName").await.unwrap();
    assert_eq!(result, "someFunctionName deleted successfully");
    assert_eq!(platform.deletions(), vec!["someFunctionName"]);
    assert!(platform.invocations().is_empty());
}

#[tokio::test]
#[tracing_test::traced_test]
async fn delete_hides_the_cause_of_the_failure() {
    let (platform, manager) = manager();
    platform.push_delete_result(Err(PlatformError::Transport(
        "ResourceNotFound exception".into(),
    )));
    let err = manager.delete("nonExistingFunctionName").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "nonExistingFunctionName could not be deleted"
    );
    // the cause only shows up in the logs.
    assert!(logs_contain("ResourceNotFound exception"));
}
