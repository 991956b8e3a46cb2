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

use compute_oracle_utils::metric::Metrics;
use compute_oracle_utils::probe;
use ethers::types::U256;

use crate::contract::{ResultContract, SubmissionError};
use crate::events::{
    DeleteEventData, DeployEventData, EditEventData, EventFamily,
    OracleEvent, RunEventData,
};
use crate::handler::EventHandler;

/// A registered handler of events of type `E`.
pub type BoxedEventHandler<E> = Box<dyn EventHandler<E>>;

/// Submits results back to the oracle contract.
///
/// Submission never fails from the caller's point of view: a failed
/// transaction is logged, counted and dropped.
pub struct ResultReporter<C> {
    contract: Arc<C>,
    metrics: Option<Arc<Metrics>>,
}

impl<C> Clone for ResultReporter<C> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<C> ResultReporter<C>
where
    C: ResultContract,
{
    /// Creates a reporter submitting through `contract`.
    pub fn new(contract: Arc<C>) -> Self {
        Self {
            contract,
            metrics: None,
        }
    }

    /// Counts submissions in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Reports the result of a run request.
    #[tracing::instrument(skip(self, message))]
    pub async fn send_run_result(
        &self,
        message: &str,
        value: U256,
        success: bool,
    ) {
        let result = self.contract.run_result(message, value, success).await;
        self.absorb("run_result", value, result);
    }

    /// Reports the result of a deploy, edit or delete request.
    #[tracing::instrument(skip(self, message))]
    pub async fn send_deploy_result(
        &self,
        message: &str,
        name: &str,
        value: U256,
        success: bool,
    ) {
        let result = self
            .contract
            .deploy_result(message, name, value, success)
            .await;
        self.absorb("deploy_result", value, result);
    }

    fn absorb(
        &self,
        method: &'static str,
        value: U256,
        result: Result<(), SubmissionError>,
    ) {
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Submission,
            method,
            %value,
            submitted = result.is_ok(),
        );
        match result {
            Ok(()) => {
                tracing::debug!(method, %value, "Result submitted");
                if let Some(metrics) = &self.metrics {
                    metrics.results_submitted.inc();
                }
            }
            Err(e) => {
                tracing::error!(
                    %e,
                    method,
                    %value,
                    "Failed to submit the result, dropping it",
                );
                if let Some(metrics) = &self.metrics {
                    metrics.result_submission_failures.inc();
                }
            }
        }
    }
}

/// Fans oracle events out to the handlers registered for their family.
///
/// Handlers run one after the other, in registration order. Registration
/// happens before events start flowing, there is no way to remove a handler.
pub struct EventDispatcher<C> {
    run_handlers: Vec<BoxedEventHandler<RunEventData>>,
    deploy_handlers: Vec<BoxedEventHandler<DeployEventData>>,
    edit_handlers: Vec<BoxedEventHandler<EditEventData>>,
    delete_handlers: Vec<BoxedEventHandler<DeleteEventData>>,
    reporter: ResultReporter<C>,
    metrics: Option<Arc<Metrics>>,
}

impl<C> EventDispatcher<C>
where
    C: ResultContract,
{
    /// Creates a dispatcher with no handlers, reporting results through
    /// `contract`.
    pub fn new(contract: Arc<C>) -> Self {
        Self {
            run_handlers: Vec::new(),
            deploy_handlers: Vec::new(),
            edit_handlers: Vec::new(),
            delete_handlers: Vec::new(),
            reporter: ResultReporter::new(contract),
            metrics: None,
        }
    }

    /// Counts dispatched events, handler failures and submissions in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.reporter = self.reporter.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    /// A handle to submit results with, for handlers to keep.
    pub fn reporter(&self) -> ResultReporter<C> {
        self.reporter.clone()
    }

    /// Registers a handler for run events. Always returns `true`.
    pub fn on_run<H>(&mut self, handler: H) -> bool
    where
        H: EventHandler<RunEventData> + 'static,
    {
        self.run_handlers.push(Box::new(handler));
        true
    }

    /// Registers a handler for deploy events. Always returns `true`.
    pub fn on_deploy<H>(&mut self, handler: H) -> bool
    where
        H: EventHandler<DeployEventData> + 'static,
    {
        self.deploy_handlers.push(Box::new(handler));
        true
    }

    /// Registers a handler for edit events. Always returns `true`.
    pub fn on_edit<H>(&mut self, handler: H) -> bool
    where
        H: EventHandler<EditEventData> + 'static,
    {
        self.edit_handlers.push(Box::new(handler));
        true
    }

    /// Registers a handler for delete events. Always returns `true`.
    pub fn on_delete<H>(&mut self, handler: H) -> bool
    where
        H: EventHandler<DeleteEventData> + 'static,
    {
        self.delete_handlers.push(Box::new(handler));
        true
    }

    /// How many handlers are registered for `family`.
    pub fn handler_count(&self, family: EventFamily) -> usize {
        match family {
            EventFamily::Run => self.run_handlers.len(),
            EventFamily::Deploy => self.deploy_handlers.len(),
            EventFamily::Edit => self.edit_handlers.len(),
            EventFamily::Delete => self.delete_handlers.len(),
        }
    }

    /// Runs every run handler with `event`.
    pub async fn dispatch_run_event(
        &self,
        event: &RunEventData,
    ) -> compute_oracle_utils::Result<()> {
        self.dispatch_to(EventFamily::Run, &self.run_handlers, event)
            .await
    }

    /// Runs every deploy handler with `event`.
    pub async fn dispatch_deploy_event(
        &self,
        event: &DeployEventData,
    ) -> compute_oracle_utils::Result<()> {
        self.dispatch_to(EventFamily::Deploy, &self.deploy_handlers, event)
            .await
    }

    /// Runs every edit handler with `event`.
    pub async fn dispatch_edit_event(
        &self,
        event: &EditEventData,
    ) -> compute_oracle_utils::Result<()> {
        self.dispatch_to(EventFamily::Edit, &self.edit_handlers, event)
            .await
    }

    /// Runs every delete handler with `event`.
    pub async fn dispatch_delete_event(
        &self,
        event: &DeleteEventData,
    ) -> compute_oracle_utils::Result<()> {
        self.dispatch_to(EventFamily::Delete, &self.delete_handlers, event)
            .await
    }

    /// Routes `event` to the handlers of its family.
    pub async fn dispatch(
        &self,
        event: &OracleEvent,
    ) -> compute_oracle_utils::Result<()> {
        match event {
            OracleEvent::Run(e) => self.dispatch_run_event(e).await,
            OracleEvent::Deploy(e) => self.dispatch_deploy_event(e).await,
            OracleEvent::Edit(e) => self.dispatch_edit_event(e).await,
            OracleEvent::Delete(e) => self.dispatch_delete_event(e).await,
        }
    }

    /// See [`ResultReporter::send_run_result`].
    pub async fn send_run_result(
        &self,
        message: &str,
        value: U256,
        success: bool,
    ) {
        self.reporter.send_run_result(message, value, success).await
    }

    /// See [`ResultReporter::send_deploy_result`].
    pub async fn send_deploy_result(
        &self,
        message: &str,
        name: &str,
        value: U256,
        success: bool,
    ) {
        self.reporter
            .send_deploy_result(message, name, value, success)
            .await
    }

    async fn dispatch_to<E>(
        &self,
        family: EventFamily,
        handlers: &[BoxedEventHandler<E>],
        event: &E,
    ) -> compute_oracle_utils::Result<()>
    where
        E: Send + Sync,
    {
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Dispatch,
            %family,
            handlers = handlers.len(),
        );
        if let Some(metrics) = &self.metrics {
            metrics
                .events_dispatched
                .with_label_values(&[family.as_str()])
                .inc();
        }
        for handler in handlers {
            if let Err(e) = handler.handle_event(event).await {
                if let Some(metrics) = &self.metrics {
                    metrics
                        .handler_failures
                        .with_label_values(&[family.as_str()])
                        .inc();
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::mocked::{MockedResultContract, Submission};
    use parking_lot::Mutex;

    fn dispatcher(
    ) -> (Arc<MockedResultContract>, EventDispatcher<MockedResultContract>) {
        let contract = Arc::new(MockedResultContract::new());
        (contract.clone(), EventDispatcher::new(contract))
    }

    #[tokio::test]
    async fn handlers_run_in_registration_order() {
        let (_, mut dispatcher) = dispatcher();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            dispatcher.on_deploy(handler_fn(move |e: DeployEventData| {
                let seen = seen.clone();
                async move {
                    seen.lock().push((tag, e.request_id().to_owned()));
                    Ok(())
                }
            }));
        }
        let event = DeployEventData::new("foo", 2, "", U256::one());
        dispatcher.dispatch_deploy_event(&event).await.unwrap();
        assert_eq!(
            *seen.lock(),
            vec![
                ("first", String::from("foo")),
                ("second", String::from("foo")),
                ("third", String::from("foo")),
            ]
        );
    }

    #[tokio::test]
    async fn handler_error_stops_the_chain_and_propagates() {
        let (_, mut dispatcher) = dispatcher();
        let calls = Arc::new(Mutex::new(0));
        dispatcher.on_run(handler_fn(|_: RunEventData| async {
            Err(compute_oracle_utils::Error::Handler(String::from("boom")))
        }));
        let counter = calls.clone();
        dispatcher.on_run(handler_fn(move |_: RunEventData| {
            let counter = counter.clone();
            async move {
                *counter.lock() += 1;
                Ok(())
            }
        }));
        let event = RunEventData::new("f", vec![], U256::one());
        let err = dispatcher.dispatch_run_event(&event).await.unwrap_err();
        assert_eq!(err.to_string(), "Handler failed: boom");
        assert_eq!(*calls.lock(), 0);
    }

    #[tokio::test]
    async fn dispatch_routes_by_family() {
        let (_, mut dispatcher) = dispatcher();
        let deleted = Arc::new(Mutex::new(Vec::new()));
        let sink = deleted.clone();
        dispatcher.on_delete(handler_fn(move |e: DeleteEventData| {
            let sink = sink.clone();
            async move {
                sink.lock().push(e);
                Ok(())
            }
        }));
        let event = DeleteEventData::new("foo", U256::from(3u64));
        dispatcher
            .dispatch(&OracleEvent::Delete(event.clone()))
            .await
            .unwrap();
        // no run handler is registered, dispatching a run event is a no-op.
        dispatcher
            .dispatch(&OracleEvent::Run(RunEventData::new(
                "foo",
                vec![],
                U256::one(),
            )))
            .await
            .unwrap();
        assert_eq!(*deleted.lock(), vec![event]);
    }

    #[tokio::test]
    async fn metrics_count_dispatches_and_submissions() {
        let (contract, dispatcher) = dispatcher();
        let metrics = Arc::new(Metrics::new().unwrap());
        let dispatcher = dispatcher.with_metrics(metrics.clone());
        dispatcher
            .dispatch_run_event(&RunEventData::new("f", vec![], U256::one()))
            .await
            .unwrap();
        contract.fail_next("reverted");
        dispatcher.send_run_result("15", U256::one(), true).await;
        dispatcher
            .send_deploy_result("ok", "foo", U256::one(), true)
            .await;
        assert_eq!(
            metrics.events_dispatched.with_label_values(&["run"]).get(),
            1.0
        );
        assert_eq!(metrics.result_submission_failures.get(), 1.0);
        assert_eq!(metrics.results_submitted.get(), 1.0);
        assert_eq!(
            contract.submissions()[1],
            Submission::Deploy {
                message: String::from("ok"),
                name: String::from("foo"),
                value: U256::one(),
                success: true,
            }
        );
    }
}
