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

use prometheus::core::{AtomicF64, GenericCounter, GenericCounterVec};
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    Encoder, Registry, TextEncoder,
};

/// A struct definition for collecting metrics in the oracle.
///
/// Every instance owns its registry, so more than one can live in the same
/// process (as they do in tests).
#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Registry,
    /// Events handed to the registered handlers, labeled by event family.
    pub events_dispatched: GenericCounterVec<AtomicF64>,
    /// Handler chains that returned an error, labeled by event family.
    pub handler_failures: GenericCounterVec<AtomicF64>,
    /// Compute platform calls that settled as a success, labeled by operation.
    pub compute_successes: GenericCounterVec<AtomicF64>,
    /// Compute platform calls that settled as a failure, labeled by operation.
    pub compute_failures: GenericCounterVec<AtomicF64>,
    /// Result transactions that got mined.
    pub results_submitted: GenericCounter<AtomicF64>,
    /// Result transactions that could not be submitted.
    pub result_submission_failures: GenericCounter<AtomicF64>,
    /// Event watcher back off metric
    pub event_watcher_back_off: GenericCounter<AtomicF64>,
}

impl Metrics {
    /// Instantiates the various metrics and their counters, also creates a registry for the counters and
    /// registers the counters
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("compute_oracle".into()), None)?;

        let events_dispatched = register_counter_vec_with_registry!(
            "events_dispatched",
            "The total number of contract events handed to handlers",
            &["family"],
            registry
        )?;

        let handler_failures = register_counter_vec_with_registry!(
            "handler_failures",
            "The total number of events whose handler chain failed",
            &["family"],
            registry
        )?;

        let compute_successes = register_counter_vec_with_registry!(
            "compute_successes",
            "The total number of compute operations that succeeded",
            &["operation"],
            registry
        )?;

        let compute_failures = register_counter_vec_with_registry!(
            "compute_failures",
            "The total number of compute operations that failed",
            &["operation"],
            registry
        )?;

        let results_submitted = register_counter_with_registry!(
            "results_submitted",
            "The total number of result transactions submitted",
            registry
        )?;

        let result_submission_failures = register_counter_with_registry!(
            "result_submission_failures",
            "The total number of result transactions that failed to submit",
            registry
        )?;

        let event_watcher_back_off = register_counter_with_registry!(
            "event_watcher_back_off",
            "specifies how many times the event watcher backed off",
            registry
        )?;

        Ok(Self {
            registry,
            events_dispatched,
            handler_failures,
            compute_successes,
            compute_failures,
            results_submitted,
            result_submission_failures,
            event_watcher_back_off,
        })
    }

    /// Gathers the whole oracle metrics in the prometheus text format.
    pub fn gather_metrics(&self) -> Result<String, GatherMetricsError> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        // Gather the metrics.
        let metric_families = self.registry.gather();
        // Encode them to send.
        encoder.encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatherMetricsError {
    #[error(transparent)]
    PrometheusError(#[from] prometheus::Error),
    #[error(transparent)]
    FromUtf8Error(#[from] std::string::FromUtf8Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_instances_do_not_collide() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.events_dispatched.with_label_values(&["run"]).inc();
        assert_eq!(a.events_dispatched.with_label_values(&["run"]).get(), 1.0);
        assert_eq!(b.events_dispatched.with_label_values(&["run"]).get(), 0.0);
    }

    #[test]
    fn gathers_prefixed_text() {
        let metrics = Metrics::new().unwrap();
        metrics.results_submitted.inc();
        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("compute_oracle_results_submitted 1"));
    }
}
