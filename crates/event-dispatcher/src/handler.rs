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

use std::future::Future;

/// A handler for one family of oracle events.
///
/// An error returned by a handler propagates to whoever dispatched the event,
/// the handlers registered after it do not see that event.
#[async_trait::async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: Send + Sync,
{
    /// Handles one event.
    async fn handle_event(
        &self,
        event: &E,
    ) -> compute_oracle_utils::Result<()>;
}

/// An [`EventHandler`] made from an async closure, see [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F>(F);

/// Wraps `f` into an [`EventHandler`].
///
/// The closure receives its own copy of the event.
///
/// ```
/// use compute_oracle_dispatcher::{handler_fn, RunEventData};
///
/// let handler = handler_fn(|event: RunEventData| async move {
///     tracing::info!(function = %event.request_id(), "Run requested");
///     Ok(())
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<E, F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(E) -> Fut,
    Fut: Future<Output = compute_oracle_utils::Result<()>>,
{
    HandlerFn(f)
}

#[async_trait::async_trait]
impl<E, F, Fut> EventHandler<E> for HandlerFn<F>
where
    E: Clone + Send + Sync + 'static,
    F: Fn(E) -> Fut + Send + Sync,
    Fut: Future<Output = compute_oracle_utils::Result<()>> + Send + 'static,
{
    async fn handle_event(
        &self,
        event: &E,
    ) -> compute_oracle_utils::Result<()> {
        (self.0)(event.clone()).await
    }
}
