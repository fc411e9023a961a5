//! Query and mutation wiring.
//!
//! Every operation runs to completion exactly once (no retries) and its
//! terminal outcome is handed to the [`OutcomeRouter`] before being returned
//! to the caller unchanged.

use std::{fmt, future::Future};

use api_types::request::{RequestKey, RequestMeta};

use crate::outcome::{HasStatus, OutcomeRouter};

#[derive(Debug, Clone)]
pub struct QueryClient {
    router: OutcomeRouter,
}

impl QueryClient {
    pub fn new(router: OutcomeRouter) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &OutcomeRouter {
        &self.router
    }

    /// Runs a read operation identified by `key`.
    pub async fn query<T, E, F>(
        &self,
        key: RequestKey,
        meta: Option<RequestMeta>,
        operation: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: HasStatus + fmt::Display,
    {
        let result = operation.await;
        self.observe(&result, Some(&key), meta.as_ref());
        result
    }

    /// Runs a write operation. Mutations usually have no key.
    pub async fn mutate<T, E, F>(
        &self,
        key: Option<RequestKey>,
        meta: Option<RequestMeta>,
        operation: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: HasStatus + fmt::Display,
    {
        let result = operation.await;
        self.observe(&result, key.as_ref(), meta.as_ref());
        result
    }

    fn observe<T, E>(&self, result: &Result<T, E>, key: Option<&RequestKey>, meta: Option<&RequestMeta>)
    where
        E: HasStatus + fmt::Display,
    {
        match result {
            Ok(_) => {
                self.router.on_success(meta);
            }
            Err(err) => {
                self.router.on_error(err, key, meta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use api_types::navigation::ToastStatus;

    use super::*;
    use crate::outcome::tests::{RecordingNavigator, TestError};

    fn client() -> (QueryClient, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::default());
        (
            QueryClient::new(OutcomeRouter::new(navigator.clone())),
            navigator,
        )
    }

    #[tokio::test]
    async fn query_returns_value_and_routes_success() {
        let (client, navigator) = client();
        let value = client
            .query(
                RequestKey::new(["orders"]),
                Some(RequestMeta::default().success("Loaded")),
                async { Ok::<_, TestError>(7) },
            )
            .await
            .unwrap();

        assert_eq!(value, 7);
        let calls = navigator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.state.toast.as_ref().unwrap().status, ToastStatus::Success);
    }

    #[tokio::test]
    async fn failed_mutation_returns_error_and_routes_once() {
        let (client, navigator) = client();
        let err = client
            .mutate(
                None,
                Some(RequestMeta::default().success("Saved").error("Failed")),
                async { Err::<(), _>(TestError(Some(500))) },
            )
            .await
            .unwrap_err();

        assert_eq!(err.0, Some(500));
        let calls = navigator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.state.toast.as_ref().unwrap().description, "Failed");
    }

    #[tokio::test]
    async fn identity_query_failure_is_silent() {
        let (client, navigator) = client();
        let _ = client
            .query(
                RequestKey::identity(),
                None,
                async { Err::<(), _>(TestError(Some(401))) },
            )
            .await;
        assert!(navigator.calls().is_empty());
    }
}
