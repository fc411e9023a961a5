//! Request outcome router.
//!
//! Turns the terminal outcome of a query or mutation into at most one
//! navigation on the injected route tree.

use std::{fmt, sync::Arc};

use api_types::{
    navigation::Outcome,
    request::{RequestKey, RequestMeta},
};
use reqwest::StatusCode;

use crate::navigation::Navigator;

/// Errors that may carry an HTTP status code.
pub trait HasStatus {
    fn status(&self) -> Option<StatusCode>;
}

/// Outcome of a successful request.
pub fn success_outcome(meta: Option<&RequestMeta>) -> Option<Outcome> {
    let description = meta?.success.clone()?;
    Some(Outcome::Success { description })
}

/// Outcome of a failed request with the given status.
///
/// The "current user" query never produces an outcome, and neither does an
/// error without a status.
pub fn error_outcome(
    status: Option<StatusCode>,
    key: Option<&RequestKey>,
    meta: Option<&RequestMeta>,
) -> Option<Outcome> {
    if key.is_some_and(RequestKey::is_identity) {
        return None;
    }

    match status? {
        StatusCode::UNAUTHORIZED => Some(Outcome::AuthRequired),
        StatusCode::CONFLICT => meta?
            .conflict
            .clone()
            .map(|description| Outcome::ErrorToast { description }),
        _ => meta?
            .error
            .clone()
            .map(|description| Outcome::ErrorToast { description }),
    }
}

#[derive(Clone)]
pub struct OutcomeRouter {
    navigator: Arc<dyn Navigator>,
}

impl fmt::Debug for OutcomeRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeRouter").finish_non_exhaustive()
    }
}

impl OutcomeRouter {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    pub fn on_success(&self, meta: Option<&RequestMeta>) -> Option<Outcome> {
        let outcome = success_outcome(meta)?;
        self.navigate(&outcome);
        Some(outcome)
    }

    pub fn on_error<E>(
        &self,
        error: &E,
        key: Option<&RequestKey>,
        meta: Option<&RequestMeta>,
    ) -> Option<Outcome>
    where
        E: HasStatus + fmt::Display,
    {
        let status = error.status();
        if key.is_some_and(RequestKey::is_identity) {
            tracing::debug!(status = ?status, "identity request failed, no navigation");
            return None;
        }
        if status.is_none() {
            tracing::warn!("request failed without a status: {error}");
            return None;
        }

        let outcome = error_outcome(status, key, meta)?;
        self.navigate(&outcome);
        Some(outcome)
    }

    fn navigate(&self, outcome: &Outcome) {
        tracing::debug!(outcome = ?outcome, "routing request outcome");
        self.navigator
            .navigate_merged(".", true, outcome.clone().into_state());
    }
}
