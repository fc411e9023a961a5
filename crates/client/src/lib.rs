//! Client-side request plumbing.
//!
//! Auth token access, the core/auth HTTP clients, and the router that turns
//! request outcomes into toast or auth-redirect navigation.

pub mod api;
pub mod error;
pub mod navigation;
pub mod outcome;
pub mod query;
pub mod reporting;
pub mod storage;
pub mod token;

pub use api::{ApiClient, ApiClients, ApiError, ApiSettings};
pub use error::{ClientError, Result, StorageError, TokenError};
pub use navigation::{Location, NavigateOptions, Navigator, RouteTree, Routes};
pub use outcome::{HasStatus, OutcomeRouter};
pub use query::QueryClient;
pub use storage::{AUTH_TOKEN, FileStorage, MemoryStorage, Storage};
