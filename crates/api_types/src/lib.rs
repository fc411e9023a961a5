use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform the application is built for.
///
/// Each platform owns its own route tree; the choice is made once at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Management console.
    #[default]
    Gestao,
    /// Seller console.
    Sellers,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gestao => "gestao",
            Self::Sellers => "sellers",
        }
    }
}

pub mod request {
    use super::*;

    /// First element of the "current user" query key.
    pub const QK_ME: &str = "me";

    /// Ordered sequence of values identifying a query or mutation.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RequestKey(pub Vec<Value>);

    impl RequestKey {
        pub fn new<I, V>(parts: I) -> Self
        where
            I: IntoIterator<Item = V>,
            V: Into<Value>,
        {
            Self(parts.into_iter().map(Into::into).collect())
        }

        /// The reserved key of the "current user" query.
        pub fn identity() -> Self {
            Self::new([QK_ME])
        }

        /// Comma-joined rendering of the key.
        ///
        /// Strings are rendered raw, `null` as an empty string and nested
        /// arrays are flattened with the same separator.
        pub fn joined(&self) -> String {
            join_values(&self.0)
        }

        /// Returns `true` if this key designates the "current user" query.
        pub fn is_identity(&self) -> bool {
            self.joined() == Self::identity().joined()
        }
    }

    fn join_values(values: &[Value]) -> String {
        values
            .iter()
            .map(|value| match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                Value::Array(items) => join_values(items),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Messages a caller attaches to a query or mutation.
    ///
    /// The outcome router only reads it.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RequestMeta {
        /// Shown on success.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub success: Option<String>,
        /// Shown on a generic failure.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
        /// Shown on HTTP 409.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub conflict: Option<String>,
    }

    impl RequestMeta {
        pub fn success(mut self, message: impl Into<String>) -> Self {
            self.success = Some(message.into());
            self
        }

        pub fn error(mut self, message: impl Into<String>) -> Self {
            self.error = Some(message.into());
            self
        }

        pub fn conflict(mut self, message: impl Into<String>) -> Self {
            self.conflict = Some(message.into());
            self
        }
    }
}

pub mod navigation {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ToastStatus {
        Success,
        Error,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Toast {
        pub status: ToastStatus,
        pub description: String,
    }

    /// State carried by a client-side route.
    ///
    /// Keys other than `toast` and `authRequired` belong to the screens and
    /// are preserved untouched in `extra`.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LocationState {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub toast: Option<Toast>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub auth_required: Option<bool>,
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    impl LocationState {
        /// Overlays `other` on top of `self`: every key present in `other`
        /// wins, every other key of `self` is kept.
        pub fn merge(mut self, other: LocationState) -> Self {
            if other.toast.is_some() {
                self.toast = other.toast;
            }
            if other.auth_required.is_some() {
                self.auth_required = other.auth_required;
            }
            self.extra.extend(other.extra);
            self
        }

        pub fn is_empty(&self) -> bool {
            self.toast.is_none() && self.auth_required.is_none() && self.extra.is_empty()
        }
    }

    /// UI effect derived from a completed request.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum Outcome {
        Success { description: String },
        ErrorToast { description: String },
        AuthRequired,
    }

    impl Outcome {
        /// The partial location state this outcome contributes.
        pub fn into_state(self) -> LocationState {
            match self {
                Self::Success { description } => LocationState {
                    toast: Some(Toast {
                        status: ToastStatus::Success,
                        description,
                    }),
                    ..LocationState::default()
                },
                Self::ErrorToast { description } => LocationState {
                    toast: Some(Toast {
                        status: ToastStatus::Error,
                        description,
                    }),
                    ..LocationState::default()
                },
                Self::AuthRequired => LocationState {
                    auth_required: Some(true),
                    ..LocationState::default()
                },
            }
        }
    }
}
